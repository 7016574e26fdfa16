//! Audio device callback: exact-length PCM delivery from irregular decode units.

use std::sync::Arc;

use crate::media::AudioCodec;
use crate::pipeline::{AudioDecoder, DecodeStatus};
use crate::session::PlayerState;
use crate::SilencePolicy;

/// Fills the output buffers the audio device asks for.
///
/// The device dictates how many bytes it wants; the decoder hands out
/// whatever one decode unit happens to contain. `AudioCallback` keeps the
/// unconsumed tail of the last unit and tops it up from the decoder, playing
/// silence whenever the decoder has nothing (shutdown, starvation).
///
/// The callback is driven by a single audio thread and is never invoked
/// concurrently with itself.
pub struct AudioCallback<C> {
    decoder: AudioDecoder<C>,
    buf: Vec<u8>,
    index: usize,
    silence: SilencePolicy,
    state: Arc<PlayerState>,
}

impl<C: AudioCodec> AudioCallback<C> {
    /// Wraps a decoder, substituting 1024-byte silence blocks on underrun.
    pub fn new(decoder: AudioDecoder<C>) -> Self {
        Self {
            decoder,
            buf: Vec::new(),
            index: 0,
            silence: SilencePolicy::default(),
            state: Arc::new(PlayerState::new()),
        }
    }

    /// Sets how much silence is synthesized per underrun.
    #[must_use]
    pub fn with_silence(mut self, silence: SilencePolicy) -> Self {
        self.silence = silence;
        self
    }

    pub(crate) fn with_state(mut self, state: Arc<PlayerState>) -> Self {
        self.state = state;
        self
    }

    /// Returns the number of bytes left over from the last decode unit.
    pub fn leftover(&self) -> usize {
        self.buf.len() - self.index
    }

    /// Writes exactly `out.len()` bytes of PCM into `out`.
    ///
    /// Only ever suspends inside the decoder's blocking queue retrieval.
    pub fn fill(&mut self, out: &mut [u8]) {
        let mut written = 0;

        while written < out.len() {
            if self.index >= self.buf.len() {
                self.refill(out.len() - written);
            }

            let n = (self.buf.len() - self.index).min(out.len() - written);
            out[written..written + n].copy_from_slice(&self.buf[self.index..self.index + n]);
            written += n;
            self.index += n;
        }
    }

    fn refill(&mut self, shortfall: usize) {
        match self.decoder.decode_next_chunk() {
            DecodeStatus::Pcm(pcm) => {
                self.buf = pcm;
            }
            status @ (DecodeStatus::EndOfStream | DecodeStatus::Starved) => {
                let len = match self.silence {
                    SilencePolicy::FixedBlock(block) => block.max(1),
                    SilencePolicy::ExactShortfall => shortfall,
                };
                tracing::trace!(?status, len, "no audio available, playing silence");
                self.state.record_underrun(len);

                self.buf.clear();
                self.buf.resize(len, 0);
            }
        }
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::mock::{PassthroughCodec, ScriptedCodec, Step};
    use crate::{Packet, PacketQueue, RetrievalMode, ShutdownSignal};

    fn callback<C: AudioCodec>(codec: C) -> (AudioCallback<C>, PacketQueue, ShutdownSignal) {
        let shutdown = ShutdownSignal::new();
        let queue = PacketQueue::new(shutdown.clone());
        let decoder = AudioDecoder::new(codec, queue.clone(), shutdown.clone());
        (AudioCallback::new(decoder), queue, shutdown)
    }

    #[test]
    fn test_fill_spans_decode_units() {
        let (mut cb, queue, _shutdown) = callback(PassthroughCodec::new());
        queue.push(Packet::new(0, vec![1; 3])).unwrap();
        queue.push(Packet::new(0, vec![2; 3])).unwrap();
        queue.push(Packet::new(0, vec![3; 3])).unwrap();

        let mut out = [0u8; 4];
        cb.fill(&mut out);
        assert_eq!(out, [1, 1, 1, 2]);
        assert_eq!(cb.leftover(), 2);

        cb.fill(&mut out);
        assert_eq!(out, [2, 2, 3, 3]);
        assert_eq!(cb.leftover(), 1);
    }

    #[test]
    fn test_all_failures_produce_silence() {
        let (cb, queue, _shutdown) = callback(ScriptedCodec::always_failing());
        let mut cb = AudioCallback {
            decoder: cb.decoder.with_retrieval(RetrievalMode::NonBlocking),
            ..cb
        };
        for _ in 0..5 {
            queue.push(Packet::new(0, vec![0xAA; 300])).unwrap();
        }

        let mut out = vec![0xFFu8; 3000];
        cb.fill(&mut out);
        assert!(out.iter().all(|&b| b == 0));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_fill_is_exact_for_any_length() {
        let codec = ScriptedCodec::new(vec![
            Step::frame(vec![1; 5]),
            Step::fail("bad"),
            Step::pending(2),
            Step::frame(vec![2; 7]),
        ]);
        let (cb, queue, _shutdown) = callback(codec);
        let mut cb = AudioCallback {
            decoder: cb.decoder.with_retrieval(RetrievalMode::NonBlocking),
            ..cb
        };
        queue.push(Packet::new(0, vec![0; 4])).unwrap();
        queue.push(Packet::new(0, vec![0; 4])).unwrap();
        queue.push(Packet::new(0, vec![0; 4])).unwrap();

        let mut total = Vec::new();
        for n in [1usize, 3, 7, 1024, 4097] {
            let mut out = vec![0xEEu8; n];
            cb.fill(&mut out);
            assert_eq!(out.len(), n);
            total.extend_from_slice(&out);
        }

        assert_eq!(&total[..5], &[1; 5]);
        assert_eq!(&total[5..12], &[2; 7]);
        assert!(total[12..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_fixed_block_silence_carries_over() {
        let (cb, queue, _shutdown) = callback(PassthroughCodec::new());
        let mut cb = AudioCallback {
            decoder: cb.decoder.with_retrieval(RetrievalMode::NonBlocking),
            ..cb
        };

        let mut out = vec![0xFFu8; 100];
        cb.fill(&mut out);
        assert_eq!(cb.leftover(), 924);

        queue.push(Packet::new(0, vec![5; 10])).unwrap();
        let mut out = vec![0xFFu8; 1000];
        cb.fill(&mut out);
        assert!(out[..924].iter().all(|&b| b == 0));
        assert_eq!(&out[924..934], &[5; 10]);
    }

    #[test]
    fn test_exact_shortfall_silence() {
        let (cb, queue, _shutdown) = callback(PassthroughCodec::new());
        let mut cb = AudioCallback {
            decoder: cb.decoder.with_retrieval(RetrievalMode::NonBlocking),
            ..cb
        }
        .with_silence(SilencePolicy::ExactShortfall);

        let mut out = vec![0xFFu8; 100];
        cb.fill(&mut out);
        assert!(out.iter().all(|&b| b == 0));
        assert_eq!(cb.leftover(), 0);

        queue.push(Packet::new(0, vec![5; 10])).unwrap();
        let mut out = vec![0u8; 10];
        cb.fill(&mut out);
        assert_eq!(out, [5; 10]);
    }

    #[test]
    fn test_shutdown_plays_silence_without_blocking() {
        let (mut cb, queue, shutdown) = callback(PassthroughCodec::new());
        queue.push(Packet::new(0, vec![9; 64])).unwrap();
        shutdown.trigger();

        let mut out = vec![0xFFu8; 2048];
        cb.fill(&mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_underruns_are_counted() {
        let state = Arc::new(PlayerState::new());
        let (cb, _queue, _shutdown) = callback(PassthroughCodec::new());
        let mut cb = AudioCallback {
            decoder: cb.decoder.with_retrieval(RetrievalMode::NonBlocking),
            ..cb
        }
        .with_state(Arc::clone(&state));

        let mut out = vec![0u8; 2048];
        cb.fill(&mut out);

        let stats = state.snapshot(0, 0);
        assert_eq!(stats.underruns, 2);
        assert_eq!(stats.silence_bytes, 2048);
    }
}
