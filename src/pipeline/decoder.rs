//! Pull-based audio decoder: packets in, one decode unit of PCM out per call.
//!
//! A compressed packet rarely maps onto one unit of PCM. The codec may need
//! several calls to get through one packet, may buffer input without
//! producing anything, or may reject the data outright. [`AudioDecoder`]
//! hides this behind [`decode_next_chunk`](AudioDecoder::decode_next_chunk),
//! keeping the partially consumed packet between calls.

use std::sync::Arc;

use crate::media::AudioCodec;
use crate::pipeline::{PacketQueue, Pop};
use crate::session::PlayerState;
use crate::{
    EventCallback, Packet, PlayerEvent, RetrievalMode, ShutdownSignal,
    DEFAULT_MAX_AUDIO_FRAME_SIZE,
};

/// Outcome of [`AudioDecoder::decode_next_chunk`].
#[derive(Debug, PartialEq, Eq)]
pub enum DecodeStatus {
    /// One decode unit of signed 16-bit PCM. Never empty.
    Pcm(Vec<u8>),
    /// Shutdown was signalled; no more audio will be decoded.
    EndOfStream,
    /// The queue was empty and retrieval is non-blocking.
    Starved,
}

/// The packet currently being decoded and how far into it we are.
struct HeldPacket {
    packet: Packet,
    offset: usize,
}

impl HeldPacket {
    fn remaining(&self) -> usize {
        self.packet.len() - self.offset
    }
}

/// Decodes queued packets on demand, carrying partial packets across calls.
pub struct AudioDecoder<C> {
    codec: C,
    queue: PacketQueue,
    shutdown: ShutdownSignal,
    retrieval: RetrievalMode,
    max_frame_size: usize,
    held: Option<HeldPacket>,
    state: Arc<PlayerState>,
    event_callback: Option<EventCallback>,
}

impl<C: AudioCodec> AudioDecoder<C> {
    /// Creates a decoder reading from `queue` with blocking retrieval.
    pub fn new(codec: C, queue: PacketQueue, shutdown: ShutdownSignal) -> Self {
        Self {
            codec,
            queue,
            shutdown,
            retrieval: RetrievalMode::Blocking,
            max_frame_size: DEFAULT_MAX_AUDIO_FRAME_SIZE,
            held: None,
            state: Arc::new(PlayerState::new()),
            event_callback: None,
        }
    }

    /// Sets how packets are retrieved from the queue.
    #[must_use]
    pub fn with_retrieval(mut self, retrieval: RetrievalMode) -> Self {
        self.retrieval = retrieval;
        self
    }

    /// Sets the largest decode unit passed on; longer units are truncated.
    #[must_use]
    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size.max(1);
        self
    }

    /// Sets the event callback used to report dropped packets.
    #[must_use]
    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    pub(crate) fn with_state(mut self, state: Arc<PlayerState>) -> Self {
        self.state = state;
        self
    }

    /// Returns `true` if part of a packet is still waiting to be decoded.
    pub fn has_pending_input(&self) -> bool {
        self.held.as_ref().is_some_and(|h| h.remaining() > 0)
    }

    /// Produces the next decode unit of PCM.
    ///
    /// Works through the held packet first. A codec error discards the rest
    /// of that packet and moves on to the next one; a call that consumes
    /// input without output is retried on the remainder. When the held packet
    /// is exhausted the next one is taken from the queue, waiting for it in
    /// blocking mode.
    pub fn decode_next_chunk(&mut self) -> DecodeStatus {
        loop {
            if let Some(held) = self.held.as_mut() {
                while held.remaining() > 0 {
                    match self.codec.decode(&held.packet.data[held.offset..]) {
                        Ok(decoded) => {
                            let consumed = decoded.consumed.min(held.remaining());
                            held.offset += consumed;

                            if let Some(pcm) = decoded.pcm.filter(|pcm| !pcm.is_empty()) {
                                let pcm = truncate_frame(pcm, self.max_frame_size);
                                self.state.record_decoded(pcm.len());
                                return DecodeStatus::Pcm(pcm);
                            }
                            // Codec buffered the input; keep feeding it.
                        }
                        Err(e) => {
                            let dropped = held.remaining();
                            held.offset = held.packet.len();

                            tracing::warn!(
                                stream = held.packet.stream_index,
                                dropped,
                                error = %e,
                                "skipping undecodable audio packet"
                            );
                            self.state.record_decode_error();
                            if let Some(ref callback) = self.event_callback {
                                callback(PlayerEvent::PacketDropped {
                                    bytes: dropped,
                                    reason: e.to_string(),
                                });
                            }
                        }
                    }
                }
            }

            self.held = None;

            if self.shutdown.is_triggered() {
                return DecodeStatus::EndOfStream;
            }

            match self.queue.pop(self.retrieval == RetrievalMode::Blocking) {
                Pop::Packet(packet) => {
                    tracing::trace!(bytes = packet.len(), "audio packet dequeued");
                    self.held = Some(HeldPacket { packet, offset: 0 });
                }
                Pop::Empty => return DecodeStatus::Starved,
                Pop::Terminated => return DecodeStatus::EndOfStream,
            }
        }
    }
}

fn truncate_frame(mut pcm: Vec<u8>, max_frame_size: usize) -> Vec<u8> {
    if pcm.len() > max_frame_size {
        tracing::warn!(
            len = pcm.len(),
            max = max_frame_size,
            "decoded frame exceeds maximum size, truncating"
        );
        pcm.truncate(max_frame_size);
    }
    pcm
}
