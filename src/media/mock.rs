//! Mock collaborators for testing without real media or codecs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{AudioCodec, Decoded, Demuxer, StreamInfo};
use crate::{CodecError, DemuxError, OutputFormat, Packet};

enum MockUnit {
    Packet(Packet),
    Error(String),
}

/// A demuxer that replays a prepared list of packets.
///
/// # Example
///
/// ```
/// use stream_player::media::mock::{tone_pcm, MockDemuxer};
/// use stream_player::media::{Demuxer, StreamInfo};
/// use stream_player::OutputFormat;
///
/// let format = OutputFormat { sample_rate: 16000, channels: 1 };
/// let mut demuxer = MockDemuxer::new(vec![StreamInfo::audio(0, 16000, 1)]);
///
/// // 100ms of 440Hz split into 800-byte packets
/// demuxer.add_pcm(0, &tone_pcm(format, 440.0, 100), 800);
///
/// assert_eq!(demuxer.remaining(), 4);
/// assert_eq!(demuxer.next_unit().unwrap().unwrap().len(), 800);
/// ```
pub struct MockDemuxer {
    streams: Vec<StreamInfo>,
    units: VecDeque<MockUnit>,
}

impl MockDemuxer {
    /// Creates a demuxer with the given stream table and no packets.
    pub fn new(streams: Vec<StreamInfo>) -> Self {
        Self {
            streams,
            units: VecDeque::new(),
        }
    }

    /// Appends one packet.
    pub fn add_packet(&mut self, packet: Packet) -> &mut Self {
        self.units.push_back(MockUnit::Packet(packet));
        self
    }

    /// Appends a read failure.
    pub fn add_error(&mut self, message: impl Into<String>) -> &mut Self {
        self.units.push_back(MockUnit::Error(message.into()));
        self
    }

    /// Splits `payload` into packets of at most `packet_bytes` for a stream.
    pub fn add_pcm(&mut self, stream_index: usize, payload: &[u8], packet_bytes: usize) -> &mut Self {
        for chunk in payload.chunks(packet_bytes.max(1)) {
            self.add_packet(Packet::new(stream_index, chunk.to_vec()));
        }
        self
    }

    /// Returns how many units are left to read.
    pub fn remaining(&self) -> usize {
        self.units.len()
    }
}

impl Demuxer for MockDemuxer {
    fn streams(&self) -> &[StreamInfo] {
        &self.streams
    }

    fn next_unit(&mut self) -> Result<Option<Packet>, DemuxError> {
        match self.units.pop_front() {
            Some(MockUnit::Packet(packet)) => Ok(Some(packet)),
            Some(MockUnit::Error(message)) => Err(DemuxError::Malformed(message)),
            None => Ok(None),
        }
    }
}

/// A codec whose input already is PCM.
///
/// Each call consumes up to `frame_bytes` of input (the whole remainder if
/// unset) and returns it unchanged, so one packet may decode into several
/// units.
#[derive(Debug, Clone, Default)]
pub struct PassthroughCodec {
    frame_bytes: Option<usize>,
}

impl PassthroughCodec {
    /// Returns each packet as a single decode unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits packets into decode units of at most `frame_bytes`.
    pub fn with_frame_bytes(frame_bytes: usize) -> Self {
        Self {
            frame_bytes: Some(frame_bytes.max(1)),
        }
    }
}

impl AudioCodec for PassthroughCodec {
    fn decode(&mut self, input: &[u8]) -> Result<Decoded, CodecError> {
        let take = self.frame_bytes.map_or(input.len(), |n| n.min(input.len()));
        Ok(Decoded::frame(take, input[..take].to_vec()))
    }
}

/// One scripted codec response.
#[derive(Debug, Clone)]
pub enum Step {
    /// Consume `consumed` bytes (the whole input if `None`) and optionally
    /// emit PCM.
    Consume {
        /// Bytes to report as consumed.
        consumed: Option<usize>,
        /// PCM to return.
        pcm: Option<Vec<u8>>,
    },
    /// Fail with an invalid-data error.
    Fail(String),
}

impl Step {
    /// Consumes the whole input and emits `pcm`.
    pub fn frame(pcm: Vec<u8>) -> Self {
        Self::Consume {
            consumed: None,
            pcm: Some(pcm),
        }
    }

    /// Consumes `consumed` bytes without emitting anything.
    pub fn pending(consumed: usize) -> Self {
        Self::Consume {
            consumed: Some(consumed),
            pcm: None,
        }
    }

    /// Fails the call.
    pub fn fail(reason: impl Into<String>) -> Self {
        Self::Fail(reason.into())
    }
}

/// A codec that plays back a fixed script of responses.
///
/// Once the script runs out every call fails. The call counter is shared so
/// it can still be read after the codec has been moved into a decoder.
///
/// # Example
///
/// ```
/// use stream_player::media::mock::{ScriptedCodec, Step};
/// use stream_player::media::AudioCodec;
///
/// let mut codec = ScriptedCodec::new(vec![Step::pending(2), Step::frame(vec![0; 4])]);
/// let calls = codec.calls();
///
/// assert!(codec.decode(&[1, 2, 3, 4]).unwrap().pcm.is_none());
/// assert_eq!(codec.decode(&[3, 4]).unwrap().pcm, Some(vec![0; 4]));
/// assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
/// ```
#[derive(Debug)]
pub struct ScriptedCodec {
    steps: VecDeque<Step>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedCodec {
    /// Creates a codec that answers with `steps` in order.
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A codec that rejects everything.
    pub fn always_failing() -> Self {
        Self::new(Vec::new())
    }

    /// Returns the shared call counter.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl AudioCodec for ScriptedCodec {
    fn decode(&mut self, input: &[u8]) -> Result<Decoded, CodecError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.steps.pop_front() {
            Some(Step::Consume { consumed, pcm }) => Ok(Decoded {
                consumed: consumed.unwrap_or(input.len()),
                pcm,
            }),
            Some(Step::Fail(reason)) => Err(CodecError::invalid_data(reason)),
            None => Err(CodecError::Unsupported("script exhausted".to_string())),
        }
    }
}

/// Generates a sine tone as signed 16-bit native-endian PCM.
///
/// The same sample is written to every channel.
pub fn tone_pcm(format: OutputFormat, frequency: f64, duration_ms: u64) -> Vec<u8> {
    let frames = (u64::from(format.sample_rate) * duration_ms / 1000) as usize;
    let sample_rate = f64::from(format.sample_rate);
    let mut pcm = Vec::with_capacity(frames * format.bytes_per_frame());

    for i in 0..frames {
        let t = i as f64 / sample_rate;
        let value = (2.0 * std::f64::consts::PI * frequency * t).sin();
        let sample = crate::format::f32_to_i16(value as f32);

        for _ in 0..format.channels {
            pcm.extend_from_slice(&sample.to_ne_bytes());
        }
    }

    pcm
}
