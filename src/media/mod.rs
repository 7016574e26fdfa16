//! Interfaces to the demuxing and decoding collaborators.
//!
//! The player owns no container parser and no codec. It needs exactly three
//! things from the outside world, expressed as traits here:
//!
//! - [`Demuxer`]: a stream table and a sequence of tagged packets
//! - [`AudioCodec`]: compressed bytes in, PCM out, with consumption reported
//! - [`VideoPath`]: somewhere to hand video packets
//!
//! [`mock`] provides hardware- and codec-free implementations for tests.

pub mod mock;
mod stream;

pub use stream::{select_streams, MediaKind, StreamInfo, StreamSelection};

use crate::{CodecError, DemuxError, Packet};

/// Source of demultiplexed packets.
pub trait Demuxer: Send {
    /// Describes the elementary streams in the container.
    fn streams(&self) -> &[StreamInfo];

    /// Reads the next packet.
    ///
    /// Returns `Ok(None)` at end of input.
    fn next_unit(&mut self) -> Result<Option<Packet>, DemuxError>;
}

/// Result of one call to [`AudioCodec::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decoded {
    /// How many input bytes the codec consumed.
    pub consumed: usize,
    /// Signed 16-bit native-endian interleaved PCM, if a frame was completed.
    ///
    /// `None` (or an empty buffer) means the codec buffered the input
    /// internally without producing a frame yet.
    pub pcm: Option<Vec<u8>>,
}

impl Decoded {
    /// Input was consumed but no frame is ready yet.
    pub fn pending(consumed: usize) -> Self {
        Self {
            consumed,
            pcm: None,
        }
    }

    /// Input was consumed and produced a frame.
    pub fn frame(consumed: usize, pcm: Vec<u8>) -> Self {
        Self {
            consumed,
            pcm: Some(pcm),
        }
    }
}

/// Audio decoder for one stream.
///
/// Called repeatedly on the remainder of a packet until the packet is
/// exhausted. The decoder relies on the codec eventually consuming every
/// byte; a codec that reports zero consumption without output forever will
/// stall the audio thread.
pub trait AudioCodec: Send {
    /// Decodes from the start of `input`.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] for malformed or unsupported data. The packet
    /// being decoded is then dropped.
    fn decode(&mut self, input: &[u8]) -> Result<Decoded, CodecError>;
}

impl<C: AudioCodec + ?Sized> AudioCodec for Box<C> {
    fn decode(&mut self, input: &[u8]) -> Result<Decoded, CodecError> {
        (**self).decode(input)
    }
}

/// Receiver for video packets.
///
/// Video decoding and presentation live outside this crate; the producer
/// just hands packets over.
pub trait VideoPath: Send {
    /// Takes ownership of one video packet.
    fn present(&mut self, packet: Packet);
}

impl<F> VideoPath for F
where
    F: FnMut(Packet) + Send,
{
    fn present(&mut self, packet: Packet) {
        self(packet);
    }
}
