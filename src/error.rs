//! Error types for stream-player.
//!
//! Errors are split into two categories:
//! - **Fatal errors** ([`PlayerError`]): Prevent playback from starting
//! - **Recoverable conditions**: Decode failures and underruns are absorbed by
//!   the audio path and surfaced via [`EventCallback`](crate::EventCallback)
//!
//! [`QueueError`] is neither: it hands an undeliverable packet back to the
//! producer so ownership is never lost.

use crate::Packet;

/// Fatal errors that prevent playback from starting.
///
/// These are returned from [`PlayerBuilder::start()`] and from the producer
/// loop. Runtime audio problems (bad packets, starvation) never surface here;
/// the callback substitutes silence instead.
///
/// [`PlayerBuilder::start()`]: crate::PlayerBuilder::start
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// The playback configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The container has no audio stream to play.
    #[error("no audio stream found in input")]
    NoAudioStream,

    /// No default output device is configured on this system.
    #[error("no default output device configured")]
    NoDefaultOutputDevice,

    /// The requested output device was not found.
    #[error("output device not found: {name}")]
    DeviceNotFound {
        /// Name of the device that wasn't found.
        name: String,
    },

    /// The device does not support a sample format we can produce.
    #[error("unsupported sample format: {format}")]
    UnsupportedFormat {
        /// The format that wasn't supported.
        format: String,
    },

    /// The stream's audio parameters cannot be opened on the device.
    #[error("device cannot play {sample_rate}Hz with {channels} channel(s)")]
    UnsupportedOutput {
        /// Requested sample rate.
        sample_rate: u32,
        /// Requested channel count.
        channels: u16,
    },

    /// An error from the underlying audio library (CPAL).
    #[error("audio backend error: {0}")]
    BackendError(String),

    /// Reading the next unit from the demuxer failed.
    #[error("demux failed: {0}")]
    Demux(#[from] DemuxError),

    /// The producer task terminated abnormally.
    #[error("producer task failed: {0}")]
    ProducerFailed(String),
}

/// A packet could not be handed to the [`PacketQueue`](crate::PacketQueue).
///
/// Every variant carries the packet back so the caller stays responsible for
/// disposing of it.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Memory for the queue entry could not be reserved.
    #[error("could not allocate queue entry for {} byte packet", .0.len())]
    AllocationFailed(Packet),

    /// The queue is at its byte limit (non-blocking push only).
    #[error("queue full, {} byte packet rejected", .0.len())]
    Full(Packet),

    /// Shutdown was signalled while waiting for room in a bounded queue.
    #[error("queue terminated")]
    Terminated(Packet),
}

impl QueueError {
    /// Returns the packet that could not be queued.
    pub fn into_packet(self) -> Packet {
        match self {
            Self::AllocationFailed(packet) | Self::Full(packet) | Self::Terminated(packet) => {
                packet
            }
        }
    }
}

/// A codec could not decode the compressed bytes it was given.
///
/// The decoder drops the offending packet and moves on; this error is only
/// reported, never propagated to the audio device.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The compressed data is malformed.
    #[error("invalid data: {reason}")]
    InvalidData {
        /// Description of what was wrong.
        reason: String,
    },

    /// The data uses a feature the codec doesn't implement.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl CodecError {
    /// Creates an invalid-data error with the given reason.
    pub fn invalid_data(reason: impl Into<String>) -> Self {
        Self::InvalidData {
            reason: reason.into(),
        }
    }
}

/// Errors reported by a [`Demuxer`](crate::media::Demuxer).
#[derive(Debug, thiserror::Error)]
pub enum DemuxError {
    /// Reading from the underlying input failed.
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),

    /// The container is malformed.
    #[error("malformed container: {0}")]
    Malformed(String),
}
