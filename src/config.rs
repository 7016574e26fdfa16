//! Configuration types for playback.

/// Device buffer size in sample frames requested from the output device.
pub const DEFAULT_AUDIO_BUFFER_SAMPLES: u32 = 1024 * 4;

/// Largest decoded unit, in bytes, the callback will accept from the codec.
///
/// One second of 48kHz 32-bit stereo audio.
pub const DEFAULT_MAX_AUDIO_FRAME_SIZE: usize = 192_000;

/// Size of the silence block substituted when the decoder has nothing to give.
pub const DEFAULT_SILENCE_BLOCK_BYTES: usize = 1024;

/// Limit on how much compressed audio the packet queue may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueLimit {
    /// No limit; the producer is never held back.
    ///
    /// A slow consumer lets the queue grow without bound.
    #[default]
    Unbounded,

    /// Cap on the total bytes queued.
    ///
    /// `push` waits for room (or shutdown) once the cap is reached; a single
    /// packet larger than the cap is still admitted into an empty queue.
    Bounded {
        /// Maximum total payload bytes held by the queue.
        max_bytes: usize,
    },
}

/// How the decoder retrieves packets from the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetrievalMode {
    /// Wait on the queue until a packet arrives or shutdown is signalled.
    ///
    /// This suspends the audio thread while the producer is behind.
    #[default]
    Blocking,

    /// Never wait; an empty queue is reported as starvation and the callback
    /// plays silence instead.
    NonBlocking,
}

/// How much silence the callback synthesizes when no PCM is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilencePolicy {
    /// Synthesize a fixed-size block and carry any unused part over to the
    /// next callback, so short gaps still produce a full block of silence.
    FixedBlock(usize),

    /// Synthesize exactly the number of bytes still missing from the current
    /// request.
    ExactShortfall,
}

impl Default for SilencePolicy {
    fn default() -> Self {
        Self::FixedBlock(DEFAULT_SILENCE_BLOCK_BYTES)
    }
}

/// PCM format handed to the output device.
///
/// Samples are always signed 16-bit in native byte order, so silence is the
/// all-zero byte pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
}

impl OutputFormat {
    /// Bytes per sample for signed 16-bit output.
    pub const BYTES_PER_SAMPLE: usize = 2;

    /// Returns the size in bytes of one frame (one sample per channel).
    #[must_use]
    pub fn bytes_per_frame(&self) -> usize {
        usize::from(self.channels) * Self::BYTES_PER_SAMPLE
    }
}

/// Configuration for playback behavior.
///
/// Use [`PlayerConfig::default()`] for the classic behavior (unbounded queue,
/// blocking retrieval, 1024-byte silence blocks), or customize as needed.
///
/// # Example
///
/// ```
/// use stream_player::{PlayerConfig, QueueLimit, RetrievalMode, SilencePolicy};
///
/// let config = PlayerConfig {
///     queue_limit: QueueLimit::Bounded { max_bytes: 4 * 1024 * 1024 },
///     retrieval: RetrievalMode::NonBlocking,
///     silence: SilencePolicy::ExactShortfall,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Limit on queued compressed audio.
    ///
    /// Default: [`QueueLimit::Unbounded`]
    pub queue_limit: QueueLimit,

    /// Packet retrieval behavior on the audio thread.
    ///
    /// Default: [`RetrievalMode::Blocking`]
    pub retrieval: RetrievalMode,

    /// Silence substitution on underrun or decode failure.
    ///
    /// Default: 1024-byte blocks
    pub silence: SilencePolicy,

    /// Output buffer size in sample frames requested from the device.
    ///
    /// Default: 4096
    pub audio_buffer_samples: u32,

    /// Largest decoded unit accepted from the codec, in bytes.
    ///
    /// Larger units are truncated and a warning is logged.
    /// Default: 192000
    pub max_audio_frame_size: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            queue_limit: QueueLimit::default(),
            retrieval: RetrievalMode::default(),
            silence: SilencePolicy::default(),
            audio_buffer_samples: DEFAULT_AUDIO_BUFFER_SAMPLES,
            max_audio_frame_size: DEFAULT_MAX_AUDIO_FRAME_SIZE,
        }
    }
}
