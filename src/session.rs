//! Playback session management.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::output::PlaybackStream;
use crate::pipeline::ProducerSummary;
use crate::{PlayerContext, PlayerError, ShutdownSignal};

/// Statistics about a playback session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
    /// Audio packets the producer queued.
    pub audio_packets: u64,
    /// Video packets handed to the video path.
    pub video_packets: u64,
    /// Packets that belonged to no selected stream, or had no video path.
    pub discarded_packets: u64,
    /// Audio packets the queue refused.
    pub rejected_packets: u64,
    /// Decode units produced by the codec.
    pub decoded_chunks: u64,
    /// Total PCM bytes produced by the codec.
    pub decoded_bytes: u64,
    /// Packets dropped because the codec rejected them.
    pub decode_errors: u64,
    /// Times the callback had nothing to play and substituted silence.
    pub underruns: u64,
    /// Total silence bytes synthesized.
    pub silence_bytes: u64,
    /// Packets waiting in the queue.
    pub queued_packets: usize,
    /// Payload bytes waiting in the queue.
    pub queued_bytes: usize,
}

/// Counters shared between the producer, the audio thread and `Session`.
///
/// Each counter is independent, so relaxed ordering is enough.
#[derive(Debug, Default)]
pub(crate) struct PlayerState {
    audio_packets: AtomicU64,
    video_packets: AtomicU64,
    discarded_packets: AtomicU64,
    rejected_packets: AtomicU64,
    decoded_chunks: AtomicU64,
    decoded_bytes: AtomicU64,
    decode_errors: AtomicU64,
    underruns: AtomicU64,
    silence_bytes: AtomicU64,
}

impl PlayerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_audio_packet(&self) {
        self.audio_packets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_video_packet(&self) {
        self.video_packets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discarded(&self) {
        self.discarded_packets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected_packets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decoded(&self, bytes: usize) {
        self.decoded_chunks.fetch_add(1, Ordering::Relaxed);
        self.decoded_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_underrun(&self, silence_bytes: usize) {
        self.underruns.fetch_add(1, Ordering::Relaxed);
        self.silence_bytes
            .fetch_add(silence_bytes as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self, queued_packets: usize, queued_bytes: usize) -> PlayerStats {
        PlayerStats {
            audio_packets: self.audio_packets.load(Ordering::Relaxed),
            video_packets: self.video_packets.load(Ordering::Relaxed),
            discarded_packets: self.discarded_packets.load(Ordering::Relaxed),
            rejected_packets: self.rejected_packets.load(Ordering::Relaxed),
            decoded_chunks: self.decoded_chunks.load(Ordering::Relaxed),
            decoded_bytes: self.decoded_bytes.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            underruns: self.underruns.load(Ordering::Relaxed),
            silence_bytes: self.silence_bytes.load(Ordering::Relaxed),
            queued_packets,
            queued_bytes,
        }
    }
}

/// Handle to a running playback session.
///
/// The `Session` is returned by [`PlayerBuilder::start()`]. The producer runs
/// on a blocking task and the output device pulls audio on its own thread
/// until `stop()` is called, a quit event arrives, or the `Session` is dropped.
///
/// # Lifecycle
///
/// 1. Created by [`PlayerBuilder::start()`]
/// 2. Packets are demuxed and played in the background
/// 3. Call [`stop()`](Session::stop) for graceful shutdown
/// 4. Dropping the `Session` also sets the shutdown signal (but prefer explicit `stop()`)
///
/// # Example
///
/// ```ignore
/// let mut session = Player::builder()
///     .start(demuxer, codec, quit_rx)
///     .await?;
///
/// // Wait for the input to run out, then for the queue to empty.
/// session.wait_for_producer().await?;
/// session.wait_until_drained(Duration::from_millis(50)).await;
///
/// session.stop().await?;
/// ```
///
/// [`PlayerBuilder::start()`]: crate::PlayerBuilder::start
pub struct Session {
    context: PlayerContext,
    producer_handle: Option<JoinHandle<Result<ProducerSummary, PlayerError>>>,
    summary: Option<ProducerSummary>,
    // Dropping the stream stops CPAL
    playback_stream: Option<PlaybackStream>,
}

impl Session {
    pub(crate) fn new(
        context: PlayerContext,
        producer_handle: JoinHandle<Result<ProducerSummary, PlayerError>>,
        playback_stream: Option<PlaybackStream>,
    ) -> Self {
        Self {
            context,
            producer_handle: Some(producer_handle),
            summary: None,
            playback_stream,
        }
    }

    /// Returns `true` until the shutdown signal is set.
    ///
    /// Reaching the end of input does not stop the session; queued audio keeps
    /// playing.
    pub fn is_running(&self) -> bool {
        !self.context.shutdown_signal().is_triggered()
    }

    /// Returns current playback statistics.
    pub fn stats(&self) -> PlayerStats {
        self.context.stats()
    }

    /// Returns the session's shutdown signal.
    ///
    /// Triggering it from anywhere stops the producer and releases the audio
    /// thread.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.context.shutdown_signal().clone()
    }

    /// Returns the format the output device was opened with.
    pub fn output_format(&self) -> Option<crate::OutputFormat> {
        self.playback_stream.as_ref().map(PlaybackStream::format)
    }

    /// Waits for the producer to finish and returns what it did.
    ///
    /// Can be called more than once; later calls return the cached summary.
    ///
    /// # Errors
    ///
    /// Returns the producer's demux error, or `ProducerFailed` if its task
    /// panicked or was cancelled.
    pub async fn wait_for_producer(&mut self) -> Result<ProducerSummary, PlayerError> {
        if let Some(summary) = self.summary {
            return Ok(summary);
        }

        let Some(handle) = self.producer_handle.take() else {
            return Err(PlayerError::ProducerFailed(
                "producer result already taken".to_string(),
            ));
        };

        let summary = handle
            .await
            .map_err(|e| PlayerError::ProducerFailed(e.to_string()))??;
        self.summary = Some(summary);
        Ok(summary)
    }

    /// Waits until the packet queue is empty or the session is shut down.
    ///
    /// The queue is sampled every `poll_interval`. The decoder may still hold
    /// the last packet when this returns.
    pub async fn wait_until_drained(&self, poll_interval: Duration) {
        while self.is_running() && !self.context.queue().is_empty() {
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Gracefully stops playback.
    ///
    /// This will:
    /// 1. Set the shutdown signal, releasing any blocked queue operation
    /// 2. Wait for the producer task to finish
    /// 3. Stop the CPAL output stream
    ///
    /// # Errors
    ///
    /// Returns the producer's error if it failed.
    pub async fn stop(mut self) -> Result<(), PlayerError> {
        self.stop_internal().await
    }

    async fn stop_internal(&mut self) -> Result<(), PlayerError> {
        if self.context.request_shutdown() {
            tracing::debug!("session stop requested");
        }

        let result = if self.summary.is_some() || self.producer_handle.is_some() {
            self.wait_for_producer().await.map(|_| ())
        } else {
            Ok(())
        };

        self.playback_stream = None;
        tracing::debug!(stats = ?self.stats(), "session stopped");
        result
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.context.request_shutdown() {
            // Dropped without stop(); the producer task exits on its own
            tracing::debug!("session dropped while running");
        }
    }
}
