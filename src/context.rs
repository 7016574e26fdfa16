//! Shared playback context handed to the producer and the audio path.

use std::sync::Arc;

use crate::event::EventSource;
use crate::media::{AudioCodec, StreamSelection};
use crate::pipeline::{AudioCallback, AudioDecoder, PacketQueue, ProducerLoop};
use crate::session::PlayerState;
use crate::{EventCallback, PlayerConfig, PlayerStats, ShutdownSignal};

/// Everything the two playback threads share: the packet queue, the
/// shutdown signal and the statistics counters.
///
/// One context per playback. Cloning is cheap; clones refer to the same
/// queue and signal.
///
/// # Example
///
/// ```
/// use stream_player::media::mock::PassthroughCodec;
/// use stream_player::media::{select_streams, StreamInfo};
/// use stream_player::{NoEvents, Packet, PlayerConfig, PlayerContext};
///
/// let context = PlayerContext::new(PlayerConfig::default());
/// let selection = select_streams(&[StreamInfo::audio(0, 8000, 1)]).unwrap();
///
/// let _producer = context.producer(selection, NoEvents);
/// let mut callback = context.audio_callback(PassthroughCodec::new());
///
/// context.queue().push(Packet::new(0, vec![7; 16])).unwrap();
/// let mut out = [0u8; 16];
/// callback.fill(&mut out);
/// assert_eq!(out, [7; 16]);
/// ```
#[derive(Clone)]
pub struct PlayerContext {
    queue: PacketQueue,
    shutdown: ShutdownSignal,
    state: Arc<PlayerState>,
    config: PlayerConfig,
    event_callback: Option<EventCallback>,
}

impl PlayerContext {
    /// Creates a context with a fresh queue and signal.
    pub fn new(config: PlayerConfig) -> Self {
        let shutdown = ShutdownSignal::new();
        let queue = PacketQueue::with_limit(shutdown.clone(), config.queue_limit);

        Self {
            queue,
            shutdown,
            state: Arc::new(PlayerState::new()),
            config,
            event_callback: None,
        }
    }

    /// Sets the callback that receives runtime events.
    #[must_use]
    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    /// The packet queue.
    pub fn queue(&self) -> &PacketQueue {
        &self.queue
    }

    /// The shutdown signal.
    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// The configuration this context was created with.
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Sets the shutdown signal. Returns `true` if this call set it.
    pub fn request_shutdown(&self) -> bool {
        self.shutdown.trigger()
    }

    /// Builds the audio side: a decoder over this context's queue, wrapped in
    /// a device callback.
    pub fn audio_callback<C: AudioCodec>(&self, codec: C) -> AudioCallback<C> {
        let mut decoder = AudioDecoder::new(codec, self.queue.clone(), self.shutdown.clone())
            .with_retrieval(self.config.retrieval)
            .with_max_frame_size(self.config.max_audio_frame_size)
            .with_state(Arc::clone(&self.state));
        if let Some(callback) = self.event_callback.clone() {
            decoder = decoder.with_event_callback(callback);
        }

        AudioCallback::new(decoder)
            .with_silence(self.config.silence)
            .with_state(Arc::clone(&self.state))
    }

    /// Builds the producer side for the selected streams.
    pub fn producer<E: EventSource>(&self, selection: StreamSelection, events: E) -> ProducerLoop<E> {
        let mut producer =
            ProducerLoop::new(self.queue.clone(), self.shutdown.clone(), selection, events)
                .with_state(Arc::clone(&self.state));
        if let Some(callback) = self.event_callback.clone() {
            producer = producer.with_event_callback(callback);
        }
        producer
    }

    /// Returns current playback statistics.
    pub fn stats(&self) -> PlayerStats {
        self.state.snapshot(self.queue.len(), self.queue.size_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::mock::PassthroughCodec;
    use crate::{QueueLimit, RetrievalMode};

    #[test]
    fn test_context_applies_queue_limit() {
        let config = PlayerConfig {
            queue_limit: QueueLimit::Bounded { max_bytes: 64 },
            ..Default::default()
        };
        let context = PlayerContext::new(config);
        assert_eq!(context.queue().limit(), QueueLimit::Bounded { max_bytes: 64 });
    }

    #[test]
    fn test_clones_share_shutdown() {
        let context = PlayerContext::new(PlayerConfig::default());
        let clone = context.clone();
        assert!(clone.request_shutdown());
        assert!(!context.request_shutdown());
        assert!(context.shutdown_signal().is_triggered());
    }

    #[test]
    fn test_stats_reflect_audio_path() {
        let config = PlayerConfig {
            retrieval: RetrievalMode::NonBlocking,
            ..Default::default()
        };
        let context = PlayerContext::new(config);
        let mut callback = context.audio_callback(PassthroughCodec::new());

        context
            .queue()
            .push(crate::Packet::new(0, vec![1; 100]))
            .unwrap();
        context
            .queue()
            .push(crate::Packet::new(0, vec![1; 50]))
            .unwrap();
        assert_eq!(context.stats().queued_bytes, 150);

        let mut out = vec![0u8; 200];
        callback.fill(&mut out);

        let stats = context.stats();
        assert_eq!(stats.queued_bytes, 0);
        assert_eq!(stats.queued_packets, 0);
        assert_eq!(stats.decoded_chunks, 2);
        assert_eq!(stats.decoded_bytes, 150);
        assert_eq!(stats.underruns, 1);
    }
}
