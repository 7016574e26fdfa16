//! Builder pattern for `Player`.

use crate::event::EventSource;
use crate::media::{select_streams, AudioCodec, Demuxer, VideoPath};
use crate::output::AudioOutput;
use crate::session::Session;
use crate::{event_callback, PlayerConfig, PlayerContext, PlayerError, PlayerEvent, QueueLimit};

/// Specifies which audio output device to use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum DeviceSelection {
    /// Use the system's default output device.
    #[default]
    SystemDefault,
    /// Use a specific device by name.
    ByName(String),
}

/// Builder for configuring and starting playback.
///
/// Use [`Player::builder()`] to create a new builder.
///
/// # Example
///
/// ```ignore
/// use stream_player::{Player, PlayerConfig, RetrievalMode};
/// use tokio::sync::mpsc;
///
/// let (quit_tx, quit_rx) = mpsc::unbounded_channel();
///
/// let session = Player::builder()
///     .with_config(PlayerConfig {
///         retrieval: RetrievalMode::NonBlocking,
///         ..Default::default()
///     })
///     .on_event(|e| tracing::warn!(?e, "player event"))
///     .start(demuxer, codec, quit_rx)
///     .await?;
///
/// // Later: quit_tx.send(ControlEvent::Quit) or session.stop().await?
/// ```
///
/// [`Player::builder()`]: crate::Player::builder
#[must_use]
pub struct PlayerBuilder {
    /// Output device selection.
    device: DeviceSelection,
    /// Receiver for video packets, if any.
    video: Option<Box<dyn VideoPath>>,
    /// Event callback.
    event_callback: Option<crate::EventCallback>,
    /// Playback configuration.
    config: PlayerConfig,
}

impl Default for PlayerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            device: DeviceSelection::SystemDefault,
            video: None,
            event_callback: None,
            config: PlayerConfig::default(),
        }
    }

    /// Play through a specific output device instead of the system default.
    pub fn output_device(mut self, name: impl Into<String>) -> Self {
        self.device = DeviceSelection::ByName(name.into());
        self
    }

    /// Hand video packets to `video` instead of discarding them.
    pub fn video_path(mut self, video: impl VideoPath + 'static) -> Self {
        self.video = Some(Box::new(video));
        self
    }

    /// Set a callback to receive runtime events.
    ///
    /// Events include dropped packets, device errors and end of input.
    /// Decode events fire on the audio thread, so the callback must not block.
    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: Fn(PlayerEvent) + Send + Sync + 'static,
    {
        self.event_callback = Some(event_callback(callback));
        self
    }

    /// Set custom playback configuration.
    pub fn with_config(mut self, config: PlayerConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the builder configuration.
    fn validate(&self) -> Result<(), PlayerError> {
        if self.config.audio_buffer_samples == 0 {
            return Err(PlayerError::InvalidConfig(
                "audio_buffer_samples must be non-zero".to_string(),
            ));
        }
        if self.config.max_audio_frame_size == 0 {
            return Err(PlayerError::InvalidConfig(
                "max_audio_frame_size must be non-zero".to_string(),
            ));
        }
        if self.config.queue_limit == (QueueLimit::Bounded { max_bytes: 0 }) {
            return Err(PlayerError::InvalidConfig(
                "bounded queue needs a non-zero byte limit".to_string(),
            ));
        }
        if let DeviceSelection::ByName(name) = &self.device {
            if name.is_empty() {
                return Err(PlayerError::DeviceNotFound { name: name.clone() });
            }
        }
        Ok(())
    }

    fn open_output(&self) -> Result<AudioOutput, PlayerError> {
        match &self.device {
            DeviceSelection::SystemDefault => AudioOutput::open_default(),
            DeviceSelection::ByName(name) => AudioOutput::open_by_name(name),
        }
    }

    /// Start playback.
    ///
    /// Selects the first audio and video streams, opens the output device at
    /// the audio stream's rate and channel count, starts the device callback,
    /// and runs the producer loop on a blocking task.
    ///
    /// Returns a [`Session`] handle to control playback.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The input has no audio stream
    /// - The output device cannot be opened or does not support the format
    pub async fn start<D, C, E>(
        self,
        mut demuxer: D,
        codec: C,
        events: E,
    ) -> Result<Session, PlayerError>
    where
        D: Demuxer + 'static,
        C: AudioCodec + 'static,
        E: EventSource + 'static,
    {
        self.validate()?;

        let selection = select_streams(demuxer.streams())?;
        let output = self.open_output()?;

        let mut context = PlayerContext::new(self.config.clone());
        if let Some(callback) = self.event_callback.clone() {
            context = context.with_event_callback(callback);
        }

        let playback_stream = output.start_playback(
            selection.format,
            self.config.audio_buffer_samples,
            context.audio_callback(codec),
            self.event_callback.clone(),
        )?;

        let mut producer = context.producer(selection, events);
        producer.set_video_path(self.video);

        tracing::debug!(
            device = %output.name(),
            audio_stream = selection.audio,
            video_stream = ?selection.video,
            "playback started"
        );

        let producer_handle = tokio::task::spawn_blocking(move || producer.run(&mut demuxer));

        Ok(Session::new(context, producer_handle, Some(playback_stream)))
    }
}

/// Main entry point for stream-player.
///
/// Use [`Player::builder()`] to start configuring playback.
pub struct Player;

impl Player {
    /// Creates a new builder for configuring playback.
    pub fn builder() -> PlayerBuilder {
        PlayerBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::mock::{MockDemuxer, PassthroughCodec};
    use crate::media::StreamInfo;
    use crate::{NoEvents, Packet};

    #[test]
    fn test_builder_default() {
        let builder = PlayerBuilder::new();
        assert_eq!(builder.device, DeviceSelection::SystemDefault);
        assert!(builder.video.is_none());
        assert!(builder.validate().is_ok());
    }

    #[test]
    fn test_builder_output_device() {
        let builder = Player::builder().output_device("Speakers");
        assert_eq!(builder.device, DeviceSelection::ByName("Speakers".into()));
    }

    #[test]
    fn test_builder_video_path() {
        let builder = Player::builder().video_path(|_: Packet| {});
        assert!(builder.video.is_some());
    }

    #[test]
    fn test_builder_rejects_zero_buffer() {
        let builder = Player::builder().with_config(PlayerConfig {
            audio_buffer_samples: 0,
            ..Default::default()
        });
        assert!(matches!(
            builder.validate(),
            Err(PlayerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_builder_rejects_zero_byte_limit() {
        let builder = Player::builder().with_config(PlayerConfig {
            queue_limit: QueueLimit::Bounded { max_bytes: 0 },
            ..Default::default()
        });
        assert!(matches!(
            builder.validate(),
            Err(PlayerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_builder_rejects_empty_device_name() {
        let builder = Player::builder().output_device("");
        assert!(matches!(
            builder.validate(),
            Err(PlayerError::DeviceNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_start_requires_audio_stream() {
        let demuxer = MockDemuxer::new(vec![StreamInfo::video(0)]);
        let result = Player::builder()
            .start(demuxer, PassthroughCodec::new(), NoEvents)
            .await;
        assert!(matches!(result, Err(PlayerError::NoAudioStream)));
    }

    #[tokio::test]
    #[ignore = "requires audio hardware"]
    async fn test_start_and_stop() {
        let mut demuxer = MockDemuxer::new(vec![StreamInfo::audio(0, 44100, 2)]);
        demuxer.add_packet(Packet::new(0, vec![0; 4096]));

        let session = Player::builder()
            .start(demuxer, PassthroughCodec::new(), NoEvents)
            .await
            .unwrap();
        assert!(session.is_running());
        session.stop().await.unwrap();
    }
}
