//! Stream table entries and audio/video stream selection.

use crate::{OutputFormat, PlayerError};

/// Kind of elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Audio, with the parameters the output device is opened with.
    Audio {
        /// Sample rate in Hz.
        sample_rate: u32,
        /// Number of channels.
        channels: u16,
    },
    /// Video.
    Video,
    /// Subtitles, data, attachments: never played.
    Other,
}

/// One entry of a container's stream table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    /// Stream index as tagged on packets.
    pub index: usize,
    /// What the stream carries.
    pub kind: MediaKind,
}

impl StreamInfo {
    /// Describes an audio stream.
    pub fn audio(index: usize, sample_rate: u32, channels: u16) -> Self {
        Self {
            index,
            kind: MediaKind::Audio {
                sample_rate,
                channels,
            },
        }
    }

    /// Describes a video stream.
    pub fn video(index: usize) -> Self {
        Self {
            index,
            kind: MediaKind::Video,
        }
    }

    /// Describes a stream the player ignores.
    pub fn other(index: usize) -> Self {
        Self {
            index,
            kind: MediaKind::Other,
        }
    }
}

/// Streams chosen for playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSelection {
    /// Index of the audio stream routed into the packet queue.
    pub audio: usize,
    /// Output format derived from the audio stream.
    pub format: OutputFormat,
    /// Index of the video stream routed to the video path, if any.
    pub video: Option<usize>,
}

/// Picks the first audio stream and the first video stream.
///
/// # Errors
///
/// Returns [`PlayerError::NoAudioStream`] if the table has no audio stream.
/// A missing video stream is not an error.
pub fn select_streams(streams: &[StreamInfo]) -> Result<StreamSelection, PlayerError> {
    let (audio, format) = streams
        .iter()
        .find_map(|s| match s.kind {
            MediaKind::Audio {
                sample_rate,
                channels,
            } => Some((
                s.index,
                OutputFormat {
                    sample_rate,
                    channels,
                },
            )),
            _ => None,
        })
        .ok_or(PlayerError::NoAudioStream)?;

    let video = streams
        .iter()
        .find(|s| s.kind == MediaKind::Video)
        .map(|s| s.index);

    tracing::debug!(
        audio,
        ?video,
        sample_rate = format.sample_rate,
        channels = format.channels,
        "selected streams"
    );

    Ok(StreamSelection {
        audio,
        format,
        video,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selects_first_of_each_kind() {
        let streams = vec![
            StreamInfo::other(0),
            StreamInfo::video(1),
            StreamInfo::audio(2, 44100, 2),
            StreamInfo::video(3),
            StreamInfo::audio(4, 48000, 6),
        ];

        let selection = select_streams(&streams).unwrap();
        assert_eq!(selection.audio, 2);
        assert_eq!(selection.video, Some(1));
        assert_eq!(selection.format.sample_rate, 44100);
        assert_eq!(selection.format.channels, 2);
    }

    #[test]
    fn test_audio_only_input() {
        let selection = select_streams(&[StreamInfo::audio(0, 22050, 1)]).unwrap();
        assert_eq!(selection.video, None);
    }

    #[test]
    fn test_missing_audio_is_fatal() {
        let result = select_streams(&[StreamInfo::video(0), StreamInfo::other(1)]);
        assert!(matches!(result, Err(PlayerError::NoAudioStream)));
    }
}
