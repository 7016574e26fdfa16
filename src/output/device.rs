//! CPAL device wrapper for audio playback.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, Device, SampleFormat, SampleRate, Stream, StreamConfig as CpalStreamConfig,
    SupportedBufferSize, SupportedStreamConfigRange,
};

use crate::format::{pcm_to_f32, pcm_to_i16};
use crate::media::AudioCodec;
use crate::pipeline::AudioCallback;
use crate::{EventCallback, OutputFormat, PlayerError, PlayerEvent};

/// Wrapper around a CPAL audio output device.
///
/// Handles device selection and format negotiation, and drives an
/// [`AudioCallback`] from the device's playback thread.
#[must_use]
pub struct AudioOutput {
    device: Device,
}

impl AudioOutput {
    /// Opens the default output device.
    ///
    /// # Errors
    ///
    /// Returns `NoDefaultOutputDevice` if no default output device is configured.
    pub fn open_default() -> Result<Self, PlayerError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(PlayerError::NoDefaultOutputDevice)?;

        Ok(Self { device })
    }

    /// Opens a specific output device by name.
    ///
    /// # Errors
    ///
    /// Returns `DeviceNotFound` if no device with the given name exists.
    pub fn open_by_name(name: &str) -> Result<Self, PlayerError> {
        let host = cpal::default_host();
        let devices = host
            .output_devices()
            .map_err(|e| PlayerError::BackendError(e.to_string()))?;

        for device in devices {
            if let Ok(device_name) = device.name() {
                if device_name == name {
                    return Ok(Self { device });
                }
            }
        }

        Err(PlayerError::DeviceNotFound {
            name: name.to_string(),
        })
    }

    /// Returns the device name.
    pub fn name(&self) -> String {
        self.device.name().unwrap_or_else(|_| "unknown".to_string())
    }

    /// Picks the sample format the device will be driven with for `format`.
    ///
    /// Signed 16-bit is preferred; `f32` is accepted and converted per callback.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOutput` if no configuration matches the rate and
    /// channel count, or `UnsupportedFormat` if only other sample types do.
    pub fn negotiate(&self, format: OutputFormat) -> Result<SupportedStreamConfigRange, PlayerError> {
        let ranges: Vec<_> = self
            .device
            .supported_output_configs()
            .map_err(|e| PlayerError::BackendError(e.to_string()))?
            .filter(|range| {
                range.channels() == format.channels
                    && range.min_sample_rate().0 <= format.sample_rate
                    && range.max_sample_rate().0 >= format.sample_rate
            })
            .collect();

        if ranges.is_empty() {
            return Err(PlayerError::UnsupportedOutput {
                sample_rate: format.sample_rate,
                channels: format.channels,
            });
        }

        [SampleFormat::I16, SampleFormat::F32]
            .into_iter()
            .find_map(|wanted| ranges.iter().find(|r| r.sample_format() == wanted).cloned())
            .ok_or_else(|| PlayerError::UnsupportedFormat {
                format: format!("{:?}", ranges[0].sample_format()),
            })
    }

    /// Opens an output stream for `format` and starts playing from `callback`.
    ///
    /// The returned `PlaybackStream` must be kept alive for playback to continue.
    /// `buffer_samples` is the requested device buffer in frames; backends that
    /// cannot honor it fall back to their default.
    ///
    /// # Errors
    ///
    /// Returns an error if negotiation fails or the stream cannot be built or started.
    pub fn start_playback<C: AudioCodec + 'static>(
        &self,
        format: OutputFormat,
        buffer_samples: u32,
        callback: AudioCallback<C>,
        event_callback: Option<EventCallback>,
    ) -> Result<PlaybackStream, PlayerError> {
        let range = self.negotiate(format)?;
        let sample_format = range.sample_format();

        let buffer_size = match range.buffer_size() {
            SupportedBufferSize::Range { min, max } if (*min..=*max).contains(&buffer_samples) => {
                BufferSize::Fixed(buffer_samples)
            }
            _ => {
                tracing::debug!(buffer_samples, "requested buffer size unavailable, using default");
                BufferSize::Default
            }
        };

        let config = CpalStreamConfig {
            channels: format.channels,
            sample_rate: SampleRate(format.sample_rate),
            buffer_size,
        };

        tracing::debug!(
            device = %self.name(),
            sample_rate = format.sample_rate,
            channels = format.channels,
            ?sample_format,
            "opening output stream"
        );

        let stream = match sample_format {
            SampleFormat::I16 => self.build_i16_stream(&config, callback, event_callback)?,
            SampleFormat::F32 => self.build_f32_stream(&config, callback, event_callback)?,
            format => {
                return Err(PlayerError::UnsupportedFormat {
                    format: format!("{format:?}"),
                });
            }
        };

        stream
            .play()
            .map_err(|e| PlayerError::BackendError(e.to_string()))?;

        Ok(PlaybackStream {
            _stream: stream,
            format,
        })
    }

    fn build_i16_stream<C: AudioCodec + 'static>(
        &self,
        config: &CpalStreamConfig,
        mut callback: AudioCallback<C>,
        event_callback: Option<EventCallback>,
    ) -> Result<Stream, PlayerError> {
        let mut scratch = Vec::new();

        self.device
            .build_output_stream(
                config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    scratch.resize(data.len() * OutputFormat::BYTES_PER_SAMPLE, 0);
                    callback.fill(&mut scratch);
                    pcm_to_i16(&scratch, data);
                },
                stream_error_handler(event_callback),
                None,
            )
            .map_err(|e| PlayerError::BackendError(e.to_string()))
    }

    fn build_f32_stream<C: AudioCodec + 'static>(
        &self,
        config: &CpalStreamConfig,
        mut callback: AudioCallback<C>,
        event_callback: Option<EventCallback>,
    ) -> Result<Stream, PlayerError> {
        let mut scratch = Vec::new();

        self.device
            .build_output_stream(
                config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    scratch.resize(data.len() * OutputFormat::BYTES_PER_SAMPLE, 0);
                    callback.fill(&mut scratch);
                    pcm_to_f32(&scratch, data);
                },
                stream_error_handler(event_callback),
                None,
            )
            .map_err(|e| PlayerError::BackendError(e.to_string()))
    }
}

fn stream_error_handler(
    event_callback: Option<EventCallback>,
) -> impl FnMut(cpal::StreamError) + Send + 'static {
    move |err| {
        tracing::error!("Audio stream error: {}", err);
        if let Some(ref callback) = event_callback {
            callback(PlayerEvent::DeviceError {
                error: err.to_string(),
            });
        }
    }
}

/// A running audio playback stream.
///
/// Playback continues while this struct is held. When dropped, the CPAL
/// stream is stopped and the device callback is released.
pub struct PlaybackStream {
    _stream: Stream,
    format: OutputFormat,
}

impl PlaybackStream {
    /// The format the stream was opened with.
    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Device tests require actual audio hardware and are skipped in CI
    #[test]
    #[ignore = "requires audio hardware"]
    fn test_open_default_output() {
        let output = AudioOutput::open_default().unwrap();
        println!("Default output: {}", output.name());
    }

    #[test]
    #[ignore = "requires audio hardware"]
    fn test_negotiate_cd_quality() {
        let output = AudioOutput::open_default().unwrap();
        let range = output
            .negotiate(OutputFormat {
                sample_rate: 44100,
                channels: 2,
            })
            .unwrap();
        assert!(matches!(
            range.sample_format(),
            SampleFormat::I16 | SampleFormat::F32
        ));
    }

    #[test]
    fn test_open_missing_device() {
        let result = AudioOutput::open_by_name("no such output device");
        assert!(matches!(
            result,
            Err(PlayerError::DeviceNotFound { .. } | PlayerError::BackendError(_))
        ));
    }
}
