//! Audio output abstraction and CPAL device wrapper.
//!
//! This module is the boundary between the playback pipeline and CPAL's
//! device callback thread.

mod device;

pub use device::{AudioOutput, PlaybackStream};

use cpal::traits::{DeviceTrait, HostTrait};

/// Lists all available output devices.
///
/// # Errors
///
/// Returns an error if the audio host cannot be accessed.
pub fn list_output_devices() -> Result<Vec<String>, crate::PlayerError> {
    let host = cpal::default_host();
    let devices = host
        .output_devices()
        .map_err(|e| crate::PlayerError::BackendError(e.to_string()))?;

    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

/// Gets the name of the default output device, if any.
pub fn default_output_device_name() -> Option<String> {
    cpal::default_host()
        .default_output_device()
        .and_then(|d| d.name().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_devices_doesnt_panic() {
        // May be empty in CI
        let _ = list_output_devices();
    }

    #[test]
    fn test_default_device_doesnt_panic() {
        let _ = default_output_device_name();
    }
}
