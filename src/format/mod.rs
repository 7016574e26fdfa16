//! Sample format conversion for the output device.
//!
//! Decoded audio travels through the pipeline as raw bytes of signed 16-bit
//! native-endian PCM. Devices take typed sample buffers, so the output
//! callback converts on the way out:
//! - bytes → `i16` for devices that accept 16-bit samples
//! - bytes → `f32` for devices that only offer floating point

mod convert;

pub use convert::{f32_to_i16, i16_to_f32, pcm_to_f32, pcm_to_i16, samples_to_pcm};
