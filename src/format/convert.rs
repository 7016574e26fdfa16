//! Sample format conversion between PCM bytes and device samples.

use crate::OutputFormat;

/// Converts an f32 sample to i16.
///
/// Input should be in the range [-1.0, 1.0].
/// Values outside this range are clamped.
///
/// Uses × 32767 (not 32768) for symmetric scaling, so -1.0 maps to -32767.
#[inline]
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample * 32767.0).clamp(-32768.0, 32767.0) as i16
}

/// Converts an i16 sample to f32 in the range [-1.0, 1.0].
#[inline]
pub fn i16_to_f32(sample: i16) -> f32 {
    f32::from(sample) / 32768.0
}

/// Decodes native-endian 16-bit PCM bytes into `out`.
///
/// Converts `min(out.len(), pcm.len() / 2)` samples and returns that count.
/// A trailing odd byte is ignored.
pub fn pcm_to_i16(pcm: &[u8], out: &mut [i16]) -> usize {
    let mut n = 0;
    for (sample, bytes) in out.iter_mut().zip(pcm.chunks_exact(OutputFormat::BYTES_PER_SAMPLE)) {
        *sample = i16::from_ne_bytes([bytes[0], bytes[1]]);
        n += 1;
    }
    n
}

/// Decodes native-endian 16-bit PCM bytes into f32 samples in `out`.
///
/// Returns the number of samples written, as [`pcm_to_i16`].
pub fn pcm_to_f32(pcm: &[u8], out: &mut [f32]) -> usize {
    let mut n = 0;
    for (sample, bytes) in out.iter_mut().zip(pcm.chunks_exact(OutputFormat::BYTES_PER_SAMPLE)) {
        *sample = i16_to_f32(i16::from_ne_bytes([bytes[0], bytes[1]]));
        n += 1;
    }
    n
}

/// Encodes i16 samples as native-endian PCM bytes.
pub fn samples_to_pcm(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_ne_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_to_i16_full_range() {
        assert_eq!(f32_to_i16(1.0), 32767);
        assert_eq!(f32_to_i16(-1.0), -32767);
        assert_eq!(f32_to_i16(0.0), 0);
    }

    #[test]
    fn test_f32_to_i16_clamping() {
        assert_eq!(f32_to_i16(2.0), 32767);
        assert_eq!(f32_to_i16(-2.0), -32768);
    }

    #[test]
    fn test_i16_to_f32_full_range() {
        let max = i16_to_f32(32767);
        assert!((max - 0.99997).abs() < 0.001);

        let min = i16_to_f32(-32768);
        assert!((min - (-1.0)).abs() < 0.001);

        assert_eq!(i16_to_f32(0), 0.0);
    }

    #[test]
    fn test_pcm_to_i16() {
        let pcm = samples_to_pcm(&[1, -2, 300, i16::MIN]);
        let mut out = [0i16; 4];
        assert_eq!(pcm_to_i16(&pcm, &mut out), 4);
        assert_eq!(out, [1, -2, 300, i16::MIN]);
    }

    #[test]
    fn test_pcm_to_i16_ignores_odd_byte() {
        let mut pcm = samples_to_pcm(&[7, 8]);
        pcm.push(0xFF);
        let mut out = [0i16; 4];
        assert_eq!(pcm_to_i16(&pcm, &mut out), 2);
        assert_eq!(&out[..2], &[7, 8]);
    }

    #[test]
    fn test_pcm_to_f32_silence_is_zero() {
        let pcm = vec![0u8; 8];
        let mut out = [1.0f32; 4];
        assert_eq!(pcm_to_f32(&pcm, &mut out), 4);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_pcm_to_f32_short_output() {
        let pcm = samples_to_pcm(&[16384, -16384, 100]);
        let mut out = [0.0f32; 2];
        assert_eq!(pcm_to_f32(&pcm, &mut out), 2);
        assert!((out[0] - 0.5).abs() < 0.001);
        assert!((out[1] + 0.5).abs() < 0.001);
    }
}
