//! WAV encoding of rendered audio
//!
//! Canonical 44-byte PCM container: RIFF/WAVE header, 16-byte fmt chunk
//! (PCM tag 1), data chunk with exact payload size, 16-bit little-endian
//! samples. Floats are clamped to [-1, 1] and scaled by 32768 on the
//! negative side and 32767 on the non-negative side.

use std::io::Cursor;

use thiserror::Error;

use crate::render::RenderedAudio;

#[derive(Debug, Error)]
pub enum WavError {
    #[error("wav encoding failed: {0}")]
    Encode(#[from] hound::Error),
}

/// Convert one float sample to 16-bit PCM
#[inline]
fn to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encode a rendered buffer as a complete WAV file in memory
pub fn encode_wav(audio: &RenderedAudio) -> Result<Vec<u8>, WavError> {
    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in &audio.samples {
            writer.write_sample(to_i16(sample))?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Mode, SessionConfig};
    use crate::render::render_session;

    fn u16_at(bytes: &[u8], pos: usize) -> u16 {
        u16::from_le_bytes([bytes[pos], bytes[pos + 1]])
    }

    fn u32_at(bytes: &[u8], pos: usize) -> u32 {
        u32::from_le_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
    }

    #[test]
    fn test_header_layout() {
        let audio = RenderedAudio {
            samples: vec![0.0; 48000 * 2],
            channels: 2,
            sample_rate: 48000,
        };
        let bytes = encode_wav(&audio).unwrap();
        let data_size = 48000 * 2 * 2;

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32_at(&bytes, 4) as usize, bytes.len() - 8);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32_at(&bytes, 16), 16); // fmt chunk length
        assert_eq!(u16_at(&bytes, 20), 1); // PCM format tag
        assert_eq!(u16_at(&bytes, 22), 2); // channels
        assert_eq!(u32_at(&bytes, 24), 48000); // sample rate
        assert_eq!(u32_at(&bytes, 28), 48000 * 2 * 2); // byte rate
        assert_eq!(u16_at(&bytes, 32), 4); // block align
        assert_eq!(u16_at(&bytes, 34), 16); // bit depth
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32_at(&bytes, 40) as usize, data_size);
        assert_eq!(bytes.len(), 44 + data_size);
    }

    #[test]
    fn test_sample_scaling_is_asymmetric() {
        let audio = RenderedAudio {
            samples: vec![-1.0, 1.0, 0.0, 0.5, -2.0, 2.0],
            channels: 2,
            sample_rate: 48000,
        };
        let bytes = encode_wav(&audio).unwrap();
        let data = &bytes[44..];

        let sample_at = |i: usize| i16::from_le_bytes([data[i * 2], data[i * 2 + 1]]);
        assert_eq!(sample_at(0), -32768);
        assert_eq!(sample_at(1), 32767);
        assert_eq!(sample_at(2), 0);
        assert_eq!(sample_at(3), 16383);
        // Out-of-range input clamps before scaling
        assert_eq!(sample_at(4), -32768);
        assert_eq!(sample_at(5), 32767);
    }

    #[test]
    fn test_round_trip_header_fields() {
        let config = SessionConfig {
            mode: Mode::Pure,
            carrier_hz: 440.0,
            volume: 0.5,
            duration_secs: 1,
            ..Default::default()
        };
        let audio = render_session(&config).unwrap();
        let frames = audio.frame_count();
        let bytes = encode_wav(&audio).unwrap();

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 48000);
        assert_eq!(spec.channels, 2);
        assert_eq!(reader.len() as usize, frames * 2);
    }
}
