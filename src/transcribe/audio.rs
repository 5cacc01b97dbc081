//! Decoding staged audio files into Whisper's input format.

use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;
use tracing::info;

/// Whisper's required sample rate
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode audio: {0}")]
    Decode(#[from] SymphoniaError),
    #[error("No audio track found in file")]
    NoTrack,
    #[error("Audio track is missing a sample rate")]
    NoSampleRate,
    #[error("File contains no decodable audio")]
    Empty,
}

/// Decode an audio file to 16 kHz mono f32 samples in [-1, 1].
///
/// Containers and codecs are whatever symphonia was built with (wav, flac,
/// ogg/vorbis, mp3, aac/m4a here). Multi-channel audio is downmixed by
/// averaging; other sample rates are resampled by linear interpolation.
pub fn load_audio(path: &Path) -> Result<Vec<f32>, AudioError> {
    let file = Box::new(File::open(path)?);
    let mss = MediaSourceStream::new(file, Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;
    let track = format.default_track().ok_or(AudioError::NoTrack)?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(AudioError::NoSampleRate)?;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut interleaved: Vec<f32> = Vec::new();
    let mut channels = 1usize;
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            // End of stream or unrecoverable container error
            Err(_) => break,
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(audio_buffer) => {
                if sample_buf.is_none() {
                    let spec = *audio_buffer.spec();
                    channels = spec.channels.count();
                    let duration = audio_buffer.capacity() as u64;
                    sample_buf = Some(SampleBuffer::<f32>::new(duration, spec));
                }
                if let Some(buf) = sample_buf.as_mut() {
                    buf.copy_interleaved_ref(audio_buffer);
                    interleaved.extend_from_slice(buf.samples());
                }
            }
            // Skip malformed packets
            Err(SymphoniaError::DecodeError(_)) => (),
            Err(_) => break,
        }
    }

    if interleaved.is_empty() {
        return Err(AudioError::Empty);
    }

    let mono = downmix_to_mono(&interleaved, channels);
    let samples = resample_linear(&mono, sample_rate, WHISPER_SAMPLE_RATE);

    info!(
        path = %path.display(),
        sample_rate,
        channels,
        secs = samples.len() as f32 / WHISPER_SAMPLE_RATE as f32,
        "decoded audio"
    );

    Ok(samples)
}

/// Average interleaved frames across channels.
fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Resample by linear interpolation between neighbouring samples.
fn resample_linear(samples: &[f32], src_rate: u32, dst_rate: u32) -> Vec<f32> {
    if src_rate == dst_rate || samples.is_empty() {
        return samples.to_vec();
    }
    let ratio = src_rate as f64 / dst_rate as f64;
    let out_len = (samples.len() as f64 / ratio).floor() as usize;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let idx = pos as usize;
        let frac = (pos - idx as f64) as f32;
        let a = samples[idx];
        let b = if idx + 1 < samples.len() {
            samples[idx + 1]
        } else {
            a
        };
        out.push(a + (b - a) * frac);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_load_mono_wav_at_whisper_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples: Vec<i16> = (0..16000)
            .map(|i| ((i as f32 * 0.05).sin() * 10000.0) as i16)
            .collect();
        write_wav(&path, WHISPER_SAMPLE_RATE, 1, &samples);

        let decoded = load_audio(&path).unwrap();
        assert_eq!(decoded.len(), 16000);
        assert!(decoded.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!(decoded.iter().any(|s| s.abs() > 0.1));
    }

    #[test]
    fn test_stereo_is_downmixed_and_resampled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        // One second of stereo at 48 kHz
        let mut samples = Vec::with_capacity(48000 * 2);
        for i in 0..48000 {
            let s = ((i as f32 * 0.01).sin() * 8000.0) as i16;
            samples.push(s);
            samples.push(s);
        }
        write_wav(&path, 48000, 2, &samples);

        let decoded = load_audio(&path).unwrap();
        // Roughly one second at 16 kHz
        assert!((decoded.len() as i64 - 16000).abs() < 32);
    }

    #[test]
    fn test_undecodable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"definitely not audio").unwrap();
        assert!(load_audio(&path).is_err());
    }

    #[test]
    fn test_downmix_averages_frames() {
        let mono = downmix_to_mono(&[1.0, 0.0, 0.5, 0.5], 2);
        assert_eq!(mono, vec![0.5, 0.5]);
    }

    #[test]
    fn test_resample_halves_length() {
        let input: Vec<f32> = (0..1000).map(|i| i as f32).collect();
        let out = resample_linear(&input, 32000, 16000);
        assert_eq!(out.len(), 500);
        // Linear ramp stays a ramp
        assert!((out[1] - out[0] - 2.0).abs() < 1e-3);
    }
}
