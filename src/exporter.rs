//! Trim/export collaborators: turning an isolated capture into an audio asset.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::isolator::TrimBounds;
use crate::session::Recording;

/// Exports the bounded sub-range of a capture as a new audio asset.
///
/// Implementations trust the bounds (the isolator guarantees
/// `start_chunk <= end_chunk <= total_chunks`) and return the location of the produced
/// asset for the recognition hand-off.
pub trait TrimExporter {
    fn export(&mut self, recording: &Recording, bounds: &TrimBounds) -> Result<PathBuf>;
}

/// Writes the trimmed range to a WAV file at a fixed path, overwriting any previous pass.
pub struct WavExporter {
    out_path: PathBuf,
}

impl WavExporter {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.out_path
    }
}

impl TrimExporter for WavExporter {
    fn export(&mut self, recording: &Recording, bounds: &TrimBounds) -> Result<PathBuf> {
        let frames = recording.frames();
        let channels = recording.channels() as usize;

        // Bounds are fractions of total duration; map them onto frame indices so
        // multi-channel interleaving stays intact.
        let start_frame = (bounds.start_fraction() * frames as f32) as usize;
        let end_frame = ((bounds.end_fraction() * frames as f32) as usize).min(frames);

        let spec = hound::WavSpec {
            channels: recording.channels(),
            sample_rate: recording.sample_rate(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(&self.out_path, spec)?;
        for &sample in &recording.samples()[start_frame * channels..end_frame * channels] {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        Ok(self.out_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_with(samples: &[i16]) -> Recording {
        let mut recording = Recording::new(8_000, 1);
        recording.append(samples);
        recording
    }

    #[test]
    fn exports_only_the_bounded_range() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("trimmed.wav");

        // 8 frames; bounds cover chunks 1..3 of 4 => frames 2..6.
        let recording = recording_with(&[10, 11, 12, 13, 14, 15, 16, 17]);
        let bounds = TrimBounds {
            start_chunk: 1,
            end_chunk: 3,
            total_chunks: 4,
        };

        let mut exporter = WavExporter::new(&out);
        let asset = exporter.export(&recording, &bounds)?;
        assert_eq!(asset, out);

        let mut reader = hound::WavReader::open(&out)?;
        let samples: Vec<i16> = reader.samples::<i16>().collect::<hound::Result<_>>()?;
        assert_eq!(samples, vec![12, 13, 14, 15]);
        Ok(())
    }

    #[test]
    fn full_range_bounds_export_the_whole_capture() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("untrimmed.wav");

        let recording = recording_with(&[1, 2, 3, 4]);
        let bounds = TrimBounds {
            start_chunk: 0,
            end_chunk: 2,
            total_chunks: 2,
        };

        WavExporter::new(&out).export(&recording, &bounds)?;

        let mut reader = hound::WavReader::open(&out)?;
        let samples: Vec<i16> = reader.samples::<i16>().collect::<hound::Result<_>>()?;
        assert_eq!(samples, vec![1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn stereo_trim_lands_on_frame_boundaries() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("stereo.wav");

        let mut recording = Recording::new(8_000, 2);
        // 4 stereo frames.
        recording.append(&[1, -1, 2, -2, 3, -3, 4, -4]);
        let bounds = TrimBounds {
            start_chunk: 1,
            end_chunk: 4,
            total_chunks: 4,
        };

        WavExporter::new(&out).export(&recording, &bounds)?;

        let mut reader = hound::WavReader::open(&out)?;
        assert_eq!(reader.spec().channels, 2);
        let samples: Vec<i16> = reader.samples::<i16>().collect::<hound::Result<_>>()?;
        assert_eq!(samples, vec![2, -2, 3, -3, 4, -4]);
        Ok(())
    }
}
