//! Chunk sources: where the session pulls its audio from.
//!
//! The core only requires "next chunk" semantics. Sources are expected to block until a
//! full chunk is available and to deliver interleaved signed 16-bit PCM matching the
//! session [`Config`](crate::config::Config).

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use hound::WavReader;

use crate::config::Config;
use crate::error::{Error, Result};

/// A pull-based producer of fixed-size audio chunks.
///
/// Implementations block until data is available. Failures are device failures
/// ([`Error::Device`]); running out of audio is not an error (see [`WavChunkSource`]).
pub trait ChunkSource {
    /// Block until the next chunk of interleaved `i16` samples is available.
    fn next_chunk(&mut self) -> Result<Vec<i16>>;
}

/// File-backed chunk source for offline runs and tests.
///
/// Validates the WAV format against the session config up front, then yields
/// `chunk_frames * channels` samples per pull. Once the file is exhausted the source
/// yields silence, so a short file behaves like a capture that went quiet rather than a
/// device failure.
pub struct WavChunkSource<R>
where
    R: Read,
{
    reader: WavReader<R>,
    chunk_samples: usize,
    exhausted: bool,
}

impl<R> std::fmt::Debug for WavChunkSource<R>
where
    R: Read,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavChunkSource")
            .field("chunk_samples", &self.chunk_samples)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

impl WavChunkSource<BufReader<File>> {
    /// Open a WAV file as a chunk source.
    pub fn open(path: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let path = path.as_ref();
        let reader = WavReader::open(path)
            .map_err(|err| Error::device(format!("failed to open '{}': {err}", path.display())))?;
        Self::from_wav_reader(reader, config)
    }
}

impl<R> WavChunkSource<R>
where
    R: Read,
{
    /// Wrap an already-open WAV reader.
    pub fn new(reader: R, config: &Config) -> Result<Self> {
        let reader = WavReader::new(reader)
            .map_err(|err| Error::device(format!("failed to read WAV data: {err}")))?;
        Self::from_wav_reader(reader, config)
    }

    fn from_wav_reader(reader: WavReader<R>, config: &Config) -> Result<Self> {
        let spec = reader.spec();

        if spec.channels != config.channels {
            return Err(Error::msg(format!(
                "expected {} channel(s), got {}",
                config.channels, spec.channels
            )));
        }
        if spec.sample_rate != config.sample_rate {
            return Err(Error::msg(format!(
                "expected {} Hz sample rate, got {} Hz",
                config.sample_rate, spec.sample_rate
            )));
        }
        if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
            return Err(Error::msg(format!(
                "expected 16-bit integer PCM, got {}-bit {:?}",
                spec.bits_per_sample, spec.sample_format
            )));
        }

        Ok(Self {
            reader,
            chunk_samples: config.chunk_samples(),
            exhausted: false,
        })
    }

    /// Whether the underlying file has run out (subsequent chunks are silence).
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<R> ChunkSource for WavChunkSource<R>
where
    R: Read,
{
    fn next_chunk(&mut self) -> Result<Vec<i16>> {
        let mut chunk = Vec::with_capacity(self.chunk_samples);

        if !self.exhausted {
            for sample in self.reader.samples::<i16>() {
                chunk.push(sample.map_err(|err| {
                    Error::device(format!("failed to read WAV sample: {err}"))
                })?);
                if chunk.len() == self.chunk_samples {
                    break;
                }
            }
            if chunk.len() < self.chunk_samples {
                self.exhausted = true;
            }
        }

        // Silence-pad the remainder (and every chunk after EOF).
        chunk.resize(self.chunk_samples, 0);
        Ok(chunk)
    }
}
