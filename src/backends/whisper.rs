//! Recognizer backed by `whisper-rs` / whisper.cpp.
//!
//! The session hands over a trimmed WAV asset; this backend loads it, normalizes it to
//! the mono 16 kHz format whisper.cpp expects, and returns the concatenated segment text.

use std::path::Path;

use anyhow::Context;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::error::{Error, Result};
use crate::recognizer::Recognizer;

/// Sample rate whisper.cpp expects.
const WHISPER_SAMPLE_RATE: u32 = 16_000;

pub struct WhisperRecognizer {
    ctx: WhisperContext,
}

impl WhisperRecognizer {
    /// Load a whisper.cpp model from disk and initialize the recognizer.
    ///
    /// Model loading is expensive; construct once and reuse across passes.
    pub fn new(model_path: &str) -> Result<Self> {
        let ctx_params = WhisperContextParameters::default();
        let ctx = WhisperContext::new_with_params(model_path, ctx_params)
            .with_context(|| format!("failed to load model from path: {model_path}"))?;
        Ok(Self { ctx })
    }

    /// Access the underlying Whisper context.
    ///
    /// This is primarily intended for advanced or experimental use-cases.
    pub fn context(&self) -> &WhisperContext {
        &self.ctx
    }
}

impl Recognizer for WhisperRecognizer {
    fn recognize(&mut self, asset: &Path) -> Result<String> {
        let samples = load_mono_16k(asset)?;
        if samples.is_empty() {
            return Err(Error::Recognition("isolated audio asset was empty".into()));
        }

        let mut state = self
            .ctx
            .create_state()
            .context("failed to create whisper state")?;
        state
            .full(full_params(), &samples)
            .context("failed to run whisper full()")?;

        let mut text = String::new();
        for segment in state.as_iter() {
            let piece = segment.to_str().context("failed to get segment text")?;
            text.push_str(piece);
        }

        let text = text.trim().to_owned();
        if text.is_empty() {
            return Err(Error::Recognition(
                "no words recognized in the isolated audio".into(),
            ));
        }

        Ok(text)
    }
}

fn full_params() -> FullParams<'static, 'static> {
    let mut params = FullParams::new(SamplingStrategy::BeamSearch {
        beam_size: 5,
        patience: 1.0,
    });

    params.set_n_threads(num_cpus::get() as i32);
    params.set_translate(false);
    params.set_language(None);
    params.set_no_context(true);
    params.set_single_segment(false);
    params.set_print_progress(false);
    params.set_print_special(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);
    params
}

/// Load a WAV asset as mono 16 kHz samples normalized to `[-1.0, 1.0]`.
fn load_mono_16k(path: &Path) -> Result<Vec<f32>> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let mut interleaved = Vec::new();
    for sample in reader.samples::<i16>() {
        let pcm = sample?;
        interleaved.push(pcm as f32 / i16::MAX as f32);
    }

    let mono = downmix_to_mono(&interleaved, spec.channels as usize);
    Ok(resample_linear(&mono, spec.sample_rate, WHISPER_SAMPLE_RATE))
}

/// Downmix interleaved samples into mono by averaging channels.
fn downmix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Linear resampler from `from_rate` to `to_rate`, mono samples.
///
/// Command recordings are short and the downstream model is robust to interpolation
/// artifacts, so a windowed-sinc resampler would be overkill here.
fn resample_linear(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate {
        return input.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = ((input.len() as f64) / ratio).floor() as usize;
    let mut output = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let src_idx = i as f64 * ratio;
        let idx0 = src_idx.floor() as usize;
        let frac = (src_idx - idx0 as f64) as f32;
        let s0 = input.get(idx0).copied().unwrap_or(0.0);
        let s1 = input.get(idx0 + 1).copied().unwrap_or(s0);
        output.push(s0 + frac * (s1 - s0));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_averages_channel_pairs() {
        // Two stereo frames: (1, 3) and (-1, 1) => mono 2, 0.
        let mono = downmix_to_mono(&[1.0, 3.0, -1.0, 1.0], 2);
        assert_eq!(mono, vec![2.0, 0.0]);
    }

    #[test]
    fn downmix_is_identity_for_mono() {
        let input = vec![0.0, 0.5, -0.5];
        assert_eq!(downmix_to_mono(&input, 1), input);
    }

    #[test]
    fn resample_halves_the_length_at_double_rate() {
        let input = vec![0.0; 1000];
        let output = resample_linear(&input, 32_000, 16_000);
        assert_eq!(output.len(), 500);
    }

    #[test]
    fn resample_is_identity_at_equal_rates() {
        let input = vec![0.1, 0.2, 0.3];
        assert_eq!(resample_linear(&input, 16_000, 16_000), input);
    }
}
