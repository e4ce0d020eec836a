//! Noise-floor calibration and threshold derivation.
//!
//! The baseline is measured once per session from a capture the caller guarantees to be
//! silent, and every later envelope is judged against thresholds derived from it. Keeping
//! both in explicit values (rather than module-level state) lets the decision functions
//! stay pure and testable.

use serde::Serialize;

use crate::config::Config;
use crate::envelope::Envelope;
use crate::error::{Error, Result};

/// Mean RMS magnitude of the silence-only calibration capture.
///
/// Set once per session; read-only afterward.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NoiseBaseline(f32);

impl NoiseBaseline {
    /// Compute the baseline from a calibration envelope.
    ///
    /// An empty capture is a caller contract violation and fails fast. A near-zero mean
    /// (dead-silent room, muted input) is clamped to `floor` so the derived thresholds
    /// stay nonzero.
    pub fn from_envelope(envelope: &Envelope, floor: f32) -> Result<Self> {
        if envelope.is_empty() {
            return Err(Error::msg("calibration capture contained no chunks"));
        }

        let mean =
            envelope.magnitudes().iter().sum::<f32>() / envelope.len() as f32;
        Ok(Self(mean.max(floor)))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

/// The three decision levels derived from the noise baseline.
///
/// `start` > `end` is a deliberate asymmetry: an utterance's onset is louder than its
/// decaying tail, so the scan that looks for the end of speech must accept quieter chunks.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Thresholds {
    /// Level a chunk must reach to count as the start of speech.
    pub start: f32,

    /// Level a chunk must reach to still count as ongoing speech.
    pub end: f32,

    /// Level the envelope peak must reach for the window to contain sound at all.
    pub silence: f32,
}

impl Thresholds {
    /// Derive thresholds from a baseline using the configured multipliers.
    pub fn derive(baseline: NoiseBaseline, config: &Config) -> Self {
        let noise = baseline.value();
        Self {
            start: config.start_multiplier * noise,
            end: config.end_multiplier * noise,
            silence: config.silence_multiplier * noise,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_is_the_mean_of_the_envelope() -> anyhow::Result<()> {
        let envelope = Envelope::from(vec![0.02, 0.04, 0.06]);
        let baseline = NoiseBaseline::from_envelope(&envelope, 1e-4)?;
        assert!((baseline.value() - 0.04).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn empty_calibration_fails_fast() {
        let envelope = Envelope::new();
        assert!(NoiseBaseline::from_envelope(&envelope, 1e-4).is_err());
    }

    #[test]
    fn near_zero_baseline_is_clamped_to_the_floor() -> anyhow::Result<()> {
        // 50 chunks of near-silence must not yield all-zero thresholds.
        let envelope = Envelope::from(vec![0.0; 50]);
        let baseline = NoiseBaseline::from_envelope(&envelope, 1e-4)?;
        assert_eq!(baseline.value(), 1e-4);

        let thresholds = Thresholds::derive(baseline, &Config::default());
        assert!(thresholds.start > 0.0);
        assert!(thresholds.end > 0.0);
        assert!(thresholds.silence > 0.0);
        Ok(())
    }

    #[test]
    fn thresholds_follow_the_configured_multipliers() -> anyhow::Result<()> {
        let envelope = Envelope::from(vec![0.01; 10]);
        let baseline = NoiseBaseline::from_envelope(&envelope, 1e-4)?;
        let thresholds = Thresholds::derive(baseline, &Config::default());

        assert!((thresholds.start - 0.0125).abs() < 1e-6);
        assert!((thresholds.end - 0.0105).abs() < 1e-6);
        assert!((thresholds.silence - 0.015).abs() < 1e-6);
        assert!(thresholds.end < thresholds.start);
        Ok(())
    }
}
