//! High-level capture session: the Calibrating → Recording → {Done, ExtendRecording} loop.
//!
//! A [`Session`] owns the configuration and the calibration state (baseline + thresholds),
//! while the collaborators — chunk source, trim exporter, recognizer — are borrowed per
//! call and released on every exit path. The decision logic itself lives in
//! [`crate::isolator`] as pure functions; this module only wires capture to decisions.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::calibration::{NoiseBaseline, Thresholds};
use crate::config::Config;
use crate::envelope::{Envelope, chunk_rms};
use crate::error::{Error, Result};
use crate::exporter::TrimExporter;
use crate::isolator::{TrimBounds, Verdict, assess};
use crate::recognizer::Recognizer;
use crate::source::ChunkSource;

/// Raw interleaved capture accumulated over one pass, kept for trim/export.
#[derive(Debug, Clone)]
pub struct Recording {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl Recording {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            samples: Vec::new(),
            sample_rate,
            channels,
        }
    }

    pub fn append(&mut self, chunk: &[i16]) {
        self.samples.extend_from_slice(chunk);
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of frames (interleaved sample groups) captured so far.
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }
}

/// Terminal result of one recording pass.
///
/// `NoSpeech` and `NotIsolated` are normal control flow, not errors; the caller decides
/// whether to start another pass. Each pass is self-contained and idempotent — discarding
/// one costs only the time already spent recording it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PassOutcome {
    /// The window never reached the silence threshold; nothing was said.
    NoSpeech,

    /// The extension budget diminished to nothing before the utterance settled; the pass
    /// gives up rather than re-assessing an envelope that can no longer change.
    NotIsolated,

    /// Speech was isolated and exported; no recognizer was attached.
    Isolated { asset: PathBuf, bounds: TrimBounds },

    /// Speech was isolated, exported, and recognized.
    Command { text: String, asset: PathBuf },

    /// Speech was isolated and exported, but the recognizer could not interpret it.
    /// Non-fatal: the caller may restart calibration-free recording.
    RecognitionFailed { reason: String, asset: PathBuf },
}

/// A calibrated capture session.
///
/// Typical usage:
/// - Construct once with a validated [`Config`].
/// - Run [`Session::calibrate`] against a caller-guaranteed-silent source, once.
/// - Run [`Session::run_pass`] per voice command.
///
/// The baseline and thresholds are written by `calibrate` and only read afterward; there
/// is no hidden cross-call state beyond them.
pub struct Session {
    config: Config,
    baseline: Option<NoiseBaseline>,
    thresholds: Option<Thresholds>,
}

impl Session {
    /// Create a session, failing fast on an unusable configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            baseline: None,
            thresholds: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The noise baseline, once calibrated.
    pub fn baseline(&self) -> Option<NoiseBaseline> {
        self.baseline
    }

    /// The derived thresholds, once calibrated.
    pub fn thresholds(&self) -> Option<Thresholds> {
        self.thresholds
    }

    pub fn is_calibrated(&self) -> bool {
        self.thresholds.is_some()
    }

    /// Measure the ambient noise baseline from a silence-only capture.
    ///
    /// The caller guarantees silence for the duration; any speech here skews every later
    /// decision. Runs once at session start — calling it again re-measures and replaces
    /// the baseline and thresholds.
    pub fn calibrate(&mut self, source: &mut dyn ChunkSource) -> Result<NoiseBaseline> {
        let budget = self.config.calibration_chunks();
        debug!(chunks = budget, "calibration capture");

        let mut envelope = Envelope::new();
        let mut recording = Recording::new(self.config.sample_rate, self.config.channels);
        capture(source, budget, &mut envelope, &mut recording)?;

        let baseline = NoiseBaseline::from_envelope(&envelope, self.config.baseline_floor)?;
        let thresholds = Thresholds::derive(baseline, &self.config);
        info!(
            baseline = baseline.value(),
            silence = thresholds.silence,
            "ambient noise calibrated"
        );

        self.baseline = Some(baseline);
        self.thresholds = Some(thresholds);
        Ok(baseline)
    }

    /// Run one recording pass to a terminal outcome.
    ///
    /// Captures a window of chunks, then decides: no sound ends the pass; contained
    /// speech is trimmed, exported, and (when a recognizer is attached) recognized;
    /// speech still running at the window edge extends the capture with a diminishing
    /// budget of `window_chunks / (iteration + 1)` and re-assesses the accumulated
    /// envelope.
    pub fn run_pass(
        &mut self,
        source: &mut dyn ChunkSource,
        exporter: &mut dyn TrimExporter,
        mut recognizer: Option<&mut dyn Recognizer>,
    ) -> Result<PassOutcome> {
        let thresholds = self
            .thresholds
            .ok_or_else(|| Error::msg("session is not calibrated"))?;

        let window_chunks = self.config.window_chunks();
        let mut envelope = Envelope::new();
        let mut recording = Recording::new(self.config.sample_rate, self.config.channels);

        let mut iteration = 0usize;
        loop {
            let budget = window_chunks / (iteration + 1);
            if budget == 0 {
                warn!(iteration, "extension budget exhausted before isolation");
                return Ok(PassOutcome::NotIsolated);
            }

            debug!(iteration, chunks = budget, "recording window");
            capture(source, budget, &mut envelope, &mut recording)?;

            match assess(&envelope, &thresholds, &self.config) {
                Verdict::NoSound => {
                    debug!(chunks = envelope.len(), "no sound detected in window");
                    return Ok(PassOutcome::NoSpeech);
                }
                Verdict::NotIsolated => {
                    debug!(
                        chunks = envelope.len(),
                        "sound is not isolated, extending recording"
                    );
                    iteration += 1;
                }
                Verdict::Isolated(bounds) => {
                    info!(
                        start = bounds.start_chunk,
                        end = bounds.end_chunk,
                        total = bounds.total_chunks,
                        "utterance isolated"
                    );
                    let asset = exporter.export(&recording, &bounds)?;

                    let Some(recognizer) = recognizer.as_deref_mut() else {
                        return Ok(PassOutcome::Isolated { asset, bounds });
                    };

                    return match recognizer.recognize(&asset) {
                        Ok(text) => Ok(PassOutcome::Command { text, asset }),
                        Err(Error::Recognition(reason)) => {
                            warn!(%reason, "recognition failed");
                            Ok(PassOutcome::RecognitionFailed { reason, asset })
                        }
                        Err(err) => Err(err),
                    };
                }
            }
        }
    }
}

/// Pull `budget` chunks, extending the envelope and the raw capture in lockstep.
fn capture(
    source: &mut dyn ChunkSource,
    budget: usize,
    envelope: &mut Envelope,
    recording: &mut Recording,
) -> Result<()> {
    for _ in 0..budget {
        let chunk = source.next_chunk()?;
        envelope.push(chunk_rms(&chunk));
        recording.append(&chunk);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_counts_frames_per_channel() {
        let mut recording = Recording::new(44_100, 2);
        recording.append(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(recording.frames(), 3);
        assert_eq!(recording.samples().len(), 6);
    }

    #[test]
    fn session_rejects_invalid_config() {
        let config = Config {
            chunk_frames: 0,
            ..Config::default()
        };
        assert!(Session::new(config).is_err());
    }

    #[test]
    fn pass_before_calibration_fails_fast() {
        struct NeverSource;
        impl ChunkSource for NeverSource {
            fn next_chunk(&mut self) -> Result<Vec<i16>> {
                unreachable!("pass must fail before pulling audio")
            }
        }
        struct NeverExporter;
        impl TrimExporter for NeverExporter {
            fn export(&mut self, _: &Recording, _: &TrimBounds) -> Result<PathBuf> {
                unreachable!("pass must fail before exporting")
            }
        }

        let mut session = Session::new(Config::default()).expect("valid config");
        let err = session
            .run_pass(&mut NeverSource, &mut NeverExporter, None)
            .unwrap_err();
        assert!(matches!(err, Error::Message(_)));
    }
}
