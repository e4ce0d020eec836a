use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunables that control capture, calibration, and isolation.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// Binaries are responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (tests, batch jobs, embedded assistants) can construct it programmatically
///
/// The defaults reproduce the hand-tuned values the heuristic was calibrated with; change
/// them together, not in isolation. In particular the start multiplier must stay above the
/// end multiplier: the start of an utterance is louder than its decaying tail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Frames per captured chunk. One chunk yields one envelope entry.
    pub chunk_frames: usize,

    /// Sample rate in Hz, fixed for the whole session.
    pub sample_rate: u32,

    /// Channel count. Multi-channel chunks are interleaved; RMS pools all channels.
    pub channels: u16,

    /// Duration of the silence-only calibration capture, in seconds.
    pub calibration_secs: u32,

    /// Duration of one recording window, in seconds.
    pub window_secs: u32,

    /// Start-of-speech threshold as a multiple of the noise baseline.
    pub start_multiplier: f32,

    /// End-of-speech threshold as a multiple of the noise baseline.
    ///
    /// Deliberately lower than `start_multiplier`: trailing consonants decay below the
    /// onset level before the utterance truly ends.
    pub end_multiplier: f32,

    /// Silence threshold as a multiple of the noise baseline. A window whose envelope
    /// never reaches it contains no sound at all.
    pub silence_multiplier: f32,

    /// Denominator of the tail fraction inspected by the isolation test: the last
    /// `1/end_partition` of the envelope must be (mostly) quiet for speech to count as
    /// fully contained.
    pub end_partition: u32,

    /// How many tail entries may exceed the start threshold before the utterance is
    /// judged to be running off the end of the window.
    pub tail_match_limit: usize,

    /// How many qualifying envelope entries a trim scan must see before it fixes a
    /// boundary.
    pub run_tolerance: usize,

    /// Backward padding applied to the detected speech onset, in multiples of
    /// `run_tolerance` chunks.
    pub start_pad_factor: usize,

    /// Forward padding applied to the detected speech tail, in multiples of
    /// `run_tolerance` chunks. More generous than the start padding (see
    /// `end_multiplier`).
    pub end_pad_factor: usize,

    /// Lower clamp for the noise baseline. A dead-silent calibration would otherwise
    /// yield all-zero thresholds and the isolation test would trigger on anything.
    pub baseline_floor: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_frames: 1024,
            sample_rate: 44_100,
            channels: 1,
            calibration_secs: 5,
            window_secs: 5,
            start_multiplier: 1.25,
            end_multiplier: 1.05,
            silence_multiplier: 1.5,
            end_partition: 7,
            tail_match_limit: 3,
            run_tolerance: 5,
            start_pad_factor: 2,
            end_pad_factor: 6,
            baseline_floor: 1e-4,
        }
    }
}

impl Config {
    /// Number of chunks in one recording window.
    pub fn window_chunks(&self) -> usize {
        (self.sample_rate as usize / self.chunk_frames) * self.window_secs as usize
    }

    /// Number of chunks in the calibration capture.
    pub fn calibration_chunks(&self) -> usize {
        (self.sample_rate as usize / self.chunk_frames) * self.calibration_secs as usize
    }

    /// Interleaved samples per chunk (`chunk_frames * channels`).
    pub fn chunk_samples(&self) -> usize {
        self.chunk_frames * self.channels as usize
    }

    /// Check that the configuration can drive a session at all.
    ///
    /// Called by [`crate::session::Session::new`]; exposed so frontends can validate user
    /// input before opening an audio device.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_frames == 0 {
            return Err(Error::msg("chunk_frames must be nonzero"));
        }
        if self.sample_rate as usize / self.chunk_frames == 0 {
            return Err(Error::msg(format!(
                "chunk_frames ({}) must not exceed the sample rate ({})",
                self.chunk_frames, self.sample_rate
            )));
        }
        if self.channels == 0 {
            return Err(Error::msg("channels must be nonzero"));
        }
        if self.calibration_secs == 0 || self.window_secs == 0 {
            return Err(Error::msg(
                "calibration and recording windows must be at least one second",
            ));
        }
        if self.end_partition < 2 {
            return Err(Error::msg("end_partition must be at least 2"));
        }
        if self.run_tolerance == 0 {
            return Err(Error::msg("run_tolerance must be nonzero"));
        }
        if self.end_multiplier > self.start_multiplier {
            return Err(Error::msg(format!(
                "end multiplier ({}) must not exceed start multiplier ({})",
                self.end_multiplier, self.start_multiplier
            )));
        }
        if self.baseline_floor <= 0.0 {
            return Err(Error::msg("baseline_floor must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().expect("default config");
    }

    #[test]
    fn default_window_math_matches_capture_parameters() {
        let config = Config::default();
        // 44100 / 1024 = 43 chunks per second, 5 second windows.
        assert_eq!(config.window_chunks(), 215);
        assert_eq!(config.calibration_chunks(), 215);
        assert_eq!(config.chunk_samples(), 1024);
    }

    #[test]
    fn validate_rejects_inverted_multipliers() {
        let config = Config {
            start_multiplier: 1.0,
            end_multiplier: 1.2,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_oversized_chunks() {
        let config = Config {
            chunk_frames: 96_000,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_degenerate_partition() {
        let config = Config {
            end_partition: 1,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
