//! The isolation heuristics: sound presence, containment, and trim boundaries.
//!
//! Everything in this module is a pure function from an envelope plus thresholds to a
//! decision. The capture loop in [`crate::session`] owns all I/O; these functions can be
//! exercised with canned envelopes and no audio device.

use serde::Serialize;

use crate::calibration::Thresholds;
use crate::config::Config;
use crate::envelope::Envelope;

/// Chunk-index boundaries of the isolated utterance within a capture.
///
/// `start_chunk <= end_chunk <= total_chunks` always holds. The fractional accessors are
/// what the trim/export collaborator consumes: fractions of total capture duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrimBounds {
    pub start_chunk: usize,
    pub end_chunk: usize,
    pub total_chunks: usize,
}

impl TrimBounds {
    /// Fraction of the capture to drop from the start.
    pub fn start_fraction(&self) -> f32 {
        self.start_chunk as f32 / self.total_chunks as f32
    }

    /// Fraction of the capture (from the start) at which the utterance ends.
    pub fn end_fraction(&self) -> f32 {
        self.end_chunk as f32 / self.total_chunks as f32
    }
}

/// Per-pass decision over a captured envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Verdict {
    /// The envelope never reached the silence threshold; nothing was said.
    NoSound,

    /// Speech is present but still in progress at the end of the window; trimming now
    /// would clip it.
    NotIsolated,

    /// Speech is fully contained; trim to these boundaries.
    Isolated(TrimBounds),
}

/// Whether the capture contains any sound at all.
///
/// An empty envelope is treated as silence.
pub fn has_sound(envelope: &Envelope, silence_threshold: f32) -> bool {
    match envelope.peak() {
        Some(peak) => peak >= silence_threshold,
        None => false,
    }
}

/// Whether the captured speech is fully contained in the window.
///
/// Inspects the last `1/end_partition` fraction of the envelope and counts entries above
/// the *start* threshold. More than `tail_match_limit` matches means the utterance is
/// still running at the edge of the window. Judging the tail against the stricter start
/// threshold is deliberate: treating ongoing speech as isolated clips the command, while
/// a false "not isolated" only costs one extension.
pub fn is_isolated(envelope: &Envelope, start_threshold: f32, config: &Config) -> bool {
    let magnitudes = envelope.magnitudes();
    let tail = tail_start(magnitudes.len(), config.end_partition);

    let mut matches = 0usize;
    for &magnitude in &magnitudes[tail..] {
        if magnitude > start_threshold {
            matches += 1;
            if matches > config.tail_match_limit {
                return false;
            }
        }
    }

    true
}

/// Compute trim boundaries for an isolated utterance.
///
/// Two independent scans, each counting qualifying entries without resetting on a
/// non-qualifying one (a run here is "qualifying entries seen so far", not a contiguous
/// streak):
/// - forward against the start threshold; on the `run_tolerance`-th match at index `i`,
///   the start boundary is `i` padded back by `start_pad_factor * run_tolerance` chunks
///   so the speech onset isn't clipped;
/// - backward against the lower end threshold; on the `run_tolerance`-th match at index
///   `i`, the end boundary is `i` padded forward by `end_pad_factor * run_tolerance`
///   chunks, clamped to the capture length.
///
/// A scan that never reaches the tolerance leaves its boundary at the default
/// (`0` / capture length): no trimming on that side.
pub fn trim_bounds(envelope: &Envelope, thresholds: &Thresholds, config: &Config) -> TrimBounds {
    let magnitudes = envelope.magnitudes();
    let total = magnitudes.len();
    let tolerance = config.run_tolerance;

    let mut start_chunk = 0usize;
    let mut count = 0usize;
    for (i, &magnitude) in magnitudes.iter().enumerate() {
        if magnitude >= thresholds.start {
            count += 1;
            if count == tolerance {
                start_chunk = i.saturating_sub(config.start_pad_factor * tolerance);
                break;
            }
        }
    }

    let mut end_chunk = total;
    let mut count = 0usize;
    for i in (0..total).rev() {
        if magnitudes[i] >= thresholds.end {
            count += 1;
            if count == tolerance {
                end_chunk = (i + config.end_pad_factor * tolerance).min(total);
                break;
            }
        }
    }

    // Sparse matches can make the scans cross (the counters never reset); an inverted
    // range would trim away the whole capture, so fall back to no trimming.
    if start_chunk > end_chunk {
        start_chunk = 0;
        end_chunk = total;
    }

    TrimBounds {
        start_chunk,
        end_chunk,
        total_chunks: total,
    }
}

/// Run the full per-pass decision: presence, containment, then boundaries.
pub fn assess(envelope: &Envelope, thresholds: &Thresholds, config: &Config) -> Verdict {
    if !has_sound(envelope, thresholds.silence) {
        return Verdict::NoSound;
    }

    if !is_isolated(envelope, thresholds.start, config) {
        return Verdict::NotIsolated;
    }

    Verdict::Isolated(trim_bounds(envelope, thresholds, config))
}

/// First index of the inspected tail: `round(len * (1 - 1/end_partition))`.
fn tail_start(len: usize, end_partition: u32) -> usize {
    let fraction = 1.0 - 1.0 / end_partition as f32;
    ((len as f32 * fraction).round() as usize).min(len)
}
