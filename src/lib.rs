//! `soloist` — a small, focused utterance-isolation library for voice-command capture.
//!
//! This crate provides:
//! - Ambient-noise calibration and threshold derivation
//! - Volume-envelope computation over fixed-size PCM chunks
//! - Isolation decisions (presence, containment, trim boundaries)
//! - A capture session that drives sources, exporters, and recognizers
//!
//! The library is designed to be used by both interactive assistants and offline tools,
//! with an emphasis on pure decision functions, explicit session state, and minimal
//! surprises.

// High-level API (most consumers should start here).
pub mod config;
pub mod session;

// Calibration state and the pure isolation heuristics.
pub mod calibration;
pub mod envelope;
pub mod isolator;

// Collaborator seams: audio in, trimmed asset out, recognized text out.
pub mod exporter;
pub mod recognizer;
pub mod source;

// Optional collaborator implementations.
pub mod backends;
#[cfg(feature = "mic")]
pub mod mic;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub mod error;
