use anyhow::Result;
use clap::Parser;
use serde::Serialize;

use std::io::{self, BufWriter, Write};

use soloist::calibration::Thresholds;
use soloist::config::Config;
use soloist::exporter::WavExporter;
use soloist::logging;
use soloist::session::{PassOutcome, Session};
use soloist::source::WavChunkSource;

fn main() -> Result<()> {
    logging::init();
    let params = get_params()?;

    // Take the capture format from the command recording itself; the calibration file
    // must match it (WavChunkSource validates).
    let spec = hound::WavReader::open(&params.audio_path)?.spec();
    let config = Config {
        chunk_frames: params.chunk_frames,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        calibration_secs: params.calibration_secs,
        window_secs: params.window_secs,
        ..Config::default()
    };

    let mut session = Session::new(config.clone())?;

    let mut calibration = WavChunkSource::open(&params.calibration_path, &config)?;
    let baseline = session.calibrate(&mut calibration)?;
    let thresholds = session
        .thresholds()
        .ok_or_else(|| anyhow::anyhow!("calibration did not produce thresholds"))?;

    let mut audio = WavChunkSource::open(&params.audio_path, &config)?;
    let mut exporter = WavExporter::new(&params.out_path);
    let outcome = session.run_pass(&mut audio, &mut exporter, None)?;

    let report = Report {
        baseline: baseline.value(),
        thresholds,
        outcome,
    };

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

/// What one offline isolation run decided, serialized to stdout.
#[derive(Serialize)]
struct Report {
    baseline: f32,
    thresholds: Thresholds,
    outcome: PassOutcome,
}

#[derive(Parser, Debug)]
#[command(name = "soloist")]
#[command(about = "An utterance isolation CLI")]
struct Params {
    /// Silence-only WAV used to measure the ambient noise baseline.
    #[arg(short = 'c', long = "calibration")]
    pub calibration_path: String,

    /// WAV containing the voice command to isolate.
    #[arg(short = 'a', long = "audio")]
    pub audio_path: String,

    /// Where to write the trimmed command audio.
    #[arg(short = 'o', long = "out", default_value = "command.wav")]
    pub out_path: String,

    #[arg(long = "chunk-frames", default_value_t = 1024)]
    pub chunk_frames: usize,

    #[arg(long = "window-secs", default_value_t = 5)]
    pub window_secs: u32,

    #[arg(long = "calibration-secs", default_value_t = 5)]
    pub calibration_secs: u32,
}

fn get_params() -> Result<Params> {
    Ok(Params::parse())
}
