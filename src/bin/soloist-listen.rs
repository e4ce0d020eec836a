use anyhow::Result;
use clap::Parser;

#[cfg(feature = "whisper")]
use soloist::backends::whisper::WhisperRecognizer;
use soloist::config::Config;
use soloist::exporter::WavExporter;
use soloist::logging;
use soloist::mic::MicSource;
use soloist::recognizer::Recognizer;
use soloist::session::{PassOutcome, Session};

fn main() -> Result<()> {
    logging::init();
    let params = get_params()?;

    let config = Config {
        window_secs: params.window_secs,
        calibration_secs: params.calibration_secs,
        ..Config::default()
    };

    let mut session = Session::new(config.clone())?;
    let mut source = MicSource::open(&config)?;
    let mut exporter = WavExporter::new(&params.out_path);

    #[cfg(feature = "whisper")]
    let mut recognizer = match &params.model_path {
        Some(path) => Some(WhisperRecognizer::new(path)?),
        None => None,
    };

    println!("Detecting ambient noise level. Please remain silent...");
    let baseline = session.calibrate(&mut source)?;
    println!("Ambient noise level: {}", baseline.value());

    loop {
        println!("Recording...");

        #[cfg(feature = "whisper")]
        let active: Option<&mut dyn Recognizer> =
            recognizer.as_mut().map(|r| r as &mut dyn Recognizer);
        #[cfg(not(feature = "whisper"))]
        let active: Option<&mut dyn Recognizer> = None;

        match session.run_pass(&mut source, &mut exporter, active)? {
            PassOutcome::NoSpeech => println!("Detected no sound. Listening again..."),
            PassOutcome::NotIsolated => {
                println!("Could not isolate the command. Listening again...")
            }
            PassOutcome::Isolated { asset, .. } => {
                println!("Command saved to {}", asset.display())
            }
            PassOutcome::Command { text, .. } => println!("{text}"),
            PassOutcome::RecognitionFailed { .. } => {
                println!("Error identifying speech. Please try again.")
            }
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "soloist-listen")]
#[command(about = "Listen for voice commands on the default microphone")]
struct Params {
    /// Where to write the most recent isolated command.
    #[arg(short = 'o', long = "out", default_value = "command.wav")]
    pub out_path: String,

    #[arg(long = "window-secs", default_value_t = 5)]
    pub window_secs: u32,

    #[arg(long = "calibration-secs", default_value_t = 5)]
    pub calibration_secs: u32,

    /// whisper.cpp model used to recognize isolated commands.
    #[cfg(feature = "whisper")]
    #[arg(short = 'm', long = "model")]
    pub model_path: Option<String>,
}

fn get_params() -> Result<Params> {
    Ok(Params::parse())
}
