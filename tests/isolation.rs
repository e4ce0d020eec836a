//! Decision-level tests over canned envelopes: no audio device, no files.

use soloist::calibration::{NoiseBaseline, Thresholds};
use soloist::config::Config;
use soloist::envelope::Envelope;
use soloist::isolator::{TrimBounds, Verdict, assess, trim_bounds};

fn config() -> Config {
    Config {
        end_partition: 5,
        ..Config::default()
    }
}

/// Thresholds for a 0.01 noise baseline: start 0.0125, end 0.0105, silence 0.015.
fn thresholds() -> anyhow::Result<Thresholds> {
    let calibration = Envelope::from(vec![0.01; 50]);
    let baseline = NoiseBaseline::from_envelope(&calibration, 1e-4)?;
    Ok(Thresholds::derive(baseline, &config()))
}

#[test]
fn silent_envelopes_contain_no_sound() -> anyhow::Result<()> {
    for len in [1, 10, 215] {
        let envelope = Envelope::from(vec![0.0001; len]);
        assert_eq!(
            assess(&envelope, &thresholds()?, &config()),
            Verdict::NoSound,
        );
    }
    Ok(())
}

#[test]
fn spike_before_the_tail_is_isolated() -> anyhow::Result<()> {
    // One spike strictly before the last fifth of the window.
    let mut magnitudes = vec![0.0001; 100];
    magnitudes[30] = 0.5;
    let envelope = Envelope::from(magnitudes);

    assert!(matches!(
        assess(&envelope, &thresholds()?, &config()),
        Verdict::Isolated(_)
    ));
    Ok(())
}

#[test]
fn speech_running_into_the_tail_is_not_isolated() -> anyhow::Result<()> {
    // Four entries above the start threshold inside the last fifth.
    let mut magnitudes = vec![0.0001; 100];
    magnitudes[10] = 0.5;
    for i in 90..94 {
        magnitudes[i] = 0.5;
    }
    let envelope = Envelope::from(magnitudes);

    assert_eq!(
        assess(&envelope, &thresholds()?, &config()),
        Verdict::NotIsolated,
    );
    Ok(())
}

#[test]
fn utterance_mid_window_is_trimmed_with_padding() -> anyhow::Result<()> {
    // 40 quiet, 10 loud, 20 quiet. Tail (indices 56..70) is quiet, so the utterance is
    // isolated; the forward scan fires on its fifth match at index 44, the backward scan
    // on its fifth match at index 45.
    let magnitudes = [vec![0.01; 40], vec![0.9; 10], vec![0.01; 20]].concat();
    let envelope = Envelope::from(magnitudes);

    let verdict = assess(&envelope, &thresholds()?, &config());
    assert_eq!(
        verdict,
        Verdict::Isolated(TrimBounds {
            start_chunk: 34,
            end_chunk: 70,
            total_chunks: 70,
        }),
    );
    Ok(())
}

#[test]
fn trimming_an_already_trimmed_envelope_keeps_the_start() -> anyhow::Result<()> {
    let magnitudes = [vec![0.01; 40], vec![0.9; 10], vec![0.01; 20]].concat();
    let envelope = Envelope::from(magnitudes.clone());

    let thresholds = thresholds()?;
    let first = trim_bounds(&envelope, &thresholds, &config());
    assert_eq!((first.start_chunk, first.end_chunk), (34, 70));

    // Re-run on the trimmed sub-envelope: the onset padding already covers the speech
    // start, so the second pass has nothing left to cut.
    let trimmed = Envelope::from(magnitudes[first.start_chunk..first.end_chunk].to_vec());
    let second = trim_bounds(&trimmed, &thresholds, &config());
    assert_eq!(second.start_chunk, 0);
    Ok(())
}

#[test]
fn degenerate_baseline_still_yields_usable_decisions() -> anyhow::Result<()> {
    // Calibrated against dead silence: the floor keeps thresholds nonzero, so a silent
    // window is still silent and a loud one is still loud.
    let calibration = Envelope::from(vec![0.0; 50]);
    let baseline = NoiseBaseline::from_envelope(&calibration, 1e-4)?;
    let thresholds = Thresholds::derive(baseline, &config());

    let silent = Envelope::from(vec![0.0; 70]);
    assert_eq!(assess(&silent, &thresholds, &config()), Verdict::NoSound);

    let spoken = [vec![0.0; 30], vec![0.2; 10], vec![0.0; 30]].concat();
    assert!(matches!(
        assess(&Envelope::from(spoken), &thresholds, &config()),
        Verdict::Isolated(_)
    ));
    Ok(())
}
