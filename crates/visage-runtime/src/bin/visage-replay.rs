//! Replay a TTS viseme payload through the driver without a renderer.
//!
//! Usage: visage-replay <payload.json> [fps]
//!
//! Prints one line per frame: frame, playback ms, viseme, jawOpen,
//! mouthClose, brow raise.

use std::process::ExitCode;
use std::time::Duration;

use tracing::info;
use visage_core::{FacialParam, VisageError, VisageResult};
use visage_runtime::{init_tracing, AvatarDriver, DriverConfig, LogConfig, LogTarget};
use visage_rig::MorphMesh;
use visage_time::{LipSyncPlayer, ManualClock, PollOutcome, VisemeTrack};

const MAX_FRAMES: u32 = 100_000;

fn run(payload: &str, fps: f32) -> VisageResult<()> {
    let config = match std::env::var("VISAGE_CONFIG") {
        Ok(path) => DriverConfig::from_path(path)?,
        Err(_) => DriverConfig::default(),
    };
    // stdout carries the table
    let log = LogConfig {
        target: LogTarget::Stderr,
        ..config.log.clone()
    };
    init_tracing(&log)?;

    let track = VisemeTrack::from_json(&std::fs::read_to_string(payload)?)?;
    info!(payload, visemes = track.len(), fps, "replaying");

    let mut driver = AvatarDriver::with_config(config.clone())?;
    let mut player = LipSyncPlayer::with_config(config.player.clone());
    let mut face = MorphMesh::new("face", FacialParam::ALL.iter().map(|p| p.as_str()));

    let clock = ManualClock::new();
    let frame = Duration::from_secs_f32(1.0 / fps);
    player.start(track, clock.clone(), &mut driver);

    println!("frame\tms\tviseme\tjawOpen\tmouthClose\tbrowRaise");
    for n in 0..MAX_FRAMES {
        let outcome = player.poll(&mut driver);
        driver.tick(frame, [&mut face]);

        let viseme = match outcome {
            PollOutcome::Active(v) => v.as_str(),
            PollOutcome::Waiting => "-",
            PollOutcome::Idle | PollOutcome::Finished => "sil",
        };
        println!(
            "{n}\t{:.1}\t{viseme}\t{:.3}\t{:.3}\t{:.3}",
            n as f32 * frame.as_secs_f32() * 1000.0,
            face.influence("jawOpen").unwrap_or(0.0),
            face.influence("mouthClose").unwrap_or(0.0),
            driver.brows().raise,
        );

        if !player.is_playing() {
            break;
        }
        clock.advance(frame);
    }

    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("visage-replay");
    let Some(payload) = args.get(1) else {
        eprintln!("usage: {program} <payload.json> [fps]");
        return ExitCode::from(2);
    };

    let fps = match args.get(2) {
        None => 60.0,
        Some(raw) => match raw.parse::<f32>() {
            Ok(fps) if fps.is_finite() && fps > 0.0 => fps,
            Ok(fps) => {
                eprintln!("{program}: {}", VisageError::InvalidFrameRate(fps));
                return ExitCode::from(2);
            }
            Err(e) => {
                eprintln!("{program}: fps {raw:?}: {e}");
                return ExitCode::from(2);
            }
        },
    };

    match run(payload, fps) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("visage-replay: {e}");
            ExitCode::FAILURE
        }
    }
}
