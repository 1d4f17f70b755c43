//! End-to-end scenarios: player, driver and meshes in one frame loop

use std::thread;
use std::time::Duration;

use visage_core::{FacialParam, ParamGroup, PoseKey, Viseme};
use visage_rig::{frames_to_converge, SmoothingConfig};
use visage_runtime::{AvatarDriver, DriverConfig};
use visage_test::*;
use visage_time::{PollOutcome, VisemeTrack};
use visage_viseme::{OverrideTable, PoseResolver, PoseTable};

fn at_fps(config: DriverConfig, fps: f32) -> FrameSimulator {
    FrameSimulator::new(config, fps, FrameJitter::steady(), 0).unwrap()
}

fn weight(sim: &FrameSimulator, mesh: &str, target: &str) -> f32 {
    sim.mesh(mesh).and_then(|m| m.influence(target)).unwrap()
}

#[test]
fn test_pp_closes_lips_on_every_rig() {
    let mut sim = FrameSimulator::steady()
        .with_mesh(arkit_mesh())
        .with_mesh(facecap_mesh());
    sim.driver_mut().set_viseme("viseme_PP", 1.0);
    sim.run_frames(60);

    for (mesh, press) in [("arkit_face", "mouthPressLeft"), ("facecap_face", "mouthPress_L")] {
        assert!(weight(&sim, mesh, "mouthClose") > 0.99, "{mesh}");
        assert!(weight(&sim, mesh, "jawOpen") < 0.01, "{mesh}");
        assert!(weight(&sim, mesh, "mouthFunnel") < 0.01, "{mesh}");
        assert!((weight(&sim, mesh, press) - 0.4).abs() < 0.01, "{mesh}");
    }
}

#[test]
fn test_clear_viseme_eases_out() {
    let mut sim = FrameSimulator::steady().with_mesh(arkit_mesh());
    sim.driver_mut().set_viseme("aa", 1.0);
    sim.run_frames(60);
    let open = weight(&sim, "arkit_face", "jawOpen");
    assert!((open - 0.95).abs() < 0.01);

    sim.driver_mut().clear_viseme();
    let mut previous = open;
    for _ in 0..120 {
        sim.step();
        let now = weight(&sim, "arkit_face", "jawOpen");
        assert!(now <= previous);
        // no single frame removes more than the smoothing factor allows
        assert!(previous - now <= previous * 0.33 + 1e-6);
        previous = now;
    }
    assert!(previous < 0.001);
}

#[test]
fn test_blendshapes_win_over_visemes() {
    let mut sim = FrameSimulator::steady().with_mesh(arkit_mesh());
    let payload = serde_json::json!({ "jawOpen": 0.2 });
    sim.driver_mut().set_viseme("viseme_aa", 1.0);
    sim.driver_mut().set_blendshapes(Some(&payload), 1.0);
    sim.run_frames(90);

    assert!((weight(&sim, "arkit_face", "jawOpen") - 0.2).abs() < 0.001);
    // keys the payload leaves out still follow the viseme
    assert!((weight(&sim, "arkit_face", "mouthFunnel") - 0.1).abs() < 0.001);

    sim.driver_mut().clear_blendshapes();
    sim.run_frames(90);
    assert!((weight(&sim, "arkit_face", "jawOpen") - 0.95).abs() < 0.001);
}

#[test]
fn test_time_normalized_ignores_frame_rate() {
    let mut slow = at_fps(DriverConfig::default(), 30.0).with_mesh(arkit_mesh());
    let mut fast = at_fps(DriverConfig::default(), 120.0).with_mesh(arkit_mesh());
    slow.driver_mut().set_viseme("aa", 1.0);
    fast.driver_mut().set_viseme("aa", 1.0);

    // 200 ms each
    slow.run_frames(6);
    fast.run_frames(24);

    let a = weight(&slow, "arkit_face", "jawOpen");
    let b = weight(&fast, "arkit_face", "jawOpen");
    assert!((a - b).abs() < 1e-3, "30 fps {a} vs 120 fps {b}");
}

#[test]
fn test_frame_locked_depends_on_frame_rate() {
    let config = DriverConfig {
        smoothing: SmoothingConfig::frame_locked(0.32),
        ..DriverConfig::default()
    };
    let mut slow = at_fps(config.clone(), 30.0).with_mesh(arkit_mesh());
    let mut fast = at_fps(config, 120.0).with_mesh(arkit_mesh());
    slow.driver_mut().set_viseme("aa", 1.0);
    fast.driver_mut().set_viseme("aa", 1.0);
    slow.run_frames(3);
    fast.run_frames(12);

    assert!(weight(&fast, "arkit_face", "jawOpen") > weight(&slow, "arkit_face", "jawOpen") + 0.1);
}

#[test]
fn test_converges_within_bound_without_overshoot() {
    let factor = 0.32;
    let config = DriverConfig {
        smoothing: SmoothingConfig::frame_locked(factor),
        ..DriverConfig::default()
    };
    let mut sim = at_fps(config, 60.0).with_mesh(arkit_mesh());
    sim.driver_mut().set_viseme("aa", 1.0);

    let frames = frames_to_converge(factor, 0.01);
    let mut previous = 0.0;
    for _ in 0..frames {
        sim.step();
        let now = weight(&sim, "arkit_face", "jawOpen");
        assert!(now >= previous);
        assert!(now <= 0.95 + 1e-6);
        previous = now;
    }
    assert!((0.95 - previous).abs() <= 0.01);
}

#[test]
fn test_stalling_display_still_converges() {
    let mut sim = FrameSimulator::new(DriverConfig::default(), 60.0, FrameJitter::stalling(), 42)
        .unwrap()
        .with_mesh(arkit_mesh());
    sim.driver_mut().set_viseme("viseme_O", 1.0);

    for _ in 0..120 {
        let sample = sim.step();
        assert!(sample.report.factor <= 1.0);
        assert!(sample.dt <= Duration::from_millis(250));
        assert!(weight(&sim, "arkit_face", "jawOpen") <= 0.5 + 1e-6);
    }
    assert!((weight(&sim, "arkit_face", "jawOpen") - 0.5).abs() < 0.01);
}

#[test]
fn test_tts_payload_plays_in_order() {
    let payload = r#"{
        "visemes": ["viseme_sil", "viseme_kk", "viseme_E", "viseme_DD", "viseme_O", "viseme_sil"],
        "vtimes": [0, 40, 100, 190, 260, 400],
        "vdurations": [40, 60, 90, 70, 140, 60],
        "audio": "ignored"
    }"#;
    let track = VisemeTrack::from_json(payload).unwrap();
    assert_eq!(track, hello_track());

    let mut sim = FrameSimulator::steady().with_mesh(arkit_mesh());
    sim.play(track, Duration::ZERO);
    let samples = sim.run_until_idle(600);

    let mut shown: Vec<Viseme> = Vec::new();
    for v in samples.iter().filter_map(FrameSample::viseme) {
        if shown.last() != Some(&v) {
            shown.push(v);
        }
    }
    assert_eq!(
        shown,
        vec![Viseme::Sil, Viseme::KK, Viseme::E, Viseme::DD, Viseme::O, Viseme::Sil]
    );
    assert_eq!(sim.driver().stats().viseme_changes, 6);
    assert_eq!(samples.last().map(|s| s.outcome), Some(PollOutcome::Finished));
    assert!(samples.last().map(|s| s.playback_ms >= 460.0).unwrap_or(false));
}

#[test]
fn test_every_viseme_reaches_the_mesh() {
    let mut sim = FrameSimulator::steady().with_mesh(arkit_mesh());
    sim.play(all_visemes_track(50.0), Duration::from_millis(20));
    let samples = sim.run_until_idle(1_000);

    let reached: Vec<Viseme> = samples.iter().filter_map(FrameSample::viseme).collect();
    for v in Viseme::ALL {
        assert!(reached.contains(&v), "{v} never shown");
    }
    assert!(!sim.is_playing());
}

#[test]
fn test_stop_mid_sentence_relaxes_mouth() {
    let mut sim = FrameSimulator::steady().with_mesh(arkit_mesh());
    sim.play(hello_track(), Duration::ZERO);
    sim.run_frames(20);
    assert!(sim.is_playing());
    assert!(weight(&sim, "arkit_face", "jawOpen") > 0.1);

    assert!(sim.stop());
    assert_eq!(sim.driver().current_viseme(), None);
    sim.run_frames(90);
    assert!(weight(&sim, "arkit_face", "jawOpen") < 0.01);
}

#[test]
fn test_loose_rig_binds_through_rules() {
    let mut sim = FrameSimulator::steady().with_mesh(loose_mesh());
    sim.driver_mut().set_viseme("aa", 1.0);
    sim.run_frames(90);

    assert!((weight(&sim, "loose_face", "MouthOpen") - 0.95).abs() < 0.01);
    assert!((weight(&sim, "loose_face", "LipsKiss") - 0.05).abs() < 0.01);
    assert!((weight(&sim, "loose_face", "MouthRoll_Upper") - 0.08684).abs() < 0.01);
    assert_eq!(weight(&sim, "loose_face", "Blink"), 0.0);
}

#[test]
fn test_brows_follow_speech() {
    let mut sim = FrameSimulator::steady();
    sim.driver_mut().set_viseme("viseme_E", 1.0);
    sim.run_frames(90);

    let brows = sim.driver().brows();
    assert!((brows.raise - 0.07).abs() < 0.001);
    assert!((brows.tilt - 0.05).abs() < 0.001);
    assert!(sim.brows().left().rotation_z > sim.brows().right().rotation_z);
    assert!(sim.brows().left().position_y > 0.0);
}

#[test]
fn test_overrides_from_another_thread() {
    let shared = OverrideTable::shared();
    let resolver = PoseResolver::with_overrides(PoseTable::canonical(), shared.clone());
    let mut driver = AvatarDriver::with_resolver(DriverConfig::default(), resolver).unwrap();
    driver.set_viseme("aa", 1.0);

    let writer = {
        let shared = shared.clone();
        thread::spawn(move || {
            let mut table = shared.write();
            table.set(Viseme::AA, ParamGroup::Mouth, PoseKey::Param(FacialParam::JawOpen), 0.4)
        })
    };
    assert!(writer.join().unwrap());

    assert!((driver.pending_mouth_pose().get(FacialParam::JawOpen) - 0.95).abs() < 1e-6);
    driver.refresh();
    assert!((driver.pending_mouth_pose().get(FacialParam::JawOpen) - 0.4).abs() < 1e-6);
}
