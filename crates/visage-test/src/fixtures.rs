//! Rig and payload fixtures

use visage_core::FacialParam;
use visage_rig::MorphMesh;
use visage_time::VisemeTrack;

/// Face mesh exposing all 52 ARKit names verbatim
pub fn arkit_mesh() -> MorphMesh {
    MorphMesh::new("arkit_face", FacialParam::ALL.iter().map(|p| p.as_str()))
}

/// Face mesh named the way FaceCap exports: `_L`/`_R` suffixes
pub fn facecap_mesh() -> MorphMesh {
    let names = FacialParam::ALL.iter().map(|p| {
        let name = p.as_str();
        if let Some(stem) = name.strip_suffix("Left") {
            format!("{stem}_L")
        } else if let Some(stem) = name.strip_suffix("Right") {
            format!("{stem}_R")
        } else {
            name.to_string()
        }
    });
    MorphMesh::new("facecap_face", names)
}

/// Hand-authored rig with loose naming that only fallback rules can bind
pub fn loose_mesh() -> MorphMesh {
    MorphMesh::new(
        "loose_face",
        [
            "MouthOpen",
            "LipsKiss",
            "Smile",
            "Frown_Left",
            "Brow_Down",
            "MouthRoll_Upper",
            "Blink",
        ],
    )
}

/// "Hello" as a TTS engine would time it, in ms
pub fn hello_track() -> VisemeTrack {
    VisemeTrack::new()
        .with("viseme_sil", 0.0, 40.0)
        .with("viseme_kk", 40.0, 60.0)
        .with("viseme_E", 100.0, 90.0)
        .with("viseme_DD", 190.0, 70.0)
        .with("viseme_O", 260.0, 140.0)
        .with("viseme_sil", 400.0, 60.0)
}

/// Track cycling through every canonical viseme, `step_ms` each
pub fn all_visemes_track(step_ms: f64) -> VisemeTrack {
    let mut track = VisemeTrack::new();
    for (i, v) in visage_core::Viseme::ALL.iter().enumerate() {
        track.push(format!("viseme_{v}"), i as f64 * step_ms, step_ms);
    }
    track
}
