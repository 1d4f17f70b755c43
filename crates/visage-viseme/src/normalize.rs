//! Viseme label normalization
//!
//! TTS engines, phonemizers and capture tools all spell visemes differently:
//! `viseme_PP`, `pp`, `AA1`, `ah`, `sh`. Everything lands on one of the 15
//! canonical symbols. Unknown input becomes silence so animation never stalls
//! on a bad label.

use visage_core::Viseme;

const PREFIX: &str = "viseme_";

/// Phoneme spellings that are not themselves canonical codes.
/// Keys are lowercase.
const ALIASES: &[(&str, Viseme)] = &[
    // Open vowels
    ("ah", Viseme::AA),
    ("ae", Viseme::AA),
    ("aw", Viseme::AA),
    ("a", Viseme::AA),
    // Mid/front vowels
    ("ee", Viseme::E),
    ("eh", Viseme::E),
    ("ih", Viseme::I),
    ("ix", Viseme::I),
    ("iy", Viseme::I),
    ("ay", Viseme::I),
    ("ey", Viseme::I),
    ("y", Viseme::I),
    // Rounded vowels
    ("oo", Viseme::O),
    ("oh", Viseme::O),
    ("ow", Viseme::O),
    ("ao", Viseme::O),
    ("oy", Viseme::O),
    ("uu", Viseme::U),
    ("uh", Viseme::U),
    ("uw", Viseme::U),
    ("w", Viseme::U),
    // Bilabials
    ("mm", Viseme::PP),
    ("bb", Viseme::PP),
    ("m", Viseme::PP),
    ("b", Viseme::PP),
    ("p", Viseme::PP),
    ("em", Viseme::PP),
    // Labiodentals
    ("vv", Viseme::FF),
    ("f", Viseme::FF),
    ("v", Viseme::FF),
    // Dentals
    ("dh", Viseme::TH),
    // Alveolars
    ("tt", Viseme::DD),
    ("nd", Viseme::DD),
    ("t", Viseme::DD),
    ("d", Viseme::DD),
    ("l", Viseme::DD),
    ("dx", Viseme::DD),
    // Velars
    ("gg", Viseme::KK),
    ("k", Viseme::KK),
    ("g", Viseme::KK),
    // Postalveolars
    ("jh", Viseme::CH),
    ("sh", Viseme::CH),
    ("zh", Viseme::CH),
    // Sibilants
    ("zz", Viseme::SS),
    ("s", Viseme::SS),
    ("z", Viseme::SS),
    // Nasals
    ("ng", Viseme::NN),
    ("n", Viseme::NN),
    // Rhotics
    ("er", Viseme::RR),
    ("r", Viseme::RR),
    // Pauses
    ("sp", Viseme::Sil),
    ("pause", Viseme::Sil),
];

/// Normalize any label to a canonical viseme. Total: never fails.
pub fn normalize(label: &str) -> Viseme {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Viseme::Sil;
    }

    let stripped = strip_prefix(trimmed);

    lookup(stripped)
        .or_else(|| {
            // ARPABET stress markers (AA1, IY0)
            let unstressed = stripped.trim_end_matches(['0', '1', '2']);
            if unstressed.len() != stripped.len() && !unstressed.is_empty() {
                lookup(unstressed)
            } else {
                None
            }
        })
        .unwrap_or(Viseme::Sil)
}

/// Look up an alias spelling (lowercase) without the canonical-code pass.
pub fn alias(spelling: &str) -> Option<Viseme> {
    ALIASES
        .iter()
        .find(|(k, _)| *k == spelling)
        .map(|(_, v)| *v)
}

fn strip_prefix(label: &str) -> &str {
    match label.get(..PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(PREFIX) => &label[PREFIX.len()..],
        _ => label,
    }
}

fn lookup(label: &str) -> Option<Viseme> {
    if let Some(v) = Viseme::from_code(label) {
        return Some(v);
    }

    let lower = label.to_ascii_lowercase();
    if let Some(v) = Viseme::from_code(&lower) {
        return Some(v);
    }

    let upper = label.to_ascii_uppercase();
    if let Some(v) = Viseme::from_code(&upper) {
        return Some(v);
    }

    alias(&lower)
}
