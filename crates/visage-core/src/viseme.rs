//! Viseme symbols
//!
//! A viseme is the visual mouth shape for a phoneme group. The pipeline uses
//! the 15-symbol Oculus set; every incoming label is normalized onto it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical viseme symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Viseme {
    /// Silence (rest mouth)
    #[default]
    #[serde(rename = "sil")]
    Sil = 0,
    /// /p/, /b/, /m/ (lips pressed together)
    PP = 1,
    /// /f/, /v/ (teeth on lip)
    FF = 2,
    /// /θ/, /ð/ (tongue between teeth)
    TH = 3,
    /// /t/, /d/, /l/ (tongue at ridge)
    DD = 4,
    /// /k/, /g/ (back of tongue up)
    #[serde(rename = "kk")]
    KK = 5,
    /// /tʃ/, /dʒ/, /ʃ/, /ʒ/
    CH = 6,
    /// /s/, /z/
    SS = 7,
    /// /n/, /ŋ/
    #[serde(rename = "nn")]
    NN = 8,
    /// /r/
    RR = 9,
    /// /a/ (open)
    #[serde(rename = "aa")]
    AA = 10,
    /// /e/
    E = 11,
    /// /i/ (spread)
    I = 12,
    /// /o/ (rounded)
    O = 13,
    /// /u/ (rounded, small)
    U = 14,
}

impl Viseme {
    pub const ALL: [Viseme; 15] = [
        Viseme::Sil,
        Viseme::PP,
        Viseme::FF,
        Viseme::TH,
        Viseme::DD,
        Viseme::KK,
        Viseme::CH,
        Viseme::SS,
        Viseme::NN,
        Viseme::RR,
        Viseme::AA,
        Viseme::E,
        Viseme::I,
        Viseme::O,
        Viseme::U,
    ];

    /// The canonical code (`sil`, `PP`, ..., `kk`, `nn`, `aa`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Viseme::Sil => "sil",
            Viseme::PP => "PP",
            Viseme::FF => "FF",
            Viseme::TH => "TH",
            Viseme::DD => "DD",
            Viseme::KK => "kk",
            Viseme::CH => "CH",
            Viseme::SS => "SS",
            Viseme::NN => "nn",
            Viseme::RR => "RR",
            Viseme::AA => "aa",
            Viseme::E => "E",
            Viseme::I => "I",
            Viseme::O => "O",
            Viseme::U => "U",
        }
    }

    /// Exact, case-sensitive match against the canonical codes.
    pub fn from_code(code: &str) -> Option<Self> {
        Viseme::ALL.iter().copied().find(|v| v.as_str() == code)
    }

    #[inline]
    pub fn is_silence(self) -> bool {
        self == Viseme::Sil
    }
}

impl fmt::Display for Viseme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
