//! The eight trigrams.
//!
//! The table uses the Fu Xi ("Earlier Heaven") numbering: 乾 1, 兑 2, 离 3,
//! 震 4, 巽 5, 坎 6, 艮 7, 坤 8. Line patterns are stored bottom to top.
//!
//! The line patterns form a bijection with the eight possible 3-bit patterns,
//! which is what lets [`Trigram::from_lines`] invert a pattern back to an id.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::HexagramError;

/// Polarity of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Line {
    /// Broken line, encoded `0`.
    Yin,
    /// Solid line, encoded `1`.
    Yang,
}

impl Line {
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Line::Yin => Line::Yang,
            Line::Yang => Line::Yin,
        }
    }

    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Line::Yin => 0,
            Line::Yang => 1,
        }
    }

    #[must_use]
    pub const fn is_yang(self) -> bool {
        matches!(self, Line::Yang)
    }
}

impl From<Line> for u8 {
    fn from(line: Line) -> Self {
        line.bit()
    }
}

impl TryFrom<u8> for Line {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Line::Yin),
            1 => Ok(Line::Yang),
            other => Err(format!("line must be 0 or 1 (got {other})")),
        }
    }
}

/// Validated trigram identity in `1..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub struct TrigramId(u8);

impl TrigramId {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8;

    pub fn new(id: u8) -> Result<Self, HexagramError> {
        if (Self::MIN..=Self::MAX).contains(&id) {
            Ok(Self(id))
        } else {
            Err(HexagramError::InvalidTrigramId(id))
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Zero-based table index.
    #[must_use]
    pub(crate) const fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// All eight ids in table order.
    pub fn all() -> impl Iterator<Item = TrigramId> {
        (Self::MIN..=Self::MAX).map(TrigramId)
    }
}

impl From<TrigramId> for u8 {
    fn from(id: TrigramId) -> Self {
        id.0
    }
}

impl TryFrom<u8> for TrigramId {
    type Error = HexagramError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for TrigramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One of the eight trigrams. Static data, never mutated.
#[derive(Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Trigram {
    pub id: TrigramId,
    pub name: &'static str,
    pub pinyin: &'static str,
    pub symbol: char,
    /// Elemental image (天, 地, 雷, ...).
    pub nature: &'static str,
    /// Bottom to top.
    pub lines: [Line; 3],
}

use Line::{Yang, Yin};

static TRIGRAMS: [Trigram; 8] = [
    Trigram {
        id: TrigramId(1),
        name: "乾",
        pinyin: "Qián",
        symbol: '☰',
        nature: "天",
        lines: [Yang, Yang, Yang],
    },
    Trigram {
        id: TrigramId(2),
        name: "兑",
        pinyin: "Duì",
        symbol: '☱',
        nature: "泽",
        lines: [Yang, Yang, Yin],
    },
    Trigram {
        id: TrigramId(3),
        name: "离",
        pinyin: "Lí",
        symbol: '☲',
        nature: "火",
        lines: [Yang, Yin, Yang],
    },
    Trigram {
        id: TrigramId(4),
        name: "震",
        pinyin: "Zhèn",
        symbol: '☳',
        nature: "雷",
        lines: [Yang, Yin, Yin],
    },
    Trigram {
        id: TrigramId(5),
        name: "巽",
        pinyin: "Xùn",
        symbol: '☴',
        nature: "风",
        lines: [Yin, Yang, Yang],
    },
    Trigram {
        id: TrigramId(6),
        name: "坎",
        pinyin: "Kǎn",
        symbol: '☵',
        nature: "水",
        lines: [Yin, Yang, Yin],
    },
    Trigram {
        id: TrigramId(7),
        name: "艮",
        pinyin: "Gèn",
        symbol: '☶',
        nature: "山",
        lines: [Yin, Yin, Yang],
    },
    Trigram {
        id: TrigramId(8),
        name: "坤",
        pinyin: "Kūn",
        symbol: '☷',
        nature: "地",
        lines: [Yin, Yin, Yin],
    },
];

impl Trigram {
    /// Look up a trigram by validated id. Total.
    #[must_use]
    pub fn get(id: TrigramId) -> &'static Trigram {
        &TRIGRAMS[id.index()]
    }

    /// Look up a trigram by raw id.
    pub fn lookup(id: u8) -> Result<&'static Trigram, HexagramError> {
        TrigramId::new(id).map(Self::get)
    }

    /// Inverse of [`Trigram::lines`]: exact pattern match against the table.
    pub fn from_lines(lines: [Line; 3]) -> Result<&'static Trigram, HexagramError> {
        TRIGRAMS
            .iter()
            .find(|trigram| trigram.lines == lines)
            .ok_or(HexagramError::UnknownTrigramPattern(lines.map(Line::bit)))
    }

    /// The full table in id order.
    #[must_use]
    pub fn all() -> &'static [Trigram; 8] {
        &TRIGRAMS
    }

    /// Line pattern as `0`/`1` bits, bottom to top.
    #[must_use]
    pub fn bits(&self) -> [u8; 3] {
        self.lines.map(Line::bit)
    }
}

impl fmt::Display for Trigram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}（{}）", self.symbol, self.name, self.nature)
    }
}
