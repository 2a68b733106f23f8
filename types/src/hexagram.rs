//! Hexagram composition and the line-change transform.
//!
//! A hexagram stacks an upper trigram over a lower one. Its six lines run
//! bottom to top: `lower.lines ++ upper.lines`. Changing a moving line flips
//! one position and re-resolves both halves through [`Trigram::from_lines`].

use std::fmt;

use serde::Serialize;

use crate::HexagramError;
use crate::trigram::{Line, Trigram, TrigramId};

/// Name-table entry: King Wen sequence number and conventional name.
#[derive(Debug, Clone, Copy)]
struct NameEntry {
    number: u8,
    name: &'static str,
}

const fn entry(number: u8, name: &'static str) -> NameEntry {
    NameEntry { number, name }
}

/// Indexed `[upper - 1][lower - 1]`, Fu Xi trigram order
/// (乾 兑 离 震 巽 坎 艮 坤). Every ordered pair has an entry.
const NAME_TABLE: [[NameEntry; 8]; 8] = [
    // upper 乾
    [
        entry(1, "乾为天"),
        entry(10, "天泽履"),
        entry(13, "天火同人"),
        entry(25, "天雷无妄"),
        entry(44, "天风姤"),
        entry(6, "天水讼"),
        entry(33, "天山遁"),
        entry(12, "天地否"),
    ],
    // upper 兑
    [
        entry(43, "泽天夬"),
        entry(58, "兑为泽"),
        entry(49, "泽火革"),
        entry(17, "泽雷随"),
        entry(28, "泽风大过"),
        entry(47, "泽水困"),
        entry(31, "泽山咸"),
        entry(45, "泽地萃"),
    ],
    // upper 离
    [
        entry(14, "火天大有"),
        entry(38, "火泽睽"),
        entry(30, "离为火"),
        entry(21, "火雷噬嗑"),
        entry(50, "火风鼎"),
        entry(64, "火水未济"),
        entry(56, "火山旅"),
        entry(35, "火地晋"),
    ],
    // upper 震
    [
        entry(34, "雷天大壮"),
        entry(54, "雷泽归妹"),
        entry(55, "雷火丰"),
        entry(51, "震为雷"),
        entry(32, "雷风恒"),
        entry(40, "雷水解"),
        entry(62, "雷山小过"),
        entry(16, "雷地豫"),
    ],
    // upper 巽
    [
        entry(9, "风天小畜"),
        entry(61, "风泽中孚"),
        entry(37, "风火家人"),
        entry(42, "风雷益"),
        entry(57, "巽为风"),
        entry(59, "风水涣"),
        entry(53, "风山渐"),
        entry(20, "风地观"),
    ],
    // upper 坎
    [
        entry(5, "水天需"),
        entry(60, "水泽节"),
        entry(63, "水火既济"),
        entry(3, "水雷屯"),
        entry(48, "水风井"),
        entry(29, "坎为水"),
        entry(39, "水山蹇"),
        entry(8, "水地比"),
    ],
    // upper 艮
    [
        entry(26, "山天大畜"),
        entry(41, "山泽损"),
        entry(22, "山火贲"),
        entry(27, "山雷颐"),
        entry(18, "山风蛊"),
        entry(4, "山水蒙"),
        entry(52, "艮为山"),
        entry(23, "山地剥"),
    ],
    // upper 坤
    [
        entry(11, "地天泰"),
        entry(19, "地泽临"),
        entry(36, "地火明夷"),
        entry(24, "地雷复"),
        entry(46, "地风升"),
        entry(7, "地水师"),
        entry(15, "地山谦"),
        entry(2, "坤为地"),
    ],
];

fn name_entry(upper: TrigramId, lower: TrigramId) -> NameEntry {
    NAME_TABLE[upper.index()][lower.index()]
}

/// Validated moving-line position in `1..=6`, counted from the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub struct MovingLine(u8);

impl MovingLine {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(line: u8) -> Result<Self, HexagramError> {
        if (Self::MIN..=Self::MAX).contains(&line) {
            Ok(Self(line))
        } else {
            Err(HexagramError::InvalidLineIndex(line))
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = MovingLine> {
        (Self::MIN..=Self::MAX).map(MovingLine)
    }

    const fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl From<MovingLine> for u8 {
    fn from(line: MovingLine) -> Self {
        line.0
    }
}

impl fmt::Display for MovingLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A six-line figure. Value object: recomputed on demand, never mutated.
///
/// Invariant: `lines[0..3] == lower.lines` and `lines[3..6] == upper.lines`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hexagram {
    number: u8,
    name: &'static str,
    upper: &'static Trigram,
    lower: &'static Trigram,
    lines: [Line; 6],
}

impl Hexagram {
    /// Compose from raw trigram ids.
    pub fn compose(upper_id: u8, lower_id: u8) -> Result<Self, HexagramError> {
        Ok(Self::from_ids(
            TrigramId::new(upper_id)?,
            TrigramId::new(lower_id)?,
        ))
    }

    /// Compose from validated ids. Total.
    #[must_use]
    pub fn from_ids(upper: TrigramId, lower: TrigramId) -> Self {
        let upper = Trigram::get(upper);
        let lower = Trigram::get(lower);
        let NameEntry { number, name } = name_entry(upper.id, lower.id);

        let mut lines = [Line::Yin; 6];
        lines[..3].copy_from_slice(&lower.lines);
        lines[3..].copy_from_slice(&upper.lines);

        Self {
            number,
            name,
            upper,
            lower,
            lines,
        }
    }

    /// Flip the moving line and resolve the changed hexagram.
    pub fn with_moving_line(&self, line: MovingLine) -> Result<Self, HexagramError> {
        let mut lines = self.lines;
        lines[line.index()] = lines[line.index()].flip();

        let lower = Trigram::from_lines([lines[0], lines[1], lines[2]])?;
        let upper = Trigram::from_lines([lines[3], lines[4], lines[5]])?;

        Ok(Self::from_ids(upper.id, lower.id))
    }

    /// King Wen sequence number, `1..=64`.
    #[must_use]
    pub const fn number(&self) -> u8 {
        self.number
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn upper(&self) -> &'static Trigram {
        self.upper
    }

    #[must_use]
    pub const fn lower(&self) -> &'static Trigram {
        self.lower
    }

    /// Bottom to top.
    #[must_use]
    pub const fn lines(&self) -> &[Line; 6] {
        &self.lines
    }

    #[must_use]
    pub fn bits(&self) -> [u8; 6] {
        self.lines.map(Line::bit)
    }
}

impl fmt::Display for Hexagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "第{}卦 {}", self.number, self.name)
    }
}

/// Apply a 1-indexed moving line to `hexagram`.
pub fn apply_moving_line(hexagram: &Hexagram, line: u8) -> Result<Hexagram, HexagramError> {
    hexagram.with_moving_line(MovingLine::new(line)?)
}

/// An original hexagram, its moving line, and the changed hexagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cast {
    pub original: Hexagram,
    pub changed: Hexagram,
    pub moving_line: MovingLine,
}

impl Cast {
    pub fn new(upper_id: u8, lower_id: u8, line: u8) -> Result<Self, HexagramError> {
        let original = Hexagram::compose(upper_id, lower_id)?;
        let moving_line = MovingLine::new(line)?;
        let changed = original.with_moving_line(moving_line)?;
        Ok(Self {
            original,
            changed,
            moving_line,
        })
    }
}
