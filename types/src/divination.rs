//! Interpretation records: the structured analysis and the completed reading.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::NonEmptyString;
use crate::hexagram::{Cast, Hexagram, MovingLine};

/// Last line of every [`DivinationResult::report`].
const REPORT_CLOSING: &str = "—— 依高岛吞象“至诚”原理推演 ——";

/// Structured interpretation returned by the upstream model.
///
/// Every field is required on the wire. A payload missing any of them, or
/// carrying `null`, fails deserialization; `follow_ups` may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub upper_trigram_detail: String,
    pub lower_trigram_detail: String,
    pub imagery: String,
    pub judgement: String,
    pub line_interpretation: String,
    pub overall_advice: String,
    pub follow_ups: Vec<String>,
}

impl Analysis {
    /// Wire names of every required field, in schema order.
    pub const FIELDS: [&'static str; 7] = [
        "upperTrigramDetail",
        "lowerTrigramDetail",
        "imagery",
        "judgement",
        "lineInterpretation",
        "overallAdvice",
        "followUps",
    ];
}

/// A completed divination. Only built after a successful analysis, so a
/// value of this type never holds a partial reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivinationResult {
    question: NonEmptyString,
    original: Hexagram,
    changed: Hexagram,
    moving_line: MovingLine,
    analysis: Analysis,
}

impl DivinationResult {
    #[must_use]
    pub fn new(question: NonEmptyString, cast: Cast, analysis: Analysis) -> Self {
        let Cast {
            original,
            changed,
            moving_line,
        } = cast;
        Self {
            question,
            original,
            changed,
            moving_line,
            analysis,
        }
    }

    #[must_use]
    pub fn question(&self) -> &str {
        self.question.as_str()
    }

    #[must_use]
    pub const fn original(&self) -> &Hexagram {
        &self.original
    }

    #[must_use]
    pub const fn changed(&self) -> &Hexagram {
        &self.changed
    }

    #[must_use]
    pub const fn moving_line(&self) -> MovingLine {
        self.moving_line
    }

    #[must_use]
    pub const fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    /// Plain-text summary suitable for copying or saving.
    #[must_use]
    pub fn report(&self) -> String {
        let mut out = String::new();
        out.push_str("【高岛易断·解卦报告】\n");
        let _ = writeln!(out, "问卜之事：{}", self.question());
        let _ = writeln!(
            out,
            "本卦：{}（动第{}爻）",
            self.original.name(),
            self.moving_line
        );
        let _ = writeln!(out, "变卦：{}", self.changed.name());
        out.push_str("\n[卦象解析]\n");
        out.push_str(self.analysis.imagery.trim());
        out.push_str("\n\n[爻辞解析]\n");
        out.push_str(self.analysis.line_interpretation.trim());
        out.push_str("\n\n[核心断语]\n");
        out.push_str(self.analysis.overall_advice.trim());
        out.push_str("\n\n");
        out.push_str(REPORT_CLOSING);
        out.push('\n');
        out
    }
}
