//! Plain-text rendering for the terminal.
//!
//! Everything the model wrote passes through [`sanitize_terminal_text`] before
//! it is printed.

use std::fmt::Write;

use gua_engine::{
    DivinationResult, Hexagram, Line, MovingLine, Trigram, sanitize_terminal_text,
};

const YANG: &str = "━━━━━━━━━━━";
const YIN: &str = "━━━━   ━━━━";
const MOVING_YANG: &str = "○";
const MOVING_YIN: &str = "×";

/// Line labels, bottom to top.
const POSITIONS: [&str; 6] = ["初", "二", "三", "四", "五", "上"];

pub fn trigram_table() -> String {
    let mut out = String::new();
    for trigram in Trigram::all() {
        let pattern: String = trigram
            .lines
            .iter()
            .rev()
            .map(|line| if line.is_yang() { '⚊' } else { '⚋' })
            .collect();
        let _ = writeln!(
            out,
            "{id}  {symbol} {name} {pinyin:<5} {nature}  {pattern}",
            id = trigram.id,
            symbol = trigram.symbol,
            name = trigram.name,
            pinyin = trigram.pinyin,
            nature = trigram.nature,
        );
    }
    out
}

/// Six lines, top line first, with the moving line marked.
pub fn hexagram(hexagram: &Hexagram, moving: Option<MovingLine>) -> String {
    let upper = hexagram.upper();
    let lower = hexagram.lower();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{hexagram}  {}{}上 {}{}下",
        upper.symbol, upper.name, lower.symbol, lower.name
    );

    for (index, line) in hexagram.lines().iter().enumerate().rev() {
        let drawn = match line {
            Line::Yang => YANG,
            Line::Yin => YIN,
        };
        let is_moving = moving.is_some_and(|m| usize::from(m.get()) == index + 1);
        let marker = match (is_moving, line) {
            (false, _) => "",
            (true, Line::Yang) => MOVING_YANG,
            (true, Line::Yin) => MOVING_YIN,
        };
        let row = format!("  {}  {drawn} {marker}", POSITIONS[index]);
        out.push_str(row.trim_end());
        out.push('\n');
    }
    out
}

pub fn cast(original: &Hexagram, moving: MovingLine, changed: &Hexagram) -> String {
    let mut out = String::from("本卦\n");
    out.push_str(&hexagram(original, Some(moving)));
    let _ = writeln!(out, "\n动第{moving}爻，变卦\n");
    out.push_str(&hexagram(changed, None));
    out
}

fn section(out: &mut String, title: &str, body: &str) {
    let _ = writeln!(out, "\n【{title}】");
    out.push_str(sanitize_terminal_text(body.trim()).as_ref());
    out.push('\n');
}

pub fn analysis(result: &DivinationResult) -> String {
    let analysis = result.analysis();
    let original = result.original();
    let mut out = String::new();

    let _ = writeln!(out, "问：{}", sanitize_terminal_text(result.question()));
    out.push('\n');
    out.push_str(&cast(original, result.moving_line(), result.changed()));

    let upper = original.upper();
    let lower = original.lower();
    section(
        &mut out,
        &format!("上卦 {}{}", upper.symbol, upper.name),
        &analysis.upper_trigram_detail,
    );
    section(
        &mut out,
        &format!("下卦 {}{}", lower.symbol, lower.name),
        &analysis.lower_trigram_detail,
    );
    section(&mut out, "大象", &analysis.imagery);
    section(&mut out, "彖辞", &analysis.judgement);
    section(
        &mut out,
        &format!("动爻 第{}爻", result.moving_line()),
        &analysis.line_interpretation,
    );
    section(&mut out, "断语", &analysis.overall_advice);

    if !analysis.follow_ups.is_empty() {
        out.push_str("\n【可再追问】\n");
        out.push_str(&follow_up_menu(&analysis.follow_ups));
    }
    out
}

pub fn follow_up_menu(suggestions: &[String]) -> String {
    let mut out = String::new();
    for (index, suggestion) in suggestions.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {}",
            index + 1,
            sanitize_terminal_text(suggestion.trim())
        );
    }
    out
}

pub fn answer(text: &str) -> String {
    let mut out = sanitize_terminal_text(text.trim()).into_owned();
    out.push('\n');
    out
}
