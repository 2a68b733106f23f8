//! Terminal text sanitization for model output.
//!
//! Interpretations and follow-up answers come from a remote model and are
//! printed straight to the user's terminal. Escape sequences in that text could
//! clear the screen, rewrite earlier output, or set the clipboard (OSC 52), so
//! everything rendered goes through [`sanitize_terminal_text`] first.

use std::borrow::Cow;

const ESC: char = '\x1b';
const BEL: char = '\x07';
const C1_CSI: char = '\u{009b}';

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    /// Saw ESC, waiting for the introducer.
    Escape,
    /// ESC plus one intermediate; the next char ends the sequence.
    EscapeArgument,
    /// Inside `ESC [` or C1 CSI, until a final byte.
    Csi,
    /// Inside OSC/DCS/PM/APC, until BEL or `ESC \`.
    String,
    /// Saw ESC inside a string sequence.
    StringEscape,
}

/// Strip escape sequences and control characters, keeping `\n`, `\t`, `\r`.
///
/// Returns `Cow::Borrowed` when nothing needs removing.
///
/// ```
/// use gua_types::sanitize_terminal_text;
///
/// assert_eq!(sanitize_terminal_text("吉"), "吉");
/// assert_eq!(sanitize_terminal_text("\x1b[2J吉\x1b]52;c;eA==\x07"), "吉");
/// ```
#[must_use]
pub fn sanitize_terminal_text(input: &str) -> Cow<'_, str> {
    if !input.chars().any(is_unsafe) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut state = State::Text;

    for c in input.chars() {
        state = match state {
            State::Text => text(c, &mut out),
            State::Escape => match c {
                '[' => State::Csi,
                ']' | 'P' | '^' | '_' | 'X' => State::String,
                '(' | ')' | '*' | '+' | '#' | ' ' | '%' => State::EscapeArgument,
                // Two-character sequence such as `ESC 7` or `ESC c`.
                '\x30'..='\x7e' => State::Text,
                // A lone ESC; the character after it is ordinary text.
                c => text(c, &mut out),
            },
            State::EscapeArgument => State::Text,
            State::Csi => {
                if ('\x20'..='\x3f').contains(&c) {
                    State::Csi
                } else {
                    // Final byte, or a malformed sequence we abandon.
                    State::Text
                }
            }
            State::String => match c {
                BEL => State::Text,
                ESC => State::StringEscape,
                _ => State::String,
            },
            State::StringEscape => {
                if c == '\\' {
                    State::Text
                } else {
                    State::String
                }
            }
        };
    }

    Cow::Owned(out)
}

fn text(c: char, out: &mut String) -> State {
    match c {
        ESC => State::Escape,
        C1_CSI => State::Csi,
        c if is_unsafe(c) => State::Text,
        c => {
            out.push(c);
            State::Text
        }
    }
}

fn is_unsafe(c: char) -> bool {
    match c {
        '\n' | '\t' | '\r' => false,
        c if c <= '\x1f' || c == '\x7f' => true,
        c => ('\u{0080}'..='\u{009f}').contains(&c),
    }
}
