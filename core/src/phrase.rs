//! Phrase boundary rule.
//!
//! Phrase prediction works on runs of inputs between boundaries. A boundary
//! is a missing input, a space, or a sentence punctuation. ASCII punctuation
//! only splits a phrase when it sits between pinyin inputs, so `e.g.` style
//! Latin text stays together.

use crate::input::Input;

const ASCII_ENDINGS: [&str; 6] = [",", ".", ";", ":", "?", "!"];
const IDEOGRAPHIC_ENDINGS: [&str; 8] = ["，", "。", "；", "：", "？", "！", "∶", "…"];

/// Whether `current` ends a phrase, given its neighbours.
///
/// Neighbours are the nearest non-gap inputs on each side, `None` at the
/// buffer ends.
pub fn is_phrase_end(current: Option<&Input>, left: Option<&Input>, right: Option<&Input>) -> bool {
    let current = match current {
        None => return true,
        Some(input) if input.is_space() => return true,
        Some(input) => input,
    };
    if !current.is_symbol() {
        return false;
    }

    let chars = current.chars();
    if ASCII_ENDINGS.contains(&chars.as_str()) {
        let pinyin_or_absent = |input: Option<&Input>| input.is_none_or(Input::is_pinyin);
        return pinyin_or_absent(left) && pinyin_or_absent(right);
    }
    IDEOGRAPHIC_ENDINGS.contains(&chars.as_str())
}
