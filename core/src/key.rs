//! Keystrokes recorded in inputs.
//!
//! A `Key` is what a gesture or tap produced: a letter, a digit, a symbol, an
//! emoji, a space or an arithmetic operator. Inputs keep the ordered keys they
//! were built from, so the same key can later be dropped, replaced or cycled.

use serde::{Deserialize, Serialize};

/// Arithmetic operators available in expression inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MathOp {
    Plus,
    Minus,
    Multiply,
    Divide,
    Percent,
    Permill,
    Permyriad,
    Equal,
    Dot,
    Brackets,
}

impl MathOp {
    /// Default display text. `Brackets` keys carry their own text.
    pub fn text(&self) -> &'static str {
        match self {
            MathOp::Plus => "+",
            MathOp::Minus => "-",
            MathOp::Multiply => "×",
            MathOp::Divide => "÷",
            MathOp::Percent => "%",
            MathOp::Permill => "‰",
            MathOp::Permyriad => "‱",
            MathOp::Equal => "=",
            MathOp::Dot => ".",
            MathOp::Brackets => "(",
        }
    }
}

/// Category of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyKind {
    Alphabet,
    Number,
    Symbol,
    Emoji,
    Space,
    MathOp(MathOp),
}

/// Disambiguation level of a key produced by a slip or circular-pad gesture.
///
/// Level 0 is the initial (`zh`, `b`, `a`...), level 1 the first letter of
/// the final, level 2 the rest of the final. `Final` keys carry a complete
/// spell and replace everything typed before them.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum KeyLevel {
    #[default]
    Level0,
    Level1,
    Level2,
    Final,
}

/// A single keystroke.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub kind: KeyKind,
    pub text: String,
    #[serde(default)]
    pub level: KeyLevel,
    /// Alternative texts cycled through by repeated taps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replacements: Vec<String>,
}

impl Key {
    pub fn new<T: Into<String>>(kind: KeyKind, text: T) -> Self {
        Self {
            kind,
            text: text.into(),
            level: KeyLevel::Level0,
            replacements: Vec::new(),
        }
    }

    pub fn alphabet<T: Into<String>>(text: T) -> Self {
        Self::new(KeyKind::Alphabet, text)
    }

    pub fn number<T: Into<String>>(text: T) -> Self {
        Self::new(KeyKind::Number, text)
    }

    pub fn symbol<T: Into<String>>(text: T) -> Self {
        Self::new(KeyKind::Symbol, text)
    }

    pub fn emoji<T: Into<String>>(text: T) -> Self {
        Self::new(KeyKind::Emoji, text)
    }

    pub fn space() -> Self {
        Self::new(KeyKind::Space, " ")
    }

    pub fn math(op: MathOp) -> Self {
        Self::new(KeyKind::MathOp(op), op.text())
    }

    /// Bracket operator with an explicit text, `(` or `)`.
    pub fn bracket<T: Into<String>>(text: T) -> Self {
        Self::new(KeyKind::MathOp(MathOp::Brackets), text)
    }

    pub fn with_level(mut self, level: KeyLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_replacements<I, S>(mut self, replacements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replacements = replacements.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_alphabet(&self) -> bool {
        self.kind == KeyKind::Alphabet
    }

    pub fn is_number(&self) -> bool {
        self.kind == KeyKind::Number
    }

    pub fn is_symbol(&self) -> bool {
        self.kind == KeyKind::Symbol
    }

    pub fn is_emoji(&self) -> bool {
        self.kind == KeyKind::Emoji
    }

    pub fn is_space(&self) -> bool {
        self.kind == KeyKind::Space
    }

    pub fn math_op(&self) -> Option<MathOp> {
        match self.kind {
            KeyKind::MathOp(op) => Some(op),
            _ => None,
        }
    }

    pub fn is_math_op(&self, op: MathOp) -> bool {
        self.math_op() == Some(op)
    }

    pub fn has_replacements(&self) -> bool {
        !self.replacements.is_empty()
    }

    /// Whether `other` is this key or one of its replacements.
    pub fn can_replace(&self, other: &Key) -> bool {
        self.kind == other.kind
            && (self.text == other.text || self.replacements.iter().any(|r| *r == other.text))
    }

    /// Replacement following `current` in the cycle (wrapping around).
    ///
    /// The cycle is `[text, replacements...]`.
    pub fn next_replacement(&self, current: &str) -> String {
        let cycle: Vec<&str> = std::iter::once(self.text.as_str())
            .chain(self.replacements.iter().map(String::as_str))
            .collect();
        match cycle.iter().position(|t| *t == current) {
            Some(i) => cycle[(i + 1) % cycle.len()].to_string(),
            None => self.text.clone(),
        }
    }

    /// Copy of this key showing `text` instead.
    pub fn replaced_with(&self, text: &str) -> Key {
        Key {
            text: text.to_string(),
            ..self.clone()
        }
    }
}

/// Split text into one key per char.
pub fn keys_from(text: &str) -> Vec<Key> {
    text.chars()
        .map(|ch| {
            let s = ch.to_string();
            if ch.is_ascii_alphabetic() {
                Key::alphabet(s)
            } else if ch.is_ascii_digit() {
                Key::number(s)
            } else if ch.is_whitespace() {
                Key::space()
            } else {
                Key::symbol(s)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_from() {
        let keys = keys_from("ab1,");
        assert_eq!(keys.len(), 4);
        assert!(keys[0].is_alphabet());
        assert!(keys[2].is_number());
        assert!(keys[3].is_symbol());
    }

    #[test]
    fn test_next_replacement_cycles() {
        let key = Key::symbol(".").with_replacements(["。", "…"]);
        assert_eq!(key.next_replacement("."), "。");
        assert_eq!(key.next_replacement("。"), "…");
        assert_eq!(key.next_replacement("…"), ".");
    }

    #[test]
    fn test_can_replace() {
        let key = Key::symbol(".").with_replacements(["。"]);
        assert!(key.can_replace(&Key::symbol("。")));
        assert!(!key.can_replace(&Key::symbol(",")));
        assert!(!key.can_replace(&Key::alphabet(".")));
    }

    #[test]
    fn test_math_keys() {
        let key = Key::math(MathOp::Multiply);
        assert_eq!(key.text, "×");
        assert!(key.is_math_op(MathOp::Multiply));
        assert_eq!(Key::bracket(")").math_op(), Some(MathOp::Brackets));
    }
}
