//! Resolved words and render options.

use serde::{Deserialize, Serialize};

/// Kind of a resolved word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WordKind {
    Pinyin,
    Emoji,
    /// Alternative of a symbol key, offered while choosing
    Symbol,
}

/// A candidate resolved from the dictionary.
///
/// `value` is in the dictionary's native script; `variant` is the same word
/// in the other script (traditional for a simplified dictionary).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputWord {
    pub id: u32,
    pub value: String,
    #[serde(default)]
    pub spell: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    pub kind: WordKind,
}

impl InputWord {
    pub fn pinyin<V: Into<String>, S: Into<String>>(id: u32, value: V, spell: S) -> Self {
        Self {
            id,
            value: value.into(),
            spell: Some(spell.into()),
            variant: None,
            kind: WordKind::Pinyin,
        }
    }

    pub fn emoji<V: Into<String>>(id: u32, value: V) -> Self {
        Self {
            id,
            value: value.into(),
            spell: None,
            variant: None,
            kind: WordKind::Emoji,
        }
    }

    pub fn symbol<V: Into<String>>(id: u32, value: V) -> Self {
        Self {
            kind: WordKind::Symbol,
            ..Self::emoji(id, value)
        }
    }

    pub fn with_variant<V: Into<String>>(mut self, variant: V) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn is_pinyin(&self) -> bool {
        self.kind == WordKind::Pinyin
    }

    pub fn is_emoji(&self) -> bool {
        self.kind == WordKind::Emoji
    }

    pub fn has_variant(&self) -> bool {
        self.variant.as_deref().is_some_and(|v| v != self.value)
    }

    /// Render with the given option.
    pub fn text(&self, option: &InputOption) -> String {
        let value = match (&self.variant, option.variant_used) {
            (Some(variant), true) => variant.as_str(),
            _ => self.value.as_str(),
        };
        match (&self.spell, option.spell_used_mode) {
            (Some(spell), Some(SpellUsedMode::Replacing)) => spell.clone(),
            (Some(spell), Some(SpellUsedMode::Following)) => format!("{}({})", value, spell),
            _ => value.to_string(),
        }
    }

    /// Whether only the spell is rendered under `option`.
    pub fn is_text_only_spell(&self, option: &InputOption) -> bool {
        self.spell.is_some() && option.spell_used_mode == Some(SpellUsedMode::Replacing)
    }
}

/// How the spell of a word is used on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellUsedMode {
    /// Render the spell instead of the word
    Replacing,
    /// Render the word followed by its spell
    Following,
}

/// Rendering preference for the whole buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputOption {
    pub spell_used_mode: Option<SpellUsedMode>,
    pub variant_used: bool,
}

impl InputOption {
    pub fn new(spell_used_mode: Option<SpellUsedMode>, variant_used: bool) -> Self {
        Self {
            spell_used_mode,
            variant_used,
        }
    }
}
