//! Pinyin word tables behind the engine's `Dictionary` port.
//!
//! Word tables are TOML files:
//!
//! ```toml
//! latins = ["hello", "help"]
//!
//! [words]
//! ni = ["你", "泥"]
//! guo = [{ value = "国", variant = "國" }, "过"]
//!
//! [phrases]
//! "ni'hao" = ["你好"]
//!
//! [emojis]
//! "好" = ["👍"]
//! ```
//!
//! Words are ranked in table order and get their ids in load order, so the
//! same table always yields the same ids.

use crate::spell_tree::SpellTree;
use anyhow::Context;
use libcompose_core::utils::normalize;
use libcompose_core::{CharInput, Dictionary, InputWord, MemoryDictionary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

const DEMO_TABLE: &str = include_str!("../data/demo_words.toml");

/// A word under a spell: the bare value, or a value with its spell and
/// script variant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum WordEntry {
    Plain(String),
    Detailed {
        value: String,
        /// Spell shown with the word, e.g. with tone marks; defaults to the
        /// table key
        #[serde(default, skip_serializing_if = "Option::is_none")]
        spell: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variant: Option<String>,
    },
}

impl WordEntry {
    pub fn value(&self) -> &str {
        match self {
            WordEntry::Plain(value) | WordEntry::Detailed { value, .. } => value,
        }
    }
}

/// Raw contents of a word table file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WordTable {
    /// spell -> ranked words
    pub words: BTreeMap<String, Vec<WordEntry>>,
    /// spells joined with `'` -> ranked phrases
    pub phrases: BTreeMap<String, Vec<String>>,
    /// word value or spell -> emojis
    pub emojis: BTreeMap<String, Vec<String>>,
    pub latins: Vec<String>,
}

/// Pinyin implementation of the `Dictionary` port.
///
/// Spell structure comes from the full syllable table, extended with any
/// spell the word table adds; words, phrases and emojis come from the table.
#[derive(Debug, Clone, Default)]
pub struct PinyinDictionary {
    tree: SpellTree,
    words: MemoryDictionary,
}

impl PinyinDictionary {
    /// Build a dictionary from a parsed word table.
    pub fn from_table(table: WordTable) -> Self {
        let mut tree = SpellTree::standard();
        let mut words = MemoryDictionary::new();

        for (chars, entries) in &table.words {
            let chars = normalize(chars).to_ascii_lowercase();
            if chars.is_empty() {
                continue;
            }
            tree.insert(&chars);
            for entry in entries {
                match entry {
                    WordEntry::Plain(value) => {
                        words.add_word(&chars, &normalize(value), &chars, None);
                    }
                    WordEntry::Detailed {
                        value,
                        spell,
                        variant,
                    } => {
                        let spell = spell.as_deref().map(normalize).unwrap_or_else(|| chars.clone());
                        let variant = variant.as_deref().map(normalize);
                        words.add_word(&chars, &normalize(value), &spell, variant.as_deref());
                    }
                }
            }
        }

        for (key, values) in &table.phrases {
            let spells: Vec<String> = key
                .split('\'')
                .map(|spell| normalize(spell).to_ascii_lowercase())
                .collect();
            let spells: Vec<&str> = spells.iter().map(String::as_str).collect();
            for value in values {
                let value = normalize(value);
                if value.chars().count() != spells.len() {
                    debug!(phrase = %value, key = %key, "phrase length differs from its spells");
                    continue;
                }
                words.add_phrase(&spells, &value);
            }
        }

        for (keyword, emojis) in &table.emojis {
            for emoji in emojis {
                words.add_emoji(&normalize(keyword), &normalize(emoji));
            }
        }

        for latin in &table.latins {
            words.add_latin(&normalize(latin));
        }

        debug!(
            spells = table.words.len(),
            phrases = table.phrases.len(),
            "loaded pinyin word table"
        );
        Self { tree, words }
    }

    /// Parse a word table from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let table: WordTable = toml::from_str(content)?;
        Ok(Self::from_table(table))
    }

    /// Load a word table file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read word table {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parse word table {}", path.display()))
    }

    /// Dictionary over the embedded demo table.
    pub fn demo() -> anyhow::Result<Self> {
        Self::from_toml_str(DEMO_TABLE).context("parse embedded demo table")
    }

    pub fn spell_tree(&self) -> &SpellTree {
        &self.tree
    }

    /// Words ranked under `chars`.
    pub fn words_for(&self, chars: &str) -> &[InputWord] {
        self.words.words_for(chars)
    }
}

impl Dictionary for PinyinDictionary {
    fn candidates_for(&self, input: &CharInput) -> Vec<InputWord> {
        self.words.candidates_for(input)
    }

    fn predict_phrase(
        &self,
        inputs: &[CharInput],
        exclude: Option<usize>,
        top_n: usize,
    ) -> Vec<Vec<Option<InputWord>>> {
        self.words.predict_phrase(inputs, exclude, top_n)
    }

    fn best_latin_prefix_matches(&self, text: &str, n: usize) -> Vec<String> {
        self.words.best_latin_prefix_matches(text, n)
    }

    fn is_valid_spell(&self, chars: &str) -> bool {
        self.tree.is_valid(chars)
    }

    fn has_spells_starting_with(&self, level0: &str) -> bool {
        self.tree.has_child(level0)
    }

    fn next_spell_chars(&self, level0: &str, level1: &str) -> Vec<String> {
        self.tree.next_chars(level0, level1)
    }

    fn emojis_for(&self, input: &CharInput, n: usize) -> Vec<InputWord> {
        self.words.emojis_for(input, n)
    }
}
