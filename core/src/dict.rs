//! Dictionary port consumed by the engine.
//!
//! The engine never owns word data. Everything it needs to resolve keys into
//! words goes through the `Dictionary` trait, which is handed to
//! `ImeEngine::new` so tests and hosts can plug in their own store.
//!
//! `MemoryDictionary` is a deterministic in-memory implementation built from
//! plain tables. It backs the tests and the pinyin demo dictionary.

use crate::input::CharInput;
use crate::word::InputWord;
use ahash::AHashMap;

/// Lookup surface for word resolution. All methods are pure.
pub trait Dictionary: Send + Sync {
    /// Ranked candidates for the keys of `input`. The vector index is the
    /// rank; `InputWord::id` is the candidate id.
    fn candidates_for(&self, input: &CharInput) -> Vec<InputWord>;

    /// The `n` best candidates for `input`.
    fn top_best_matches(&self, input: &CharInput, n: usize) -> Vec<InputWord> {
        let mut words = self.candidates_for(input);
        words.truncate(n);
        words
    }

    /// Ranked word assignments for a phrase run, one entry per position.
    ///
    /// Positions that hold no pinyin get `None`. Confirmed words, and the
    /// word at `exclude`, are kept as they are.
    fn predict_phrase(
        &self,
        inputs: &[CharInput],
        exclude: Option<usize>,
        top_n: usize,
    ) -> Vec<Vec<Option<InputWord>>>;

    /// Latin words starting with `text`, best first.
    fn best_latin_prefix_matches(&self, text: &str, n: usize) -> Vec<String>;

    fn is_valid_spell(&self, chars: &str) -> bool;

    /// Whether any spell starts with the level-0 `chars`.
    fn has_spells_starting_with(&self, level0: &str) -> bool;

    /// Level-2 continuations of `level0` + `level1`, each starting with the
    /// level-1 letter (`"uang"` for `"zh"` + `"u"`).
    fn next_spell_chars(&self, level0: &str, level1: &str) -> Vec<String>;

    fn emojis_for(&self, _input: &CharInput, _n: usize) -> Vec<InputWord> {
        Vec::new()
    }

    fn best_candidate(&self, input: &CharInput) -> Option<InputWord> {
        self.top_best_matches(input, 1).into_iter().next()
    }
}

/// Three-level split of a spell as entered by gestures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellLevels {
    pub level0: String,
    pub level1: Option<String>,
    pub level2: Option<String>,
}

/// Split a spell into its initial, the next letter and the rest.
///
/// `zh`, `ch` and `sh` count as one initial.
pub fn split_spell(spell: &str) -> Option<SpellLevels> {
    let first = spell.chars().next()?;
    let initial_len = if ["zh", "ch", "sh"].iter().any(|d| spell.starts_with(d)) {
        2
    } else {
        first.len_utf8()
    };
    let (level0, rest) = spell.split_at(initial_len);

    let mut chars = rest.chars();
    let level1 = chars.next().map(String::from);
    let level2 = Some(chars.as_str())
        .filter(|s| !s.is_empty())
        .map(String::from);

    Some(SpellLevels {
        level0: level0.to_string(),
        level1,
        level2,
    })
}

/// Deterministic dictionary over in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryDictionary {
    /// spell chars -> ranked words
    words: AHashMap<String, Vec<InputWord>>,
    /// joined spell chars (`ni'hao`) -> ranked phrase values
    phrases: AHashMap<String, Vec<String>>,
    /// keyword (word value or spell chars) -> emojis
    emojis: AHashMap<String, Vec<InputWord>>,
    latins: Vec<String>,
    next_id: u32,
}

impl MemoryDictionary {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    /// Add a word for `chars`, ranked after the existing ones.
    pub fn add_word(
        &mut self,
        chars: &str,
        value: &str,
        spell: &str,
        variant: Option<&str>,
    ) -> InputWord {
        let id = self.next_id();
        let mut word = InputWord::pinyin(id, value, spell);
        if let Some(variant) = variant {
            word = word.with_variant(variant);
        }
        self.words
            .entry(chars.to_string())
            .or_default()
            .push(word.clone());
        word
    }

    /// Add words for `chars` in rank order, using `chars` as the spell.
    pub fn add_words(&mut self, chars: &str, values: &[&str]) {
        for value in values {
            self.add_word(chars, value, chars, None);
        }
    }

    /// Add a phrase: one spell per char of `value`.
    pub fn add_phrase(&mut self, spells: &[&str], value: &str) {
        self.phrases
            .entry(spells.join("'"))
            .or_default()
            .push(value.to_string());
    }

    pub fn add_latin(&mut self, word: &str) {
        self.latins.push(word.to_string());
    }

    pub fn add_emoji(&mut self, keyword: &str, emoji: &str) {
        let id = self.next_id();
        self.emojis
            .entry(keyword.to_string())
            .or_default()
            .push(InputWord::emoji(id, emoji));
    }

    pub fn spells(&self) -> impl Iterator<Item = &str> {
        self.words.keys().map(String::as_str)
    }

    pub fn words_for(&self, chars: &str) -> &[InputWord] {
        self.words.get(chars).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Word for `value` under `chars`, created on the fly when the phrase
    /// table knows a char the word table lacks.
    fn word_with_value(&self, chars: &str, value: &str) -> InputWord {
        self.words_for(chars)
            .iter()
            .find(|word| word.value == value)
            .cloned()
            .unwrap_or_else(|| InputWord::pinyin(0, value, chars))
    }

    /// Phrase values for `spells`, split into one word per position.
    fn phrase_candidates(&self, spells: &[String]) -> Vec<Vec<InputWord>> {
        let Some(values) = self.phrases.get(&spells.join("'")) else {
            return Vec::new();
        };
        values
            .iter()
            .filter(|value| value.chars().count() == spells.len())
            .map(|value| {
                value
                    .chars()
                    .zip(spells)
                    .map(|(ch, chars)| self.word_with_value(chars, &ch.to_string()))
                    .collect()
            })
            .collect()
    }
}

impl Dictionary for MemoryDictionary {
    fn candidates_for(&self, input: &CharInput) -> Vec<InputWord> {
        self.words_for(&input.chars()).to_vec()
    }

    fn predict_phrase(
        &self,
        inputs: &[CharInput],
        exclude: Option<usize>,
        top_n: usize,
    ) -> Vec<Vec<Option<InputWord>>> {
        if inputs.is_empty() || top_n == 0 {
            return Vec::new();
        }

        let spells: Vec<Option<String>> = inputs
            .iter()
            .map(|input| Some(input.chars()).filter(|chars| self.words.contains_key(chars)))
            .collect();
        let fixed: Vec<Option<InputWord>> = inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                (input.is_word_confirmed() || Some(i) == exclude)
                    .then(|| input.word().cloned())
                    .flatten()
            })
            .collect();

        // Greedy longest match over runs of known spells.
        let mut segments: Vec<Vec<Vec<InputWord>>> = Vec::new();
        let mut i = 0;
        while i < inputs.len() {
            if spells[i].is_none() {
                segments.push(Vec::new());
                i += 1;
                continue;
            }
            let mut end = i + 1;
            let mut matched = Vec::new();
            for j in (i + 2..=inputs.len()).rev() {
                let run: Option<Vec<String>> = spells[i..j].iter().cloned().collect();
                let Some(run) = run else {
                    continue;
                };
                let candidates: Vec<Vec<InputWord>> = self
                    .phrase_candidates(&run)
                    .into_iter()
                    .filter(|phrase| {
                        phrase.iter().enumerate().all(|(k, word)| {
                            fixed[i + k].as_ref().is_none_or(|f| f.value == word.value)
                        })
                    })
                    .collect();
                if !candidates.is_empty() {
                    matched = candidates;
                    end = j;
                    break;
                }
            }
            if matched.is_empty() {
                let chars = spells[i].as_deref().unwrap_or_default();
                matched = self
                    .words_for(chars)
                    .iter()
                    .map(|word| vec![word.clone()])
                    .collect();
            }
            segments.push(matched);
            i = end;
        }

        let mut results: Vec<Vec<Option<InputWord>>> = Vec::new();
        let max_rank = segments.iter().map(Vec::len).max().unwrap_or(0).max(1);
        for rank in 0..max_rank {
            let mut assignment = Vec::with_capacity(inputs.len());
            for segment in &segments {
                match segment.get(rank).or_else(|| segment.first()) {
                    Some(words) => assignment.extend(words.iter().cloned().map(Some)),
                    None => assignment.push(None),
                }
            }
            for (slot, fixed) in assignment.iter_mut().zip(&fixed) {
                if fixed.is_some() {
                    slot.clone_from(fixed);
                }
            }
            if !results.contains(&assignment) {
                results.push(assignment);
            }
            if results.len() >= top_n {
                break;
            }
        }
        results
    }

    fn best_latin_prefix_matches(&self, text: &str, n: usize) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        let lower = text.to_lowercase();
        self.latins
            .iter()
            .filter(|word| word.to_lowercase().starts_with(&lower) && word.len() > text.len())
            .take(n)
            .cloned()
            .collect()
    }

    fn is_valid_spell(&self, chars: &str) -> bool {
        self.words.contains_key(chars)
    }

    fn has_spells_starting_with(&self, level0: &str) -> bool {
        self.spells()
            .filter_map(split_spell)
            .any(|levels| levels.level0 == level0)
    }

    fn next_spell_chars(&self, level0: &str, level1: &str) -> Vec<String> {
        let mut next: Vec<String> = self
            .spells()
            .filter_map(split_spell)
            .filter(|levels| levels.level0 == level0 && levels.level1.as_deref() == Some(level1))
            .filter_map(|levels| levels.level2.map(|rest| format!("{}{}", level1, rest)))
            .collect();
        next.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        next.dedup();
        next
    }

    fn emojis_for(&self, input: &CharInput, n: usize) -> Vec<InputWord> {
        let by_word = input
            .word()
            .and_then(|word| self.emojis.get(&word.value))
            .into_iter()
            .flatten();
        let by_chars = self.emojis.get(&input.chars()).into_iter().flatten();

        let mut emojis: Vec<InputWord> = Vec::new();
        for emoji in by_word.chain(by_chars) {
            if !emojis.contains(emoji) {
                emojis.push(emoji.clone());
            }
        }
        emojis.truncate(n);
        emojis
    }
}
