//! Completion sets proposed over a span of the buffer.
//!
//! A completion set is plain data: the handlers fill it from dictionary
//! results, the buffer validates and applies it.

use crate::input::CharInput;
use crate::word::InputOption;
use std::ops::Range;

/// What a completion replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    /// Replace all keys of a single Latin input
    Latin,
    /// Fill or extend the words of a pinyin phrase
    PhraseWord,
}

/// One proposed replacement sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub inputs: Vec<CharInput>,
}

impl Completion {
    pub fn new(inputs: Vec<CharInput>) -> Self {
        Self { inputs }
    }

    pub fn text(&self, option: &InputOption) -> String {
        self.inputs.iter().map(|input| input.text(option)).collect()
    }
}

/// Completion candidates scoped to `apply_range` (positions in the buffer,
/// end exclusive).
#[derive(Debug, Clone, PartialEq)]
pub struct Completions {
    pub kind: CompletionKind,
    pub apply_range: Range<usize>,
    pub candidates: Vec<Completion>,
}

impl Completions {
    pub fn new(kind: CompletionKind, apply_range: Range<usize>) -> Self {
        Self {
            kind,
            apply_range,
            candidates: Vec::new(),
        }
    }

    pub fn add(&mut self, completion: Completion) {
        self.candidates.push(completion);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Completion> {
        self.candidates.get(position)
    }

    /// Rendered texts, in candidate order.
    pub fn texts(&self, option: &InputOption) -> Vec<String> {
        self.candidates.iter().map(|c| c.text(option)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::keys_from;

    #[test]
    fn test_texts() {
        let mut completions = Completions::new(CompletionKind::Latin, 1..2);
        completions.add(Completion::new(vec![CharInput::from_keys(keys_from("hello"))]));
        completions.add(Completion::new(vec![CharInput::from_keys(keys_from("help"))]));

        assert_eq!(completions.len(), 2);
        assert_eq!(
            completions.texts(&InputOption::default()),
            vec!["hello".to_string(), "help".to_string()]
        );
    }
}
