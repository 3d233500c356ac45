//! Candidate paging for the choose and filter modes.
//!
//! This module provides:
//! - `CandidateFilter`: spells the user narrowed the candidates to
//! - `CandidateList`: ranked words, filtered and split into pages

use crate::word::InputWord;
use std::ops::Range;

/// Spell filter over candidate words. Empty means no filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFilter {
    spells: Vec<String>,
}

impl CandidateFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spells(&self) -> &[String] {
        &self.spells
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    /// Add `spell`, or remove it when already present.
    pub fn toggle(&mut self, spell: &str) {
        match self.spells.iter().position(|s| s == spell) {
            Some(pos) => {
                self.spells.remove(pos);
            }
            None => self.spells.push(spell.to_string()),
        }
    }

    pub fn matches(&self, word: &InputWord) -> bool {
        self.is_empty()
            || word
                .spell
                .as_deref()
                .is_some_and(|spell| self.spells.iter().any(|s| s == spell))
    }
}

/// A paginated list of candidate words.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateList {
    /// All candidates, best first
    words: Vec<InputWord>,

    /// Candidates passing the filter
    visible: Vec<InputWord>,

    filter: CandidateFilter,

    /// Number of candidates per page
    page_size: usize,

    /// Current page index (0-based)
    current_page: usize,
}

impl CandidateList {
    /// Create a new empty candidate list.
    pub fn new() -> Self {
        Self::with_page_size(20)
    }

    /// Create a candidate list with specified page size.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            words: Vec::new(),
            visible: Vec::new(),
            filter: CandidateFilter::new(),
            page_size: page_size.max(1),
            current_page: 0,
        }
    }

    /// Set the page size.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        // Reset to first page if current page is now out of bounds
        if self.current_page >= self.num_pages() {
            self.current_page = 0;
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Set the candidates, resetting pagination state.
    pub fn set_candidates(&mut self, words: Vec<InputWord>) {
        self.words = words;
        self.refresh();
    }

    /// Set the filter, going back to the first page.
    pub fn set_filter(&mut self, filter: CandidateFilter) {
        self.filter = filter;
        self.refresh();
    }

    pub fn filter(&self) -> &CandidateFilter {
        &self.filter
    }

    fn refresh(&mut self) {
        self.visible = self
            .words
            .iter()
            .filter(|word| self.filter.matches(word))
            .cloned()
            .collect();
        self.current_page = 0;
    }

    /// Every candidate, ignoring the filter.
    pub fn all(&self) -> &[InputWord] {
        &self.words
    }

    /// Candidates passing the filter.
    pub fn candidates(&self) -> &[InputWord] {
        &self.visible
    }

    /// Distinct spells among all candidates, in rank order.
    pub fn spells(&self) -> Vec<String> {
        let mut spells: Vec<String> = Vec::new();
        for spell in self.words.iter().filter_map(|w| w.spell.as_ref()) {
            if !spells.contains(spell) {
                spells.push(spell.clone());
            }
        }
        spells
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Get the total number of pages.
    pub fn num_pages(&self) -> usize {
        self.visible.len().div_ceil(self.page_size)
    }

    /// Get the current page index (0-based).
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    fn current_page_range(&self) -> Range<usize> {
        let start = (self.current_page * self.page_size).min(self.visible.len());
        let end = (start + self.page_size).min(self.visible.len());
        start..end
    }

    /// Get the candidates for the current page.
    pub fn current_page_candidates(&self) -> &[InputWord] {
        &self.visible[self.current_page_range()]
    }

    /// Move to the previous page.
    /// Returns true if the page changed.
    pub fn page_up(&mut self) -> bool {
        if self.current_page > 0 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Move to the next page.
    /// Returns true if the page changed.
    pub fn page_down(&mut self) -> bool {
        if self.current_page + 1 < self.num_pages() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Candidate by index within the current page.
    pub fn get_on_page(&self, page_index: usize) -> Option<&InputWord> {
        self.current_page_candidates().get(page_index)
    }

    /// Clear the candidate list and its filter.
    pub fn clear(&mut self) {
        self.words.clear();
        self.visible.clear();
        self.filter = CandidateFilter::new();
        self.current_page = 0;
    }
}

impl Default for CandidateList {
    fn default() -> Self {
        Self::new()
    }
}
