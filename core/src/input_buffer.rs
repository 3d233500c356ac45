//! Composition buffer with cursor tracking.
//!
//! The buffer stores the inputs the user has composed so far as an ordered
//! list that alternates gaps and inputs (`Gap, Input, Gap, ..., Gap`) once
//! every pending edit is confirmed. The cursor is the selected input (by id)
//! plus a pending working copy of it; edits go to the pending first and are
//! folded back into the list by `confirm_pending`.
//!
//! Clearing and committing keep a snapshot of the buffer in a single undo
//! stage so the user can take the action back.

use crate::completion::{CompletionKind, Completions};
use crate::input::{CharInput, Input, InputId};
use crate::key::Key;
use crate::phrase;
use crate::word::{InputOption, InputWord};
use tracing::{debug, trace};

/// Kind of a staged snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedKind {
    Cleared,
    Committed,
}

#[derive(Debug, Clone, PartialEq)]
struct Staged {
    kind: StagedKind,
    snapshot: Box<InputBuffer>,
}

/// Ordered inputs with a selected position and a pending edit.
#[derive(Debug, Clone, PartialEq)]
pub struct InputBuffer {
    inputs: Vec<Input>,
    selected: InputId,
    pending: Input,
    option: Option<InputOption>,
    frozen: bool,
    nested: bool,
    completions: Option<Completions>,
    staged: Option<Staged>,
}

impl InputBuffer {
    /// Create an empty buffer holding one selected gap.
    pub fn new() -> Self {
        let gap = Input::gap();
        Self {
            selected: gap.id(),
            inputs: vec![gap],
            pending: CharInput::new().into(),
            option: None,
            frozen: false,
            nested: false,
            completions: None,
            staged: None,
        }
    }

    /// Buffer owned by an expression input. It never holds expressions.
    pub(crate) fn nested() -> Self {
        Self {
            nested: true,
            ..Self::new()
        }
    }

    // ==== Accessors ====

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn input_at(&self, index: usize) -> Option<&Input> {
        self.inputs.get(index)
    }

    pub fn input(&self, id: InputId) -> Option<&Input> {
        self.inputs.iter().find(|input| input.id() == id)
    }

    pub fn index_of(&self, id: InputId) -> Option<usize> {
        self.inputs.iter().position(|input| input.id() == id)
    }

    pub fn contains(&self, id: InputId) -> bool {
        self.index_of(id).is_some() || self.pending.id() == id
    }

    pub fn selected_id(&self) -> InputId {
        self.selected
    }

    /// Position of the selected input.
    pub fn selected_index(&self) -> usize {
        let index = self.index_of(self.selected);
        debug_assert!(index.is_some(), "selected input must be in the buffer");
        index.unwrap_or(0)
    }

    pub fn selected(&self) -> &Input {
        &self.inputs[self.selected_index()]
    }

    pub fn is_selected(&self, id: InputId) -> bool {
        self.selected == id
    }

    pub fn is_gap_selected(&self) -> bool {
        self.selected().is_gap()
    }

    pub fn pending(&self) -> &Input {
        &self.pending
    }

    pub fn pending_mut(&mut self) -> &mut Input {
        &mut self.pending
    }

    pub fn char_pending(&self) -> Option<&CharInput> {
        self.pending.as_char()
    }

    pub fn char_pending_mut(&mut self) -> Option<&mut CharInput> {
        self.pending.as_char_mut()
    }

    pub fn has_empty_pending(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether the pending differs from what is stored at the selection.
    pub fn has_changed_pending(&self) -> bool {
        let selected = self.selected();
        if selected.is_gap() {
            !self.pending.is_empty()
        } else {
            *selected != self.pending
        }
    }

    pub fn first_input(&self) -> Option<&Input> {
        self.inputs.first()
    }

    pub fn last_input(&self) -> Option<&Input> {
        self.inputs.last()
    }

    pub fn char_inputs(&self) -> Vec<&CharInput> {
        self.inputs.iter().filter_map(Input::as_char).collect()
    }

    pub fn first_char_input(&self) -> Option<&CharInput> {
        self.inputs.iter().find_map(Input::as_char)
    }

    pub fn last_char_input(&self) -> Option<&CharInput> {
        self.inputs.iter().rev().find_map(Input::as_char)
    }

    /// Input right before the selection.
    pub fn input_before_selected(&self) -> Option<&Input> {
        let index = self.selected_index();
        index.checked_sub(1).and_then(|i| self.inputs.get(i))
    }

    /// Char input by id, the pending taking precedence over the stored copy.
    pub fn char_input_mut(&mut self, id: InputId) -> Option<&mut CharInput> {
        if self.pending.id() == id {
            return self.pending.as_char_mut();
        }
        self.inputs
            .iter_mut()
            .find(|input| input.id() == id)
            .and_then(Input::as_char_mut)
    }

    /// Whether there is no content, pending included.
    pub fn is_empty(&self) -> bool {
        self.inputs.iter().all(Input::is_empty) && self.pending.is_empty()
    }

    pub fn option(&self) -> Option<InputOption> {
        self.option
    }

    pub fn set_option(&mut self, option: Option<InputOption>) {
        self.option = option;
    }

    /// Stored option, or the default rendering.
    pub fn effective_option(&self) -> InputOption {
        self.option.unwrap_or_default()
    }

    pub fn freeze(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    // ==== Pending and confirm ====

    /// Replace the pending with a fresh empty char input, without confirming.
    pub fn new_pending(&mut self) -> &mut CharInput {
        self.pending = CharInput::new().into();
        match &mut self.pending {
            Input::Char(pending) => pending,
            _ => unreachable!("pending was just set to a char input"),
        }
    }

    /// The pending as a char input, replacing it when it is not one.
    pub fn char_pending_or_new(&mut self) -> &mut CharInput {
        if self.pending.as_char().is_none() {
            return self.new_pending();
        }
        match &mut self.pending {
            Input::Char(pending) => pending,
            _ => unreachable!("pending was checked to be a char input"),
        }
    }

    /// Replace the pending with `input`, without confirming.
    pub fn with_pending(&mut self, input: Input) -> &mut Input {
        assert!(!input.is_gap(), "a gap can not be set as pending");
        assert!(
            !(self.nested && input.is_math_expr()),
            "an expression buffer can not hold expressions"
        );
        self.pending = input;
        &mut self.pending
    }

    /// Discard the pending edit.
    pub fn drop_pending(&mut self) {
        self.new_pending();
    }

    /// Fold the pending into the list.
    ///
    /// On a gap, a non-empty pending is inserted before the gap with a new
    /// gap in front of it. On an input, the pending replaces it in place and
    /// takes over its id and pair link. Returns the position of the
    /// confirmed input, or `None` when nothing was confirmed.
    pub fn confirm_pending(&mut self) -> Option<usize> {
        let index = self.index_of(self.selected)?;

        if self.pending.is_empty() {
            let selected = &self.inputs[index];
            if selected.is_math_expr() && (selected.is_empty() || self.pending.is_math_expr()) {
                trace!(index, "remove empty expression");
                self.remove_input_at(index);
                self.do_select(index.saturating_sub(1));
                self.new_pending();
            } else if self.pending.is_math_expr() {
                self.new_pending();
            }
            return None;
        }

        let mut pending = std::mem::replace(&mut self.pending, CharInput::new().into());
        if let Input::Expr(expr) = &mut pending {
            expr.confirm();
        }

        let confirmed = if self.inputs[index].is_gap() {
            self.inputs.splice(index..index, [Input::gap(), pending]);
            index + 1
        } else {
            let id = self.inputs[index].id();
            let pair = self.inputs[index].pair();
            match &mut pending {
                Input::Char(input) => {
                    input.set_id(id);
                    input.set_pair(pair);
                }
                Input::Expr(input) => {
                    input.set_id(id);
                    if let Some(partner) = pair {
                        self.set_pair_of(partner, None);
                    }
                }
                Input::Gap(_) => unreachable!("pending is never a gap"),
            }
            self.inputs[index] = pending;
            index
        };

        trace!(index = confirmed, "confirm pending");
        self.do_select(confirmed);
        Some(confirmed)
    }

    pub fn confirm_pending_and_select_next(&mut self) {
        self.confirm_pending_and_select_by_offset(1);
    }

    pub fn confirm_pending_and_select_previous(&mut self) {
        self.confirm_pending_and_select_by_offset(-1);
    }

    /// Confirm, then select the input `offset` away from the confirmed one.
    ///
    /// Nothing is selected when nothing was confirmed.
    pub fn confirm_pending_and_select_by_offset(&mut self, offset: isize) {
        let Some(index) = self.confirm_pending() else {
            return;
        };
        let target = index as isize + offset;
        if target >= 0 && (target as usize) < self.inputs.len() {
            self.do_select(target as usize);
        }
    }

    /// Confirm, then select `id`. With `force`, an already selected input
    /// gets a fresh pending copy.
    pub fn confirm_pending_and_select(&mut self, id: InputId, force: bool) {
        self.confirm_pending();

        if let Some(index) = self.index_of(id) {
            if force || !self.is_selected(id) {
                self.do_select(index);
            }
        }
    }

    pub fn confirm_pending_and_select_last(&mut self) {
        self.confirm_pending();
        self.select_last();
    }

    // ==== Selection ====

    /// Select `id`, confirming the pending first.
    ///
    /// Unknown or already selected inputs are ignored.
    pub fn select(&mut self, id: InputId) {
        if self.is_selected(id) || self.index_of(id).is_none() {
            return;
        }

        self.confirm_pending_and_select_next();

        if let Some(index) = self.index_of(id) {
            self.do_select(index);
        }
    }

    pub fn select_at(&mut self, index: usize) {
        if let Some(id) = self.inputs.get(index).map(Input::id) {
            self.select(id);
        }
    }

    /// Select the last input (always a gap once confirmed).
    pub fn select_last(&mut self) -> InputId {
        let last = self.inputs.len() - 1;
        let id = self.inputs[last].id();
        if !self.is_selected(id) {
            self.do_select(last);
        }
        id
    }

    /// Select the first input after the selection matching `filter`.
    pub fn select_next_first_matched<F>(&mut self, filter: F) -> Option<InputId>
    where
        F: Fn(&Input) -> bool,
    {
        let start = self.selected_index() + 1;
        let index = (start..self.inputs.len()).find(|&i| filter(&self.inputs[i]))?;
        self.do_select(index);
        Some(self.selected)
    }

    fn do_select(&mut self, index: usize) {
        let index = index.min(self.inputs.len() - 1);
        let input = &self.inputs[index];
        self.selected = input.id();
        self.pending = match input {
            Input::Gap(_) => CharInput::new().into(),
            other => other.clone(),
        };
    }

    // ==== Pairing ====

    /// Unlink the selected input and its partner.
    pub fn clear_pair_on_selected(&mut self) {
        let Some(partner) = self.selected().pair() else {
            return;
        };
        let selected = self.selected;
        self.set_pair_of(partner, None);
        self.set_pair_of(selected, None);
        if let Some(pending) = self.pending.as_char_mut() {
            pending.clear_pair();
        }
    }

    pub(crate) fn set_pair_of(&mut self, id: InputId, pair: Option<InputId>) {
        if let Some(input) = self
            .inputs
            .iter_mut()
            .find(|input| input.id() == id)
            .and_then(Input::as_char_mut)
        {
            input.set_pair(pair);
        }
    }

    /// Insert or replace a pair of linked symbols.
    ///
    /// If the selection is one side of a pair, both sides get the new keys,
    /// keeping their left/right order. Otherwise a non-empty, non-symbol
    /// selection is wrapped, or both symbols are inserted at the cursor. The
    /// cursor ends on the gap right before the right symbol.
    pub fn prepare_pair_inputting(&mut self, left: Key, right: Key) {
        let index = self.selected_index();

        let partner = self
            .selected()
            .pair()
            .and_then(|id| self.index_of(id).map(|i| (id, i)));
        if let Some((partner_id, partner_index)) = partner {
            let (own_key, partner_key) = if index > partner_index {
                (right, left)
            } else {
                (left, right)
            };
            self.new_pending().append_key(own_key);
            if let Some(input) = self.char_input_mut(partner_id) {
                input.replace_last_key(partner_key);
            }
            trace!(index, partner_index, "replace pair symbols");
            return;
        }

        let wrap =
            !self.is_gap_selected() && !self.pending.is_empty() && !self.pending.is_symbol();
        if wrap {
            self.confirm_pending_and_select_previous();
        } else {
            self.confirm_pending_and_select_next();
            if !self.is_gap_selected() {
                // nothing confirmed: insert after the selected input
                let next = self.selected_index() + 1;
                self.do_select(next);
            }
        }

        self.char_pending_or_new().append_key(left);
        let Some(left_index) = self.confirm_pending() else {
            return;
        };
        let left_id = self.inputs[left_index].id();
        // left symbol, gap, wrapped input, then the gap after it
        let offset = if wrap { 3 } else { 1 };
        self.do_select(left_index + offset);

        self.char_pending_or_new().append_key(right);
        let Some(right_index) = self.confirm_pending() else {
            return;
        };
        let right_id = self.inputs[right_index].id();
        self.set_pair_of(left_id, Some(right_id));
        self.set_pair_of(right_id, Some(left_id));
        self.do_select(right_index - 1);
        trace!(wrap, "insert pair symbols");
    }

    /// Whether the buffer holds exactly two char inputs linked to each other.
    pub fn has_only_one_pair_inputs(&self) -> bool {
        match self.char_inputs().as_slice() {
            [a, b] => a.pair() == Some(b.id()) && b.pair() == Some(a.id()),
            _ => false,
        }
    }

    // ==== Deletion ====

    /// Delete backward from the cursor.
    ///
    /// A multi-key Latin input loses its last key only. On a gap, the input
    /// before it is removed; on an input, that input is removed. Paired
    /// inputs take their partner along.
    pub fn delete_backward(&mut self) {
        self.do_delete_backward(true);
    }

    /// Delete the selected input; on a gap, only the pending is dropped.
    pub fn delete_selected(&mut self) {
        if !self.is_gap_selected() {
            self.do_delete_backward(false);
        }
        self.drop_pending();
    }

    fn do_delete_backward(&mut self, by_step: bool) {
        let Some(index) = self.index_of(self.selected) else {
            return;
        };

        let is_latin_run = |input: &Input| input.is_latin() && input.keys().len() > 1;
        if by_step {
            if !self.pending.is_empty() {
                if is_latin_run(&self.pending) {
                    if let Some(pending) = self.pending.as_char_mut() {
                        pending.drop_last_key();
                    }
                    trace!("drop last key of pending");
                    return;
                }
            } else if is_latin_run(&self.inputs[index]) {
                if let Some(selected) = self.inputs[index].as_char_mut() {
                    selected.drop_last_key();
                }
                trace!("drop last key of selected");
                return;
            }
        }

        if self.inputs[index].is_gap() {
            if index == 0 || !self.pending.is_empty() {
                self.drop_pending();
                return;
            }

            let prev = index - 1;
            if is_latin_run(&self.inputs[prev]) {
                self.do_select(prev);
                return;
            }

            let prev_id = self.inputs[prev].id();
            self.remove_pair_of(prev_id);
            // The selected gap goes away when the partner sat right after it.
            if self.index_of(self.selected).is_none() {
                self.do_select(index);
            }
            self.remove_input(prev_id);
            trace!(index = prev, "delete input before gap");
        } else {
            let selected = self.selected;
            self.remove_pair_of(selected);

            let index = self.selected_index();
            let next_id = self.inputs[index + 1].id();
            self.remove_input(selected);

            if let Some(next) = self.index_of(next_id) {
                self.do_select(next);
            }
            trace!(index, "delete selected input");
        }
    }

    /// Remove an input together with the gap before it.
    fn remove_input(&mut self, id: InputId) {
        if let Some(index) = self.index_of(id) {
            if !self.inputs[index].is_gap() {
                self.remove_input_at(index);
            }
        }
    }

    fn remove_input_at(&mut self, index: usize) {
        if index == 0 || index >= self.inputs.len() {
            return;
        }
        self.inputs.drain(index - 1..=index);
    }

    /// Remove the partner of `id`, if any.
    fn remove_pair_of(&mut self, id: InputId) {
        let Some(partner) = self.input(id).and_then(Input::pair) else {
            return;
        };
        if let Some(partner_index) = self.index_of(partner) {
            self.set_pair_of(partner, None);
            self.remove_input_at(partner_index);
        }
    }

    // ==== Rendering ====

    /// Whether the gap at `i` (or the gap before input `i` while it holds a
    /// pending) renders as a space.
    pub fn need_gap_space(&self, i: usize) -> bool {
        self.need_gap_space_with(i, &self.effective_option())
    }

    pub fn need_gap_space_with(&self, i: usize, option: &InputOption) -> bool {
        let total = self.inputs.len();
        if i == 0 || i >= total {
            return false;
        }

        let input = &self.inputs[i];
        let left = &self.inputs[i - 1];
        let right = if input.is_gap() {
            match self.non_empty_pending_on(input) {
                Some(pending) => pending,
                None if i == total - 1 => return false,
                None => self.non_empty_pending_or_self(&self.inputs[i + 1]),
            }
        } else {
            // An input faces the gap before it only while that gap holds a pending.
            if !self.is_selected(left.id()) || self.pending.is_empty() {
                return false;
            }
            input
        };
        let left = self.non_empty_pending_or_self(left);

        if left.is_space() || right.is_space() {
            false
        } else if (left.is_math_expr() && !left.is_empty())
            || (right.is_math_expr() && !right.is_empty())
        {
            true
        } else if left.is_math_op() || right.is_math_op() {
            true
        } else if left.is_latin() {
            !right.is_symbol()
        } else if right.is_latin() {
            !left.is_symbol()
        } else if left.is_text_only_word_spell(option) {
            !right.is_symbol()
        } else if right.is_text_only_word_spell(option) {
            !left.is_symbol()
        } else {
            false
        }
    }

    /// Rendered text with the stored option.
    pub fn text(&self) -> String {
        self.text_with(&self.effective_option())
    }

    /// Rendered text. Confirm the pending first, or it is left out.
    pub fn text_with(&self, option: &InputOption) -> String {
        let mut text = String::new();
        for (i, input) in self.inputs.iter().enumerate() {
            text.push_str(&input.text(option));
            if self.need_gap_space_with(i, option) {
                text.push(' ');
            }
        }
        text
    }

    fn non_empty_pending_on(&self, input: &Input) -> Option<&Input> {
        (self.is_selected(input.id()) && !self.pending.is_empty()).then_some(&self.pending)
    }

    fn non_empty_pending_or_self<'a>(&'a self, input: &'a Input) -> &'a Input {
        self.non_empty_pending_on(input).unwrap_or(input)
    }

    // ==== Phrases ====

    /// Input at `index` as the user sees it: the pending stands in for the
    /// selected input. Gaps with an empty pending stay gaps.
    fn view_at(&self, index: usize) -> Option<&Input> {
        let input = self.inputs.get(index)?;
        if self.is_selected(input.id()) && (!input.is_gap() || !self.pending.is_empty()) {
            Some(&self.pending)
        } else {
            Some(input)
        }
    }

    fn is_content_view(input: &Input) -> bool {
        !input.is_gap() && !input.is_empty()
    }

    fn is_phrase_end_at(&self, index: usize) -> bool {
        let current = self.view_at(index);
        let left = (0..index)
            .rev()
            .filter_map(|i| self.view_at(i))
            .find(|input| Self::is_content_view(input));
        let right = (index + 1..self.inputs.len())
            .filter_map(|i| self.view_at(i))
            .find(|input| Self::is_content_view(input));
        phrase::is_phrase_end(current, left, right)
    }

    /// Ids of the phrase inputs around `index`, the pending standing in for
    /// the selection.
    pub fn phrase_input_ids_containing(&self, index: usize) -> Vec<InputId> {
        if index >= self.inputs.len() {
            return Vec::new();
        }

        let collect = |i: usize| -> Option<Option<InputId>> {
            if self.is_phrase_end_at(i) {
                return None;
            }
            let input = self.view_at(i)?;
            Some(Self::is_content_view(input).then(|| input.id()))
        };

        let mut before: Vec<InputId> = Vec::new();
        for i in (0..index).rev() {
            match collect(i) {
                Some(id) => before.extend(id),
                None => break,
            }
        }
        before.reverse();

        for i in index..self.inputs.len() {
            match collect(i) {
                Some(id) => before.extend(id),
                None => break,
            }
        }
        before
    }

    /// Phrase inputs around `index`, as copies.
    pub fn phrase_inputs_containing(&self, index: usize) -> Vec<CharInput> {
        self.phrase_input_ids_containing(index)
            .into_iter()
            .filter_map(|id| self.char_view(id).cloned())
            .collect()
    }

    /// Char input by id, as the user sees it.
    pub fn char_view(&self, id: InputId) -> Option<&CharInput> {
        if self.pending.id() == id {
            return self.pending.as_char();
        }
        self.input(id).and_then(Input::as_char)
    }

    /// Continuous pinyin words ending at `index`.
    pub fn phrase_words_from(&self, index: usize) -> Vec<InputWord> {
        let mut words = Vec::new();
        for i in (0..=index.min(self.inputs.len().saturating_sub(1))).rev() {
            let Some(input) = self.view_at(i) else {
                break;
            };
            if input.is_gap() {
                continue;
            }
            match input.word().filter(|w| w.is_pinyin()) {
                Some(word) => words.push(word.clone()),
                None => break,
            }
        }
        words.reverse();
        words
    }

    /// Words of every pinyin phrase in the buffer.
    pub fn all_phrase_words(&self) -> Vec<Vec<InputWord>> {
        let mut phrases = Vec::new();
        let mut phrase = Vec::new();
        for i in 0..self.inputs.len() {
            if self.is_phrase_end_at(i) {
                if !phrase.is_empty() {
                    phrases.push(std::mem::take(&mut phrase));
                }
            } else if let Some(word) = self.view_at(i).and_then(Input::word) {
                if word.is_pinyin() {
                    phrase.push(word.clone());
                }
            }
        }
        if !phrase.is_empty() {
            phrases.push(phrase);
        }
        phrases
    }

    pub fn latins(&self) -> Vec<String> {
        let option = self.effective_option();
        self.inputs
            .iter()
            .filter(|input| input.is_latin())
            .map(|input| input.text(&option))
            .collect()
    }

    pub fn emojis(&self) -> Vec<InputWord> {
        self.inputs
            .iter()
            .filter(|input| input.is_emoji())
            .filter_map(|input| match input.word() {
                Some(word) => Some(word.clone()),
                None => input.keys().first().map(|key| InputWord::emoji(0, &key.text)),
            })
            .collect()
    }

    /// Whether any input holds a pinyin word.
    pub fn has_pinyin_words(&self) -> bool {
        self.inputs.iter().any(Input::is_pinyin) || self.pending.is_pinyin()
    }

    /// Whether any pinyin word has a script variant.
    pub fn has_variant_words(&self) -> bool {
        self.inputs
            .iter()
            .chain(std::iter::once(&self.pending))
            .filter_map(Input::word)
            .any(InputWord::has_variant)
    }

    // ==== Completions ====

    pub fn completions(&self) -> Option<&Completions> {
        self.completions.as_ref()
    }

    pub fn clear_completions(&mut self) {
        self.completions = None;
    }

    /// Start a Latin completion set over the selection.
    pub fn new_latin_completions(&mut self) -> &mut Completions {
        let index = self.selected_index();
        self.completions
            .insert(Completions::new(CompletionKind::Latin, index..index + 1))
    }

    /// Start a phrase completion set over `first..=last`.
    pub fn new_phrase_word_completions(&mut self, first: usize, last: usize) -> &mut Completions {
        self.completions
            .insert(Completions::new(CompletionKind::PhraseWord, first..last + 1))
    }

    /// Apply the completion at `position` and clear the set.
    ///
    /// Returns false when there is no such completion.
    pub fn apply_completion(&mut self, position: usize) -> bool {
        let Some(completions) = self.completions.take() else {
            return false;
        };
        let Some(completion) = completions.get(position).cloned() else {
            self.completions = Some(completions);
            return false;
        };

        let mut range = completions.apply_range.clone();
        let selected_index = self.selected_index();
        // Confirming a gap's pending inserts a gap and the input into the range.
        if self.is_gap_selected() && !self.pending.is_empty() && range.contains(&selected_index) {
            range.end += 2;
        }
        self.confirm_pending();

        let targets: Vec<usize> = range
            .filter(|&i| {
                self.inputs
                    .get(i)
                    .and_then(Input::as_char)
                    .is_some_and(|input| !input.is_empty())
            })
            .collect();

        let mut last_applied = None;
        let mut surplus = Vec::new();
        for (n, input) in completion.inputs.iter().enumerate() {
            let Some(&index) = targets.get(n) else {
                surplus.push(input.renewed());
                continue;
            };
            if let Some(target) = self.inputs[index].as_char_mut() {
                match completions.kind {
                    CompletionKind::Latin => {
                        target.set_keys(input.keys().to_vec());
                        target.clear_word();
                    }
                    CompletionKind::PhraseWord => {
                        if !target.is_word_confirmed() {
                            target.set_word(input.word().cloned());
                        }
                    }
                }
            }
            last_applied = Some(index);
        }

        let anchor = match last_applied {
            Some(index) => index + 1,
            None if self.is_gap_selected() => self.selected_index(),
            // the gap after the selected input
            None => self.selected_index() + 1,
        };
        let inserted = surplus.len();
        if inserted > 0 {
            let items = surplus
                .into_iter()
                .flat_map(|input| [Input::Char(input), Input::gap()]);
            self.inputs.splice(anchor + 1..anchor + 1, items);
        }

        self.do_select(anchor + inserted * 2);
        trace!(position, inserted, "apply completion");
        true
    }

    /// Whether the completion set still fits the selection; clears it if not.
    pub fn verify_completions(&mut self) -> bool {
        let Some(completions) = &self.completions else {
            return false;
        };

        let index = self.selected_index();
        let valid = completions.apply_range.contains(&index)
            && match completions.kind {
                CompletionKind::Latin => self.pending.is_latin(),
                CompletionKind::PhraseWord => self.is_gap_selected(),
            };
        if !valid {
            debug!(kind = ?completions.kind, index, "drop stale completions");
            self.completions = None;
        }
        valid
    }

    // ==== Undo stage ====

    /// Independent copy of the buffer.
    pub fn copy(&self) -> InputBuffer {
        self.clone()
    }

    /// Take over the content of `source`, keeping this buffer's stage.
    pub fn replace_by(&mut self, source: InputBuffer) {
        let InputBuffer {
            inputs,
            selected,
            pending,
            option,
            frozen,
            nested,
            completions,
            staged: _,
        } = source;
        self.inputs = inputs;
        self.selected = selected;
        self.pending = pending;
        self.option = option;
        self.frozen = frozen;
        self.nested = nested;
        self.completions = completions;
    }

    fn snapshot(&self) -> Box<InputBuffer> {
        let mut snapshot = self.clone();
        snapshot.staged = None;
        Box::new(snapshot)
    }

    fn do_reset(&mut self) {
        let gap = Input::gap();
        self.selected = gap.id();
        self.inputs = vec![gap];
        self.pending = CharInput::new().into();
        self.option = None;
        self.frozen = false;
        self.completions = None;
    }

    /// Empty the buffer. With `can_be_canceled`, a non-empty buffer is
    /// staged so `cancel_delete` can bring it back.
    pub fn reset(&mut self, can_be_canceled: bool) {
        let staged = (can_be_canceled && !self.is_empty()).then(|| Staged {
            kind: StagedKind::Cleared,
            snapshot: self.snapshot(),
        });
        self.do_reset();
        self.staged = staged;
        debug!(staged = self.staged.is_some(), "reset input buffer");
    }

    /// Render the buffer and empty it. With `can_be_revoked`, a non-empty
    /// buffer is staged so `revoke_commit` can bring it back.
    pub fn commit(&mut self, can_be_revoked: bool) -> String {
        self.confirm_pending();
        let text = self.text();

        let staged = (can_be_revoked && !self.is_empty()).then(|| Staged {
            kind: StagedKind::Committed,
            snapshot: self.snapshot(),
        });
        self.do_reset();
        self.staged = staged;
        debug!(staged = self.staged.is_some(), "commit input buffer");

        text
    }

    pub fn staged_kind(&self) -> Option<StagedKind> {
        self.staged.as_ref().map(|staged| staged.kind)
    }

    pub fn has_deleted_stage(&self) -> bool {
        self.staged_kind() == Some(StagedKind::Cleared)
    }

    pub fn has_committed_stage(&self) -> bool {
        self.staged_kind() == Some(StagedKind::Committed)
    }

    pub fn clear_staged(&mut self) {
        self.staged = None;
    }

    /// Bring back a cleared buffer.
    pub fn cancel_delete(&mut self) -> bool {
        self.restore(StagedKind::Cleared)
    }

    /// Bring back a committed buffer.
    pub fn revoke_commit(&mut self) -> bool {
        self.restore(StagedKind::Committed)
    }

    fn restore(&mut self, kind: StagedKind) -> bool {
        if self.staged_kind() != Some(kind) {
            return false;
        }
        let Some(staged) = self.staged.take() else {
            return false;
        };
        self.replace_by(*staged.snapshot);
        debug!(?kind, "restore staged input buffer");
        true
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new()
    }
}
