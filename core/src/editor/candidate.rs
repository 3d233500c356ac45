//! Candidate choosing for a selected input.
//!
//! Choosing a word confirms it and moves on to the next pinyin input whose
//! word is still a guess, so a whole phrase can be corrected in one pass.

use super::{
    arithmetic, determine_word, predict_phrase_words, Editor, EditorContext, EditorResult,
};
use crate::candidate::CandidateFilter;
use crate::dict::{split_spell, Dictionary};
use crate::ime_engine::{CtrlKey, InputEvent, SpellToggle};
use crate::input::{CharInput, Input, InputId};
use crate::input_buffer::InputBuffer;
use crate::key::{Key, KeyLevel};
use crate::session::{ChooseState, FilterState, ImeSession, InputMode};
use crate::word::{InputWord, WordKind};
use crate::Config;
use std::sync::Arc;
use tracing::debug;

/// Editor of the `CandidateChoose` mode.
pub struct CandidateEditor {
    dict: Arc<dyn Dictionary>,
}

/// Select `id` and enter the mode fitting its kind.
///
/// Pinyin, symbol and emoji inputs get candidates, an expression goes back
/// to arithmetic input, anything else returns to `InputWait`.
pub(crate) fn start_choosing(
    dict: &dyn Dictionary,
    config: &Config,
    session: &mut ImeSession,
    id: InputId,
) {
    let buffer = session.buffer_mut();
    buffer.select(id);
    buffer.clear_completions();

    let pending = buffer.pending();
    let is_expr = pending.is_math_expr();
    let choosable = pending.is_pinyin() || pending.is_symbol() || pending.is_emoji();
    if is_expr {
        arithmetic::start(session);
    } else if choosable {
        start_candidate_choosing(dict, config, session);
    } else {
        if buffer.is_gap_selected() {
            buffer.confirm_pending_and_select_next();
        }
        session.reset_mode();
    }
}

/// Fill the candidate list for the pending and enter `CandidateChoose`.
fn start_candidate_choosing(dict: &dyn Dictionary, config: &Config, session: &mut ImeSession) {
    let buffer = session.buffer();
    let Some(pending) = buffer.char_pending() else {
        return;
    };
    let target = pending.id();
    let words = if pending.is_symbol() {
        symbol_alternatives(pending)
    } else if pending.is_emoji() {
        emoji_alternatives(dict, config, buffer, pending)
    } else {
        pinyin_candidates(dict, config, pending)
    };
    debug!(target = target.value(), count = words.len(), "start choosing");

    let candidates = session.candidates_mut();
    candidates.set_page_size(config.candidate_page_size);
    candidates.set_candidates(words);
    session.enter_mode(InputMode::CandidateChoose(ChooseState { target }));
}

fn push_unique(words: &mut Vec<InputWord>, word: InputWord) {
    if !words.contains(&word) {
        words.push(word);
    }
}

/// The pending's word, then the best matches and emojis when they fit on
/// the first page, then every candidate.
fn pinyin_candidates(dict: &dyn Dictionary, config: &Config, pending: &CharInput) -> Vec<InputWord> {
    let mut words = Vec::new();
    if let Some(word) = pending.word() {
        words.push(word.clone());
    }

    let top = dict.top_best_matches(pending, config.best_candidate_count);
    let emojis = dict.emojis_for(pending, config.emoji_candidate_count);
    if words.len() + top.len() + emojis.len() <= config.candidate_page_size {
        for word in top.into_iter().chain(emojis) {
            push_unique(&mut words, word);
        }
    }
    for word in dict.candidates_for(pending) {
        push_unique(&mut words, word);
    }
    words
}

/// The replacement cycle of a symbol key.
fn symbol_alternatives(pending: &CharInput) -> Vec<InputWord> {
    let Some(key) = pending.last_key() else {
        return Vec::new();
    };
    let mut words = vec![InputWord::symbol(0, key.text.clone())];
    for replacement in &key.replacements {
        push_unique(&mut words, InputWord::symbol(0, replacement.clone()));
    }
    words
}

/// The emoji itself, then the emojis of the nearest pinyin word before it.
fn emoji_alternatives(
    dict: &dyn Dictionary,
    config: &Config,
    buffer: &InputBuffer,
    pending: &CharInput,
) -> Vec<InputWord> {
    let mut words = Vec::new();
    match pending.word() {
        Some(word) => words.push(word.clone()),
        None => words.extend(pending.last_key().map(|key| InputWord::emoji(0, key.text.clone()))),
    }

    let index = buffer.selected_index();
    let keyword = buffer.inputs()[..index]
        .iter()
        .rev()
        .filter_map(Input::as_char)
        .find(|input| input.is_pinyin());
    if let Some(keyword) = keyword {
        let count = config.emoji_candidate_count.max(config.candidate_page_size);
        for emoji in dict.emojis_for(keyword, count) {
            push_unique(&mut words, emoji);
        }
    }
    words
}

/// Toggle one of the easily confused parts of `chars`.
pub fn toggle_spell(chars: &str, toggle: SpellToggle) -> Option<String> {
    match toggle {
        SpellToggle::NgEnding => {
            if let Some(stem) = chars.strip_suffix("ng") {
                Some(format!("{}n", stem))
            } else if chars.ends_with('n') {
                Some(format!("{}g", chars))
            } else {
                None
            }
        }
        SpellToggle::NlStart => {
            if let Some(rest) = chars.strip_prefix('n') {
                Some(format!("l{}", rest))
            } else {
                chars.strip_prefix('l').map(|rest| format!("n{}", rest))
            }
        }
        SpellToggle::SczStart => {
            for initial in ["s", "c", "z"] {
                if let Some(rest) = chars.strip_prefix(&format!("{}h", initial)) {
                    return Some(format!("{}{}", initial, rest));
                }
                if let Some(rest) = chars.strip_prefix(initial) {
                    return Some(format!("{}h{}", initial, rest));
                }
            }
            None
        }
    }
}

/// Level keys spelling `spell`, as a slip would have typed it.
fn spell_keys(spell: &str) -> Vec<Key> {
    let Some(levels) = split_spell(spell) else {
        return Vec::new();
    };
    let mut keys = vec![Key::alphabet(levels.level0).with_level(KeyLevel::Level0)];
    match (levels.level1, levels.level2) {
        (Some(level1), Some(level2)) => {
            keys.push(Key::alphabet(format!("{}{}", level1, level2)).with_level(KeyLevel::Level2));
        }
        (Some(level1), None) => keys.push(Key::alphabet(level1).with_level(KeyLevel::Level1)),
        _ => {}
    }
    keys
}

impl CandidateEditor {
    pub fn new(dict: Arc<dyn Dictionary>) -> Self {
        Self { dict }
    }

    fn choose(&self, position: usize, session: &mut ImeSession, config: &Config) -> EditorResult {
        let Some(word) = session.candidates().get_on_page(position).cloned() else {
            return EditorResult::Handled;
        };
        let buffer = session.buffer_mut();
        let Some(pending) = buffer.char_pending_mut() else {
            return EditorResult::Handled;
        };

        let kind = word.kind;
        match kind {
            WordKind::Symbol => {
                if let Some(last) = pending.last_key().cloned() {
                    pending.replace_last_key(last.replaced_with(&word.value));
                }
                buffer.confirm_pending_and_select_next();
                session.reset_mode();
                return EditorResult::Handled;
            }
            WordKind::Emoji if !pending.is_emoji() => {
                // The emoji goes in after the pinyin input, which keeps its word.
                pending.confirm_word();
                buffer.confirm_pending_and_select_next();
                let emoji = buffer.char_pending_or_new();
                emoji.append_key(Key::emoji(word.value.clone()));
                emoji.set_word(Some(word));
                emoji.confirm_word();
            }
            WordKind::Emoji => {
                pending.set_keys(vec![Key::emoji(word.value.clone())]);
                pending.set_word(Some(word));
                pending.confirm_word();
            }
            WordKind::Pinyin => {
                pending.set_word(Some(word));
                pending.confirm_word();
            }
        }
        buffer.confirm_pending_and_select_next();
        self.choose_next(session, config);
        EditorResult::Handled
    }

    /// Move to the next pinyin input with an unconfirmed word.
    fn choose_next(&self, session: &mut ImeSession, config: &Config) {
        let dict = self.dict.as_ref();
        let buffer = session.buffer_mut();
        let next = buffer.select_next_first_matched(|input| {
            input
                .as_char()
                .is_some_and(|input| input.is_pinyin() && !input.is_word_confirmed())
        });
        match next {
            Some(id) => {
                let index = buffer.selected_index();
                predict_phrase_words(dict, buffer, index, None, 1);
                start_choosing(dict, config, session, id);
            }
            None => session.reset_mode(),
        }
    }

    fn toggle(&self, toggle: SpellToggle, session: &mut ImeSession, config: &Config) {
        let dict = self.dict.as_ref();
        let Some(pending) = session.buffer_mut().char_pending_mut() else {
            return;
        };
        let Some(spell) = toggle_spell(&pending.chars(), toggle) else {
            return;
        };
        if !dict.is_valid_spell(&spell) {
            debug!(%spell, "toggled spell is not valid");
            return;
        }

        pending.set_keys(spell_keys(&spell));
        determine_word(dict, pending);
        start_candidate_choosing(dict, config, session);
    }
}

impl Editor for CandidateEditor {
    fn process_event(
        &mut self,
        event: &InputEvent,
        session: &mut ImeSession,
        ctx: &mut EditorContext<'_>,
    ) -> EditorResult {
        let target = match session.mode() {
            InputMode::CandidateChoose(state) => state.target,
            _ => return EditorResult::PassThrough,
        };

        match event {
            InputEvent::ChooseCandidate(position) => self.choose(*position, session, ctx.config),
            InputEvent::Ctrl(key) => match key {
                CtrlKey::PageUp => {
                    session.candidates_mut().page_up();
                    EditorResult::Handled
                }
                CtrlKey::PageDown => {
                    session.candidates_mut().page_down();
                    EditorResult::Handled
                }
                CtrlKey::ToggleSpell(toggle) => {
                    self.toggle(*toggle, session, ctx.config);
                    EditorResult::Handled
                }
                CtrlKey::FilterBySpell(spell) => {
                    let mut filter = CandidateFilter::new();
                    if !session.candidates().filter().spells().contains(spell) {
                        filter.toggle(spell);
                    }
                    session.candidates_mut().set_filter(filter);
                    EditorResult::Handled
                }
                CtrlKey::AdvanceFilter => {
                    let candidates = session.candidates();
                    let state = FilterState {
                        target,
                        filter: candidates.filter().clone(),
                        spells: candidates.spells(),
                        page: 0,
                        page_size: ctx.config.advance_filter_page_size,
                    };
                    session.push_mode(InputMode::AdvanceFilter(state));
                    EditorResult::Handled
                }
                CtrlKey::ChooseInput(id) => {
                    start_choosing(self.dict.as_ref(), ctx.config, session, *id);
                    EditorResult::Handled
                }
                CtrlKey::Exit => {
                    session.pop_mode();
                    EditorResult::Handled
                }
                CtrlKey::Backspace
                | CtrlKey::Space
                | CtrlKey::Enter
                | CtrlKey::Arithmetic
                | CtrlKey::EditorEdit
                | CtrlKey::CommitOptions => {
                    session.reset_mode();
                    EditorResult::Redispatch(event.clone())
                }
                _ => EditorResult::PassThrough,
            },
            InputEvent::Tap { .. }
            | InputEvent::PairTap { .. }
            | InputEvent::SlipStart(_)
            | InputEvent::PadTap(_) => {
                session.reset_mode();
                EditorResult::Redispatch(event.clone())
            }
            _ => EditorResult::PassThrough,
        }
    }

    fn name(&self) -> &'static str {
        "candidate"
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::super::predict_and_confirm;
    use super::*;
    use crate::key::keys_from;

    /// Buffer holding `你好` typed as two pinyin inputs.
    fn nihao(dict: &dyn Dictionary, config: &Config) -> ImeSession {
        let mut session = ImeSession::new();
        for chars in ["ni", "hao"] {
            type_pinyin(dict, session.buffer_mut(), chars);
            predict_and_confirm(dict, config, session.buffer_mut());
        }
        session
    }

    #[test]
    fn test_toggle_spell() {
        assert_eq!(toggle_spell("lin", SpellToggle::NgEnding).as_deref(), Some("ling"));
        assert_eq!(toggle_spell("ling", SpellToggle::NgEnding).as_deref(), Some("lin"));
        assert_eq!(toggle_spell("ma", SpellToggle::NgEnding), None);
        assert_eq!(toggle_spell("nin", SpellToggle::NlStart).as_deref(), Some("lin"));
        assert_eq!(toggle_spell("zhu", SpellToggle::SczStart).as_deref(), Some("zu"));
        assert_eq!(toggle_spell("ci", SpellToggle::SczStart).as_deref(), Some("chi"));
        assert_eq!(toggle_spell("ma", SpellToggle::SczStart), None);
    }

    #[test]
    fn test_spell_keys() {
        let keys = spell_keys("zhuang");
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1].text, "uang");
        assert_eq!(keys[1].level, KeyLevel::Level2);
        assert_eq!(spell_keys("ni")[1].level, KeyLevel::Level1);
    }

    #[test]
    fn test_choose_moves_to_next_pinyin() {
        let dict = sample_dict();
        let mut editor = CandidateEditor::new(dict.clone());
        let mut h = Harness::new();
        let mut session = nihao(dict.as_ref(), &h.config);

        let ni = session.buffer().inputs()[1].id();
        let hao = session.buffer().inputs()[3].id();
        start_choosing(dict.as_ref(), &h.config, &mut session, ni);
        assert_eq!(session.mode(), &InputMode::CandidateChoose(ChooseState { target: ni }));
        assert_eq!(session.candidates().candidates()[0].value, "你");

        // 泥 is second on the page
        editor.process_event(&InputEvent::ChooseCandidate(1), &mut session, &mut h.ctx());
        assert_eq!(session.mode(), &InputMode::CandidateChoose(ChooseState { target: hao }));
        assert!(session.buffer().is_selected(hao));

        // The phrase table re-predicted 号 to follow 泥.
        assert_eq!(session.candidates().candidates()[0].value, "号");
        editor.process_event(&InputEvent::ChooseCandidate(0), &mut session, &mut h.ctx());
        assert_eq!(session.mode(), &InputMode::InputWait);
        assert_eq!(session.buffer().text(), "泥号");
    }

    #[test]
    fn test_emoji_candidate_is_inserted_after() {
        let dict = sample_dict();
        let mut editor = CandidateEditor::new(dict.clone());
        let mut h = Harness::new();
        let mut session = nihao(dict.as_ref(), &h.config);

        let hao = session.buffer().inputs()[3].id();
        start_choosing(dict.as_ref(), &h.config, &mut session, hao);
        let position = session
            .candidates()
            .current_page_candidates()
            .iter()
            .position(InputWord::is_emoji);
        assert!(position.is_some());

        editor.process_event(
            &InputEvent::ChooseCandidate(position.unwrap_or_default()),
            &mut session,
            &mut h.ctx(),
        );
        assert_eq!(session.buffer().text(), "你好👍");
        assert_eq!(session.mode(), &InputMode::InputWait);
    }

    #[test]
    fn test_symbol_alternatives() {
        let dict = sample_dict();
        let mut editor = CandidateEditor::new(dict.clone());
        let mut h = Harness::new();
        let mut session = ImeSession::new();
        let buffer = session.buffer_mut();
        buffer
            .char_pending_or_new()
            .append_key(Key::symbol(".").with_replacements(["。", "…"]));
        buffer.confirm_pending_and_select_next();
        let id = buffer.inputs()[1].id();

        start_choosing(dict.as_ref(), &h.config, &mut session, id);
        assert_eq!(session.candidates().len(), 3);
        editor.process_event(&InputEvent::ChooseCandidate(2), &mut session, &mut h.ctx());
        assert_eq!(session.buffer().text(), "…");
        assert_eq!(session.mode(), &InputMode::InputWait);
    }

    #[test]
    fn test_toggle_requeries() {
        let dict = sample_dict();
        let mut editor = CandidateEditor::new(dict.clone());
        let mut h = Harness::new();
        let mut session = ImeSession::new();
        type_pinyin(dict.as_ref(), session.buffer_mut(), "lin");
        let id = session.buffer().pending().id();
        start_choosing(dict.as_ref(), &h.config, &mut session, id);
        assert_eq!(session.mode().name(), "CandidateChoose");

        let toggle = InputEvent::Ctrl(CtrlKey::ToggleSpell(SpellToggle::NgEnding));
        editor.process_event(&toggle, &mut session, &mut h.ctx());
        assert_eq!(session.buffer().pending().chars(), "ling");
        assert_eq!(session.candidates().candidates()[0].value, "零");

        // "ning" is not a spell; nothing changes
        let toggle = InputEvent::Ctrl(CtrlKey::ToggleSpell(SpellToggle::NlStart));
        editor.process_event(&toggle, &mut session, &mut h.ctx());
        assert_eq!(session.buffer().pending().chars(), "ling");
    }

    #[test]
    fn test_filter_by_spell_toggles() {
        let dict = sample_dict();
        let mut editor = CandidateEditor::new(dict.clone());
        let mut h = Harness::new();
        let mut session = ImeSession::new();
        type_pinyin(dict.as_ref(), session.buffer_mut(), "ni");
        let id = session.buffer().pending().id();
        start_choosing(dict.as_ref(), &h.config, &mut session, id);

        let filter = InputEvent::Ctrl(CtrlKey::FilterBySpell("hao".into()));
        editor.process_event(&filter, &mut session, &mut h.ctx());
        assert!(session.candidates().is_empty());
        editor.process_event(&filter, &mut session, &mut h.ctx());
        assert_eq!(session.candidates().len(), 2);
    }

    #[test]
    fn test_tap_leaves_choosing() {
        let dict = sample_dict();
        let mut editor = CandidateEditor::new(dict.clone());
        let mut h = Harness::new();
        let mut session = ImeSession::new();
        type_pinyin(dict.as_ref(), session.buffer_mut(), "ni");
        let id = session.buffer().pending().id();
        start_choosing(dict.as_ref(), &h.config, &mut session, id);

        let tap = InputEvent::Tap {
            key: keys_from("a").remove(0),
            tick: 0,
        };
        let result = editor.process_event(&tap, &mut session, &mut h.ctx());
        assert_eq!(result, EditorResult::Redispatch(tap));
        assert_eq!(session.mode(), &InputMode::InputWait);
    }
}
