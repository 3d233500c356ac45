//! Editor trait and the handlers of each input mode.
//!
//! Every input mode has an editor that turns events into buffer edits and
//! mode transitions. The engine picks the editor from the current mode; an
//! editor that hands an event over to another mode returns
//! `EditorResult::Redispatch`.
//!
//! The helpers at the bottom are the steps several modes share: word
//! resolution, phrase prediction and completion building.

use crate::completion::Completion;
use crate::context::{Commit, EditorAction};
use crate::dict::Dictionary;
use crate::ime_engine::InputEvent;
use crate::input::{CharInput, InputId};
use crate::input_buffer::InputBuffer;
use crate::key::{keys_from, Key};
use crate::notify::{InputMsg, InputMsgKind, MsgSink};
use crate::session::ImeSession;
use crate::word::InputWord;
use crate::Config;
use tracing::debug;

pub mod arithmetic;
pub mod candidate;
pub mod circular_pad;
pub mod commit_option;
pub mod direct;
pub mod filter;
pub mod flip;
pub mod host;
pub mod pair;
pub mod slip;

pub use arithmetic::ArithmeticEditor;
pub use candidate::CandidateEditor;
pub use circular_pad::CircularPadEditor;
pub use commit_option::CommitOptionEditor;
pub use direct::DirectEditor;
pub use filter::FilterEditor;
pub use flip::FlipEditor;
pub use host::HostEditor;
pub use slip::SlipEditor;

/// Result of processing an event in an editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorResult {
    /// Event was handled, session state updated
    Handled,

    /// Text should be committed to the host
    Commit(Commit),

    /// The mode changed; process the event again in the new mode
    Redispatch(InputEvent),

    /// Event not handled by this editor
    PassThrough,
}

/// What an editor may touch besides the session.
pub struct EditorContext<'a> {
    pub config: &'a Config,
    pub sink: &'a mut dyn MsgSink,
    /// Host text actions requested by this event
    pub editor_actions: &'a mut Vec<EditorAction>,
}

impl EditorContext<'_> {
    pub fn notify(&mut self, kind: InputMsgKind, key: Option<&Key>, input: Option<InputId>) {
        self.sink
            .on_msg(InputMsg::new(kind).with_key(key.cloned()).with_input(input));
    }

    /// Ask the host to run `action` on its text.
    pub fn request_editor_action(&mut self, action: EditorAction) {
        debug!(?action, "request editor action");
        self.editor_actions.push(action);
        self.notify(InputMsgKind::EditorActionRequested, None, None);
    }
}

/// Handler of one input mode.
pub trait Editor {
    /// Process an event in this editor's mode.
    fn process_event(
        &mut self,
        event: &InputEvent,
        session: &mut ImeSession,
        ctx: &mut EditorContext<'_>,
    ) -> EditorResult;

    /// Get a human-readable name for this editor (for debugging/logging).
    fn name(&self) -> &'static str;
}

// ============================================================================
// Shared steps
// ============================================================================

/// Pending for a new input: a gap's pending is confirmed first, a selected
/// input gets an empty pending replacing it.
pub(crate) fn confirm_or_new_pending(buffer: &mut InputBuffer) -> &mut CharInput {
    if buffer.is_gap_selected() {
        buffer.confirm_pending_and_select_next();
    }
    buffer.new_pending()
}

/// Resolve the word of `input` from its keys.
///
/// A confirmed word survives as long as the keys still produce it.
pub(crate) fn determine_word(dict: &dyn Dictionary, input: &mut CharInput) {
    if !dict.is_valid_spell(&input.chars()) {
        input.clear_word();
        return;
    }

    if input.is_word_confirmed() {
        let candidates = dict.candidates_for(input);
        if input.word().is_some_and(|word| candidates.contains(word)) {
            return;
        }
    }
    let best = dict.best_candidate(input);
    input.set_word(best);
}

/// Phrase around an input, with the ranked assignments not yet applied.
#[derive(Debug, Clone, Default)]
pub(crate) struct PhrasePrediction {
    pub ids: Vec<InputId>,
    pub phrases: Vec<Vec<Option<InputWord>>>,
}

/// Predict the words of the phrase around `index` and apply the best one
/// to its unconfirmed pinyin inputs.
///
/// The word of `exclude` is kept. The other predictions are returned for
/// phrase completions.
pub(crate) fn predict_phrase_words(
    dict: &dyn Dictionary,
    buffer: &mut InputBuffer,
    index: usize,
    exclude: Option<InputId>,
    top: usize,
) -> PhrasePrediction {
    let mut ids = Vec::new();
    let mut inputs = Vec::new();
    for id in buffer.phrase_input_ids_containing(index) {
        if let Some(input) = buffer.char_view(id) {
            ids.push(id);
            inputs.push(if input.is_pinyin() {
                input.clone()
            } else {
                CharInput::new()
            });
        }
    }
    if inputs.is_empty() {
        return PhrasePrediction::default();
    }

    let exclude = exclude.and_then(|id| ids.iter().position(|i| *i == id));
    let mut phrases = dict.predict_phrase(&inputs, exclude, top);
    if phrases.is_empty() {
        return PhrasePrediction::default();
    }

    let best = phrases.remove(0);
    for (id, word) in ids.iter().zip(best) {
        let Some(word) = word else {
            continue;
        };
        if let Some(input) = buffer.char_input_mut(*id) {
            if input.is_pinyin() && !input.is_word_confirmed() {
                input.set_word(Some(word));
            }
        }
    }
    PhrasePrediction { ids, phrases }
}

/// Offer the remaining predictions as phrase completions.
///
/// Only built while a gap inside or next to the phrase is selected.
pub(crate) fn create_phrase_completions(buffer: &mut InputBuffer, prediction: &PhrasePrediction) {
    if !buffer.is_gap_selected() || prediction.phrases.is_empty() {
        return;
    }
    let indexes: Vec<usize> = prediction
        .ids
        .iter()
        .filter_map(|id| buffer.index_of(*id))
        .collect();
    let (Some(&first), Some(&last)) = (indexes.iter().min(), indexes.iter().max()) else {
        return;
    };
    let selected = buffer.selected_index();
    if selected + 1 < first || selected > last + 1 {
        return;
    }

    let option = buffer.effective_option();
    let current: String = prediction
        .ids
        .iter()
        .filter_map(|id| buffer.char_view(*id))
        .map(|input| input.text(&option))
        .collect();

    let mut completions: Vec<Completion> = Vec::new();
    for phrase in &prediction.phrases {
        let inputs: Vec<CharInput> = prediction
            .ids
            .iter()
            .zip(phrase)
            .filter_map(|(id, word)| {
                let mut input = buffer.char_view(*id)?.clone();
                if let Some(word) = word {
                    if input.is_pinyin() && !input.is_word_confirmed() {
                        input.set_word(Some(word.clone()));
                    }
                }
                Some(input)
            })
            .collect();
        let completion = Completion::new(inputs);
        let text = completion.text(&option);
        if text != current && !completions.iter().any(|c| c.text(&option) == text) {
            completions.push(completion);
        }
    }
    if completions.is_empty() {
        return;
    }

    let set = buffer.new_phrase_word_completions(first.min(selected), last.max(selected));
    for completion in completions {
        set.add(completion);
    }
}

/// Predict the phrase of the pending, confirm it and offer the other
/// predictions as completions.
pub(crate) fn predict_and_confirm(dict: &dyn Dictionary, config: &Config, buffer: &mut InputBuffer) {
    let index = buffer.selected_index();
    let prediction =
        predict_phrase_words(dict, buffer, index, None, config.phrase_completion_top + 1);

    buffer.confirm_pending_and_select_next();
    buffer.clear_completions();
    create_phrase_completions(buffer, &prediction);
}

/// Finish a gesture-typed pending: an invalid spell is dropped, a valid
/// one is confirmed.
pub(crate) fn stop_char_inputting(dict: &dyn Dictionary, config: &Config, buffer: &mut InputBuffer) {
    let Some(pending) = buffer.char_pending() else {
        return;
    };
    if pending.is_empty() {
        return;
    }

    let chars = pending.chars();
    if !dict.is_valid_spell(&chars) {
        debug!(%chars, "drop invalid pending");
        buffer.drop_pending();
        buffer.clear_completions();
        return;
    }
    predict_and_confirm(dict, config, buffer);
}

/// Rebuild the Latin completions of the pending.
pub(crate) fn build_latin_completions(dict: &dyn Dictionary, config: &Config, buffer: &mut InputBuffer) {
    let text = match buffer.char_pending() {
        Some(pending) if pending.is_latin() => pending.chars(),
        _ => {
            buffer.clear_completions();
            return;
        }
    };

    let words = dict.best_latin_prefix_matches(&text, config.latin_completion_top);
    if words.is_empty() {
        buffer.clear_completions();
        return;
    }

    // One key per char so that a completed word is deleted char by char.
    let completions = buffer.new_latin_completions();
    for word in words {
        completions.add(Completion::new(vec![CharInput::from_keys(keys_from(&word))]));
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::dict::MemoryDictionary;
    use crate::notify::InputMsg;
    use std::sync::Arc;

    pub fn sample_dict() -> Arc<dyn Dictionary> {
        let mut dict = MemoryDictionary::new();
        dict.add_words("ni", &["你", "泥"]);
        dict.add_words("hao", &["好", "号"]);
        dict.add_words("ma", &["吗", "马"]);
        dict.add_words("zhu", &["主", "猪"]);
        dict.add_words("zhuang", &["装", "撞"]);
        dict.add_words("zhang", &["张"]);
        dict.add_words("zi", &["字"]);
        dict.add_words("lin", &["林"]);
        dict.add_words("ling", &["零"]);
        dict.add_words("nin", &["您"]);
        dict.add_phrase(&["ni", "hao"], "你好");
        dict.add_phrase(&["ni", "hao"], "泥号");
        dict.add_latin("hello");
        dict.add_latin("help");
        dict.add_emoji("好", "👍");
        Arc::new(dict)
    }

    /// Owns what an `EditorContext` borrows.
    pub struct Harness {
        pub config: Config,
        pub msgs: Vec<InputMsg>,
        pub actions: Vec<EditorAction>,
    }

    impl Harness {
        pub fn new() -> Self {
            Self {
                config: Config::default(),
                msgs: Vec::new(),
                actions: Vec::new(),
            }
        }

        pub fn ctx(&mut self) -> EditorContext<'_> {
            EditorContext {
                config: &self.config,
                sink: &mut self.msgs,
                editor_actions: &mut self.actions,
            }
        }
    }

    /// Type `chars` as a pinyin pending with its best word.
    pub fn type_pinyin(dict: &dyn Dictionary, buffer: &mut InputBuffer, chars: &str) {
        let pending = confirm_or_new_pending(buffer);
        pending.set_keys(keys_from(chars));
        determine_word(dict, pending);
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::completion::CompletionKind;

    #[test]
    fn test_determine_word() {
        let dict = sample_dict();
        let mut input = CharInput::from_keys(keys_from("ni"));
        determine_word(dict.as_ref(), &mut input);
        assert_eq!(input.word().map(|w| w.value.as_str()), Some("你"));

        input.set_word(dict.candidates_for(&input).get(1).cloned());
        input.confirm_word();
        determine_word(dict.as_ref(), &mut input);
        assert_eq!(input.word().map(|w| w.value.as_str()), Some("泥"));

        input.append_key(Key::alphabet("x"));
        determine_word(dict.as_ref(), &mut input);
        assert!(input.word().is_none());
    }

    #[test]
    fn test_stop_drops_invalid_pending() {
        let dict = sample_dict();
        let config = Config::default();
        let mut buffer = InputBuffer::new();
        buffer.char_pending_or_new().set_keys(keys_from("zq"));

        stop_char_inputting(dict.as_ref(), &config, &mut buffer);
        assert!(buffer.is_empty());
        assert!(buffer.completions().is_none());
    }

    #[test]
    fn test_predict_and_confirm_builds_phrase_completions() {
        let dict = sample_dict();
        let config = Config::default();
        let mut buffer = InputBuffer::new();

        type_pinyin(dict.as_ref(), &mut buffer, "ni");
        predict_and_confirm(dict.as_ref(), &config, &mut buffer);
        type_pinyin(dict.as_ref(), &mut buffer, "hao");
        predict_and_confirm(dict.as_ref(), &config, &mut buffer);

        assert_eq!(buffer.text(), "你好");
        let completions = buffer.completions().map(|c| (c.kind, c.texts(&buffer.effective_option())));
        assert_eq!(
            completions,
            Some((CompletionKind::PhraseWord, vec!["泥号".to_string()]))
        );
        assert!(buffer.verify_completions());
    }

    #[test]
    fn test_latin_completions() {
        let dict = sample_dict();
        let config = Config::default();
        let mut buffer = InputBuffer::new();
        for key in keys_from("hel") {
            buffer.char_pending_or_new().append_key(key);
        }

        build_latin_completions(dict.as_ref(), &config, &mut buffer);
        let texts = buffer
            .completions()
            .map(|c| c.texts(&buffer.effective_option()))
            .unwrap_or_default();
        assert_eq!(texts, vec!["hello", "help"]);

        assert!(buffer.apply_completion(1));
        assert_eq!(buffer.text(), "help");
        assert!(buffer.completions().is_none());
    }
}
