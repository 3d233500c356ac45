//! Slip input: one finger gesture spelling a syllable over the level keys.
//!
//! The gesture starts on an initial (level 0), then passes over the first
//! final letter (level 1) and the rest of the final (level 2). Moving back
//! to level 1 or on to another level-2 key replaces everything after the
//! initial, so the pending always spells the path's latest reading.

use super::{
    confirm_or_new_pending, determine_word, flip, stop_char_inputting, Editor, EditorContext,
    EditorResult,
};
use crate::dict::Dictionary;
use crate::ime_engine::InputEvent;
use crate::input::CharInput;
use crate::key::{Key, KeyLevel};
use crate::session::{ImeSession, InputMode, SlipState};
use std::sync::Arc;
use tracing::debug;

/// Editor of the `Slip` mode.
pub struct SlipEditor {
    dict: Arc<dyn Dictionary>,
}

/// Start a slip gesture on `key`.
pub(crate) fn start(dict: &dyn Dictionary, session: &mut ImeSession, key: &Key) {
    session.buffer_mut().clear_completions();
    confirm_or_new_pending(session.buffer_mut());
    session.enter_mode(InputMode::Slip(SlipState::default()));
    debug!(key = %key.text, "start slip");
    slip_to(dict, session, key);
}

/// Extend the pending along the gesture.
fn slip_to(dict: &dyn Dictionary, session: &mut ImeSession, key: &Key) {
    let mut state = match session.mode() {
        InputMode::Slip(state) => state.clone(),
        _ => return,
    };
    let Some(pending) = session.buffer_mut().char_pending_mut() else {
        return;
    };
    apply_level_key(dict, &mut state, pending, key);
    determine_word(dict, pending);
    session.set_mode(InputMode::Slip(state));
}

/// Put `key` into `pending` by its level, keeping `state` in step.
pub(crate) fn apply_level_key(
    dict: &dyn Dictionary,
    state: &mut SlipState,
    pending: &mut CharInput,
    key: &Key,
) {
    match key.level {
        KeyLevel::Level0 => {
            pending.append_key(key.clone());
            state.reset();
            state.level0 = Some(key.clone());
        }
        KeyLevel::Level1 => {
            pending.replace_keys_after_level(KeyLevel::Level0, key.clone());
            state.level2_next = match &state.level0 {
                Some(level0) => dict.next_spell_chars(&level0.text, &key.text),
                None => Vec::new(),
            };
            state.level1 = Some(key.clone());
            state.level2 = None;
        }
        KeyLevel::Level2 => {
            pending.replace_keys_after_level(KeyLevel::Level0, key.clone());
            state.level2 = Some(key.clone());
        }
        KeyLevel::Final => {
            pending.replace_all_keys(key.clone());
            state.reset();
        }
    }
}

impl SlipEditor {
    pub fn new(dict: Arc<dyn Dictionary>) -> Self {
        Self { dict }
    }
}

impl Editor for SlipEditor {
    fn process_event(
        &mut self,
        event: &InputEvent,
        session: &mut ImeSession,
        ctx: &mut EditorContext<'_>,
    ) -> EditorResult {
        let dict = self.dict.as_ref();
        match event {
            InputEvent::SlipMove(key) if key.is_alphabet() => {
                let same = session
                    .buffer()
                    .char_pending()
                    .and_then(CharInput::last_key)
                    .is_some_and(|last| last.text == key.text);
                if !same {
                    slip_to(dict, session, key);
                }
                EditorResult::Handled
            }
            InputEvent::SlipStop => {
                stop_char_inputting(dict, ctx.config, session.buffer_mut());
                session.reset_mode();
                EditorResult::Handled
            }
            InputEvent::Flip(key) => {
                let start_key = match session.buffer().char_pending() {
                    Some(pending) if pending.keys().len() == 1 => pending.keys()[0].clone(),
                    Some(pending) if pending.is_empty() => key.clone(),
                    _ => return EditorResult::Handled,
                };
                flip::start(dict, session, &start_key);
                EditorResult::Handled
            }
            _ => EditorResult::PassThrough,
        }
    }

    fn name(&self) -> &'static str {
        "slip"
    }
}
