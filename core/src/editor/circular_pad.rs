//! Circular pad input: syllables typed by taps around a ring of level keys.
//!
//! Each tap lands on one level. A syllable ends by itself once no longer
//! spell can follow, so words can be typed without lifting to confirm.

use super::{
    confirm_or_new_pending, determine_word, slip::apply_level_key, stop_char_inputting, Editor,
    EditorContext, EditorResult,
};
use crate::dict::Dictionary;
use crate::ime_engine::{CtrlKey, InputEvent};
use crate::key::{Key, KeyLevel};
use crate::session::{ImeSession, InputMode, SlipState};
use crate::Config;
use std::sync::Arc;
use tracing::debug;

/// Editor of the `CircularPadInput` mode.
pub struct CircularPadEditor {
    dict: Arc<dyn Dictionary>,
}

/// Start pad input with `key`.
pub(crate) fn start(dict: &dyn Dictionary, config: &Config, session: &mut ImeSession, key: &Key) {
    session.buffer_mut().clear_completions();
    confirm_or_new_pending(session.buffer_mut());
    session.enter_mode(InputMode::CircularPadInput(SlipState::default()));
    pad_tap(dict, config, session, key);
}

fn pad_tap(dict: &dyn Dictionary, config: &Config, session: &mut ImeSession, key: &Key) {
    let mut state = match session.mode() {
        InputMode::CircularPadInput(state) => state.clone(),
        _ => return,
    };

    // A tap on an initial after a complete syllable starts the next one.
    if key.level == KeyLevel::Level0 {
        let valid = session
            .buffer()
            .char_pending()
            .is_some_and(|pending| dict.is_valid_spell(&pending.chars()));
        if valid {
            stop_char_inputting(dict, config, session.buffer_mut());
            confirm_or_new_pending(session.buffer_mut());
            state.reset();
        }
    }

    let Some(pending) = session.buffer_mut().char_pending_mut() else {
        return;
    };
    apply_level_key(dict, &mut state, pending, key);
    determine_word(dict, pending);

    let end = match key.level {
        KeyLevel::Level0 => !dict.has_spells_starting_with(&key.text),
        KeyLevel::Level1 => state.level2_next.is_empty(),
        KeyLevel::Level2 | KeyLevel::Final => true,
    };
    if end {
        debug!(chars = %pending.chars(), "pad syllable ends");
        stop_char_inputting(dict, config, session.buffer_mut());
        state.reset();
    }
    session.set_mode(InputMode::CircularPadInput(state));
}

impl CircularPadEditor {
    pub fn new(dict: Arc<dyn Dictionary>) -> Self {
        Self { dict }
    }
}

impl Editor for CircularPadEditor {
    fn process_event(
        &mut self,
        event: &InputEvent,
        session: &mut ImeSession,
        ctx: &mut EditorContext<'_>,
    ) -> EditorResult {
        let dict = self.dict.as_ref();
        match event {
            InputEvent::PadTap(key) if key.is_alphabet() => {
                pad_tap(dict, ctx.config, session, key);
                EditorResult::Handled
            }
            InputEvent::PadStop => {
                stop_char_inputting(dict, ctx.config, session.buffer_mut());
                session.reset_mode();
                EditorResult::Handled
            }
            InputEvent::Ctrl(CtrlKey::Backspace) => {
                session.reset_mode();
                EditorResult::Redispatch(event.clone())
            }
            InputEvent::Ctrl(CtrlKey::Space) => {
                stop_char_inputting(dict, ctx.config, session.buffer_mut());
                session.reset_mode();
                EditorResult::Redispatch(event.clone())
            }
            _ => EditorResult::PassThrough,
        }
    }

    fn name(&self) -> &'static str {
        "circular_pad"
    }
}
