//! Flip input: every spell of a flipped initial on display at once.

use super::{determine_word, stop_char_inputting, Editor, EditorContext, EditorResult};
use crate::dict::Dictionary;
use crate::ime_engine::{CtrlKey, InputEvent};
use crate::key::Key;
use crate::session::{FlipState, ImeSession, InputMode};
use std::sync::Arc;
use tracing::debug;

/// Editor of the `Flip` mode.
pub struct FlipEditor {
    dict: Arc<dyn Dictionary>,
}

/// Show the spells starting with `key`, if there are any.
pub(crate) fn start(dict: &dyn Dictionary, session: &mut ImeSession, key: &Key) {
    if !dict.has_spells_starting_with(&key.text) {
        debug!(key = %key.text, "no spell to flip to");
        return;
    }

    let spells = spell_rests(dict, &key.text);
    session.buffer_mut().new_pending().append_key(key.clone());
    session.enter_mode(InputMode::Flip(FlipState {
        start: key.text.clone(),
        spells,
    }));
}

/// What follows `level0` in each spell starting with it, shortest first.
fn spell_rests(dict: &dyn Dictionary, level0: &str) -> Vec<String> {
    let mut rests: Vec<String> = Vec::new();
    for letter in 'a'..='z' {
        let letter = letter.to_string();
        if dict.is_valid_spell(&format!("{}{}", level0, letter)) {
            rests.push(letter.clone());
        }
        for next in dict.next_spell_chars(level0, &letter) {
            if !rests.contains(&next) {
                rests.push(next);
            }
        }
    }
    rests.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    rests
}

impl FlipEditor {
    pub fn new(dict: Arc<dyn Dictionary>) -> Self {
        Self { dict }
    }
}

impl Editor for FlipEditor {
    fn process_event(
        &mut self,
        event: &InputEvent,
        session: &mut ImeSession,
        ctx: &mut EditorContext<'_>,
    ) -> EditorResult {
        let dict = self.dict.as_ref();
        match event {
            InputEvent::Tap { key, .. } => {
                let buffer = session.buffer_mut();
                if let Some(pending) = buffer.char_pending_mut() {
                    if key.is_alphabet() {
                        pending.append_key(key.clone());
                        determine_word(dict, pending);
                    } else {
                        pending.clear_word();
                    }
                }
                stop_char_inputting(dict, ctx.config, buffer);
                session.reset_mode();
                EditorResult::Handled
            }
            InputEvent::Ctrl(CtrlKey::Exit | CtrlKey::Backspace) => {
                session.buffer_mut().drop_pending();
                session.reset_mode();
                EditorResult::Handled
            }
            _ => EditorResult::PassThrough,
        }
    }

    fn name(&self) -> &'static str {
        "flip"
    }
}
