//! Direct input: the `InputWait` mode.
//!
//! Taps go straight into the buffer. Letters and digits grow a Latin
//! pending with prefix completions, symbols and emojis become confirmed
//! single-key inputs. Gestures and control keys start the other modes.

use super::{
    arithmetic, build_latin_completions, candidate, circular_pad, confirm_or_new_pending, pair,
    predict_and_confirm, slip, Editor, EditorContext, EditorResult,
};
use crate::context::{Commit, EditorAction};
use crate::dict::Dictionary;
use crate::ime_engine::{CtrlKey, InputEvent};
use crate::input::Input;
use crate::input_buffer::InputBuffer;
use crate::key::Key;
use crate::session::{CommitOptionState, EditorEditState, ImeSession, InputMode};
use std::sync::Arc;
use tracing::debug;

/// Editor of the `InputWait` mode.
pub struct DirectEditor {
    dict: Arc<dyn Dictionary>,
}

impl DirectEditor {
    pub fn new(dict: Arc<dyn Dictionary>) -> Self {
        Self { dict }
    }

    fn on_tap(
        &mut self,
        key: &Key,
        tick: u32,
        session: &mut ImeSession,
        ctx: &mut EditorContext<'_>,
    ) -> EditorResult {
        if key.is_space() {
            return self.on_ctrl(&CtrlKey::Space, session, ctx);
        }
        if key.math_op().is_some() {
            arithmetic::start(session);
            return EditorResult::Redispatch(InputEvent::Tap {
                key: key.clone(),
                tick,
            });
        }

        let buffer = session.buffer_mut();
        if tick > 0 && key.has_replacements() {
            if buffer.is_empty() || buffer.is_frozen() {
                return EditorResult::Commit(replacement_commit(key, tick));
            }
            if replace_latest_key(buffer, key) {
                build_latin_completions(self.dict.as_ref(), ctx.config, buffer);
                return EditorResult::Handled;
            }
        }

        if buffer.is_frozen() || (buffer.is_empty() && (key.is_symbol() || key.is_emoji())) {
            return EditorResult::Commit(Commit::Text {
                text: key.text.clone(),
                replacements: key_cycle(key),
                revocable: false,
            });
        }

        buffer.clear_pair_on_selected();
        if key.is_symbol() || key.is_emoji() {
            confirm_or_new_pending(buffer).append_key(key.clone());
            buffer.confirm_pending_and_select_next();
            buffer.clear_completions();
            return EditorResult::Handled;
        }

        let latin = buffer
            .char_pending()
            .is_some_and(|pending| pending.is_empty() || pending.is_latin());
        if !latin {
            confirm_or_new_pending(buffer);
        }
        buffer.char_pending_or_new().append_key(key.clone());
        build_latin_completions(self.dict.as_ref(), ctx.config, buffer);
        EditorResult::Handled
    }

    fn on_ctrl(
        &mut self,
        key: &CtrlKey,
        session: &mut ImeSession,
        ctx: &mut EditorContext<'_>,
    ) -> EditorResult {
        let dict = self.dict.as_ref();
        match key {
            CtrlKey::Backspace => {
                let buffer = session.buffer_mut();
                if buffer.is_empty() || buffer.is_frozen() {
                    ctx.request_editor_action(EditorAction::Backspace);
                    return EditorResult::Handled;
                }
                buffer.delete_backward();
                build_latin_completions(dict, ctx.config, buffer);
                EditorResult::Handled
            }
            CtrlKey::Space | CtrlKey::Enter => {
                let newline = matches!(key, CtrlKey::Enter);
                let buffer = session.buffer_mut();
                if buffer.is_empty() || buffer.is_frozen() {
                    let text = if newline { "\n" } else { " " };
                    return EditorResult::Commit(Commit::text(text, false));
                }

                if newline {
                    if ctx.config.single_line_mode {
                        return EditorResult::Redispatch(InputEvent::Ctrl(CtrlKey::Commit));
                    }
                    predict_and_confirm(dict, ctx.config, buffer);
                } else {
                    predict_and_confirm(dict, ctx.config, buffer);
                    select_next_gap(buffer);
                    confirm_or_new_pending(buffer).append_key(Key::space());
                    buffer.confirm_pending_and_select_next();
                    buffer.clear_completions();
                }
                EditorResult::Handled
            }
            CtrlKey::ChooseInput(id) => {
                candidate::start_choosing(dict, ctx.config, session, *id);
                EditorResult::Handled
            }
            CtrlKey::Arithmetic => {
                arithmetic::start(session);
                EditorResult::Handled
            }
            CtrlKey::EditorEdit => {
                session.buffer_mut().freeze(true);
                session.push_mode(InputMode::EditorEdit(EditorEditState::default()));
                EditorResult::Handled
            }
            CtrlKey::CommitOptions => {
                if !session.buffer().has_pinyin_words() {
                    debug!("no pinyin word to commit with options");
                    return EditorResult::Handled;
                }
                let old_option = session.buffer().option();
                session.push_mode(InputMode::CommitOptionChoose(CommitOptionState { old_option }));
                EditorResult::Handled
            }
            _ => EditorResult::PassThrough,
        }
    }
}

impl Editor for DirectEditor {
    fn process_event(
        &mut self,
        event: &InputEvent,
        session: &mut ImeSession,
        ctx: &mut EditorContext<'_>,
    ) -> EditorResult {
        match event {
            InputEvent::Tap { key, tick } => self.on_tap(key, *tick, session, ctx),
            InputEvent::PairTap { left, right } => pair::on_pair_tap(session, left, right),
            InputEvent::SlipStart(key) if key.is_alphabet() => {
                if ctx.config.circular_pad_enabled {
                    circular_pad::start(self.dict.as_ref(), ctx.config, session, key);
                } else {
                    slip::start(self.dict.as_ref(), session, key);
                }
                EditorResult::Handled
            }
            InputEvent::PadTap(key) if ctx.config.circular_pad_enabled && key.is_alphabet() => {
                circular_pad::start(self.dict.as_ref(), ctx.config, session, key);
                EditorResult::Handled
            }
            InputEvent::ApplyCompletion(position) => {
                let buffer = session.buffer_mut();
                if buffer.verify_completions() {
                    buffer.apply_completion(*position);
                }
                EditorResult::Handled
            }
            InputEvent::Ctrl(key) => self.on_ctrl(key, session, ctx),
            _ => EditorResult::PassThrough,
        }
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

/// `[text, replacements...]`, or nothing for a key without replacements.
fn key_cycle(key: &Key) -> Vec<String> {
    if !key.has_replacements() {
        return Vec::new();
    }
    std::iter::once(key.text.clone())
        .chain(key.replacements.iter().cloned())
        .collect()
}

/// Commit of the replacement a repeated tap has reached.
fn replacement_commit(key: &Key, tick: u32) -> Commit {
    let cycle = key_cycle(key);
    let text = cycle[tick as usize % cycle.len()].clone();
    Commit::Text {
        text,
        replacements: cycle,
        revocable: false,
    }
}

/// Cycle the last key of the pending, or of the input before the selected
/// gap, to its next replacement.
fn replace_latest_key(buffer: &mut InputBuffer, key: &Key) -> bool {
    let target = if buffer.is_gap_selected() && buffer.has_empty_pending() {
        buffer.input_before_selected().map(Input::id)
    } else {
        Some(buffer.pending().id())
    };
    let Some(input) = target.and_then(|id| buffer.char_input_mut(id)) else {
        return false;
    };
    let Some(last) = input.last_key().cloned() else {
        return false;
    };
    if !key.can_replace(&last) {
        return false;
    }

    let next = key.next_replacement(&last.text);
    input.replace_latest_key(&last, key.replaced_with(&next));
    true
}

/// Move a selection sitting on an input to the gap after it.
fn select_next_gap(buffer: &mut InputBuffer) {
    if !buffer.is_gap_selected() {
        let next = buffer.selected_index() + 1;
        buffer.select_at(next);
    }
}
