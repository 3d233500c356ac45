//! Commit options: how the spells and variants of words are committed.

use super::{Editor, EditorContext, EditorResult};
use crate::ime_engine::{CommitOption, CtrlKey, InputEvent};
use crate::session::{ImeSession, InputMode};
use crate::word::{InputOption, SpellUsedMode};
use tracing::debug;

/// Editor of the `CommitOptionChoose` mode.
#[derive(Debug, Default)]
pub struct CommitOptionEditor;

impl CommitOptionEditor {
    pub fn new() -> Self {
        Self
    }
}

fn toggle_spell_mode(option: &mut InputOption, mode: SpellUsedMode) {
    option.spell_used_mode = if option.spell_used_mode == Some(mode) {
        None
    } else {
        Some(mode)
    };
}

impl Editor for CommitOptionEditor {
    fn process_event(
        &mut self,
        event: &InputEvent,
        session: &mut ImeSession,
        _ctx: &mut EditorContext<'_>,
    ) -> EditorResult {
        let InputMode::CommitOptionChoose(state) = session.mode() else {
            return EditorResult::PassThrough;
        };
        let old_option = state.old_option;

        match event {
            InputEvent::Ctrl(CtrlKey::CommitOption(choice)) => {
                let buffer = session.buffer_mut();
                let mut option = buffer.effective_option();
                match choice {
                    CommitOption::OnlySpell => toggle_spell_mode(&mut option, SpellUsedMode::Replacing),
                    CommitOption::WithSpell => toggle_spell_mode(&mut option, SpellUsedMode::Following),
                    CommitOption::SwitchVariant => {
                        if !buffer.has_variant_words() {
                            debug!("no word with a variant");
                            return EditorResult::Handled;
                        }
                        option.variant_used = !option.variant_used;
                    }
                }
                debug!(?option, "commit option changed");
                buffer.set_option(Some(option));
                EditorResult::Handled
            }
            InputEvent::Ctrl(CtrlKey::Exit) => {
                session.buffer_mut().set_option(old_option);
                session.pop_mode();
                EditorResult::Handled
            }
            _ => EditorResult::PassThrough,
        }
    }

    fn name(&self) -> &'static str {
        "commit_option"
    }
}
