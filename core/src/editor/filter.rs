//! Advance filter: picking a spell from every spell among the candidates.
//!
//! The pick only reaches the candidate list on confirm, so the list the
//! user came from stays as it was when the filter is dismissed.

use super::{Editor, EditorContext, EditorResult};
use crate::candidate::CandidateFilter;
use crate::ime_engine::{CtrlKey, InputEvent};
use crate::session::{ImeSession, InputMode};

/// Editor of the `AdvanceFilter` mode.
#[derive(Debug, Default)]
pub struct FilterEditor;

impl FilterEditor {
    pub fn new() -> Self {
        Self
    }
}

impl Editor for FilterEditor {
    fn process_event(
        &mut self,
        event: &InputEvent,
        session: &mut ImeSession,
        _ctx: &mut EditorContext<'_>,
    ) -> EditorResult {
        let InputMode::AdvanceFilter(state) = session.mode_mut() else {
            return EditorResult::PassThrough;
        };
        let InputEvent::Ctrl(key) = event else {
            return EditorResult::PassThrough;
        };

        match key {
            CtrlKey::FilterBySpell(spell) => {
                let mut filter = CandidateFilter::new();
                if !state.filter.spells().contains(spell) {
                    filter.toggle(spell);
                }
                state.filter = filter;
            }
            CtrlKey::PageUp => {
                state.page_up();
            }
            CtrlKey::PageDown => {
                state.page_down();
            }
            CtrlKey::ConfirmFilter => {
                let filter = state.filter.clone();
                session.candidates_mut().set_filter(filter);
                session.pop_mode();
            }
            CtrlKey::Exit => session.pop_mode(),
            _ => return EditorResult::PassThrough,
        }
        EditorResult::Handled
    }

    fn name(&self) -> &'static str {
        "filter"
    }
}
