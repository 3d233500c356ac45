//! Editor edit: cursor and clipboard actions forwarded to the host text
//! field while the buffer is frozen.

use super::{Editor, EditorContext, EditorResult};
use crate::ime_engine::{CtrlKey, InputEvent};
use crate::session::{ImeSession, InputMode};

/// Editor of the `EditorEdit` mode.
#[derive(Debug, Default)]
pub struct HostEditor;

impl HostEditor {
    pub fn new() -> Self {
        Self
    }
}

impl Editor for HostEditor {
    fn process_event(
        &mut self,
        event: &InputEvent,
        session: &mut ImeSession,
        ctx: &mut EditorContext<'_>,
    ) -> EditorResult {
        match event {
            InputEvent::Ctrl(CtrlKey::EditorAction(action)) => {
                ctx.request_editor_action(*action);
                if let InputMode::EditorEdit(state) = session.mode_mut() {
                    state.last_action = Some(*action);
                }
                EditorResult::Handled
            }
            InputEvent::Ctrl(CtrlKey::Exit | CtrlKey::EditorEdit) => {
                session.buffer_mut().freeze(false);
                session.pop_mode();
                EditorResult::Handled
            }
            _ => {
                session.buffer_mut().freeze(false);
                session.pop_mode();
                EditorResult::Redispatch(event.clone())
            }
        }
    }

    fn name(&self) -> &'static str {
        "host"
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::context::EditorAction;
    use crate::notify::InputMsgKind;
    use crate::session::EditorEditState;

    #[test]
    fn test_actions_forwarded() {
        let mut editor = HostEditor::new();
        let mut session = ImeSession::new();
        let mut h = Harness::new();
        session.buffer_mut().freeze(true);
        session.push_mode(InputMode::EditorEdit(EditorEditState::default()));

        for action in [EditorAction::SelectAll, EditorAction::Copy] {
            let event = InputEvent::Ctrl(CtrlKey::EditorAction(action));
            editor.process_event(&event, &mut session, &mut h.ctx());
        }
        assert_eq!(h.actions, vec![EditorAction::SelectAll, EditorAction::Copy]);
        assert!(h
            .msgs
            .iter()
            .all(|msg| msg.kind == InputMsgKind::EditorActionRequested));
        assert_eq!(
            session.mode(),
            &InputMode::EditorEdit(EditorEditState {
                last_action: Some(EditorAction::Copy)
            })
        );

        editor.process_event(&InputEvent::Ctrl(CtrlKey::Exit), &mut session, &mut h.ctx());
        assert_eq!(session.mode(), &InputMode::InputWait);
        assert!(!session.buffer().is_frozen());
    }

    #[test]
    fn test_other_event_thaws_and_redispatches() {
        let mut editor = HostEditor::new();
        let mut session = ImeSession::new();
        let mut h = Harness::new();
        session.buffer_mut().freeze(true);
        session.push_mode(InputMode::EditorEdit(EditorEditState::default()));

        let tap = InputEvent::Tap {
            key: crate::key::Key::alphabet("a"),
            tick: 0,
        };
        let result = editor.process_event(&tap, &mut session, &mut h.ctx());
        assert_eq!(result, EditorResult::Redispatch(tap));
        assert_eq!(session.mode(), &InputMode::InputWait);
        assert!(!session.buffer().is_frozen());
    }
}
