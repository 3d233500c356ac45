//! Notifications emitted to the host.
//!
//! The engine reports each externally visible change as an `InputMsg`. Hosts
//! pass a `MsgSink` into `ImeEngine::process_event`; a `Vec<InputMsg>`
//! records them, a closure reacts to them directly.

use crate::input::InputId;
use crate::key::Key;
use serde::{Deserialize, Serialize};

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputMsgKind {
    ModeChanged,
    PendingChanged,
    CandidateSetChanged,
    CompletionSetChanged,
    CommitRequested,
    CommitUndoRequested,
    SelectionChanged,
    InputListCleared,
    InputListClearCanceled,
    HandModeSwitchRequested,
    EditorActionRequested,
}

/// A change notification with the key and input that caused it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMsg {
    pub kind: InputMsgKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<InputId>,
}

impl InputMsg {
    pub fn new(kind: InputMsgKind) -> Self {
        Self {
            kind,
            key: None,
            input: None,
        }
    }

    pub fn with_key(mut self, key: Option<Key>) -> Self {
        self.key = key;
        self
    }

    pub fn with_input(mut self, input: Option<InputId>) -> Self {
        self.input = input;
        self
    }
}

/// Receiver of engine notifications.
pub trait MsgSink {
    fn on_msg(&mut self, msg: InputMsg);
}

impl MsgSink for Vec<InputMsg> {
    fn on_msg(&mut self, msg: InputMsg) {
        self.push(msg);
    }
}

impl<F> MsgSink for F
where
    F: FnMut(InputMsg),
{
    fn on_msg(&mut self, msg: InputMsg) {
        self(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(sink: &mut dyn MsgSink) {
        sink.on_msg(InputMsg::new(InputMsgKind::ModeChanged));
        sink.on_msg(InputMsg::new(InputMsgKind::CommitRequested).with_key(Some(Key::space())));
    }

    #[test]
    fn test_vec_records() {
        let mut msgs: Vec<InputMsg> = Vec::new();
        emit(&mut msgs);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1].kind, InputMsgKind::CommitRequested);
        assert!(msgs[1].key.is_some());
    }

    #[test]
    fn test_closure_sink() {
        let mut count = 0;
        let mut sink = |_msg: InputMsg| count += 1;
        emit(&mut sink);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_json_shape() {
        let msg = InputMsg::new(InputMsgKind::SelectionChanged);
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"kind":"SelectionChanged"}"#);
    }
}
