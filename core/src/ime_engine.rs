//! IME engine with session management and event processing.
//!
//! The `ImeEngine` owns the session and one editor per input mode. Each
//! event first goes through the control keys every mode shares, then to the
//! editor of the current mode. An editor may hand the event over to another
//! mode; the engine dispatches it again until some editor settles it. After
//! the event the engine reports what changed to the host's `MsgSink` and
//! syncs the `ImeContext`.

use crate::candidate::CandidateList;
use crate::completion::Completions;
use crate::context::{Commit, EditorAction, ImeContext};
use crate::dict::Dictionary;
use crate::editor::{
    candidate, ArithmeticEditor, CandidateEditor, CircularPadEditor, CommitOptionEditor,
    DirectEditor, Editor, EditorContext, EditorResult, FilterEditor, FlipEditor, HostEditor,
    SlipEditor,
};
use crate::input::{Input, InputId};
use crate::key::Key;
use crate::notify::{InputMsg, InputMsgKind, MsgSink};
use crate::session::{ImeSession, InputMode};
use crate::Config;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, debug_span, warn};

/// How many times one event may be handed over between modes.
const MAX_REDISPATCH: usize = 4;

/// Events the IME can process.
///
/// Gestures arrive already resolved to keys: a tap, the keys crossed by a
/// slip, the keys hit on the circular pad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Single tap. `tick` counts repeated taps on the same key.
    Tap {
        key: Key,
        #[serde(default)]
        tick: u32,
    },
    /// Tap on a key producing a symbol pair
    PairTap { left: Key, right: Key },
    SlipStart(Key),
    SlipMove(Key),
    SlipStop,
    /// Show every spell starting with a level-0 key
    Flip(Key),
    PadTap(Key),
    PadStop,
    /// Choose a candidate by its index on the current page
    ChooseCandidate(usize),
    ApplyCompletion(usize),
    Ctrl(CtrlKey),
}

impl InputEvent {
    fn key(&self) -> Option<&Key> {
        match self {
            InputEvent::Tap { key, .. }
            | InputEvent::PairTap { left: key, .. }
            | InputEvent::SlipStart(key)
            | InputEvent::SlipMove(key)
            | InputEvent::Flip(key)
            | InputEvent::PadTap(key) => Some(key),
            _ => None,
        }
    }
}

/// Control keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CtrlKey {
    Backspace,
    Space,
    Enter,
    /// Commit the buffer
    Commit,
    /// Long press on commit: choose how spells and variants are committed
    CommitOptions,
    CommitOption(CommitOption),
    RevokeCommit,
    ClearInputs,
    CancelClear,
    /// Delete the selected input
    DropInput,
    ChooseInput(InputId),
    Exit,
    PageUp,
    PageDown,
    ToggleSpell(SpellToggle),
    FilterBySpell(String),
    AdvanceFilter,
    ConfirmFilter,
    Arithmetic,
    SwitchHandMode,
    EditorEdit,
    EditorAction(EditorAction),
}

/// Commit option switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitOption {
    /// Commit the spells instead of the words
    OnlySpell,
    /// Commit each word followed by its spell
    WithSpell,
    /// Commit the variant forms of the words
    SwitchVariant,
}

/// Spell corrections offered while choosing candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellToggle {
    /// `n` <-> `ng` final
    NgEnding,
    /// `n` <-> `l` initial
    NlStart,
    /// `s/c/z` <-> `sh/ch/zh` initial
    SczStart,
}

/// Result of processing an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Event was handled by the IME
    Handled,
    /// Event was not handled (pass through to the host)
    NotHandled,
}

/// One editor per input mode.
struct Editors {
    direct: DirectEditor,
    slip: SlipEditor,
    flip: FlipEditor,
    circular_pad: CircularPadEditor,
    candidate: CandidateEditor,
    filter: FilterEditor,
    arithmetic: ArithmeticEditor,
    commit_option: CommitOptionEditor,
    host: HostEditor,
}

impl Editors {
    fn new(dict: &Arc<dyn Dictionary>) -> Self {
        Self {
            direct: DirectEditor::new(dict.clone()),
            slip: SlipEditor::new(dict.clone()),
            flip: FlipEditor::new(dict.clone()),
            circular_pad: CircularPadEditor::new(dict.clone()),
            candidate: CandidateEditor::new(dict.clone()),
            filter: FilterEditor::new(),
            arithmetic: ArithmeticEditor::new(),
            commit_option: CommitOptionEditor::new(),
            host: HostEditor::new(),
        }
    }

    fn for_mode(&mut self, mode: &InputMode) -> &mut dyn Editor {
        match mode {
            InputMode::InputWait => &mut self.direct,
            InputMode::Slip(_) => &mut self.slip,
            InputMode::Flip(_) => &mut self.flip,
            InputMode::CircularPadInput(_) => &mut self.circular_pad,
            InputMode::CandidateChoose(_) => &mut self.candidate,
            InputMode::AdvanceFilter(_) => &mut self.filter,
            InputMode::CommitOptionChoose(_) => &mut self.commit_option,
            InputMode::EditorEdit(_) => &mut self.host,
            InputMode::ArithmeticInput => &mut self.arithmetic,
        }
    }
}

/// Visible session state, compared before and after an event.
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    mode: InputMode,
    selected: InputId,
    pending: Input,
    completions: Option<Completions>,
    candidates: CandidateList,
}

impl Snapshot {
    fn of(session: &ImeSession) -> Self {
        let buffer = session.buffer();
        Self {
            mode: session.mode().clone(),
            selected: buffer.selected_id(),
            pending: buffer.pending().clone(),
            completions: buffer.completions().cloned(),
            candidates: session.candidates().clone(),
        }
    }
}

/// IME engine with session management.
pub struct ImeEngine {
    dict: Arc<dyn Dictionary>,
    config: Config,
    editors: Editors,

    /// Session state
    session: ImeSession,

    /// Context for platform communication
    context: ImeContext,
}

impl ImeEngine {
    /// Create an engine over `dict`.
    pub fn new(dict: Arc<dyn Dictionary>, config: Config) -> Self {
        let mut session = ImeSession::new();
        session
            .candidates_mut()
            .set_page_size(config.candidate_page_size);
        Self {
            editors: Editors::new(&dict),
            dict,
            config,
            session,
            context: ImeContext::new(),
        }
    }

    /// Get a reference to the context for reading IME state.
    pub fn context(&self) -> &ImeContext {
        &self.context
    }

    /// Get a mutable reference to the context.
    pub fn context_mut(&mut self) -> &mut ImeContext {
        &mut self.context
    }

    /// Get a reference to the session.
    pub fn session(&self) -> &ImeSession {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the configuration. The session keeps its state.
    pub fn update_config(&mut self, config: Config) {
        self.session
            .candidates_mut()
            .set_page_size(config.candidate_page_size);
        self.config = config;
        self.session.sync_to_context(&mut self.context, &self.config);
    }

    /// Reset the IME to initial state.
    pub fn reset(&mut self) {
        self.session.clear();
        self.session
            .candidates_mut()
            .set_page_size(self.config.candidate_page_size);
        self.context = ImeContext::new();
        self.session.sync_to_context(&mut self.context, &self.config);
    }

    /// Process an event and update IME state.
    ///
    /// This is the main entry point for IME interaction. Changes are reported
    /// to `sink` as they are settled; afterwards the platform reads
    /// `context()` for the preedit, the candidates and the commit.
    ///
    /// Returns `KeyResult::NotHandled` if no mode consumed the event.
    pub fn process_event(&mut self, event: InputEvent, sink: &mut dyn MsgSink) -> KeyResult {
        let span = debug_span!("process_event", mode = self.session.mode().name());
        let _enter = span.enter();

        self.context.commit = None;
        self.context.editor_actions.clear();
        if !matches!(
            event,
            InputEvent::Ctrl(CtrlKey::CancelClear | CtrlKey::RevokeCommit)
        ) {
            self.session.buffer_mut().clear_staged();
        }

        let before = Snapshot::of(&self.session);
        let trigger = event.key().cloned();
        let mut editor_actions = Vec::new();

        let mut event = event;
        let mut result = EditorResult::PassThrough;
        for _ in 0..MAX_REDISPATCH {
            result = match self.process_common(&event, sink) {
                Some(result) => result,
                None => {
                    let editor = self.editors.for_mode(self.session.mode());
                    debug!(editor = editor.name(), ?event, "dispatch");
                    let mut ctx = EditorContext {
                        config: &self.config,
                        sink: &mut *sink,
                        editor_actions: &mut editor_actions,
                    };
                    editor.process_event(&event, &mut self.session, &mut ctx)
                }
            };
            match result {
                EditorResult::Redispatch(ref next) => event = next.clone(),
                _ => break,
            }
        }

        let handled = match result {
            EditorResult::Commit(commit) => {
                debug!(?commit, "commit from editor");
                self.context.commit = Some(commit);
                sink.on_msg(InputMsg::new(InputMsgKind::CommitRequested).with_key(trigger.clone()));
                true
            }
            EditorResult::Redispatch(event) => {
                warn!(?event, "event dispatched too many times");
                true
            }
            EditorResult::Handled => true,
            EditorResult::PassThrough => false,
        };

        self.notify_changes(&before, trigger.as_ref(), sink);
        self.session.sync_to_context(&mut self.context, &self.config);
        self.context.editor_actions = editor_actions;

        if handled {
            KeyResult::Handled
        } else {
            KeyResult::NotHandled
        }
    }

    /// Control keys that act the same in every mode.
    fn process_common(&mut self, event: &InputEvent, sink: &mut dyn MsgSink) -> Option<EditorResult> {
        let InputEvent::Ctrl(key) = event else {
            return None;
        };

        match key {
            CtrlKey::Commit => {
                self.commit(sink);
            }
            CtrlKey::DropInput => {
                let buffer = self.session.buffer_mut();
                buffer.delete_selected();
                buffer.clear_completions();
                self.session.reset_mode();
            }
            CtrlKey::RevokeCommit => {
                if !self.session.buffer_mut().revoke_commit() {
                    debug!("no commit to revoke");
                    return Some(EditorResult::Handled);
                }
                sink.on_msg(InputMsg::new(InputMsgKind::CommitUndoRequested));
                let selected = self.session.buffer().selected_id();
                candidate::start_choosing(self.dict.as_ref(), &self.config, &mut self.session, selected);
            }
            CtrlKey::SwitchHandMode => {
                self.config.toggle_handedness();
                debug!(handedness = ?self.config.handedness, "switch hand mode");
                sink.on_msg(InputMsg::new(InputMsgKind::HandModeSwitchRequested));
            }
            CtrlKey::ClearInputs => {
                self.session.buffer_mut().reset(true);
                self.session.candidates_mut().clear();
                self.session.reset_mode();
                sink.on_msg(InputMsg::new(InputMsgKind::InputListCleared));
            }
            CtrlKey::CancelClear => {
                if self.session.buffer_mut().cancel_delete() {
                    sink.on_msg(InputMsg::new(InputMsgKind::InputListClearCanceled));
                }
            }
            _ => return None,
        }
        Some(EditorResult::Handled)
    }

    fn commit(&mut self, sink: &mut dyn MsgSink) {
        let buffer = self.session.buffer_mut();
        buffer.freeze(false);
        if buffer.option().is_none() {
            buffer.set_option(Some(self.config.render_option()));
        }

        let commit = if buffer.has_only_one_pair_inputs() {
            let option = buffer.effective_option();
            let texts: Vec<String> = buffer
                .char_inputs()
                .iter()
                .map(|input| input.text(&option))
                .collect();
            buffer.reset(false);
            match texts.as_slice() {
                [left, right] => Some(Commit::PairSymbol {
                    left: left.clone(),
                    right: right.clone(),
                }),
                _ => None,
            }
        } else if buffer.is_empty() {
            None
        } else {
            Some(Commit::text(buffer.commit(true), true))
        };

        self.session.candidates_mut().clear();
        self.session.reset_mode();
        if let Some(commit) = commit {
            debug!(?commit, "commit buffer");
            self.context.commit = Some(commit);
            sink.on_msg(InputMsg::new(InputMsgKind::CommitRequested));
        }
    }

    fn notify_changes(&self, before: &Snapshot, key: Option<&Key>, sink: &mut dyn MsgSink) {
        let after = Snapshot::of(&self.session);
        if *before == after {
            return;
        }

        let msg = |kind: InputMsgKind, input: Option<InputId>| {
            InputMsg::new(kind).with_key(key.cloned()).with_input(input)
        };
        if !before.mode.same_kind(&after.mode) {
            sink.on_msg(msg(InputMsgKind::ModeChanged, None));
        }
        if before.selected != after.selected {
            sink.on_msg(msg(InputMsgKind::SelectionChanged, Some(after.selected)));
        }
        if before.pending != after.pending {
            sink.on_msg(msg(InputMsgKind::PendingChanged, Some(after.pending.id())));
        }
        if before.completions != after.completions {
            sink.on_msg(msg(InputMsgKind::CompletionSetChanged, None));
        }
        let state_changed = before.mode.same_kind(&after.mode) && before.mode != after.mode;
        if before.candidates != after.candidates || state_changed {
            sink.on_msg(msg(InputMsgKind::CandidateSetChanged, None));
        }
    }
}
