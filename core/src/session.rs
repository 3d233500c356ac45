//! IME session management.
//!
//! The `ImeSession` owns everything that lives across events: the input
//! buffer, the current input mode with the stack of modes it was entered
//! from, and the candidate list of the choose mode. Handlers mutate it; the
//! engine renders it into an `ImeContext` after each event.

use crate::candidate::{CandidateFilter, CandidateList};
use crate::composition::Composition;
use crate::context::{EditorAction, ImeContext};
use crate::input::InputId;
use crate::input_buffer::InputBuffer;
use crate::key::Key;
use crate::word::InputOption;
use crate::Config;

/// Level state of a slip or circular-pad gesture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlipState {
    pub level0: Option<Key>,
    pub level1: Option<Key>,
    pub level2: Option<Key>,
    /// Level-2 continuations offered after the level-1 key
    pub level2_next: Vec<String>,
}

impl SlipState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Spells offered after flipping a level-0 key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlipState {
    pub start: String,
    /// Remaining chars of every spell starting with `start`
    pub spells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChooseState {
    /// Input whose candidates are shown
    pub target: InputId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub target: InputId,
    pub filter: CandidateFilter,
    /// Spells to pick from, in rank order
    pub spells: Vec<String>,
    pub page: usize,
    pub page_size: usize,
}

impl FilterState {
    pub fn num_pages(&self) -> usize {
        self.spells.len().div_ceil(self.page_size.max(1))
    }

    pub fn page_spells(&self) -> &[String] {
        let size = self.page_size.max(1);
        let start = (self.page * size).min(self.spells.len());
        let end = (start + size).min(self.spells.len());
        &self.spells[start..end]
    }

    pub fn page_up(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn page_down(&mut self) -> bool {
        if self.page + 1 < self.num_pages() {
            self.page += 1;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOptionState {
    /// Buffer option before the mode was entered
    pub old_option: Option<InputOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorEditState {
    pub last_action: Option<EditorAction>,
}

/// Current input mode of the IME session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Waiting for taps; the direct input mode
    #[default]
    InputWait,
    /// Progressive slip over the level keys
    Slip(SlipState),
    /// Spells of a flipped key on display
    Flip(FlipState),
    CircularPadInput(SlipState),
    CandidateChoose(ChooseState),
    AdvanceFilter(FilterState),
    CommitOptionChoose(CommitOptionState),
    EditorEdit(EditorEditState),
    /// Nested arithmetic sub-composition
    ArithmeticInput,
}

impl InputMode {
    pub fn name(&self) -> &'static str {
        match self {
            InputMode::InputWait => "InputWait",
            InputMode::Slip(_) => "Slip",
            InputMode::Flip(_) => "Flip",
            InputMode::CircularPadInput(_) => "CircularPadInput",
            InputMode::CandidateChoose(_) => "CandidateChoose",
            InputMode::AdvanceFilter(_) => "AdvanceFilter",
            InputMode::CommitOptionChoose(_) => "CommitOptionChoose",
            InputMode::EditorEdit(_) => "EditorEdit",
            InputMode::ArithmeticInput => "ArithmeticInput",
        }
    }

    /// Whether both modes are the same variant, ignoring their state.
    pub fn same_kind(&self, other: &InputMode) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// IME session state combining all session components.
#[derive(Debug, Clone, Default)]
pub struct ImeSession {
    buffer: InputBuffer,

    mode: InputMode,

    /// Modes to return to, innermost last
    previous: Vec<InputMode>,

    candidates: CandidateList,
}

impl ImeSession {
    /// Create a new empty session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &InputBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut InputBuffer {
        &mut self.buffer
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    pub fn candidates_mut(&mut self) -> &mut CandidateList {
        &mut self.candidates
    }

    pub fn mode(&self) -> &InputMode {
        &self.mode
    }

    pub fn mode_mut(&mut self) -> &mut InputMode {
        &mut self.mode
    }

    /// The mode `pop_mode` would return to.
    pub fn previous_mode(&self) -> Option<&InputMode> {
        self.previous.last()
    }

    pub fn previous_mode_mut(&mut self) -> Option<&mut InputMode> {
        self.previous.last_mut()
    }

    /// Replace the current mode, keeping the stack.
    pub fn set_mode(&mut self, mode: InputMode) {
        self.mode = mode;
    }

    /// Enter `mode`, remembering the current one.
    pub fn push_mode(&mut self, mode: InputMode) {
        let current = std::mem::replace(&mut self.mode, mode);
        self.previous.push(current);
    }

    /// Return to the mode this one was entered from, or `InputWait`.
    ///
    /// Stacked modes of the same kind as the current one are skipped.
    pub fn pop_mode(&mut self) {
        while let Some(mode) = self.previous.pop() {
            if !mode.same_kind(&self.mode) {
                self.mode = mode;
                return;
            }
        }
        self.mode = InputMode::InputWait;
    }

    /// Enter `mode` with an empty stack.
    pub fn enter_mode(&mut self, mode: InputMode) {
        self.previous.clear();
        self.mode = mode;
    }

    /// Back to `InputWait` with an empty stack.
    pub fn reset_mode(&mut self) {
        self.enter_mode(InputMode::InputWait);
    }

    /// Clear all session state and return to `InputWait`.
    pub fn clear(&mut self) {
        self.buffer = InputBuffer::new();
        self.candidates.clear();
        self.reset_mode();
    }

    /// Sync session state to an ImeContext for platform communication.
    ///
    /// The commit and editor actions are left alone; the engine owns them.
    pub fn sync_to_context(&self, context: &mut ImeContext, config: &Config) {
        context.clear();

        let option = self.buffer.option().unwrap_or_else(|| config.render_option());
        context.preedit = Composition::from_buffer(&self.buffer, &option);
        context.mode_name = self.mode.name().to_string();
        context.hand_mode = config.handedness;

        if let Some(completions) = self.buffer.completions() {
            context.completions = completions.texts(&option);
        }

        match &self.mode {
            InputMode::CandidateChoose(_) => {
                context.candidates = self
                    .candidates
                    .current_page_candidates()
                    .iter()
                    .map(|word| word.text(&option))
                    .collect();
                context.candidate_page = self.candidates.current_page();
                context.candidate_pages = self.candidates.num_pages();
            }
            InputMode::AdvanceFilter(state) => {
                context.candidates = state.page_spells().to_vec();
                context.candidate_page = state.page;
                context.candidate_pages = state.num_pages();
            }
            InputMode::Flip(state) => {
                context.candidates = state
                    .spells
                    .iter()
                    .map(|rest| format!("{}{}", state.start, rest))
                    .collect();
                context.candidate_pages = usize::from(!state.spells.is_empty());
            }
            InputMode::Slip(state) | InputMode::CircularPadInput(state) => {
                context.candidates = state.level2_next.clone();
            }
            _ => {}
        }

        // Page indicator, 1-indexed for display
        if context.candidate_pages > 1 {
            context.auxiliary_text =
                format!("{}/{}", context.candidate_page + 1, context.candidate_pages);
        }
    }
}
