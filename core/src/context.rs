//! IME context for platform communication.
//!
//! The `ImeContext` struct is a simple data container with public fields that
//! platforms read after calling `process_event()` on an engine. It reflects
//! the state after the last event: the commit and editor actions of earlier
//! events are not carried over.
//!
//! Design philosophy: Zero abstraction - just data transfer. No callbacks, no
//! traits, no generics. Platform code reads fields directly.

use crate::composition::Composition;
use crate::Handedness;
use serde::{Deserialize, Serialize};

/// Text the host must insert into its text field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Commit {
    /// Plain text. `replacements` are the alternatives a repeated tap on the
    /// same key cycles through; `revocable` is set when the engine keeps an
    /// undo stage for it.
    Text {
        text: String,
        replacements: Vec<String>,
        revocable: bool,
    },
    /// A bracket or quote pair; the host places its caret between them.
    PairSymbol { left: String, right: String },
}

impl Commit {
    pub fn text<T: Into<String>>(text: T, revocable: bool) -> Self {
        Commit::Text {
            text: text.into(),
            replacements: Vec::new(),
            revocable,
        }
    }

    /// The full text inserted by this commit.
    pub fn full_text(&self) -> String {
        match self {
            Commit::Text { text, .. } => text.clone(),
            Commit::PairSymbol { left, right } => format!("{}{}", left, right),
        }
    }
}

/// Cursor and selection actions on the host text, issued in editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditorAction {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    SelectLeft,
    SelectRight,
    SelectAll,
    Copy,
    Paste,
    Cut,
    Backspace,
    Undo,
    Redo,
}

/// IME context for platform communication.
///
/// # Fields
///
/// - `preedit`: Rendered buffer with segments and cursor
/// - `commit`: Text to commit to the application (consume with `take_commit`)
/// - `candidates`: Candidate texts on the current page
/// - `completions`: Rendered completion candidates
/// - `mode_name`: Name of the active input mode
/// - `auxiliary_text`: Optional hint text (e.g., "2/5" for the page indicator)
/// - `editor_actions`: Host text actions requested in editor mode
/// - `hand_mode`: Keyboard handedness
#[derive(Debug, Clone, Default)]
pub struct ImeContext {
    pub preedit: Composition,

    pub commit: Option<Commit>,

    /// Candidate texts of the current page
    pub candidates: Vec<String>,

    /// Current candidate page (0-based)
    pub candidate_page: usize,

    /// Number of candidate pages
    pub candidate_pages: usize,

    pub completions: Vec<String>,

    pub mode_name: String,

    /// Auxiliary text for UI hints (e.g., page numbers)
    pub auxiliary_text: String,

    pub editor_actions: Vec<EditorAction>,

    pub hand_mode: Handedness,
}

impl ImeContext {
    /// Create a new empty IME context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the visible state (preedit, candidates, completions, auxiliary).
    /// Does NOT clear the commit or editor actions.
    pub fn clear(&mut self) {
        self.preedit.clear();
        self.candidates.clear();
        self.candidate_page = 0;
        self.candidate_pages = 0;
        self.completions.clear();
        self.auxiliary_text.clear();
    }

    /// Take the commit, leaving none.
    pub fn take_commit(&mut self) -> Option<Commit> {
        self.commit.take()
    }

    /// Take the requested editor actions.
    pub fn take_editor_actions(&mut self) -> Vec<EditorAction> {
        std::mem::take(&mut self.editor_actions)
    }

    /// Check if there's any visible state (preedit or candidates).
    pub fn has_visible_state(&self) -> bool {
        !self.preedit.is_empty() || !self.candidates.is_empty() || !self.completions.is_empty()
    }

    /// Check if there's text to commit.
    pub fn has_commit(&self) -> bool {
        self.commit.is_some()
    }
}
