//! libcompose-core
//!
//! Composing-input engine of a gesture-driven ideographic input method,
//! shared by language-specific backends (libpinyin).
//!
//! Events from the keyboard are turned into an editable buffer of inputs
//! (syllables, symbols, emojis, arithmetic expressions) that the user
//! refines before committing it as text to the host.
//!
//! Public API:
//! - `InputBuffer` - Ordered inputs with a cursor, pending edit and undo stage
//! - `ImeEngine` - Event dispatch over the input modes
//! - `Dictionary` - Port to the word source, implemented by backends
//! - `MsgSink` - Notifications to the host
//! - `ImeContext` - Host-facing view after each event
//! - `Config` - Configuration and feature flags
use serde::{Deserialize, Serialize};

// Input model
pub mod key;
pub use key::{Key, KeyKind, KeyLevel, MathOp};

pub mod word;
pub use word::{InputOption, InputWord, SpellUsedMode, WordKind};

pub mod input;
pub use input::{CharInput, ExprInput, Input, InputId};

pub mod input_buffer;
pub use input_buffer::{InputBuffer, StagedKind};

pub mod phrase;

pub mod completion;
pub use completion::{Completion, CompletionKind, Completions};

pub mod math;

// Ports
pub mod dict;
pub use dict::{Dictionary, MemoryDictionary};

pub mod notify;
pub use notify::{InputMsg, InputMsgKind, MsgSink};

// IME modules
pub mod candidate;
pub use candidate::{CandidateFilter, CandidateList};

pub mod composition;
pub use composition::{Composition, Segment};

pub mod context;
pub use context::{Commit, EditorAction, ImeContext};

pub mod session;
pub use session::{ImeSession, InputMode};

pub mod editor;
pub use editor::{Editor, EditorResult};

pub mod ime_engine;
pub use ime_engine::{CommitOption, CtrlKey, ImeEngine, InputEvent, KeyResult, SpellToggle};

/// Script form words are rendered in when both exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ScriptVariant {
    #[default]
    Simplified,
    Traditional,
}

/// Hand the keyboard layout is arranged for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Handedness {
    Left,
    #[default]
    Right,
}

/// Configuration of the composing engine.
///
/// The engine takes a snapshot at construction; hosts push changes with
/// `ImeEngine::update_config`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Render word variants (e.g. traditional forms) unless the buffer
    /// chose otherwise
    pub preferred_script_variant: ScriptVariant,

    pub handedness: Handedness,

    /// Enter commits the buffer instead of confirming the pending
    pub single_line_mode: bool,

    // Candidate Selection
    /// Candidates per page while choosing
    pub candidate_page_size: usize,
    /// Best matches merged into the first page
    pub best_candidate_count: usize,
    /// Spells per page of the advance filter
    pub advance_filter_page_size: usize,
    /// Emojis merged into the first page
    pub emoji_candidate_count: usize,

    // Completions
    /// Latin word completions offered for a Latin pending
    pub latin_completion_top: usize,
    /// Alternative phrases offered after a phrase is predicted
    pub phrase_completion_top: usize,

    /// Type syllables on the circular pad instead of slipping
    pub circular_pad_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preferred_script_variant: ScriptVariant::Simplified,
            handedness: Handedness::Right,
            single_line_mode: false,
            candidate_page_size: 20,
            best_candidate_count: 7,
            advance_filter_page_size: 12,
            emoji_candidate_count: 4,
            latin_completion_top: 5,
            phrase_completion_top: 3,
            circular_pad_enabled: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        use anyhow::Context;

        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        use anyhow::Context;

        let path = path.as_ref();
        let content = toml::to_string_pretty(self).context("serialize config")?;
        std::fs::write(path, content).with_context(|| format!("write config {}", path.display()))?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    // ========== Hand Mode ==========

    pub fn set_handedness(&mut self, handedness: Handedness) {
        self.handedness = handedness;
    }

    /// Switch between the left- and right-hand layouts.
    pub fn toggle_handedness(&mut self) {
        self.handedness = match self.handedness {
            Handedness::Left => Handedness::Right,
            Handedness::Right => Handedness::Left,
        };
    }

    /// Rendering option of a buffer that has not chosen one.
    pub fn render_option(&self) -> InputOption {
        InputOption::new(
            None,
            self.preferred_script_variant == ScriptVariant::Traditional,
        )
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }
}
