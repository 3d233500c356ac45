//! libcompose-pinyin crate root
//!
//! Pinyin backend of the composing engine: the syllable table, the spell
//! tree the slip and circular-pad gestures walk, and a `Dictionary` over
//! TOML word tables.
//!
//! Public API exported here:
//! - `SpellTree` and `PINYIN_SYLLABLES` from `spell_tree`
//! - `PinyinDictionary` and `WordTable` from `dictionary`
//! - `PinyinConfig` from `config`
//! - `Replayer` from `replay`

pub mod config;
pub mod dictionary;
pub mod replay;
pub mod spell_tree;

// Re-export the engine surface from core so callers need one crate.
pub use libcompose_core::{
    Commit, Config, Dictionary, ImeContext, ImeEngine, InputEvent, InputMsg, InputMsgKind,
    KeyResult, MsgSink,
};

// Convenience re-exports for common types used by callers.
pub use config::PinyinConfig;
pub use dictionary::{PinyinDictionary, WordEntry, WordTable};
pub use replay::{committed_text, load_script, parse_script, ReplayStep, Replayer};
pub use spell_tree::{SpellTree, PINYIN_SYLLABLES};
