//! Input variants held by the composition buffer.
//!
//! - `Gap`: insertion point between inputs, never holds content
//! - `CharInput`: keystrokes plus an optional resolved word and pair link
//! - `ExprInput`: an arithmetic expression owning a nested `InputBuffer`

use crate::input_buffer::InputBuffer;
use crate::key::{Key, KeyLevel, MathOp};
use crate::math;
use crate::word::{InputOption, InputWord};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INPUT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of an input.
///
/// Positions shift on every insert/delete, ids do not. A pending copied from
/// the selected input keeps its id, so confirming it in place preserves
/// pairing links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InputId(u64);

impl InputId {
    pub fn next() -> Self {
        InputId(NEXT_INPUT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Keystrokes with an optional resolved word.
#[derive(Debug, Clone, PartialEq)]
pub struct CharInput {
    id: InputId,
    keys: Vec<Key>,
    word: Option<InputWord>,
    confirmed: bool,
    pair: Option<InputId>,
}

impl CharInput {
    pub fn new() -> Self {
        Self {
            id: InputId::next(),
            keys: Vec::new(),
            word: None,
            confirmed: false,
            pair: None,
        }
    }

    pub fn from_keys(keys: Vec<Key>) -> Self {
        let mut input = Self::new();
        input.keys = keys;
        input
    }

    pub fn from_key(key: Key) -> Self {
        Self::from_keys(vec![key])
    }

    pub fn id(&self) -> InputId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: InputId) {
        self.id = id;
    }

    /// Same content under a fresh id.
    pub fn renewed(&self) -> Self {
        Self {
            id: InputId::next(),
            pair: None,
            ..self.clone()
        }
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn first_key(&self) -> Option<&Key> {
        self.keys.first()
    }

    pub fn last_key(&self) -> Option<&Key> {
        self.keys.last()
    }

    pub fn append_key(&mut self, key: Key) {
        self.keys.push(key);
    }

    pub fn drop_last_key(&mut self) {
        self.keys.pop();
    }

    pub fn replace_last_key(&mut self, key: Key) {
        self.keys.pop();
        self.keys.push(key);
    }

    /// Keep the keys at or below `level`, then append `key`.
    pub fn replace_keys_after_level(&mut self, level: KeyLevel, key: Key) {
        self.keys.retain(|k| k.level <= level);
        self.keys.push(key);
    }

    pub fn set_keys(&mut self, keys: Vec<Key>) {
        self.keys = keys;
    }

    pub fn replace_all_keys(&mut self, key: Key) {
        self.keys.clear();
        self.keys.push(key);
    }

    /// Replace the latest occurrence of `old` with `new`.
    pub fn replace_latest_key(&mut self, old: &Key, new: Key) {
        if let Some(pos) = self.keys.iter().rposition(|k| k == old) {
            self.keys[pos] = new;
        }
    }

    /// Joined key texts, i.e. the spell typed so far.
    pub fn chars(&self) -> String {
        self.keys.iter().map(|k| k.text.as_str()).collect()
    }

    pub fn word(&self) -> Option<&InputWord> {
        self.word.as_ref()
    }

    pub fn has_word(&self) -> bool {
        self.word.is_some()
    }

    /// Set the resolved word; the user has not confirmed it yet.
    pub fn set_word(&mut self, word: Option<InputWord>) {
        self.word = word;
        self.confirmed = false;
    }

    pub fn clear_word(&mut self) {
        self.set_word(None);
    }

    pub fn confirm_word(&mut self) {
        self.confirmed = self.word.is_some();
    }

    pub fn is_word_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn pair(&self) -> Option<InputId> {
        self.pair
    }

    pub(crate) fn set_pair(&mut self, pair: Option<InputId>) {
        self.pair = pair;
    }

    pub fn clear_pair(&mut self) {
        self.pair = None;
    }

    pub fn is_pinyin(&self) -> bool {
        self.word.as_ref().is_some_and(InputWord::is_pinyin)
    }

    pub fn is_latin(&self) -> bool {
        !self.keys.is_empty()
            && !self.is_pinyin()
            && self.keys.iter().all(|k| k.is_alphabet() || k.is_number())
    }

    pub fn is_symbol(&self) -> bool {
        !self.keys.is_empty() && self.keys.iter().all(Key::is_symbol)
    }

    pub fn is_emoji(&self) -> bool {
        self.word.as_ref().is_some_and(InputWord::is_emoji)
            || (!self.keys.is_empty() && self.keys.iter().all(Key::is_emoji))
    }

    pub fn is_space(&self) -> bool {
        self.keys.len() == 1 && self.keys[0].is_space()
    }

    /// Single operator key, not counting the decimal dot.
    pub fn is_math_op(&self) -> bool {
        self.single_math_op().is_some_and(|op| op != MathOp::Dot)
    }

    pub fn single_math_op(&self) -> Option<MathOp> {
        match self.keys.as_slice() {
            [key] => key.math_op(),
            _ => None,
        }
    }

    pub fn is_text_only_word_spell(&self, option: &InputOption) -> bool {
        self.word
            .as_ref()
            .is_some_and(|w| w.is_text_only_spell(option))
    }

    pub fn text(&self, option: &InputOption) -> String {
        match &self.word {
            Some(word) => word.text(option),
            None => self.chars(),
        }
    }
}

impl Default for CharInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Arithmetic expression owning a nested buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprInput {
    id: InputId,
    buffer: Box<InputBuffer>,
}

impl ExprInput {
    pub fn new() -> Self {
        Self {
            id: InputId::next(),
            buffer: Box::new(InputBuffer::nested()),
        }
    }

    pub fn id(&self) -> InputId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: InputId) {
        self.id = id;
    }

    pub fn buffer(&self) -> &InputBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut InputBuffer {
        &mut self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Confirm the nested pending.
    pub fn confirm(&mut self) {
        self.buffer.confirm_pending();
    }

    /// Compact key text of the expression, e.g. `1+2`.
    pub fn expression(&self) -> String {
        self.buffer
            .char_inputs()
            .iter()
            .map(|input| input.chars())
            .collect()
    }

    /// Nested text, with the evaluated result when the expression starts or
    /// ends with `=`.
    pub fn text(&self, option: &InputOption) -> String {
        let mut inputs = self.buffer.char_inputs();
        let is_equal = |input: Option<&&CharInput>| {
            input.and_then(|i| i.single_math_op()) == Some(MathOp::Equal)
        };
        let first_equal = is_equal(inputs.first());
        let last_equal = is_equal(inputs.last());

        let result = if first_equal {
            inputs.remove(0);
            math::evaluate(&inputs)
        } else if last_equal {
            inputs.pop();
            math::evaluate(&inputs)
        } else {
            None
        };

        match result {
            None => self.buffer.text_with(option),
            Some(value) => {
                let value = math::format_result(value);
                if last_equal {
                    format!("{} {}", self.buffer.text_with(option), value)
                } else {
                    value
                }
            }
        }
    }
}

impl Default for ExprInput {
    fn default() -> Self {
        Self::new()
    }
}

/// An entry of the composition buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Gap(InputId),
    Char(CharInput),
    Expr(ExprInput),
}

impl Input {
    pub fn gap() -> Self {
        Input::Gap(InputId::next())
    }

    pub fn id(&self) -> InputId {
        match self {
            Input::Gap(id) => *id,
            Input::Char(input) => input.id(),
            Input::Expr(input) => input.id(),
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self, Input::Gap(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Input::Gap(_) => true,
            Input::Char(input) => input.is_empty(),
            Input::Expr(input) => input.is_empty(),
        }
    }

    pub fn as_char(&self) -> Option<&CharInput> {
        match self {
            Input::Char(input) => Some(input),
            _ => None,
        }
    }

    pub fn as_char_mut(&mut self) -> Option<&mut CharInput> {
        match self {
            Input::Char(input) => Some(input),
            _ => None,
        }
    }

    pub fn as_expr(&self) -> Option<&ExprInput> {
        match self {
            Input::Expr(input) => Some(input),
            _ => None,
        }
    }

    pub fn as_expr_mut(&mut self) -> Option<&mut ExprInput> {
        match self {
            Input::Expr(input) => Some(input),
            _ => None,
        }
    }

    pub fn is_math_expr(&self) -> bool {
        matches!(self, Input::Expr(_))
    }

    pub fn keys(&self) -> &[Key] {
        match self {
            Input::Char(input) => input.keys(),
            _ => &[],
        }
    }

    pub fn word(&self) -> Option<&InputWord> {
        self.as_char().and_then(CharInput::word)
    }

    pub fn pair(&self) -> Option<InputId> {
        self.as_char().and_then(CharInput::pair)
    }

    pub fn is_latin(&self) -> bool {
        self.as_char().is_some_and(CharInput::is_latin)
    }

    pub fn is_pinyin(&self) -> bool {
        self.as_char().is_some_and(CharInput::is_pinyin)
    }

    pub fn is_symbol(&self) -> bool {
        self.as_char().is_some_and(CharInput::is_symbol)
    }

    pub fn is_emoji(&self) -> bool {
        self.as_char().is_some_and(CharInput::is_emoji)
    }

    pub fn is_space(&self) -> bool {
        self.as_char().is_some_and(CharInput::is_space)
    }

    pub fn is_math_op(&self) -> bool {
        self.as_char().is_some_and(CharInput::is_math_op)
    }

    pub fn is_text_only_word_spell(&self, option: &InputOption) -> bool {
        self.as_char()
            .is_some_and(|input| input.is_text_only_word_spell(option))
    }

    /// Joined key texts; empty for gaps and expressions.
    pub fn chars(&self) -> String {
        self.as_char().map(CharInput::chars).unwrap_or_default()
    }

    pub fn text(&self, option: &InputOption) -> String {
        match self {
            Input::Gap(_) => String::new(),
            Input::Char(input) => input.text(option),
            Input::Expr(input) => input.text(option),
        }
    }
}

impl From<CharInput> for Input {
    fn from(input: CharInput) -> Self {
        Input::Char(input)
    }
}

impl From<ExprInput> for Input {
    fn from(input: ExprInput) -> Self {
        Input::Expr(input)
    }
}
