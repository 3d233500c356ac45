//! Arithmetic input: numbers and operators typed into the nested buffer of
//! an expression input.
//!
//! While the mode is active the outer pending is always an `ExprInput`.
//! Char events edit its nested buffer; anything that is not arithmetic
//! confirms the expression outward and goes back to `InputWait`.

use super::{Editor, EditorContext, EditorResult};
use crate::context::{Commit, EditorAction};
use crate::ime_engine::{CtrlKey, InputEvent};
use crate::input::{CharInput, ExprInput, Input, InputId};
use crate::input_buffer::InputBuffer;
use crate::key::{Key, MathOp};
use crate::session::{ImeSession, InputMode};
use tracing::{debug, trace};

/// Editor of the `ArithmeticInput` mode.
#[derive(Debug, Default)]
pub struct ArithmeticEditor;

/// Enter arithmetic mode on the current cursor.
///
/// A selected expression is edited again; elsewhere a new empty
/// expression becomes the pending.
pub(crate) fn start(session: &mut ImeSession) {
    let buffer = session.buffer_mut();
    buffer.clear_completions();
    let editing_expr = buffer.selected().is_math_expr()
        && (buffer.pending().is_empty() || buffer.pending().is_math_expr());
    if !editing_expr {
        buffer.confirm_pending_and_select_next();
    }
    ensure_expr_pending(buffer);
    session.enter_mode(InputMode::ArithmeticInput);
    debug!("start arithmetic input");
}

fn ensure_expr_pending(buffer: &mut InputBuffer) {
    if buffer.pending().is_math_expr() {
        return;
    }
    let expr = match buffer.selected().as_expr() {
        Some(expr) => expr.clone(),
        None => ExprInput::new(),
    };
    buffer.with_pending(expr.into());
}

/// Confirm the expression outward and return to `InputWait`.
fn leave(session: &mut ImeSession) {
    let buffer = session.buffer_mut();
    if let Some(expr) = buffer.pending_mut().as_expr_mut() {
        expr.confirm();
    }
    if buffer.pending().is_math_expr() || buffer.selected().is_math_expr() {
        buffer.confirm_pending_and_select_next();
    }
    session.reset_mode();
    trace!("leave arithmetic input");
}

fn nested_mut(session: &mut ImeSession) -> Option<&mut InputBuffer> {
    session
        .buffer_mut()
        .pending_mut()
        .as_expr_mut()
        .map(ExprInput::buffer_mut)
}

fn is_number(input: &CharInput) -> bool {
    !input.is_empty()
        && input
            .keys()
            .iter()
            .all(|key| key.is_number() || key.is_math_op(MathOp::Dot))
}

/// The nested pending to append a digit or a dot to.
fn number_pending(buffer: &mut InputBuffer) -> &mut CharInput {
    let continues = buffer
        .char_pending()
        .is_some_and(|pending| pending.is_empty() || is_number(pending));
    if continues {
        return buffer.char_pending_or_new();
    }
    if buffer.is_gap_selected() {
        buffer.confirm_pending_and_select_next();
    }
    buffer.new_pending()
}

/// Insert `key` as a confirmed single-key input at the nested cursor.
fn insert_single(buffer: &mut InputBuffer, key: Key) {
    if buffer.is_gap_selected() {
        buffer.confirm_pending_and_select_next();
    }
    buffer.new_pending().append_key(key);
    buffer.confirm_pending_and_select_next();
}

/// Put an arithmetic key into the nested buffer. Returns `false` when the
/// key is not arithmetic.
fn input_key(buffer: &mut InputBuffer, key: &Key) -> bool {
    if key.is_number() {
        number_pending(buffer).append_key(key.clone());
        return true;
    }

    let Some(op) = key.math_op() else {
        return false;
    };
    match op {
        MathOp::Dot => {
            let pending = number_pending(buffer);
            if !pending.keys().iter().any(|k| k.is_math_op(MathOp::Dot)) {
                pending.append_key(key.clone());
            }
        }
        MathOp::Brackets => {
            buffer.prepare_pair_inputting(Key::bracket("("), Key::bracket(")"));
        }
        MathOp::Equal => {
            let at_start = buffer.is_gap_selected() && buffer.selected_index() <= 1;
            if !at_start {
                buffer.confirm_pending_and_select_last();
            }
            insert_single(buffer, key.clone());
        }
        _ => insert_single(buffer, key.clone()),
    }
    true
}

impl ArithmeticEditor {
    pub fn new() -> Self {
        Self
    }

    fn on_backspace(&mut self, session: &mut ImeSession, ctx: &mut EditorContext<'_>) -> EditorResult {
        // an expression emptied by this press stays until the next one
        let edited = match nested_mut(session) {
            Some(nested) if !nested.is_empty() => {
                nested.delete_backward();
                Some(())
            }
            _ => None,
        };

        let buffer = session.buffer_mut();
        match edited {
            Some(_) => {}
            None if buffer.is_empty() => {
                ctx.request_editor_action(EditorAction::Backspace);
            }
            None if buffer.selected().is_math_expr() => buffer.delete_selected(),
            None => {
                buffer.drop_pending();
                buffer.delete_backward();
            }
        }
        ensure_expr_pending(session.buffer_mut());
        EditorResult::Handled
    }

    fn on_space(&mut self, session: &mut ImeSession) -> EditorResult {
        let buffer = session.buffer_mut();
        if let Some(expr) = buffer.pending_mut().as_expr_mut() {
            expr.confirm();
        }
        buffer.confirm_pending_and_select_next();

        if buffer.is_empty() {
            session.reset_mode();
            return EditorResult::Commit(Commit::text(" ", false));
        }
        buffer.new_pending().append_key(Key::space());
        buffer.confirm_pending_and_select_next();
        ensure_expr_pending(buffer);
        EditorResult::Handled
    }

    fn on_choose_input(&mut self, session: &mut ImeSession, id: InputId) -> EditorResult {
        if let Some(nested) = nested_mut(session) {
            if nested.contains(id) {
                nested.confirm_pending_and_select(id, false);
                return EditorResult::Handled;
            }
        }

        let buffer = session.buffer_mut();
        if buffer.input(id).is_some_and(Input::is_math_expr) {
            if let Some(expr) = buffer.pending_mut().as_expr_mut() {
                expr.confirm();
            }
            buffer.select(id);
            ensure_expr_pending(buffer);
            return EditorResult::Handled;
        }

        leave(session);
        EditorResult::Redispatch(InputEvent::Ctrl(CtrlKey::ChooseInput(id)))
    }
}

impl Editor for ArithmeticEditor {
    fn process_event(
        &mut self,
        event: &InputEvent,
        session: &mut ImeSession,
        ctx: &mut EditorContext<'_>,
    ) -> EditorResult {
        match event {
            InputEvent::Tap { key, .. } => {
                let handled = match nested_mut(session) {
                    Some(nested) => input_key(nested, key),
                    None => false,
                };
                if handled {
                    return EditorResult::Handled;
                }
                leave(session);
                EditorResult::Redispatch(event.clone())
            }
            InputEvent::PairTap { .. }
            | InputEvent::SlipStart(_)
            | InputEvent::PadTap(_)
            | InputEvent::Ctrl(CtrlKey::Enter) => {
                leave(session);
                EditorResult::Redispatch(event.clone())
            }
            InputEvent::Ctrl(CtrlKey::Backspace) => self.on_backspace(session, ctx),
            InputEvent::Ctrl(CtrlKey::Space) => self.on_space(session),
            InputEvent::Ctrl(CtrlKey::Exit | CtrlKey::Arithmetic) => {
                leave(session);
                EditorResult::Handled
            }
            InputEvent::Ctrl(CtrlKey::ChooseInput(id)) => self.on_choose_input(session, *id),
            _ => EditorResult::PassThrough,
        }
    }

    fn name(&self) -> &'static str {
        "arithmetic"
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;

    fn tap(editor: &mut ArithmeticEditor, session: &mut ImeSession, h: &mut Harness, key: Key) -> EditorResult {
        editor.process_event(&InputEvent::Tap { key, tick: 0 }, session, &mut h.ctx())
    }

    fn ctrl(editor: &mut ArithmeticEditor, session: &mut ImeSession, h: &mut Harness, key: CtrlKey) -> EditorResult {
        editor.process_event(&InputEvent::Ctrl(key), session, &mut h.ctx())
    }

    /// Chars of the confirmed nested inputs.
    fn nested_chars(session: &ImeSession) -> Vec<String> {
        match session.buffer().pending().as_expr() {
            Some(expr) => expr.buffer().char_inputs().iter().map(|i| i.chars()).collect(),
            None => Vec::new(),
        }
    }

    #[test]
    fn test_one_plus_two() {
        let mut editor = ArithmeticEditor::new();
        let mut session = ImeSession::new();
        let mut h = Harness::new();

        start(&mut session);
        assert_eq!(session.mode(), &InputMode::ArithmeticInput);
        tap(&mut editor, &mut session, &mut h, Key::number("1"));
        tap(&mut editor, &mut session, &mut h, Key::math(MathOp::Plus));
        tap(&mut editor, &mut session, &mut h, Key::number("2"));
        assert_eq!(nested_chars(&session), vec!["1", "+"]);

        ctrl(&mut editor, &mut session, &mut h, CtrlKey::Exit);
        assert_eq!(session.mode(), &InputMode::InputWait);

        let buffer = session.buffer();
        let exprs: Vec<&ExprInput> = buffer.inputs().iter().filter_map(Input::as_expr).collect();
        assert_eq!(exprs.len(), 1);
        assert_eq!(exprs[0].expression(), "1+2");
        assert_eq!(buffer.text(), "1 + 2");
        assert!(buffer.is_gap_selected());
    }

    #[test]
    fn test_equal_appends_result() {
        let mut editor = ArithmeticEditor::new();
        let mut session = ImeSession::new();
        let mut h = Harness::new();

        start(&mut session);
        for key in [
            Key::number("1"),
            Key::number("2"),
            Key::math(MathOp::Multiply),
            Key::number("3"),
            Key::math(MathOp::Equal),
        ] {
            tap(&mut editor, &mut session, &mut h, key);
        }
        ctrl(&mut editor, &mut session, &mut h, CtrlKey::Exit);
        assert!(session.buffer().text().ends_with(" 36"));
    }

    #[test]
    fn test_single_dot() {
        let mut editor = ArithmeticEditor::new();
        let mut session = ImeSession::new();
        let mut h = Harness::new();

        start(&mut session);
        tap(&mut editor, &mut session, &mut h, Key::number("1"));
        tap(&mut editor, &mut session, &mut h, Key::math(MathOp::Dot));
        tap(&mut editor, &mut session, &mut h, Key::math(MathOp::Dot));
        tap(&mut editor, &mut session, &mut h, Key::number("5"));

        let nested = session.buffer().pending().as_expr().map(|e| e.buffer().clone());
        let pending = nested.as_ref().and_then(|n| n.char_pending()).map(CharInput::chars);
        assert_eq!(pending.as_deref(), Some("1.5"));
    }

    #[test]
    fn test_brackets_pair() {
        let mut editor = ArithmeticEditor::new();
        let mut session = ImeSession::new();
        let mut h = Harness::new();

        start(&mut session);
        tap(&mut editor, &mut session, &mut h, Key::bracket("("));
        assert_eq!(nested_chars(&session), vec!["(", ")"]);
        tap(&mut editor, &mut session, &mut h, Key::number("4"));
        tap(&mut editor, &mut session, &mut h, Key::math(MathOp::Plus));
        assert_eq!(nested_chars(&session), vec!["(", "4", "+", ")"]);
    }

    #[test]
    fn test_backspace_escalates() {
        let mut editor = ArithmeticEditor::new();
        let mut session = ImeSession::new();
        let mut h = Harness::new();

        start(&mut session);
        tap(&mut editor, &mut session, &mut h, Key::number("7"));
        ctrl(&mut editor, &mut session, &mut h, CtrlKey::Exit);
        assert!(!session.buffer().is_empty());

        // Back into the expression, then delete it digit by digit.
        let id = session.buffer().inputs()[1].id();
        session.buffer_mut().select(id);
        start(&mut session);
        ctrl(&mut editor, &mut session, &mut h, CtrlKey::Backspace);
        assert!(session.buffer().is_empty());
        assert_eq!(session.mode(), &InputMode::ArithmeticInput);
        assert!(h.actions.is_empty());

        ctrl(&mut editor, &mut session, &mut h, CtrlKey::Backspace);
        assert_eq!(h.actions, vec![EditorAction::Backspace]);
    }

    #[test]
    fn test_backspace_keeps_outer_input() {
        let dict = sample_dict();
        let mut editor = ArithmeticEditor::new();
        let mut session = ImeSession::new();
        let mut h = Harness::new();

        type_pinyin(dict.as_ref(), session.buffer_mut(), "ni");
        start(&mut session);
        tap(&mut editor, &mut session, &mut h, Key::number("7"));
        ctrl(&mut editor, &mut session, &mut h, CtrlKey::Backspace);
        assert_eq!(session.buffer().text(), "你");

        // Only a backspace on the empty expression reaches the outer input.
        ctrl(&mut editor, &mut session, &mut h, CtrlKey::Backspace);
        assert!(session.buffer().is_empty());
    }

    #[test]
    fn test_other_key_leaves() {
        let mut editor = ArithmeticEditor::new();
        let mut session = ImeSession::new();
        let mut h = Harness::new();

        start(&mut session);
        tap(&mut editor, &mut session, &mut h, Key::number("3"));
        let result = tap(&mut editor, &mut session, &mut h, Key::alphabet("a"));
        assert!(matches!(result, EditorResult::Redispatch(_)));
        assert_eq!(session.mode(), &InputMode::InputWait);
        assert_eq!(session.buffer().text(), "3");
    }

    #[test]
    fn test_space_on_empty_commits() {
        let mut editor = ArithmeticEditor::new();
        let mut session = ImeSession::new();
        let mut h = Harness::new();

        start(&mut session);
        let result = ctrl(&mut editor, &mut session, &mut h, CtrlKey::Space);
        assert_eq!(result, EditorResult::Commit(Commit::text(" ", false)));
    }
}
