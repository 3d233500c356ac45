//! Structural invariants of the composition buffer under random edits.

use libcompose_core::key::keys_from;
use libcompose_core::{Input, InputBuffer, InputWord, Key};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Latin(String),
    Symbol(&'static str),
    Pinyin(&'static str, &'static str),
    Pair,
    SelectAt(usize),
    Previous,
    Next,
    DeleteBackward,
    DeleteSelected,
    DropPending,
    Confirm,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z]{1,3}".prop_map(Op::Latin),
        prop::sample::select(vec![",", "。", "!"]).prop_map(Op::Symbol),
        prop::sample::select(vec![("ni", "你"), ("hao", "好"), ("ma", "吗")])
            .prop_map(|(chars, value)| Op::Pinyin(chars, value)),
        Just(Op::Pair),
        (0usize..16).prop_map(Op::SelectAt),
        Just(Op::Previous),
        Just(Op::Next),
        Just(Op::DeleteBackward),
        Just(Op::DeleteSelected),
        Just(Op::DropPending),
        Just(Op::Confirm),
    ]
}

/// Put a single new input at the cursor the way taps do.
fn insert(buffer: &mut InputBuffer, keys: Vec<Key>, word: Option<InputWord>) {
    if buffer.is_gap_selected() {
        buffer.confirm_pending_and_select_next();
    }
    let pending = buffer.new_pending();
    pending.set_keys(keys);
    pending.set_word(word);
    buffer.confirm_pending_and_select_next();
}

fn apply(buffer: &mut InputBuffer, op: &Op) {
    match op {
        Op::Latin(text) => {
            let pending = buffer.char_pending_or_new();
            for key in keys_from(text) {
                pending.append_key(key);
            }
        }
        Op::Symbol(text) => insert(buffer, vec![Key::symbol(*text)], None),
        Op::Pinyin(chars, value) => insert(
            buffer,
            keys_from(chars),
            Some(InputWord::pinyin(1, *value, *chars)),
        ),
        Op::Pair => buffer.prepare_pair_inputting(Key::symbol("("), Key::symbol(")")),
        Op::SelectAt(i) => buffer.select_at(i % buffer.len()),
        Op::Previous => buffer.confirm_pending_and_select_previous(),
        Op::Next => buffer.confirm_pending_and_select_next(),
        Op::DeleteBackward => buffer.delete_backward(),
        Op::DeleteSelected => buffer.delete_selected(),
        Op::DropPending => buffer.drop_pending(),
        Op::Confirm => {
            buffer.confirm_pending();
        }
    }
}

fn build(ops: &[Op]) -> InputBuffer {
    let mut buffer = InputBuffer::new();
    for op in ops {
        apply(&mut buffer, op);
    }
    buffer
}

fn assert_alternates(buffer: &InputBuffer) {
    let inputs = buffer.inputs();
    assert_eq!(inputs.len() % 2, 1, "odd length: {:?}", inputs);
    for (i, input) in inputs.iter().enumerate() {
        if i % 2 == 0 {
            assert!(input.is_gap(), "gap expected at {}: {:?}", i, inputs);
        } else {
            assert!(!input.is_gap() && !input.is_empty(), "input expected at {}: {:?}", i, inputs);
        }
    }
}

fn assert_pairs_symmetric(buffer: &InputBuffer) {
    for input in buffer.inputs() {
        if let Some(partner) = input.pair() {
            let back = buffer.input(partner).and_then(Input::pair);
            assert_eq!(back, Some(input.id()), "one-sided pair: {:?}", buffer.inputs());
        }
    }
}

proptest! {
    #[test]
    fn edits_keep_gaps_and_pairs(ops in prop::collection::vec(op(), 0..40)) {
        let mut buffer = InputBuffer::new();
        for op in &ops {
            apply(&mut buffer, op);

            prop_assert!(buffer.inputs().iter().any(Input::is_gap));
            prop_assert!(buffer.first_input().is_some_and(Input::is_gap));
            prop_assert!(buffer.last_input().is_some_and(Input::is_gap));
            assert_pairs_symmetric(&buffer);

            let mut confirmed = buffer.clone();
            confirmed.confirm_pending();
            assert_alternates(&confirmed);
        }
    }

    #[test]
    fn second_confirm_changes_nothing(ops in prop::collection::vec(op(), 0..30)) {
        let mut buffer = build(&ops);
        buffer.confirm_pending();
        let once = buffer.clone();
        buffer.confirm_pending();
        prop_assert_eq!(buffer, once);
    }

    #[test]
    fn copy_then_replace_restores_text(
        ops in prop::collection::vec(op(), 0..30),
        more in prop::collection::vec(op(), 1..10),
    ) {
        let mut buffer = build(&ops);
        let text = buffer.text();
        let copy = buffer.copy();

        for op in &more {
            apply(&mut buffer, op);
        }
        buffer.replace_by(copy);
        prop_assert_eq!(buffer.text(), text);
    }

    #[test]
    fn cleared_buffer_restores_exactly(ops in prop::collection::vec(op(), 1..30)) {
        let mut buffer = build(&ops);
        let before = buffer.clone();

        buffer.reset(true);
        prop_assert!(buffer.inputs().len() == 1);
        let restored = buffer.cancel_delete();

        prop_assert_eq!(restored, !before.is_empty());
        if restored {
            prop_assert_eq!(buffer.inputs(), before.inputs());
            prop_assert_eq!(buffer.selected_id(), before.selected_id());
            prop_assert_eq!(buffer.pending(), before.pending());
            prop_assert!(!buffer.cancel_delete());
        }
    }
}
