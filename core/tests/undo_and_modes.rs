//! Undo stage and mode transitions as seen by a host.

use libcompose_core::{
    CommitOption, Config, CtrlKey, EditorAction, ImeEngine, InputEvent, InputMsg, InputMsgKind,
    Key, KeyLevel, MemoryDictionary,
};
use std::sync::Arc;

fn engine() -> ImeEngine {
    let mut dict = MemoryDictionary::new();
    dict.add_words("ni", &["你", "泥"]);
    dict.add_words("hao", &["好", "号"]);
    dict.add_words("zhu", &["主", "猪"]);
    dict.add_words("zhuang", &["装"]);
    dict.add_phrase(&["ni", "hao"], "你好");
    ImeEngine::new(Arc::new(dict), Config::default())
}

fn slip_ni(engine: &mut ImeEngine, msgs: &mut Vec<InputMsg>) {
    engine.process_event(InputEvent::SlipStart(Key::alphabet("n").with_level(KeyLevel::Level0)), msgs);
    engine.process_event(InputEvent::SlipMove(Key::alphabet("i").with_level(KeyLevel::Level1)), msgs);
    engine.process_event(InputEvent::SlipStop, msgs);
}

fn ctrl(engine: &mut ImeEngine, key: CtrlKey) -> Vec<InputMsg> {
    let mut msgs = Vec::new();
    engine.process_event(InputEvent::Ctrl(key), &mut msgs);
    msgs
}

fn has(msgs: &[InputMsg], kind: InputMsgKind) -> bool {
    msgs.iter().any(|m| m.kind == kind)
}

#[test]
fn cleared_inputs_come_back_exactly() {
    let mut engine = engine();
    let mut msgs = Vec::new();
    slip_ni(&mut engine, &mut msgs);
    engine.process_event(InputEvent::Tap { key: Key::symbol(","), tick: 0 }, &mut msgs);
    let before = engine.session().buffer().clone();

    let msgs = ctrl(&mut engine, CtrlKey::ClearInputs);
    assert!(has(&msgs, InputMsgKind::InputListCleared));
    assert!(engine.session().buffer().is_empty());

    let msgs = ctrl(&mut engine, CtrlKey::CancelClear);
    assert!(has(&msgs, InputMsgKind::InputListClearCanceled));
    let after = engine.session().buffer();
    assert_eq!(after.inputs(), before.inputs());
    assert_eq!(after.selected_id(), before.selected_id());
    assert_eq!(after.text(), "你,");
}

#[test]
fn edit_after_clear_discards_the_stage() {
    let mut engine = engine();
    let mut msgs = Vec::new();
    slip_ni(&mut engine, &mut msgs);

    ctrl(&mut engine, CtrlKey::ClearInputs);
    engine.process_event(InputEvent::Tap { key: Key::alphabet("a"), tick: 0 }, &mut msgs);
    let msgs = ctrl(&mut engine, CtrlKey::CancelClear);

    assert!(!has(&msgs, InputMsgKind::InputListClearCanceled));
    assert_eq!(engine.context().preedit.preedit, "a");
}

#[test]
fn clearing_an_empty_buffer_stages_nothing() {
    let mut engine = engine();
    ctrl(&mut engine, CtrlKey::ClearInputs);
    let msgs = ctrl(&mut engine, CtrlKey::CancelClear);
    assert!(!has(&msgs, InputMsgKind::InputListClearCanceled));
}

#[test]
fn revoke_needs_a_fresh_commit() {
    let mut engine = engine();
    let mut msgs = Vec::new();
    slip_ni(&mut engine, &mut msgs);
    ctrl(&mut engine, CtrlKey::Commit);
    ctrl(&mut engine, CtrlKey::Backspace);

    let msgs = ctrl(&mut engine, CtrlKey::RevokeCommit);
    assert!(!has(&msgs, InputMsgKind::CommitUndoRequested));
    assert!(engine.session().buffer().is_empty());
}

#[test]
fn slip_returns_to_input_wait() {
    let mut engine = engine();
    let mut msgs = Vec::new();
    engine.process_event(InputEvent::SlipStart(Key::alphabet("zh").with_level(KeyLevel::Level0)), &mut msgs);
    assert_eq!(engine.context().mode_name, "Slip");
    engine.process_event(InputEvent::SlipMove(Key::alphabet("u").with_level(KeyLevel::Level1)), &mut msgs);
    engine.process_event(InputEvent::SlipStop, &mut msgs);
    assert_eq!(engine.context().mode_name, "InputWait");
    assert_eq!(engine.session().buffer().text(), "主");
}

#[test]
fn invalid_slip_is_dropped() {
    let mut engine = engine();
    let mut msgs = Vec::new();
    engine.process_event(InputEvent::SlipStart(Key::alphabet("n").with_level(KeyLevel::Level0)), &mut msgs);
    engine.process_event(InputEvent::SlipMove(Key::alphabet("u").with_level(KeyLevel::Level1)), &mut msgs);
    engine.process_event(InputEvent::SlipStop, &mut msgs);
    assert_eq!(engine.context().mode_name, "InputWait");
    assert!(engine.session().buffer().is_empty());
}

#[test]
fn advance_filter_stacks_on_candidate_choose() {
    let mut engine = engine();
    let mut msgs = Vec::new();
    slip_ni(&mut engine, &mut msgs);
    let ni = engine.session().buffer().inputs()[1].id();

    ctrl(&mut engine, CtrlKey::ChooseInput(ni));
    assert_eq!(engine.context().mode_name, "CandidateChoose");
    let msgs = ctrl(&mut engine, CtrlKey::AdvanceFilter);
    assert_eq!(engine.context().mode_name, "AdvanceFilter");
    assert!(has(&msgs, InputMsgKind::ModeChanged));

    ctrl(&mut engine, CtrlKey::Exit);
    assert_eq!(engine.context().mode_name, "CandidateChoose");
    ctrl(&mut engine, CtrlKey::Exit);
    assert_eq!(engine.context().mode_name, "InputWait");
}

#[test]
fn commit_options_render_spells() {
    let mut engine = engine();
    let mut msgs = Vec::new();
    slip_ni(&mut engine, &mut msgs);

    ctrl(&mut engine, CtrlKey::CommitOptions);
    assert_eq!(engine.context().mode_name, "CommitOptionChoose");
    ctrl(&mut engine, CtrlKey::CommitOption(CommitOption::WithSpell));
    assert_eq!(engine.context().preedit.preedit, "你(ni)");

    ctrl(&mut engine, CtrlKey::Commit);
    assert_eq!(
        engine.context().commit.as_ref().map(|c| c.full_text()),
        Some("你(ni)".to_string())
    );
    assert_eq!(engine.context().mode_name, "InputWait");
}

#[test]
fn commit_options_need_pinyin_words() {
    let mut engine = engine();
    let mut msgs = Vec::new();
    engine.process_event(InputEvent::Tap { key: Key::alphabet("a"), tick: 0 }, &mut msgs);
    ctrl(&mut engine, CtrlKey::CommitOptions);
    assert_eq!(engine.context().mode_name, "InputWait");
}

#[test]
fn editor_edit_forwards_actions_while_frozen() {
    let mut engine = engine();
    let mut msgs = Vec::new();
    slip_ni(&mut engine, &mut msgs);

    ctrl(&mut engine, CtrlKey::EditorEdit);
    assert_eq!(engine.context().mode_name, "EditorEdit");
    assert!(engine.session().buffer().is_frozen());

    let msgs = ctrl(&mut engine, CtrlKey::EditorAction(EditorAction::SelectAll));
    assert_eq!(engine.context().editor_actions, vec![EditorAction::SelectAll]);
    assert!(has(&msgs, InputMsgKind::EditorActionRequested));

    ctrl(&mut engine, CtrlKey::Exit);
    assert_eq!(engine.context().mode_name, "InputWait");
    assert!(!engine.session().buffer().is_frozen());
    assert!(engine.context().editor_actions.is_empty());
    assert_eq!(engine.context().preedit.preedit, "你");
}

#[test]
fn tap_in_editor_edit_thaws_and_types() {
    let mut engine = engine();
    let mut msgs = Vec::new();
    slip_ni(&mut engine, &mut msgs);
    ctrl(&mut engine, CtrlKey::EditorEdit);
    assert!(engine.session().buffer().is_frozen());

    let result = engine.process_event(InputEvent::Tap { key: Key::alphabet("a"), tick: 0 }, &mut msgs);
    assert_eq!(result, libcompose_core::KeyResult::Handled);
    assert_eq!(engine.context().mode_name, "InputWait");
    assert!(!engine.session().buffer().is_frozen());
    assert!(engine.context().preedit.preedit.ends_with('a'));
}

#[test]
fn hand_mode_switch_is_reported() {
    let mut engine = engine();
    let before = engine.context().hand_mode;
    let msgs = ctrl(&mut engine, CtrlKey::SwitchHandMode);
    assert!(has(&msgs, InputMsgKind::HandModeSwitchRequested));
    assert_ne!(engine.context().hand_mode, before);
}
