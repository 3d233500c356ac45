use libcompose_core::ScriptVariant;
use libcompose_pinyin::{
    committed_text, parse_script, Config, InputMsgKind, KeyResult, PinyinDictionary, Replayer,
};
use std::sync::Arc;

const NIHAO: &str = r#"[
    {"SlipStart": {"kind": "Alphabet", "text": "n", "level": "Level0"}},
    {"SlipMove": {"kind": "Alphabet", "text": "i", "level": "Level1"}},
    "SlipStop",
    {"SlipStart": {"kind": "Alphabet", "text": "h", "level": "Level0"}},
    {"SlipMove": {"kind": "Alphabet", "text": "a", "level": "Level1"}},
    {"SlipMove": {"kind": "Alphabet", "text": "ao", "level": "Level2"}},
    "SlipStop",
    {"Ctrl": "Commit"}
]"#;

const GUO: &str = r#"[
    {"SlipStart": {"kind": "Alphabet", "text": "g", "level": "Level0"}},
    {"SlipMove": {"kind": "Alphabet", "text": "u", "level": "Level1"}},
    {"SlipMove": {"kind": "Alphabet", "text": "uo", "level": "Level2"}},
    "SlipStop"
]"#;

fn replayer(config: Config) -> Replayer {
    let dict = PinyinDictionary::demo().unwrap();
    Replayer::new(Arc::new(dict), config)
}

#[test]
fn slipped_phrase_is_committed() {
    let mut replayer = replayer(Config::default());
    let steps = replayer.run(parse_script(NIHAO).unwrap());

    assert!(steps.iter().all(|s| s.result == KeyResult::Handled));
    assert_eq!(steps[6].preedit, "你好");
    assert_eq!(committed_text(&steps), "你好");
    assert!(steps[7]
        .msgs
        .iter()
        .any(|m| m.kind == InputMsgKind::CommitRequested));
    assert!(replayer.engine().context().preedit.is_empty());
}

#[test]
fn traditional_config_renders_variants() {
    let config = Config {
        preferred_script_variant: ScriptVariant::Traditional,
        ..Config::default()
    };
    let mut replayer = replayer(config);
    let steps = replayer.run(parse_script(GUO).unwrap());
    assert_eq!(steps.last().map(|s| s.preedit.as_str()), Some("國"));

    let mut replayer = self::replayer(Config::default());
    let steps = replayer.run(parse_script(GUO).unwrap());
    assert_eq!(steps.last().map(|s| s.preedit.as_str()), Some("国"));
}

#[test]
fn revoked_commit_restores_the_input() {
    let mut replayer = replayer(Config::default());
    let mut events = parse_script(NIHAO).unwrap();
    events.extend(parse_script(r#"[{"Ctrl": "RevokeCommit"}]"#).unwrap());

    let steps = replayer.run(events);
    let last = steps.last().unwrap();
    assert_eq!(last.preedit, "你好");
    assert!(last
        .msgs
        .iter()
        .any(|m| m.kind == InputMsgKind::CommitUndoRequested));
}
