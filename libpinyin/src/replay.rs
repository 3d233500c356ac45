//! Replay of scripted gesture events through the engine.
//!
//! A script is a JSON array of `InputEvent`s, e.g.
//! `[{"SlipStart": {"kind": "Alphabet", "text": "n"}}, "SlipStop", {"Ctrl": "Commit"}]`.

use anyhow::Context;
use libcompose_core::{
    Commit, Config, Dictionary, ImeEngine, InputEvent, InputMsg, KeyResult,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of one replayed event.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayStep {
    pub event: InputEvent,
    pub result: KeyResult,
    pub commit: Option<Commit>,
    /// Preedit after the event
    pub preedit: String,
    pub msgs: Vec<InputMsg>,
}

pub fn parse_script(json: &str) -> serde_json::Result<Vec<InputEvent>> {
    serde_json::from_str(json)
}

/// Load an event script file.
pub fn load_script<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<InputEvent>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read script {}", path.display()))?;
    parse_script(&content).with_context(|| format!("parse script {}", path.display()))
}

/// Drives an `ImeEngine` one scripted event at a time.
pub struct Replayer {
    engine: ImeEngine,
}

impl Replayer {
    pub fn new(dict: Arc<dyn Dictionary>, config: Config) -> Self {
        Self {
            engine: ImeEngine::new(dict, config),
        }
    }

    pub fn engine(&self) -> &ImeEngine {
        &self.engine
    }

    pub fn step(&mut self, event: InputEvent) -> ReplayStep {
        let mut msgs = Vec::new();
        let result = self.engine.process_event(event.clone(), &mut msgs);
        let ctx = self.engine.context();
        if result == KeyResult::NotHandled {
            debug!(?event, "event not handled");
        }

        ReplayStep {
            event,
            result,
            commit: ctx.commit.clone(),
            preedit: ctx.preedit.preedit.clone(),
            msgs,
        }
    }

    pub fn run<I>(&mut self, events: I) -> Vec<ReplayStep>
    where
        I: IntoIterator<Item = InputEvent>,
    {
        let steps: Vec<ReplayStep> = events.into_iter().map(|event| self.step(event)).collect();
        info!(
            events = steps.len(),
            commits = steps.iter().filter(|s| s.commit.is_some()).count(),
            "replay finished"
        );
        steps
    }
}

/// Text inserted into the host by all commits of a replay.
pub fn committed_text(steps: &[ReplayStep]) -> String {
    steps
        .iter()
        .filter_map(|step| step.commit.as_ref())
        .map(Commit::full_text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PinyinDictionary;

    #[test]
    fn test_parse_script() {
        let events = parse_script(r#"[{"Tap": {"key": {"kind": "Number", "text": "1"}}}, {"Ctrl": "Commit"}]"#)
            .unwrap();
        assert_eq!(events.len(), 2);
        assert!(parse_script("{}").is_err());
        assert!(load_script("/nonexistent/script.json").is_err());
    }

    #[test]
    fn test_tap_and_commit() {
        let dict = Arc::new(PinyinDictionary::demo().unwrap());
        let mut replayer = Replayer::new(dict, Config::default());
        let events = parse_script(
            r#"[
                {"Tap": {"key": {"kind": "Number", "text": "4"}}},
                {"Tap": {"key": {"kind": "Number", "text": "2"}}},
                {"Ctrl": "Commit"}
            ]"#,
        )
        .unwrap();

        let steps = replayer.run(events);
        assert_eq!(steps[1].preedit, "42");
        assert_eq!(committed_text(&steps), "42");
        assert!(steps[2].preedit.is_empty());
    }
}
