use clap::Parser;
use libcompose_pinyin::{load_script, PinyinConfig, PinyinDictionary, ReplayStep, Replayer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "compose-replay")]
#[command(about = "Replay scripted gesture events through the composing engine")]
#[command(version)]
struct Cli {
    /// JSON array of input events
    #[arg(long)]
    script: PathBuf,

    /// Word table (TOML); the embedded demo table when omitted
    #[arg(long)]
    dict: Option<PathBuf>,

    /// Engine configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the preedit after every event
    #[arg(long)]
    trace: bool,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
}

fn print_step(index: usize, step: &ReplayStep, trace: bool) {
    if trace {
        println!("[{:>3}] {:?}", index, step.event);
        println!("      preedit: {:?}", step.preedit);
    }
    if let Some(commit) = &step.commit {
        println!("commit: {}", commit.full_text());
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PinyinConfig::load_toml(path)?,
        None => PinyinConfig::default(),
    };
    let dict = match cli.dict.as_ref().or(config.word_table.as_ref()) {
        Some(path) => PinyinDictionary::load_toml(path)?,
        None => PinyinDictionary::demo()?,
    };
    let events = load_script(&cli.script)?;
    tracing::info!(events = events.len(), "replaying {}", cli.script.display());

    let mut replayer = Replayer::new(Arc::new(dict), config.into_base());
    for (index, event) in events.into_iter().enumerate() {
        let step = replayer.step(event);
        print_step(index, &step, cli.trace);
    }

    let preedit = &replayer.engine().context().preedit.preedit;
    if !preedit.is_empty() {
        println!("uncommitted: {}", preedit);
    }
    Ok(())
}
