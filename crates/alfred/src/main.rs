//! Command-line entry point for the Alfred assistant.

use alfred::init_logging;
use alfred_config::{AlfredConfig, load_config};
use alfred_core::Orchestrator;
use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use log::info;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Interaction modes exposed by the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Read-eval loop over stdin, no banner.
    Cli,
    /// Read-eval loop over stdin with a startup banner.
    Interactive,
    /// Reserved for speech input.
    Voice,
    /// Reserved for background operation.
    Daemon,
}

impl Mode {
    fn as_str(&self) -> &'static str {
        match self {
            Mode::Cli => "cli",
            Mode::Interactive => "interactive",
            Mode::Voice => "voice",
            Mode::Daemon => "daemon",
        }
    }
}

/// Command-line options for the Alfred binary.
#[derive(Parser)]
#[command(name = "alfred", version, about = "Personal assistant orchestration core")]
struct Cli {
    /// Interaction mode
    #[arg(value_enum, default_value_t = Mode::Interactive)]
    mode: Mode,
    /// Optional path to an alfred.json5 config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Raise the default log filter to debug
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AlfredConfig::default(),
    };
    init_logging(cli.debug || config.debug);
    info!(
        "starting alfred (mode={}, config_set={}, provider={})",
        cli.mode.as_str(),
        cli.config.is_some(),
        config.reasoning.provider
    );

    match cli.mode {
        Mode::Cli => run_repl(&config, false).await,
        Mode::Interactive => run_repl(&config, true).await,
        Mode::Voice | Mode::Daemon => {
            bail!("unsupported mode: {}", cli.mode.as_str());
        }
    }
}

/// Drive a read-eval loop over stdin until EOF or an exit command.
async fn run_repl(config: &AlfredConfig, banner: bool) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_config(config).context("failed to build orchestrator")?;
    orchestrator.start().context("failed to start orchestrator")?;
    if banner {
        print_banner();
    }

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("you> ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }
        if matches!(utterance, "exit" | "quit") {
            break;
        }
        match orchestrator.process(utterance).await {
            Ok(reply) => println!("alfred> {reply}"),
            Err(err) => eprintln!("error: {err}"),
        }
    }

    orchestrator.stop().context("failed to stop orchestrator")?;
    println!("goodbye.");
    Ok(())
}

fn print_banner() {
    println!("alfred v{}", env!("CARGO_PKG_VERSION"));
    println!("type 'exit' or 'quit' to leave.");
}
