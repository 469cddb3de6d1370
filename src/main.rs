//! Command-line front end: reads a JSON request from a file or stdin and
//! prints the verdict as JSON.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use guardcheck::fsm::FsmDefinition;
use guardcheck::{
    Analyzer, AnalyzerConfig, BackendKind, CheckCompletenessRequest, CheckGuardsRequest,
    Precedence,
};

#[derive(Parser)]
#[command(name = "guardcheck", version, about = "Satisfiability and completeness checks for FSM guards")]
struct Cli {
    /// JSON analyzer config; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Treat unparsable guard text as an error
    #[arg(long, global = true)]
    strict: bool,

    #[arg(long, global = true, value_enum)]
    precedence: Option<PrecedenceArg>,

    #[arg(long, global = true, value_enum)]
    backend: Option<BackendArg>,

    /// Per-query solver timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Can two guards hold at the same time?
    CheckGuards {
        /// Request file (`{"guard1": .., "guard2": ..}`); stdin if omitted
        input: Option<PathBuf>,
    },
    /// Do the guards of one (state, event) pair cover every input?
    CheckCompleteness {
        /// Request file (`{"guards": [..], "variables": [..]}`); stdin if omitted
        input: Option<PathBuf>,
    },
    /// Run every check over a whole machine
    AnalyzeFsm {
        /// Machine file (`{"nodes": [..], "edges": [..], "variables": [..]}`); stdin if omitted
        input: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PrecedenceArg {
    Legacy,
    Standard,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Builtin,
    Z3,
}

impl From<PrecedenceArg> for Precedence {
    fn from(arg: PrecedenceArg) -> Self {
        match arg {
            PrecedenceArg::Legacy => Precedence::Legacy,
            PrecedenceArg::Standard => Precedence::Standard,
        }
    }
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Builtin => BackendKind::Builtin,
            BackendArg::Z3 => BackendKind::Z3,
        }
    }
}

impl Cli {
    fn analyzer_config(&self) -> anyhow::Result<AnalyzerConfig> {
        let mut config = match &self.config {
            Some(path) => AnalyzerConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AnalyzerConfig::default(),
        };
        if self.strict {
            config = config.strict(true);
        }
        if let Some(precedence) = self.precedence {
            config = config.precedence(precedence.into());
        }
        if let Some(backend) = self.backend {
            config = config.backend(backend.into());
        }
        if let Some(ms) = self.timeout_ms {
            config = config.timeout(Duration::from_millis(ms));
        }
        Ok(config)
    }
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let analyzer = Analyzer::new(cli.analyzer_config()?);
    let config = analyzer.config();
    tracing::debug!(
        backend = analyzer.backend_name(),
        precedence = ?config.precedence,
        strict = config.strict,
        timeout_ms = ?config.timeout_ms,
        "analyzer ready"
    );

    match &cli.command {
        Command::CheckGuards { input } => {
            let request: CheckGuardsRequest = serde_json::from_str(&read_input(input.as_deref())?)
                .context("decoding guard pair request")?;
            print_json(&analyzer.check_guards_request(&request))
        }
        Command::CheckCompleteness { input } => {
            let request: CheckCompletenessRequest =
                serde_json::from_str(&read_input(input.as_deref())?)
                    .context("decoding completeness request")?;
            print_json(&analyzer.check_completeness_request(&request))
        }
        Command::AnalyzeFsm { input } => {
            let fsm: FsmDefinition = serde_json::from_str(&read_input(input.as_deref())?)
                .context("decoding FSM definition")?;
            print_json(&analyzer.analyze_fsm(&fsm))
        }
    }
}
