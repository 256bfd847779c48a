//! AsoWorks CLI entry point.
//!
//! Composition root for the deterministic core. The subcommands exercise the
//! validator, the ranker, and the full stage contract offline:
//!
//! - `validate` — check listing drafts against one or both stores' rules.
//! - `rank` — validate a bundle of drafts and select the best variant.
//! - `replay` — drive the whole pipeline through the stage runner with
//!   scripted collaborators from a replay file.
//!
//! Live model/search collaborators are deliberately absent here: they plug
//! in behind the `pipeline` port traits, outside this binary.
//!
//! Reports full of issues are normal output and exit zero; only structural
//! errors (unreadable input, out-of-order writes, empty draft lists) fail
//! the process.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use pipeline::{
    rank, validate, ComplianceRules, KeywordSet, ListingDraft, Platform, StoreTarget,
    ValidatedDraft, ValidationReport,
};
use stages::{ReplayScript, RetryConfig, RunnerConfig, StageRunner};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(
    name = "asoworks",
    version,
    about = "Deterministic core of the AsoWorks listing pipeline"
)]
struct Cli {
    /// TOML file overriding the built-in guideline rules.
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Stores to validate against.
    #[arg(long, global = true, default_value = "both")]
    platform: StoreTarget,

    /// Log output format (logs go to stderr; results go to stdout).
    #[arg(long, global = true, default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate drafts from a JSON file and print their reports.
    Validate {
        /// JSON file holding a list of listing drafts.
        input: PathBuf,
    },
    /// Validate and rank a bundle of drafts against a keyword set.
    Rank {
        /// JSON file holding a keyword set and a list of drafts.
        input: PathBuf,
    },
    /// Replay a full pipeline run from pre-recorded stage outputs.
    Replay {
        /// JSON replay file: brief, keyword set, competitor notes, drafts.
        input: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let rules = load_rules(cli.rules.as_deref())?;
    let platforms = cli.platform.platforms();
    tracing::debug!(
        target_stores = %cli.platform,
        custom_rules = cli.rules.is_some(),
        "asoworks starting"
    );

    match cli.command {
        Command::Validate { input } => cmd_validate(&input, &platforms, &rules),
        Command::Rank { input } => cmd_rank(&input, &platforms, &rules),
        Command::Replay { input } => cmd_replay(&input, cli.platform, rules).await,
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

/// One draft's verdicts across the requested platforms.
#[derive(Debug, Serialize)]
struct DraftVerdict<'a> {
    title: &'a str,
    strategy_label: &'a str,
    reports: Vec<ValidationReport>,
}

fn cmd_validate(input: &Path, platforms: &[Platform], rules: &ComplianceRules) -> Result<()> {
    let drafts: Vec<ListingDraft> = read_json(input)?;
    let mut verdicts = Vec::with_capacity(drafts.len());
    for draft in &drafts {
        let reports = platforms
            .iter()
            .map(|&platform| validate(draft, platform, rules))
            .collect::<Result<Vec<_>, _>>()?;
        verdicts.push(DraftVerdict {
            title: draft.title(),
            strategy_label: draft.strategy_label().as_str(),
            reports,
        });
    }
    print_json(&verdicts)
}

/// Input for `rank`: the researched keywords plus the candidate drafts.
#[derive(Debug, Deserialize)]
struct RankBundle {
    keyword_set: KeywordSet,
    drafts: Vec<ListingDraft>,
}

fn cmd_rank(input: &Path, platforms: &[Platform], rules: &ComplianceRules) -> Result<()> {
    let bundle: RankBundle = read_json(input)?;
    let mut validated = Vec::with_capacity(bundle.drafts.len());
    for draft in bundle.drafts {
        let reports: BTreeMap<Platform, ValidationReport> = platforms
            .iter()
            .map(|&platform| validate(&draft, platform, rules).map(|report| (platform, report)))
            .collect::<Result<_, _>>()?;
        validated.push(ValidatedDraft { draft, reports });
    }
    let record = rank(&validated, &bundle.keyword_set)?;
    print_json(&record)
}

async fn cmd_replay(input: &Path, target: StoreTarget, rules: ComplianceRules) -> Result<()> {
    let script: ReplayScript = read_json(input)?;
    let (brief, researcher, analyst, writer) = script.into_collaborators();
    let config = RunnerConfig {
        target,
        rules,
        retry: RetryConfig::default(),
    };
    let runner = StageRunner::new(researcher, analyst, writer, config);
    let state = runner.run(brief).await?;
    print_json(&state)
}

// ---------------------------------------------------------------------------
// Plumbing
// ---------------------------------------------------------------------------

fn load_rules(path: Option<&Path>) -> Result<ComplianceRules> {
    match path {
        None => Ok(ComplianceRules::default()),
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading rules file {}", path.display()))?;
            toml::from_str(&raw).with_context(|| format!("parsing rules file {}", path.display()))
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
