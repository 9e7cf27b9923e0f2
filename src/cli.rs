use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::models::{ParseResponse, ProblemKey};
use crate::services::fetch::{decode_body, fetch_and_parse, CodeforcesClient};
use crate::services::parser::{ParseInput, ParseOutcome, StatementParser};

#[derive(Parser)]
#[command(name = "statement-extractor")]
#[command(author, version, about = "Extracts structured problem statements from Codeforces pages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve,

    /// Parse a saved problem page and print the statement as JSON
    Parse {
        /// HTML file of the problem page
        file: PathBuf,
        #[arg(long, default_value_t = 0)]
        contest: u32,
        #[arg(long, default_value = "A")]
        index: String,
        /// Problem tag, may be repeated (e.g. --tag interactive)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Print the parse diagnostics together with the statement
        #[arg(long)]
        diagnostics: bool,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Fetch a problem from the source, parse it and print it as JSON
    Fetch {
        contest: u32,
        index: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        diagnostics: bool,
        #[arg(long)]
        compact: bool,
    },
}

/// How a parse result is written to stdout.
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub diagnostics: bool,
    pub compact: bool,
}

pub fn handle_parse(
    config: &Config,
    file: &Path,
    key: ProblemKey,
    tags: Vec<String>,
    output: OutputOptions,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let html = decode_body(&bytes).with_context(|| format!("Failed to decode {}", file.display()))?;

    let input = ParseInput::new(key, html)
        .with_tags(tags)
        .with_source(file.display().to_string());
    let outcome = StatementParser::new(config.source_base_url.clone()).parse_with_diagnostics(&input);
    report(&outcome);
    print_outcome(outcome, output)
}

pub async fn handle_fetch(
    config: &Config,
    key: ProblemKey,
    tags: Vec<String>,
    output: OutputOptions,
) -> anyhow::Result<()> {
    let client = CodeforcesClient::new(config).context("Failed to build HTTP client")?;
    let parser = StatementParser::new(config.source_base_url.clone());

    info!("Fetching problem {}", key);
    let outcome = fetch_and_parse(&client, &parser, key.clone(), tags)
        .await
        .with_context(|| format!("Failed to fetch problem {}", key))?;
    report(&outcome);
    print_outcome(outcome, output)
}

fn report(outcome: &ParseOutcome) {
    let statement = &outcome.statement;
    info!(
        "{}: {} samples, multiple test cases: {}, {} diagnostic events",
        statement.display_name(),
        statement.samples.len(),
        statement.has_multiple_test_cases,
        outcome.diagnostics.events.len()
    );
    if outcome.diagnostics.has_violations() {
        warn!("{} has structural problems, run with --diagnostics for details", statement.key);
    }
}

fn print_outcome(outcome: ParseOutcome, output: OutputOptions) -> anyhow::Result<()> {
    if output.diagnostics {
        let response = ParseResponse {
            statement: outcome.statement,
            diagnostics: outcome.diagnostics,
        };
        print_json(&response, output.compact)
    } else {
        print_json(&outcome.statement, output.compact)
    }
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> anyhow::Result<()> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", json);
    Ok(())
}
