#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `pdf_max`: report the largest numbers in a PDF, scaled by the units the
//! document states ("in millions", "($K)").
//!
//! Exit codes: `0` on success, `1` on a usage error, `2` when the document
//! cannot be read or contains no numbers.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser, ValueEnum, error::ErrorKind};
use pdf_max_cli_utils::{IndicatifProgress, init_logger};
use pdf_max_pdf::{PageSource, PdfFile};
use pdf_max_rank::{
    DEFAULT_TOP_N, Outcome, RankConfig, RankError, Ranker, Strategy,
    progress::{self, ScanProgress},
    report,
};

const USAGE_ERROR: u8 = 1;
const RUNTIME_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "pdf_max",
    version,
    about = "Find the largest numbers in a PDF, scaled by the units it states"
)]
struct Cli {
    /// Path to the PDF document
    input: PathBuf,

    /// Number of results to report [default: 5]. Not valid with the budget
    /// strategy, which reports a single amount
    #[arg(long, value_parser = parse_top)]
    top: Option<usize>,

    /// How numbers are selected and scaled: `ranked` or `budget`
    #[arg(long, default_value_t = Strategy::Ranked, value_parser = parse_strategy)]
    strategy: Strategy,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// TOML file replacing the built-in unit rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

impl Cli {
    /// Checks combinations clap cannot express on its own.
    fn validate(&self) -> Result<(), clap::Error> {
        if self.strategy == Strategy::Budget && self.top.is_some() {
            return Err(Self::command().error(
                ErrorKind::ArgumentConflict,
                "--top cannot be used with --strategy budget, which reports a single amount",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Rank(#[from] RankError),

    #[error("Failed to render JSON report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No numeric values found in {0}")]
    NoNumbers(PathBuf),
}

fn exit_code(error: &CliError) -> u8 {
    match error {
        CliError::Rank(_) | CliError::Json(_) | CliError::NoNumbers(_) => RUNTIME_ERROR,
    }
}

fn parse_top(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_strategy(s: &str) -> Result<Strategy, String> {
    s.parse::<Strategy>()
        .map_err(|_| format!("expected `{}` or `{}`", Strategy::Ranked, Strategy::Budget))
}

fn parse_cli<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    cli.validate()?;
    Ok(cli)
}

/// The text printed for a parse failure. Usage errors always end with the
/// usage line.
fn render_parse_error(error: &clap::Error) -> String {
    let mut rendered = error.render().to_string();

    if !matches!(
        error.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    ) && !rendered.contains("Usage:")
    {
        if !rendered.ends_with('\n') {
            rendered.push('\n');
        }
        rendered.push('\n');
        rendered.push_str(&Cli::command().render_usage().to_string());
        rendered.push('\n');
    }

    rendered
}

fn main() -> ExitCode {
    let cli = match parse_cli(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => {
            let rendered = render_parse_error(&e);
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    print!("{rendered}");
                    ExitCode::SUCCESS
                }
                _ => {
                    eprint!("{rendered}");
                    ExitCode::from(USAGE_ERROR)
                }
            };
        }
    };

    let multi = init_logger();

    let progress = if cli.quiet {
        progress::null_progress()
    } else {
        IndicatifProgress::pages_bar(&multi)
    };

    log::info!("Reading {}", cli.input.display());

    match run(&cli, &PdfFile::new(&cli.input), &progress) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::debug!("Run failed: {e:?}");
            eprintln!("[ERROR] {e}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Ranks the pages of `source` and renders the report.
fn run(
    cli: &Cli,
    source: &dyn PageSource,
    progress: &Arc<dyn ScanProgress>,
) -> Result<String, CliError> {
    let mut config = RankConfig::new(cli.strategy);
    if cli.strategy == Strategy::Ranked {
        config = config.with_top_n(cli.top.unwrap_or(DEFAULT_TOP_N));
    }
    let ranker = Ranker::with_rules_file(cli.rules.as_deref(), config)?;

    let Outcome::Found(ranking) = ranker.rank_source(source, progress)? else {
        return Err(CliError::NoNumbers(cli.input.clone()));
    };

    Ok(match cli.format {
        Format::Json => format!("{}\n", report::render_json(&ranking)?),
        Format::Text => {
            let mut out = String::new();
            if let Some(line) = report::unit_line(&ranking) {
                out.push_str(&line);
                out.push('\n');
            }
            out.push('\n');
            out.push_str(&report::render_text(&ranking));
            out
        }
    })
}
