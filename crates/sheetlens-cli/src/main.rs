//! `sheetlens` command-line tool
//!
//! Exit codes: 0 on success, 2 for configuration errors, 3 when the source
//! rejects credentials or access, 1 for anything else.

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use sheetlens_core::{
    analyze_snapshots, load_snapshots, AnalysisError, Analyzer, AnalyzerConfig, ConfigError,
    ErrorKind, SpreadsheetLocator,
};
use sheetlens_model::{AnalysisResult, SpreadsheetId};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("sheetlens")
        .version(sheetlens_core::VERSION)
        .about("Explain the structure and intent of a spreadsheet from its formulas")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .subcommand(
            Command::new("analyze")
                .about("Analyze a live spreadsheet")
                .arg(
                    Arg::new("locator")
                        .required(true)
                        .help("Spreadsheet URL or id"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(json_flag())
                .arg(
                    Arg::new("no-cache")
                        .long("no-cache")
                        .action(ArgAction::SetTrue)
                        .help("Always fetch, never reuse a cached result"),
                ),
        )
        .subcommand(
            Command::new("offline")
                .about("Analyze sheets from a snapshot file without network access")
                .arg(
                    Arg::new("snapshot")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("JSON array of sheet snapshots"),
                )
                .arg(
                    Arg::new("title")
                        .long("title")
                        .help("Title shown in the report (defaults to the file name)"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("locate")
                .about("Print the spreadsheet id extracted from a URL")
                .arg(
                    Arg::new("locator")
                        .required(true)
                        .help("Spreadsheet URL or id"),
                ),
        )
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print the full result as JSON")
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a String> {
    args.get_one::<String>(name)
        .ok_or_else(|| anyhow!("missing argument <{name}>"))
}

fn print_result(result: &AnalysisResult, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(result).context("serializing result")?;
        println!("{text}");
    } else {
        print!("{}", sheetlens_insight::render_text(result));
    }
    Ok(())
}

async fn analyze(args: &ArgMatches) -> Result<()> {
    let locator = required(args, "locator")?;
    let path = args.get_one::<PathBuf>("config").map(PathBuf::as_path);

    let mut config = AnalyzerConfig::load(path).map_err(AnalysisError::from)?;
    if args.get_flag("no-cache") {
        config = config.with_cache_enabled(false);
    }
    let analyzer = Analyzer::from_config(&config).map_err(AnalysisError::from)?;
    tracing::info!(locator = %locator, cache = config.cache.enabled, "analyzing spreadsheet");
    let result = analyzer.analyze_locator(locator).await?;
    print_result(&result, args.get_flag("json"))
}

fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "offline".to_string(), |s| s.to_string_lossy().into_owned())
}

fn offline(args: &ArgMatches) -> Result<()> {
    let path = args
        .get_one::<PathBuf>("snapshot")
        .ok_or_else(|| anyhow!("missing argument <snapshot>"))?;
    let sheets = load_snapshots(path).map_err(AnalysisError::from)?;
    tracing::info!(path = %path.display(), sheets = sheets.len(), "analyzing snapshot file");
    let title = args
        .get_one::<String>("title")
        .cloned()
        .unwrap_or_else(|| title_from_path(path));

    let result = analyze_snapshots(SpreadsheetId::new(title_from_path(path)), title, sheets);
    print_result(&result, args.get_flag("json"))
}

fn locate(args: &ArgMatches) -> Result<()> {
    let locator = SpreadsheetLocator::parse(required(args, "locator")?)
        .map_err(AnalysisError::from)?;
    tracing::debug!(from_url = locator.is_url(), "locator parsed");
    println!("{}", locator.id());
    Ok(())
}

async fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("analyze", args)) => analyze(args).await,
        Some(("offline", args)) => offline(args),
        Some(("locate", args)) => locate(args),
        Some((other, _)) => Err(anyhow!("unknown command {other}")),
        None => Err(anyhow!("no command given")),
    }
}

/// Process exit code for a failed run
fn exit_code(err: &anyhow::Error) -> u8 {
    let kind = err
        .downcast_ref::<AnalysisError>()
        .map(AnalysisError::kind)
        .or_else(|| {
            err.downcast_ref::<ConfigError>()
                .map(|_| ErrorKind::Configuration)
        });
    match kind {
        Some(ErrorKind::Configuration) => 2,
        Some(ErrorKind::Unauthorized | ErrorKind::AccessDenied) => 3,
        Some(ErrorKind::Processing) | None => 1,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match run(&matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if let Some(analysis) = err.downcast_ref::<AnalysisError>() {
                eprintln!("hint: {}", analysis.remediation_hint());
            }
            ExitCode::from(exit_code(&err))
        }
    }
}
