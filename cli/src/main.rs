use std::io::BufRead;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sms_command_core::{AnalyzeOutcome, DecodeError, ParseResult, Slot, strip_prefix};
use sms_command_db::{DecoderSettings, LoadOutcome, TableLoader, TableStore};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliOutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "sms-decode")]
#[command(about = "Check keyword tables and decode SMS home-automation commands")]
struct Cli {
    /// Log decoding steps (overrides RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a tables file and print the load log.
    Check(CheckArgs),
    /// Decode commands given as arguments, or one per stdin line.
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Args)]
struct TablesArgs {
    /// Tables file (JSON, or YAML with a .yml/.yaml extension).
    #[arg(long)]
    tables: Option<PathBuf>,
    /// Decoder settings YAML file.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Compare input with accents kept.
    #[arg(long)]
    keep_diacritics: bool,
}

#[derive(Debug, Args)]
struct CheckArgs {
    #[command(flatten)]
    tables: TablesArgs,
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    #[command(flatten)]
    tables: TablesArgs,
    /// Prefix every message must start with (overrides the settings file).
    #[arg(long)]
    prefix: Option<String>,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: CliOutputFormat,
    /// Command text; read from stdin when omitted.
    text: Vec<String>,
}

/// One decoded message in JSON output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DecodedMessage<'a> {
    message: &'a str,
    understood: Option<String>,
    failed_slot: Option<&'static str>,
    first_error: &'a str,
    full_log: &'a str,
    result: &'a ParseResult,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Analyze(args) => run_analyze(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn resolve_settings(args: &TablesArgs) -> Result<DecoderSettings, String> {
    let mut settings = match &args.settings {
        Some(path) => DecoderSettings::load(path)
            .map_err(|err| format!("Failed to read settings '{}': {err}", path.display()))?,
        None => DecoderSettings::default(),
    };
    if let Some(tables) = &args.tables {
        settings.tables = tables.clone();
    }
    if args.keep_diacritics {
        settings.fold_diacritics = false;
    }
    if settings.tables.as_os_str().is_empty() {
        return Err("Specify a tables file with --tables or --settings".to_string());
    }
    Ok(settings)
}

fn load_tables(settings: &DecoderSettings) -> Result<LoadOutcome, String> {
    let path = settings.tables_path().map_err(|e| e.to_string())?;
    TableLoader::new(settings.fold_options())
        .load_path(path)
        .map_err(|err| format!("Failed to load '{}': {err}", path.display()))
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let settings = resolve_settings(&args.tables)?;
    let outcome = load_tables(&settings)?;

    if !outcome.full_log.is_empty() {
        println!("{}", outcome.full_log);
    }
    if !outcome.is_ok() {
        return Err(outcome.first_error);
    }

    let tables = &outcome.tables;
    println!(
        "Ok: {} command(s), {} device class(es), {} device(s) in '{}'.",
        tables.commands().len(),
        tables.device_classes().len(),
        tables.devices().len(),
        settings.tables.display()
    );
    Ok(())
}

fn run_analyze(args: AnalyzeArgs) -> Result<(), String> {
    let settings = resolve_settings(&args.tables)?;
    let loaded = load_tables(&settings)?;
    if !loaded.is_ok() {
        eprintln!("{}", loaded.full_log);
        return Err(format!(
            "Tables in '{}' are invalid: {}",
            settings.tables.display(),
            loaded.first_error
        ));
    }
    let store = TableStore::new(loaded.tables);
    let prefix = args.prefix.unwrap_or_else(|| settings.prefix.clone());

    let messages = if args.text.is_empty() {
        read_stdin_lines()?
    } else {
        vec![args.text.join(" ")]
    };

    let options = settings.fold_options();
    let mut failures = 0usize;
    for message in &messages {
        let Some(text) = strip_prefix(message, &prefix, settings.prefix_min_length, &options)
        else {
            debug!(message = %message, prefix = %prefix, "message ignored");
            println!("Ignored, no '{prefix}' prefix: {message}");
            failures += 1;
            continue;
        };

        let outcome = store.analyze(text);
        if !outcome.is_ok() {
            failures += 1;
        }
        match args.format {
            CliOutputFormat::Text => print_text(&outcome),
            CliOutputFormat::Json => print_json(message, &outcome)?,
        }
    }

    info!(messages = messages.len(), failures, "analysis done");
    if failures > 0 {
        return Err(format!(
            "{failures} of {} message(s) not understood",
            messages.len()
        ));
    }
    Ok(())
}

fn read_stdin_lines() -> Result<Vec<String>, String> {
    let mut lines = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line.map_err(|err| format!("Failed to read stdin: {err}"))?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

fn print_text(outcome: &AnalyzeOutcome) {
    if !outcome.is_ok() {
        println!("Error: {}", outcome.first_error);
        return;
    }
    let result = &outcome.result;
    println!("Understood: {}", result.understood());
    if let Some(index) = &result.device_id {
        println!("  device: {} ({index})", result.device_id_name);
    }
    println!(
        "  command value: {} ({})",
        result.command_value_text, result.command_value
    );
    if let Some(value) = &result.value_to_set_remapped {
        println!("  value: {value}");
    } else if let Some(value) = &result.value_to_set {
        println!("  value: {value}");
    }
}

fn print_json(message: &str, outcome: &AnalyzeOutcome) -> Result<(), String> {
    let decoded = DecodedMessage {
        message,
        understood: outcome.is_ok().then(|| outcome.result.understood()),
        failed_slot: outcome
            .error
            .as_ref()
            .and_then(DecodeError::slot)
            .map(Slot::label),
        first_error: &outcome.first_error,
        full_log: &outcome.full_log,
        result: &outcome.result,
    };
    let raw = serde_json::to_string(&decoded)
        .map_err(|err| format!("Failed to serialize result: {err}"))?;
    println!("{raw}");
    Ok(())
}
