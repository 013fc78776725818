use std::fs;
use std::io::Read;
use std::path::Path as FsPath;
use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use strucmp_diff::{compare, DiffOptions, DiffReport, DifferenceRecord, ExcludeSpec};
use strucmp_types::Value;
use tracing::Level;

use crate::cli::*;
use crate::request::{self, CompareRequest, CompareResponse};

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Run(args) => cmd_run(args, cli.verbose),
        Command::Files(args) => cmd_files(args, cli.verbose, cli.format),
    }
}

/// Install the stderr log subscriber. DEBUG when asked for, WARN otherwise.
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn read_request(args: &RunArgs) -> anyhow::Result<String> {
    if let Some(request) = &args.request {
        return Ok(request.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .with_context(|| format!("failed to read request file {}", path.display()));
    }
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read request from stdin")?;
    Ok(input)
}

fn cmd_run(args: RunArgs, verbose: bool) -> anyhow::Result<ExitCode> {
    let input = read_request(&args)?;

    let parsed = CompareRequest::from_json(&input);
    init_logging(verbose || parsed.as_ref().is_ok_and(|req| req.open_log));

    let response = match parsed {
        Ok(req) => request::respond(&req),
        // Empty input and parse errors get their failure message here.
        Err(_) => request::handle(&input),
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(ExitCode::SUCCESS)
}

fn load_document(path: &FsPath) -> anyhow::Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let json: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(Value::from(json))
}

fn load_config(path: &FsPath) -> anyhow::Result<DiffOptions> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

/// Options from the config file (if any) with command-line flags applied on top.
fn build_options(args: &FilesArgs) -> anyhow::Result<DiffOptions> {
    let mut options = match &args.config {
        Some(path) => load_config(path)?,
        None => DiffOptions::default(),
    };

    if !args.exclude.is_empty() {
        options.exclude_fields = ExcludeSpec::new(&args.exclude)?;
    }
    if args.ordered {
        options.equivalence.ignore_order = false;
    }
    options
        .equivalence
        .ignore_type_in_groups
        .extend(args.type_groups.iter().cloned());
    if args.check_redundant {
        options.check_redundant = true;
    }
    if args.no_check_value {
        options.check_value = false;
    }
    if args.no_check_missing {
        options.check_missing = false;
    }
    if args.no_check_type {
        options.check_type = false;
    }
    if let Some(depth) = args.max_depth {
        options.max_depth = depth;
    }
    Ok(options)
}

fn cmd_files(args: FilesArgs, verbose: bool, format: OutputFormat) -> anyhow::Result<ExitCode> {
    init_logging(verbose);
    let options = build_options(&args)?;
    let origin = load_document(&args.origin)?;
    let current = load_document(&args.current)?;

    let report = compare(&origin, &current, &options)
        .with_context(|| format!("cannot compare {} with {}", args.origin.display(), args.current.display()))?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_text(&report),
    }

    Ok(if report.is_identical() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn print_json(report: &DiffReport) -> anyhow::Result<()> {
    let mut response = serde_json::to_value(CompareResponse::from_report(report))?;
    response["records"] = serde_json::to_value(report.records())?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn print_text(report: &DiffReport) {
    if report.is_identical() {
        println!("{} No differences.", "✓".green().bold());
        return;
    }
    for record in report {
        let line = record.to_string();
        let line = match record {
            DifferenceRecord::MissingField { .. } | DifferenceRecord::ListItemRemoved { .. } => line.red(),
            DifferenceRecord::RedundantField { .. } | DifferenceRecord::ListItemAdded { .. } => line.green(),
            DifferenceRecord::TypeConflict { .. } => line.magenta(),
            DifferenceRecord::ValueChanged { note: Some(_), .. } => line.yellow().bold(),
            DifferenceRecord::ValueChanged { .. } => line.yellow(),
        };
        println!("  {line}");
    }
    println!("\n{} {} difference(s)", "✗".red().bold(), report.len().to_string().bold());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn files_args(extra: &[&str]) -> FilesArgs {
        let mut argv = vec!["strucmp", "files", "a.json", "b.json"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Files(args) => args,
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn load_document_reads_json() {
        let file = temp_file(r#"{"b": 1, "a": [true, null]}"#);
        let value = load_document(file.path()).unwrap();
        let Value::Map(map) = value else { panic!("expected map") };
        assert_eq!(map.keys().collect::<Vec<_>>(), ["b", "a"]);
    }

    #[test]
    fn load_document_rejects_bad_json() {
        let file = temp_file("{oops");
        let err = load_document(file.path()).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn flags_build_options() {
        let opts = build_options(&files_args(&[
            "--exclude", "ts", "--ordered", "--type-group", "str,int",
            "--no-check-missing", "--max-depth", "8",
        ]))
        .unwrap();
        assert_eq!(opts.exclude_fields, ExcludeSpec::new(["ts"]).unwrap());
        assert!(!opts.equivalence.ignore_order);
        assert_eq!(opts.equivalence.ignore_type_in_groups.len(), 1);
        assert!(!opts.check_missing);
        assert!(opts.check_value);
        assert_eq!(opts.max_depth, 8);
    }

    #[test]
    fn config_file_with_flag_override() {
        let config = temp_file(
            r#"
check_redundant = true
check_type = false
exclude_fields = ["meta", "rows[*].link"]

[equivalence]
ignore_order = false
ignore_type_in_groups = [["float", "int"]]
"#,
        );
        let path = config.path().to_str().unwrap();
        let opts = build_options(&files_args(&["--config", path, "--no-check-value"])).unwrap();
        assert!(opts.check_redundant);
        assert!(!opts.check_type);
        assert!(!opts.check_value);
        assert_eq!(opts.exclude_fields.len(), 2);
        assert!(!opts.equivalence.ignore_order);
        assert_eq!(opts.equivalence.ignore_type_in_groups.len(), 1);

        let opts = build_options(&files_args(&["--config", path, "-x", "only"])).unwrap();
        assert_eq!(opts.exclude_fields, ExcludeSpec::new(["only"]).unwrap());
    }

    #[test]
    fn bad_config_is_an_error() {
        let config = temp_file("exclude_fields = [\"a..b\"]\n");
        let path = config.path().to_str().unwrap();
        assert!(build_options(&files_args(&["--config", path])).is_err());
    }

    #[test]
    fn run_reads_request_file() {
        let file = temp_file(r#"{"origin_data": {}, "current_data": {}}"#);
        let args = RunArgs {
            request: None,
            file: Some(file.path().to_path_buf()),
        };
        let input = read_request(&args).unwrap();
        assert!(request::handle(&input).success);
    }
}
