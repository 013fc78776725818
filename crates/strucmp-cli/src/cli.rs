use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use strucmp_diff::TypeGroup;
use strucmp_types::ScalarKind;

#[derive(Parser)]
#[command(
    name = "strucmp",
    about = "Structural comparison of JSON-like documents",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log comparison progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Answer a JSON comparison request and print the JSON response
    Run(RunArgs),
    /// Compare two JSON files
    Files(FilesArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Request as a JSON string. Read from --file or stdin when absent.
    pub request: Option<String>,
    #[arg(short, long, conflicts_with = "request")]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct FilesArgs {
    pub origin: PathBuf,
    pub current: PathBuf,
    /// Exclude pattern such as `user.profile` or `rows[*].link` (repeatable)
    #[arg(short = 'x', long = "exclude")]
    pub exclude: Vec<String>,
    /// Compare lists position by position
    #[arg(long)]
    pub ordered: bool,
    /// Comma-separated kinds treated as one type, e.g. `str,int` (repeatable)
    #[arg(long = "type-group", value_parser = parse_type_group)]
    pub type_groups: Vec<TypeGroup>,
    #[arg(long)]
    pub check_redundant: bool,
    #[arg(long)]
    pub no_check_value: bool,
    #[arg(long)]
    pub no_check_missing: bool,
    #[arg(long)]
    pub no_check_type: bool,
    #[arg(long)]
    pub max_depth: Option<usize>,
    /// TOML file with comparison options; flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_type_group(s: &str) -> Result<TypeGroup, String> {
    let kinds = s
        .split(',')
        .map(|kind| kind.trim().parse::<ScalarKind>().map_err(|e| e.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    if kinds.len() < 2 {
        return Err(format!("type group `{s}` needs at least two kinds"));
    }
    Ok(TypeGroup::new(kinds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_inline() {
        let cli = Cli::try_parse_from(["strucmp", "run", r#"{"origin_data": {}}"#]).unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.request.as_deref(), Some(r#"{"origin_data": {}}"#));
            assert!(args.file.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_run_file() {
        let cli = Cli::try_parse_from(["strucmp", "run", "--file", "req.json"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.file, Some(PathBuf::from("req.json")));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn run_request_and_file_conflict() {
        assert!(Cli::try_parse_from(["strucmp", "run", "{}", "--file", "req.json"]).is_err());
    }

    #[test]
    fn parse_files_with_flags() {
        let cli = Cli::try_parse_from([
            "strucmp", "files", "a.json", "b.json",
            "-x", "timestamp", "--exclude", "rows[*].link",
            "--ordered", "--type-group", "str,int", "--check-redundant",
            "--no-check-type", "--max-depth", "32",
        ])
        .unwrap();
        if let Command::Files(args) = cli.command {
            assert_eq!(args.origin, PathBuf::from("a.json"));
            assert_eq!(args.exclude, vec!["timestamp", "rows[*].link"]);
            assert!(args.ordered);
            assert_eq!(args.type_groups.len(), 1);
            assert!(args.type_groups[0].contains(ScalarKind::Int));
            assert!(args.check_redundant);
            assert!(args.no_check_type);
            assert!(!args.no_check_value);
            assert_eq!(args.max_depth, Some(32));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn bad_type_group_rejected() {
        assert!(Cli::try_parse_from(["strucmp", "files", "a", "b", "--type-group", "str,widget"]).is_err());
        assert!(Cli::try_parse_from(["strucmp", "files", "a", "b", "--type-group", "str"]).is_err());
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["strucmp", "--verbose", "run"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["strucmp", "--format", "json", "files", "a", "b"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
