//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cursor-paginated retrieval CLI
#[derive(Parser, Debug)]
#[command(name = "pagewalk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true, default_value = "pagewalk.yaml")]
    pub config: PathBuf,

    /// Summary format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Retrieve an object type, following continuation tokens
    Retrieve {
        /// Object type to retrieve
        #[arg(long)]
        object: String,

        /// Properties to retrieve (comma-separated, default from config)
        #[arg(long, value_delimiter = ',')]
        properties: Option<Vec<String>>,

        /// Lower bound of the date filter (default: epoch)
        #[arg(long)]
        start: Option<String>,

        /// Upper bound of the date filter (default: now)
        #[arg(long)]
        end: Option<String>,

        /// Date property to filter on (default from config)
        #[arg(long, conflicts_with = "no_filter")]
        filter_field: Option<String>,

        /// Retrieve without a date filter
        #[arg(long)]
        no_filter: bool,

        /// Output file (JSON lines, default stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Where the paused state is written
        #[arg(long, default_value = "paused.json")]
        pause_file: PathBuf,

        /// Execution budget in seconds (overrides config)
        #[arg(long)]
        budget_secs: Option<u64>,
    },

    /// Resume a paused retrieval
    Resume {
        /// Paused state written by an earlier run
        #[arg(long, default_value = "paused.json")]
        pause_file: PathBuf,

        /// Output file to append to (JSON lines, default stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Execution budget in seconds (overrides config)
        #[arg(long)]
        budget_secs: Option<u64>,
    },

    /// List configured object types
    Objects,

    /// Validate the configuration file
    Validate,
}

/// Summary output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_retrieve() {
        let cli = Cli::try_parse_from([
            "pagewalk",
            "-C",
            "gw.yaml",
            "retrieve",
            "--object",
            "Send",
            "--properties",
            "ID,SendDate",
            "--start",
            "2024-01-01",
            "-o",
            "send.jsonl",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("gw.yaml"));
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Retrieve {
                object,
                properties,
                start,
                end,
                no_filter,
                output,
                pause_file,
                ..
            } => {
                assert_eq!(object, "Send");
                assert_eq!(properties, Some(vec!["ID".to_string(), "SendDate".to_string()]));
                assert_eq!(start.as_deref(), Some("2024-01-01"));
                assert!(end.is_none());
                assert!(!no_filter);
                assert_eq!(output, Some(PathBuf::from("send.jsonl")));
                assert_eq!(pause_file, PathBuf::from("paused.json"));
            }
            other => panic!("Expected Retrieve, got {other:?}"),
        }
    }

    #[test]
    fn test_filter_field_conflicts_with_no_filter() {
        let result = Cli::try_parse_from([
            "pagewalk",
            "retrieve",
            "--object",
            "Send",
            "--filter-field",
            "CreatedDate",
            "--no-filter",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_resume_with_global_flags() {
        let cli = Cli::try_parse_from([
            "pagewalk",
            "resume",
            "--pause-file",
            "state/send.json",
            "--budget-secs",
            "600",
            "-v",
            "--format",
            "pretty",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Pretty);
        match cli.command {
            Commands::Resume {
                pause_file,
                output,
                budget_secs,
            } => {
                assert_eq!(pause_file, PathBuf::from("state/send.json"));
                assert!(output.is_none());
                assert_eq!(budget_secs, Some(600));
            }
            other => panic!("Expected Resume, got {other:?}"),
        }
    }
}
