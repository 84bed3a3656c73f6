//! Command-line interface for roadreport.
//!
//! This module provides the CLI structure for the `roadrep` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AskCommand, ClearCommand, ConfigCommand, DeleteCommand, ListCommand, MediaKindArg, OutputFormat,
    ShowCommand, StatusArg, StatusCommand, SubmitCommand,
};

/// roadrep - Report traffic violations
///
/// Uploads dashcam clips and photos for classification and keeps a local
/// history of the resulting reports.
#[derive(Debug, Parser)]
#[command(name = "roadrep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a media file and save the resulting report
    Submit(SubmitCommand),

    /// List saved reports, newest first
    List(ListCommand),

    /// Show a single report
    Show(ShowCommand),

    /// Delete a report
    Delete(DeleteCommand),

    /// Delete all reports
    Clear(ClearCommand),

    /// Show storage and endpoint status
    Status(StatusCommand),

    /// Ask the traffic-rules assistant a question
    Ask(AskCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn status_cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Status(StatusCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "roadrep");
    }

    #[test]
    fn test_verbosity() {
        use crate::logging::Verbosity;
        assert_eq!(status_cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(status_cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(status_cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(status_cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(status_cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        // Verify the CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_submit_defaults_to_video() {
        let cli = Cli::try_parse_from(["roadrep", "submit", "clip.mp4"]).unwrap();
        match cli.command {
            Command::Submit(cmd) => {
                assert_eq!(cmd.file, PathBuf::from("clip.mp4"));
                assert_eq!(cmd.kind, MediaKindArg::Video);
                assert!(!cmd.json);
            }
            other => panic!("Expected Submit, got: {other:?}"),
        }
    }

    #[test]
    fn test_parse_submit_photo_json() {
        let cli =
            Cli::try_parse_from(["roadrep", "submit", "plate.jpg", "--kind", "photo", "--json"])
                .unwrap();
        match cli.command {
            Command::Submit(cmd) => {
                assert_eq!(cmd.kind, MediaKindArg::Photo);
                assert!(cmd.json);
            }
            other => panic!("Expected Submit, got: {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_filters() {
        let cli = Cli::try_parse_from([
            "roadrep", "list", "--status", "accepted", "--limit", "3", "-f", "json",
        ])
        .unwrap();
        match cli.command {
            Command::List(cmd) => {
                assert_eq!(cmd.status, Some(StatusArg::Accepted));
                assert_eq!(cmd.limit, Some(3));
                assert_eq!(cmd.format, OutputFormat::Json);
            }
            other => panic!("Expected List, got: {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["roadrep", "list", "--status", "pending"]).is_err());
    }

    #[test]
    fn test_parse_show_and_delete() {
        let cli = Cli::try_parse_from(["roadrep", "show", "report_1"]).unwrap();
        assert!(matches!(cli.command, Command::Show(ShowCommand { ref id, json: false }) if id == "report_1"));

        let cli = Cli::try_parse_from(["roadrep", "delete", "report_2"]).unwrap();
        assert!(matches!(cli.command, Command::Delete(DeleteCommand { ref id }) if id == "report_2"));
    }

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from(["roadrep", "ask", "what", "is", "a", "red-light", "violation?"])
            .unwrap();
        match cli.command {
            Command::Ask(cmd) => assert_eq!(cmd.text(), "what is a red-light violation?"),
            other => panic!("Expected Ask, got: {other:?}"),
        }

        assert!(Cli::try_parse_from(["roadrep", "ask"]).is_err());
    }

    #[test]
    fn test_parse_clear() {
        let cli = Cli::try_parse_from(["roadrep", "clear", "--yes"]).unwrap();
        assert!(matches!(cli.command, Command::Clear(ClearCommand { yes: true })));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli =
            Cli::try_parse_from(["roadrep", "config", "validate", "--file", "/tmp/c.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["roadrep", "-c", "/custom/config.toml", "status"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["roadrep", "status", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["roadrep", "list", "-q"]).unwrap();
        assert!(cli.quiet);
    }
}
