//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::report::ReportStatus;
use crate::submission::MediaKind;

/// Submit command arguments.
#[derive(Debug, Args)]
pub struct SubmitCommand {
    /// Media file to upload
    pub file: PathBuf,

    /// Kind of media being submitted
    #[arg(short, long, value_enum, default_value = "video")]
    pub kind: MediaKindArg,

    /// Print the saved report as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show reports with this status
    #[arg(short, long, value_enum)]
    pub status: Option<StatusArg>,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Report id
    pub id: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Report id
    pub id: String,
}

/// Clear command arguments.
#[derive(Debug, Args)]
pub struct ClearCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Ask command arguments.
#[derive(Debug, Args)]
pub struct AskCommand {
    /// Question about traffic rules or violations
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}

impl AskCommand {
    /// The question words joined back into one string.
    #[must_use]
    pub fn text(&self) -> String {
        self.question.join(" ")
    }
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Report status argument for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Awaiting review
    Submitted,
    /// Confirmed violation
    Accepted,
    /// Dismissed
    Rejected,
}

impl From<StatusArg> for ReportStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Submitted => Self::Submitted,
            StatusArg::Accepted => Self::Accepted,
            StatusArg::Rejected => Self::Rejected,
        }
    }
}

/// Media kind argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MediaKindArg {
    /// Video clip
    #[default]
    Video,
    /// Still photo
    Photo,
}

impl From<MediaKindArg> for MediaKind {
    fn from(arg: MediaKindArg) -> Self {
        match arg {
            MediaKindArg::Video => Self::Video,
            MediaKindArg::Photo => Self::Photo,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_arg_conversion() {
        assert_eq!(
            ReportStatus::from(StatusArg::Submitted),
            ReportStatus::Submitted
        );
        assert_eq!(
            ReportStatus::from(StatusArg::Accepted),
            ReportStatus::Accepted
        );
        assert_eq!(
            ReportStatus::from(StatusArg::Rejected),
            ReportStatus::Rejected
        );
    }

    #[test]
    fn test_media_kind_arg_conversion() {
        assert_eq!(MediaKind::from(MediaKindArg::Video), MediaKind::Video);
        assert_eq!(MediaKind::from(MediaKindArg::Photo), MediaKind::Photo);
        assert_eq!(MediaKindArg::default(), MediaKindArg::Video);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_list_command_debug() {
        let cmd = ListCommand {
            status: Some(StatusArg::Accepted),
            limit: Some(5),
            format: OutputFormat::Table,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Accepted"));
        assert!(debug_str.contains("limit"));
    }

    #[test]
    fn test_ask_command_text() {
        let cmd = AskCommand {
            question: vec!["is".into(), "honking".into(), "allowed?".into()],
        };
        assert_eq!(cmd.text(), "is honking allowed?");
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
