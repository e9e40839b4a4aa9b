//! Command-line interface.
//!
//! The bare `gruff` command opens the task picker; each task also has a
//! subcommand that skips straight to it. Asset management (`add`,
//! `delete`, `edit`, `reset`) and `config` run without the TUI.

use clap::{Args, Parser, Subcommand, ValueEnum};

use gruff_core::assets::Category;

#[derive(Debug, Parser)]
#[command(
    name = "gruff",
    version,
    about = "AI-assisted code reviews, commit messages, and PR descriptions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Flags for the default review flow when no subcommand is given.
    #[command(flatten)]
    pub review: ReviewArgs,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ReviewArgs {
    /// Reviewer persona (case-insensitive substring match)
    #[arg(long = "as", value_name = "REVIEWER")]
    pub reviewer: Option<String>,

    /// Review current changes, staged and unstaged
    #[arg(long, conflicts_with_all = ["staged", "commit", "branch"])]
    pub changes: bool,

    /// Review staged changes only
    #[arg(long, conflicts_with_all = ["commit", "branch"])]
    pub staged: bool,

    /// Pick a recent commit to review
    #[arg(long, conflicts_with = "branch")]
    pub commit: bool,

    /// Review the working tree against a branch
    #[arg(long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Instruction set to apply (case-insensitive substring match)
    #[arg(long, value_name = "NAME")]
    pub instructions: Option<String>,

    /// Skip the instruction picker
    #[arg(long)]
    pub skip_instruction: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a code review
    Review(ReviewArgs),

    /// Generate a commit message and commit
    Commit {
        /// Stage all tracked changes before generating
        #[arg(long)]
        all: bool,
        /// Free-text hint about the nature of the change
        #[arg(long)]
        hint: Option<String>,
    },

    /// Generate a pull-request description
    Pr {
        /// Base branch to compare against (default: detected)
        #[arg(long)]
        branch: Option<String>,
    },

    /// Create a reviewer or instruction set in your editor
    Add {
        category: CategoryArg,
        name: String,
    },

    /// Delete a stored reviewer or instruction set
    Delete {
        category: CategoryArg,
        name: String,
    },

    /// Open a stored reviewer or instruction set in your editor
    Edit {
        category: CategoryArg,
        name: String,
    },

    /// Open the configuration file in your editor
    Config,

    /// Restore the default reviewers and instruction sets
    Reset,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Reviewer,
    Instruction,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Reviewer => Category::Reviewers,
            CategoryArg::Instruction => Category::Instructions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn bare_invocation_has_no_subcommand() {
        let cli = Cli::parse_from(["gruff"]);
        assert!(cli.command.is_none());
        assert!(!cli.review.staged);
    }

    #[test]
    fn review_flags_parse() {
        let cli = Cli::parse_from([
            "gruff", "review", "--as", "maintainer", "--staged", "--skip-instruction",
        ]);
        match cli.command {
            Some(Command::Review(args)) => {
                assert_eq!(args.reviewer.as_deref(), Some("maintainer"));
                assert!(args.staged);
                assert!(args.skip_instruction);
            }
            other => panic!("expected review subcommand, got {other:?}"),
        }
    }

    #[test]
    fn conflicting_sources_are_rejected() {
        assert!(Cli::try_parse_from(["gruff", "review", "--staged", "--branch", "main"]).is_err());
        assert!(Cli::try_parse_from(["gruff", "--changes", "--commit"]).is_err());
    }

    #[test]
    fn config_subcommand_parses() {
        let cli = Cli::parse_from(["gruff", "config"]);
        assert!(matches!(cli.command, Some(Command::Config)));
    }

    #[test]
    fn commit_and_pr_flags_parse() {
        let cli = Cli::parse_from(["gruff", "commit", "--all", "--hint", "refactor"]);
        assert!(matches!(
            cli.command,
            Some(Command::Commit { all: true, ref hint }) if hint.as_deref() == Some("refactor")
        ));

        let cli = Cli::parse_from(["gruff", "pr", "--branch", "develop"]);
        assert!(matches!(
            cli.command,
            Some(Command::Pr { ref branch }) if branch.as_deref() == Some("develop")
        ));
    }
}
