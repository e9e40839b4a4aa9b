//! Shared domain types used by both the TUI binary and the pure logic
//! in this crate.
//!
//! Everything here is fully owned (no borrowed lifetimes) so values can
//! cross the channel boundary between the git background thread and the
//! main event loop.

/// The three top-level things gruff can do.
///
/// `None` means the user has not picked yet and the task picker must be
/// shown. A task passed on the command line skips the picker entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Task {
    #[default]
    None,
    Review,
    Commit,
    PrDescription,
}

impl Task {
    /// Human-readable label used in the task picker.
    pub fn label(self) -> &'static str {
        match self {
            Task::None => "",
            Task::Review => "Review",
            Task::Commit => "Generate commit message",
            Task::PrDescription => "Generate PR description",
        }
    }
}

/// What the review task should look at.
///
/// A closed enumeration — downstream diff selection matches on these
/// variants, never on free-form strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewOption {
    #[default]
    None,
    /// Working tree including unstaged changes (`git diff HEAD`).
    CurrentChanges,
    /// Index only (`git diff --staged`).
    StagedChanges,
    /// One specific commit picked from the recent-commit list.
    Commit,
    /// Diff against a named branch.
    Branch,
}

impl ReviewOption {
    pub fn label(self) -> &'static str {
        match self {
            ReviewOption::None => "",
            ReviewOption::CurrentChanges => "Review current changes",
            ReviewOption::StagedChanges => "Review staged changes",
            ReviewOption::Commit => "Review a recent commit",
            ReviewOption::Branch => "Review against a branch",
        }
    }
}

/// A single git commit as shown in the commit picker and fed to prompt
/// assembly.
///
/// `date` is already humanized ("3 days ago") — the git provider formats
/// it once so the UI and prompts never deal with raw timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    pub author: String,
    pub date: String,
    pub subject: String,
    /// Full commit body; empty for subject-only commits.
    pub body: String,
}

/// Everything the PR-description prompt needs to know about the current
/// branch relative to its base.
///
/// Computed on demand per PR-description run; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub name: String,
    pub base_branch: String,
    /// Commits exclusive to this branch, in git log order.
    pub commits: Vec<Commit>,
    pub files_changed: usize,
    pub additions: usize,
    pub deletions: usize,
    /// Raw diff text, possibly truncated with a trailing marker.
    pub diffs: String,
}
