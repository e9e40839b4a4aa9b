//! Request/response types for the git background thread.
//!
//! All payloads are fully owned (no borrowed lifetimes) so they can cross
//! the channel boundary between the thread that owns the
//! `git2::Repository` and the main event loop.

use gruff_core::types::{BranchInfo, Commit};

/// Errors from git operations, mapped from git2 into the small taxonomy
/// the orchestrator reacts to.
///
/// `NoChangesInRepository` and `NoCommitsInRepository` are routine
/// situations that get a friendly info message rather than an error
/// screen; everything unexpected collapses into `Other`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GitError {
    #[error("not a git repository")]
    NotARepository,
    #[error("no changes found in the repository")]
    NoChangesInRepository,
    #[error("the repository does not have any commits yet")]
    NoCommitsInRepository,
    #[error("{0}")]
    Other(String),
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound if err.class() == git2::ErrorClass::Repository => {
                GitError::NotARepository
            }
            git2::ErrorCode::UnbornBranch => GitError::NoCommitsInRepository,
            _ => GitError::Other(err.message().to_owned()),
        }
    }
}

/// Commands sent from the main thread to the git background worker.
#[derive(Debug)]
pub enum GitRequest {
    /// Load the most recent commits on HEAD, newest first.
    RecentCommits { limit: usize },
    /// Diff of one commit against its first parent.
    CommitDiff { hash: String },
    /// Diff of the working tree against HEAD. With `include_unstaged`
    /// this covers both staged and unstaged edits; without it, the index
    /// only.
    WorkingTreeDiff { include_unstaged: bool },
    /// Diff of the working tree against the tip of a named branch.
    BranchDiff { branch: String },
    /// Everything the PR-description prompt needs about the current
    /// branch. `base` overrides base-branch detection when set.
    BranchInfo { base: Option<String> },
    /// Create a commit with `message`; with `stage_all`, stage every
    /// tracked change first.
    Commit { message: String, stage_all: bool },
}

/// Replies from the worker, carried inside `AppEvent::Git(Box<_>)`.
///
/// Each request kind has its own variant so the orchestrator can route a
/// reply without tracking which request is in flight.
#[derive(Debug)]
pub enum GitResponse {
    Commits(Result<Vec<Commit>, GitError>),
    CommitDiff(Result<String, GitError>),
    WorkingTreeDiff(Result<String, GitError>),
    BranchDiff {
        branch: String,
        result: Result<String, GitError>,
    },
    BranchInfo(Result<BranchInfo, GitError>),
    Committed(Result<(), GitError>),
}
