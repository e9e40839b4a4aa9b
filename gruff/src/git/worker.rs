//! Background thread that owns git2::Repository for its lifetime.
//!
//! git2::Repository is !Send — it must be opened inside the thread, not
//! passed in. All communication is via channels: GitRequest in,
//! AppEvent::Git out. The main binary verifies the repository exists
//! before spawning this thread, so an open failure here only happens if
//! the repository vanished in between; the worker then exits and every
//! pending request is answered with `NotARepository`.

use std::time::{SystemTime, UNIX_EPOCH};

use crossbeam_channel::Receiver;
use git2::{Diff, DiffFormat, DiffOptions, IndexAddOption, Repository};
use gruff_core::types::{BranchInfo, Commit};
use tokio::sync::mpsc::UnboundedSender;

use crate::event::AppEvent;
use crate::git::types::{GitError, GitRequest, GitResponse};

/// Diffs longer than this are cut off before being fed to a prompt.
const MAX_DIFF_LINES: usize = 2000;
const TRUNCATION_MARKER: &str = "... (truncated)";

/// Entry point for the background thread that owns the git Repository.
///
/// Opens the repository at `path` and loops over incoming `GitRequest`
/// messages until the channel is closed (sender dropped).
pub fn git_worker_loop(path: String, rx: Receiver<GitRequest>, event_tx: UnboundedSender<AppEvent>) {
    let repo = match Repository::discover(&path) {
        Ok(r) => r,
        Err(_) => {
            for request in rx {
                let response = failed_response(request, GitError::NotARepository);
                let _ = event_tx.send(AppEvent::Git(Box::new(response)));
            }
            return;
        }
    };

    for request in rx {
        let response = handle_request(&repo, request);
        let _ = event_tx.send(AppEvent::Git(Box::new(response)));
    }
}

fn handle_request(repo: &Repository, request: GitRequest) -> GitResponse {
    match request {
        GitRequest::RecentCommits { limit } => GitResponse::Commits(recent_commits(repo, limit)),
        GitRequest::CommitDiff { hash } => GitResponse::CommitDiff(commit_diff(repo, &hash)),
        GitRequest::WorkingTreeDiff { include_unstaged } => {
            GitResponse::WorkingTreeDiff(working_tree_diff(repo, include_unstaged))
        }
        GitRequest::BranchDiff { branch } => {
            let result = branch_diff(repo, &branch);
            GitResponse::BranchDiff { branch, result }
        }
        GitRequest::BranchInfo { base } => GitResponse::BranchInfo(branch_info(repo, base)),
        GitRequest::Commit { message, stage_all } => {
            GitResponse::Committed(commit_changes(repo, &message, stage_all))
        }
    }
}

fn failed_response(request: GitRequest, err: GitError) -> GitResponse {
    match request {
        GitRequest::RecentCommits { .. } => GitResponse::Commits(Err(err)),
        GitRequest::CommitDiff { .. } => GitResponse::CommitDiff(Err(err)),
        GitRequest::WorkingTreeDiff { .. } => GitResponse::WorkingTreeDiff(Err(err)),
        GitRequest::BranchDiff { branch } => GitResponse::BranchDiff { branch, result: Err(err) },
        GitRequest::BranchInfo { .. } => GitResponse::BranchInfo(Err(err)),
        GitRequest::Commit { .. } => GitResponse::Committed(Err(err)),
    }
}

/// The most recent commits on HEAD, newest first.
fn recent_commits(repo: &Repository, limit: usize) -> Result<Vec<Commit>, GitError> {
    // push_head on an empty repository reports a generic reference
    // error; probing HEAD first yields the unborn-branch code, which
    // maps to NoCommitsInRepository.
    repo.head()?;

    let mut revwalk = repo.revwalk()?;
    revwalk.push_head()?;

    let now = unix_now();
    let mut commits = Vec::with_capacity(limit);
    for oid in revwalk.take(limit) {
        let commit = repo.find_commit(oid?)?;
        commits.push(to_owned_commit(repo, &commit, now)?);
    }
    Ok(commits)
}

fn to_owned_commit(repo: &Repository, commit: &git2::Commit, now: i64) -> Result<Commit, GitError> {
    let short = repo.find_object(commit.id(), None)?.short_id()?;
    Ok(Commit {
        hash: short.as_str().unwrap_or_default().to_owned(),
        author: commit.author().name().unwrap_or("unknown").to_owned(),
        date: humanize_age(now - commit.time().seconds()),
        subject: commit.summary().unwrap_or("").to_owned(),
        body: commit.body().unwrap_or("").trim().to_owned(),
    })
}

/// Diff of one commit against its first parent. Root commits diff
/// against the empty tree.
fn commit_diff(repo: &Repository, hash: &str) -> Result<String, GitError> {
    let commit = repo.revparse_single(hash)?.peel_to_commit()?;
    let tree = commit.tree()?;
    let parent_tree = match commit.parent(0) {
        Ok(parent) => Some(parent.tree()?),
        Err(_) => None,
    };

    let mut opts = DiffOptions::new();
    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;
    Ok(diff_to_string(&diff)?)
}

/// Diff of the working tree against HEAD.
///
/// `include_unstaged` compares HEAD to the working directory through the
/// index (`git diff HEAD`); without it only the index is compared
/// (`git diff --staged`). An empty diff is reported as
/// `NoChangesInRepository` so the orchestrator can show a friendly
/// message instead of a blank review.
fn working_tree_diff(repo: &Repository, include_unstaged: bool) -> Result<String, GitError> {
    let head_tree = repo.head()?.peel_to_commit()?.tree()?;

    let mut opts = DiffOptions::new();
    let diff = if include_unstaged {
        repo.diff_tree_to_workdir_with_index(Some(&head_tree), Some(&mut opts))?
    } else {
        repo.diff_tree_to_index(Some(&head_tree), None, Some(&mut opts))?
    };

    let text = diff_to_string(&diff)?;
    if text.trim().is_empty() {
        return Err(GitError::NoChangesInRepository);
    }
    Ok(text)
}

/// Diff of the working tree against the tip of `branch`, truncated to
/// [`MAX_DIFF_LINES`].
fn branch_diff(repo: &Repository, branch: &str) -> Result<String, GitError> {
    let branch_tree = repo
        .revparse_single(branch)
        .map_err(|_| GitError::Other(format!("branch '{branch}' not found")))?
        .peel_to_commit()?
        .tree()?;

    let mut opts = DiffOptions::new();
    let diff = repo.diff_tree_to_workdir_with_index(Some(&branch_tree), Some(&mut opts))?;

    let text = diff_to_string(&diff)?;
    if text.trim().is_empty() {
        return Err(GitError::NoChangesInRepository);
    }
    Ok(truncate_lines(&text, MAX_DIFF_LINES))
}

/// Collects branch metadata, the commits exclusive to the branch, change
/// stats, and the (truncated) diff against the merge base.
fn branch_info(repo: &Repository, base: Option<String>) -> Result<BranchInfo, GitError> {
    let head = repo.head()?;
    let name = head.shorthand().unwrap_or("HEAD").to_owned();
    let head_commit = head.peel_to_commit()?;

    let base_branch = match base {
        Some(b) => b,
        None => detect_base_branch(repo),
    };
    let base_commit = repo
        .revparse_single(&base_branch)
        .map_err(|_| GitError::Other(format!("base branch '{base_branch}' not found")))?
        .peel_to_commit()?;

    let merge_base = repo.merge_base(base_commit.id(), head_commit.id())?;
    let merge_base_tree = repo.find_commit(merge_base)?.tree()?;

    let mut revwalk = repo.revwalk()?;
    revwalk.push(head_commit.id())?;
    revwalk.hide(merge_base)?;

    let now = unix_now();
    let mut commits = Vec::new();
    for oid in revwalk {
        let commit = repo.find_commit(oid?)?;
        commits.push(to_owned_commit(repo, &commit, now)?);
    }

    let mut opts = DiffOptions::new();
    let diff =
        repo.diff_tree_to_tree(Some(&merge_base_tree), Some(&head_commit.tree()?), Some(&mut opts))?;
    let stats = diff.stats()?;
    let diffs = truncate_lines(&diff_to_string(&diff)?, MAX_DIFF_LINES);

    Ok(BranchInfo {
        name,
        base_branch,
        commits,
        files_changed: stats.files_changed(),
        additions: stats.insertions(),
        deletions: stats.deletions(),
        diffs,
    })
}

/// Picks the base branch: origin's default branch when the remote
/// advertises one, otherwise `main`, otherwise `master`.
fn detect_base_branch(repo: &Repository) -> String {
    if let Ok(reference) = repo.find_reference("refs/remotes/origin/HEAD") {
        if let Some(target) = reference.symbolic_target() {
            if let Some(name) = target.strip_prefix("refs/remotes/origin/") {
                return name.to_owned();
            }
        }
    }
    if repo.find_branch("main", git2::BranchType::Local).is_ok() {
        return "main".to_owned();
    }
    "master".to_owned()
}

/// Creates a commit on HEAD. With `stage_all`, every tracked change is
/// staged first. Committing an unchanged tree is reported as
/// `NoChangesInRepository`.
fn commit_changes(repo: &Repository, message: &str, stage_all: bool) -> Result<(), GitError> {
    let mut index = repo.index()?;
    if stage_all {
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.write()?;
    }

    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;
    let signature = repo.signature()?;

    match repo.head() {
        Ok(head) => {
            let parent = head.peel_to_commit()?;
            if parent.tree_id() == tree_id {
                return Err(GitError::NoChangesInRepository);
            }
            repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])?;
        }
        Err(err) if err.code() == git2::ErrorCode::UnbornBranch => {
            if index.is_empty() {
                return Err(GitError::NoChangesInRepository);
            }
            repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &[])?;
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

/// Renders a git2 Diff in unified patch format, prefixing content lines
/// with their origin character the way `git diff` output reads.
fn diff_to_string(diff: &Diff<'_>) -> Result<String, GitError> {
    let mut out = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        match line.origin() {
            '+' | '-' | ' ' => out.push(line.origin()),
            _ => {}
        }
        out.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;
    Ok(out)
}

/// Caps `text` at `max_lines` lines, appending a marker when anything
/// was dropped.
fn truncate_lines(text: &str, max_lines: usize) -> String {
    let mut count = 0;
    for (idx, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            count += 1;
            if count == max_lines {
                if idx + 1 == text.len() {
                    break;
                }
                let mut out = text[..=idx].to_owned();
                out.push_str(TRUNCATION_MARKER);
                return out;
            }
        }
    }
    text.to_owned()
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Formats an age in seconds as a coarse human-readable phrase.
fn humanize_age(seconds: i64) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const WEEK: i64 = 7 * DAY;
    const MONTH: i64 = 30 * DAY;
    const YEAR: i64 = 365 * DAY;

    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{n} {unit}s ago")
        }
    };

    match seconds {
        s if s < MINUTE => "just now".to_owned(),
        s if s < HOUR => plural(s / MINUTE, "minute"),
        s if s < DAY => plural(s / HOUR, "hour"),
        s if s < 2 * DAY => "yesterday".to_owned(),
        s if s < WEEK => plural(s / DAY, "day"),
        s if s < MONTH => plural(s / WEEK, "week"),
        s if s < YEAR => plural(s / MONTH, "month"),
        s => plural(s / YEAR, "year"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        (dir, repo)
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(name), content).unwrap();
    }

    #[test]
    fn empty_repository_reports_no_commits() {
        let (_dir, repo) = setup_repo();
        assert!(matches!(
            recent_commits(&repo, 25),
            Err(GitError::NoCommitsInRepository)
        ));
        assert!(matches!(
            working_tree_diff(&repo, true),
            Err(GitError::NoCommitsInRepository)
        ));
    }

    #[test]
    fn commit_list_and_diff_flow() {
        let (dir, repo) = setup_repo();
        write_file(&dir, "hello.txt", "hello\n");

        // First commit on an unborn branch.
        commit_changes(&repo, "add hello", true).unwrap();

        let commits = recent_commits(&repo, 25).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].subject, "add hello");
        assert_eq!(commits[0].author, "Test");
        assert_eq!(commits[0].date, "just now");

        // A root commit diffs against the empty tree.
        let diff = commit_diff(&repo, &commits[0].hash).unwrap();
        assert!(diff.contains("+hello"));

        // Clean tree: nothing to review.
        assert!(matches!(
            working_tree_diff(&repo, true),
            Err(GitError::NoChangesInRepository)
        ));

        // An unstaged edit shows up in the HEAD-vs-workdir diff but not
        // in the staged-only one.
        write_file(&dir, "hello.txt", "hello\nworld\n");
        assert!(working_tree_diff(&repo, true).unwrap().contains("+world"));
        assert!(matches!(
            working_tree_diff(&repo, false),
            Err(GitError::NoChangesInRepository)
        ));
    }

    #[test]
    fn committing_a_clean_tree_reports_no_changes() {
        let (dir, repo) = setup_repo();
        write_file(&dir, "a.txt", "a\n");
        commit_changes(&repo, "init", true).unwrap();

        assert!(matches!(
            commit_changes(&repo, "empty", true),
            Err(GitError::NoChangesInRepository)
        ));
    }

    #[test]
    fn unknown_branch_is_a_recoverable_error() {
        let (dir, repo) = setup_repo();
        write_file(&dir, "a.txt", "a\n");
        commit_changes(&repo, "init", true).unwrap();

        match branch_diff(&repo, "no-such-branch") {
            Err(GitError::Other(message)) => assert!(message.contains("no-such-branch")),
            other => panic!("expected branch error, got {other:?}"),
        }
    }

    #[test]
    fn humanize_age_buckets() {
        assert_eq!(humanize_age(5), "just now");
        assert_eq!(humanize_age(61), "1 minute ago");
        assert_eq!(humanize_age(15 * 60), "15 minutes ago");
        assert_eq!(humanize_age(3 * 3600), "3 hours ago");
        assert_eq!(humanize_age(30 * 3600), "yesterday");
        assert_eq!(humanize_age(4 * 86_400), "4 days ago");
        assert_eq!(humanize_age(20 * 86_400), "2 weeks ago");
        assert_eq!(humanize_age(100 * 86_400), "3 months ago");
        assert_eq!(humanize_age(800 * 86_400), "2 years ago");
    }

    #[test]
    fn truncate_keeps_short_text_intact() {
        let text = "a\nb\nc\n";
        assert_eq!(truncate_lines(text, 2000), text);
    }

    #[test]
    fn truncate_cuts_and_marks() {
        let text = "one\ntwo\nthree\nfour\n";
        let out = truncate_lines(text, 2);
        assert_eq!(out, "one\ntwo\n... (truncated)");
    }

    #[test]
    fn truncate_at_exact_boundary_is_a_no_op() {
        let text = "one\ntwo\n";
        assert_eq!(truncate_lines(text, 2), text);
    }
}
