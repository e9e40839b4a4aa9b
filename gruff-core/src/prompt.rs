//! Prompt assembly.
//!
//! Pure functions composing the final LLM prompt from the selected
//! persona, optional instruction block, and the diff payload. The
//! concatenation order and separators are load-bearing: the "view
//! prompt" toggle and retry both re-use the assembled string, so the
//! same inputs must produce a byte-identical prompt every time.

use std::fmt::Write;

use crate::types::BranchInfo;

/// Builds the review prompt:
/// format preamble, persona, optional instruction block, then the diff.
pub fn review_prompt(
    format_preamble: &str,
    reviewer_prompt: &str,
    instruction: &str,
    diff: &str,
) -> String {
    let mut prompt = format!("{format_preamble}\n\n{reviewer_prompt}");

    if !instruction.is_empty() {
        prompt.push_str("\n\nFollow the instructions below when analysing code:\n\n");
        prompt.push_str(instruction);
    }

    prompt.push_str("\n\n---\n\n**Code to review:**\n\n");
    prompt.push_str(diff);
    prompt
}

/// Builds the commit-message prompt from the user-configurable commit
/// instructions, an optional free-text hint, and the diff.
pub fn commit_prompt(commit_instructions: &str, hint: &str, diff: &str) -> String {
    let mut prompt = commit_instructions.to_owned();

    if !hint.is_empty() {
        prompt.push_str(
            "\nBased on the following hint, determine the type of changes \
             (e.g., feature, fix, refactor, docs) for the commit message.\n",
        );
        prompt.push_str("Commit message hint: ");
        prompt.push_str(hint);
    }

    prompt.push_str("\n\n");
    prompt.push_str(diff);
    prompt
}

/// Builds the PR-description prompt from the user-configurable PR
/// instructions and the formatted branch information.
pub fn pr_prompt(pr_instructions: &str, branch: &BranchInfo) -> String {
    format!(
        "{pr_instructions}**Analyze the following changes and generate an appropriate PR description:**\n\n{}",
        format_branch_info(branch)
    )
}

/// Renders branch metadata for the PR prompt: names, counts, the
/// itemized commit list (subject + optional body), then the raw diff.
pub fn format_branch_info(branch: &BranchInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Branch: {}", branch.name);
    let _ = writeln!(out, "Base Branch: {}", branch.base_branch);
    let _ = writeln!(out, "Total Commits: {}", branch.commits.len());
    let _ = writeln!(out, "Total Files Changed: {}", branch.files_changed);
    let _ = writeln!(out, "Total Additions: {}", branch.additions);
    let _ = writeln!(out, "Total Deletions: {}", branch.deletions);
    out.push_str("Commits:\n");

    for commit in &branch.commits {
        let _ = writeln!(out, " - {}", commit.subject);
        if !commit.body.is_empty() {
            let _ = writeln!(out, "   {}", commit.body);
        }
    }

    out.push_str("\nDiffs:\n");
    out.push_str(&branch.diffs);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Commit;

    fn branch() -> BranchInfo {
        BranchInfo {
            name: "feature/x".into(),
            base_branch: "main".into(),
            commits: vec![
                Commit {
                    hash: "abc123".into(),
                    author: "dev".into(),
                    date: "2 days ago".into(),
                    subject: "add x".into(),
                    body: String::new(),
                },
                Commit {
                    hash: "def456".into(),
                    author: "dev".into(),
                    date: "1 day ago".into(),
                    subject: "fix x".into(),
                    body: "details here".into(),
                },
            ],
            files_changed: 3,
            additions: 40,
            deletions: 7,
            diffs: "diff --git a/x b/x".into(),
        }
    }

    #[test]
    fn review_prompt_with_instruction() {
        let prompt = review_prompt("PREAMBLE", "PERSONA", "INSTR", "DIFF");
        assert_eq!(
            prompt,
            "PREAMBLE\n\nPERSONA\n\nFollow the instructions below when analysing code:\n\nINSTR\n\n---\n\n**Code to review:**\n\nDIFF"
        );
    }

    #[test]
    fn review_prompt_without_instruction_omits_block() {
        let prompt = review_prompt("PREAMBLE", "PERSONA", "", "DIFF");
        assert_eq!(
            prompt,
            "PREAMBLE\n\nPERSONA\n\n---\n\n**Code to review:**\n\nDIFF"
        );
    }

    #[test]
    fn review_prompt_is_deterministic() {
        let a = review_prompt("P", "R", "I", "D");
        let b = review_prompt("P", "R", "I", "D");
        assert_eq!(a, b);
    }

    #[test]
    fn commit_prompt_without_hint() {
        assert_eq!(commit_prompt("INSTRUCTIONS", "", "DIFF"), "INSTRUCTIONS\n\nDIFF");
    }

    #[test]
    fn commit_prompt_with_hint_inserts_hint_sentence() {
        let prompt = commit_prompt("INSTRUCTIONS", "bugfix in parser", "DIFF");
        assert!(prompt.starts_with("INSTRUCTIONS\nBased on the following hint"));
        assert!(prompt.contains("Commit message hint: bugfix in parser"));
        assert!(prompt.ends_with("\n\nDIFF"));
    }

    #[test]
    fn branch_info_renders_counts_commits_and_diff() {
        let text = format_branch_info(&branch());
        assert_eq!(
            text,
            "Branch: feature/x\n\
             Base Branch: main\n\
             Total Commits: 2\n\
             Total Files Changed: 3\n\
             Total Additions: 40\n\
             Total Deletions: 7\n\
             Commits:\n \
             - add x\n \
             - fix x\n   \
             details here\n\
             \nDiffs:\ndiff --git a/x b/x"
        );
    }

    #[test]
    fn pr_prompt_joins_instructions_and_branch_info() {
        let prompt = pr_prompt("PR INSTRUCTIONS\n\n", &branch());
        assert!(prompt.starts_with(
            "PR INSTRUCTIONS\n\n**Analyze the following changes and generate an appropriate PR description:**\n\nBranch: feature/x\n"
        ));
    }
}
