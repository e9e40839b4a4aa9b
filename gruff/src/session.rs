//! Session state machines for LLM-backed runs.
//!
//! A [`ReviewSession`] owns a streaming review: the editable prompt, the
//! raw accumulated chunk buffer, and the phase. An [`OperationSession`]
//! owns a one-shot commit-message or PR-description generation. Both
//! survive retries — the prompt, including any user edits, is reused
//! verbatim on the next run.

use gruff_core::text::{normalize_code_fences, strip_code_fences};

/// Where a run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Dispatched, nothing received yet. Loading message shown.
    Pending,
    /// At least one chunk arrived (review only).
    Streaming,
    Complete,
    Errored(String),
    Canceled,
}

/// What a one-shot generation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    CommitMessage,
    PrDescription,
}

/// State for one streaming review run, reusable across retries.
pub struct ReviewSession {
    /// Name of the reviewer persona, shown in the status bar.
    pub reviewer: String,
    /// The full assembled prompt. User-editable; retries send it as-is.
    pub prompt: String,
    pub phase: Phase,
    /// Accumulated chunks, untouched. Normalization happens on read so
    /// the displayed text never depends on how the stream was chunked.
    raw: String,
    /// Tab toggles between rendered markdown and the raw buffer.
    pub show_raw: bool,
    pub scroll: u16,
}

impl ReviewSession {
    pub fn new(reviewer: String, prompt: String) -> Self {
        Self {
            reviewer,
            prompt,
            phase: Phase::Pending,
            raw: String::new(),
            show_raw: false,
            scroll: 0,
        }
    }

    pub fn push_chunk(&mut self, chunk: &str) {
        self.raw.push_str(chunk);
        self.phase = Phase::Streaming;
    }

    /// The review text with code fences and diff markers normalized.
    pub fn text(&self) -> String {
        normalize_code_fences(&self.raw)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Pending | Phase::Streaming)
    }

    pub fn complete(&mut self) {
        self.phase = Phase::Complete;
    }

    pub fn fail(&mut self, message: String) {
        self.phase = Phase::Errored(message);
    }

    pub fn cancel(&mut self) {
        self.phase = Phase::Canceled;
    }

    /// Resets for another run with the same (possibly edited) prompt.
    pub fn retry(&mut self) -> String {
        self.raw.clear();
        self.scroll = 0;
        self.phase = Phase::Pending;
        self.prompt.clone()
    }
}

/// State for one commit-message or PR-description generation.
pub struct OperationSession {
    pub kind: OperationKind,
    /// The full assembled prompt. User-editable; retries send it as-is.
    pub prompt: String,
    pub phase: Phase,
    /// The generated text. For commit messages this is the editable
    /// buffer the user confirms; fences are stripped on arrival.
    pub output: String,
    /// Commit only: stage every tracked change before committing.
    pub stage_all: bool,
    /// Tab toggles between the output and the editable prompt.
    pub show_prompt: bool,
    pub scroll: u16,
}

impl OperationSession {
    pub fn new(kind: OperationKind, prompt: String, stage_all: bool) -> Self {
        Self {
            kind,
            prompt,
            phase: Phase::Pending,
            output: String::new(),
            stage_all,
            show_prompt: false,
            scroll: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Pending)
    }

    /// Records a finished generation. Commit messages are routinely
    /// wrapped in markdown fences despite instructions; strip them
    /// before the text reaches the editable buffer.
    pub fn complete(&mut self, text: String) {
        self.output = match self.kind {
            OperationKind::CommitMessage => strip_code_fences(&text),
            OperationKind::PrDescription => text,
        };
        self.phase = Phase::Complete;
    }

    pub fn fail(&mut self, message: String) {
        self.phase = Phase::Errored(message);
    }

    /// Resets for another run with the same (possibly edited) prompt.
    pub fn retry(&mut self) -> String {
        self.output.clear();
        self.scroll = 0;
        self.phase = Phase::Pending;
        self.prompt.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_accumulates_and_normalizes_on_read() {
        let mut session = ReviewSession::new("The Maintainer".into(), "prompt".into());
        session.push_chunk("Fine.\n    ``");
        session.push_chunk("`diff\n    +added\n    ```");
        session.complete();

        assert_eq!(session.text(), "Fine.\n```diff\n+added\n```");
        assert_eq!(session.phase, Phase::Complete);
    }

    #[test]
    fn review_retry_reuses_edited_prompt_and_clears_buffer() {
        let mut session = ReviewSession::new("r".into(), "original".into());
        session.push_chunk("old output");
        session.fail("boom".into());

        session.prompt = "edited by user".into();
        let resent = session.retry();

        assert_eq!(resent, "edited by user");
        assert_eq!(session.text(), "");
        assert_eq!(session.phase, Phase::Pending);
    }

    #[test]
    fn canceled_review_is_not_an_error() {
        let mut session = ReviewSession::new("r".into(), "p".into());
        session.push_chunk("partial");
        session.cancel();
        assert_eq!(session.phase, Phase::Canceled);
        // Partial output stays readable.
        assert_eq!(session.text(), "partial");
    }

    #[test]
    fn commit_output_loses_markdown_fences() {
        let mut session =
            OperationSession::new(OperationKind::CommitMessage, "p".into(), false);
        session.complete("```\nfeat: add thing\n```".into());
        assert_eq!(session.output, "feat: add thing");
    }

    #[test]
    fn pr_output_is_kept_verbatim() {
        let mut session =
            OperationSession::new(OperationKind::PrDescription, "p".into(), false);
        session.complete("## Summary\n\nDoes things.".into());
        assert_eq!(session.output, "## Summary\n\nDoes things.");
    }

    #[test]
    fn operation_retry_reuses_edited_prompt() {
        let mut session =
            OperationSession::new(OperationKind::PrDescription, "assembled".into(), false);
        session.fail("timeout".into());
        session.prompt.push_str("\nextra context");

        assert_eq!(session.retry(), "assembled\nextra context");
        assert_eq!(session.phase, Phase::Pending);
        assert!(session.output.is_empty());
    }
}
