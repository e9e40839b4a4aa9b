//! Top-level orchestrator state machine.
//!
//! `App` owns all mutable state: the current view, picker states, the
//! active sessions, and the cancellation slots. It is mutated by events
//! from the unified bus and read by `ui::render` — no rendering logic
//! lives here. Collaborators are reached only through channels (git) or
//! spawned bridge tasks (LLM), so every transition below is testable
//! without a terminal.

use std::sync::Arc;

use crossbeam_channel::Sender;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;

use gruff_core::assets::{self, Asset, Category};
use gruff_core::config::{Config, FORMAT_REQUIREMENTS};
use gruff_core::loading::{MessageRotator, COMMIT_MESSAGES, PR_MESSAGES, REVIEW_MESSAGES};
use gruff_core::prompt;
use gruff_core::types::{Commit, ReviewOption, Task};

use crate::event::AppEvent;
use crate::git::types::{GitError, GitRequest, GitResponse};
use crate::llm::{bridge, Llm};
use crate::session::{OperationKind, OperationSession, Phase, ReviewSession};
use crate::slots::{Slot, Slots};
use crate::theme::Theme;
use crate::ui::editor::Editor;
use crate::ui::picker::{Picker, PickerOutcome};

/// How many commits the commit picker offers.
const COMMIT_LIST_LIMIT: usize = 25;
/// Loading message refresh: 20 logic ticks at 250 ms = 5 s.
const MESSAGE_REFRESH_TICKS: u32 = 20;

/// Which screen is active. Picker and session payloads live in `App`
/// fields so a view switch never loses state it may navigate back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Tasks,
    ReviewOptions,
    Commits,
    BranchInput,
    Reviewers,
    Instructions,
    Review,
    CommitMessage,
    PrDescription,
    Info(InfoMessage),
    Fatal(String),
}

/// Where Esc goes from an info surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoReturn {
    ReviewOptions,
    BranchInput,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoMessage {
    pub title: String,
    pub body: String,
    pub back: InfoReturn,
}

/// Everything the command line pre-selects before the first frame.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub task: Task,
    pub review_option: ReviewOption,
    pub branch: Option<String>,
    pub reviewer: Option<String>,
    pub instructions: Option<String>,
    pub skip_instruction: bool,
    pub stage_all: bool,
    pub hint: Option<String>,
    pub pr_base: Option<String>,
}

pub struct App {
    pub config: Config,
    pub theme: Theme,
    pub view: View,
    pub should_quit: bool,

    git_tx: Sender<GitRequest>,
    llm: Arc<dyn Llm>,
    event_tx: UnboundedSender<AppEvent>,
    pub slots: Slots,

    // Selection state for the review flow.
    task: Task,
    task_preselected: bool,
    review_option: ReviewOption,
    selected_commit: Option<Commit>,
    branch: Option<String>,
    staged_only: bool,
    selected_reviewer: Option<Asset>,
    /// Selected instruction prompt text; empty means skipped.
    instruction: String,

    // CLI pre-selections consumed as the flow reaches them.
    preselect_reviewer: Option<String>,
    preselect_instructions: Option<String>,
    skip_instruction: bool,
    stage_all: bool,
    hint: String,
    pr_base: Option<String>,

    // Pickers. The commit/reviewer/instruction pickers are built when
    // their data arrives; `None` under the matching view means loading.
    pub task_picker: Picker,
    pub option_picker: Picker,
    pub commit_picker: Option<Picker>,
    pub reviewer_picker: Option<Picker>,
    pub instruction_picker: Option<Picker>,
    pub branch_editor: Editor,
    commits: Vec<Commit>,
    reviewers: Vec<Asset>,
    instructions: Vec<Asset>,

    pub review: Option<ReviewSession>,
    pub operation: Option<OperationSession>,
    /// Active editor: the commit message buffer or a prompt being edited.
    pub editor: Option<Editor>,
    pub editing_prompt: bool,
    pub show_help: bool,

    rotator: MessageRotator,
    pub loading_message: String,
    ticks_since_message: u32,
    pub spinner_frame: usize,
}

impl App {
    pub fn new(
        config: Config,
        theme: Theme,
        git_tx: Sender<GitRequest>,
        llm: Arc<dyn Llm>,
        event_tx: UnboundedSender<AppEvent>,
        options: LaunchOptions,
    ) -> Self {
        let task_picker = Picker::new(
            "What would you like to do?",
            vec![
                Task::Review.label().to_owned(),
                Task::Commit.label().to_owned(),
                Task::PrDescription.label().to_owned(),
            ],
        );
        let option_picker = Picker::new(
            "What should be reviewed?",
            vec![
                ReviewOption::CurrentChanges.label().to_owned(),
                ReviewOption::StagedChanges.label().to_owned(),
                ReviewOption::Commit.label().to_owned(),
                ReviewOption::Branch.label().to_owned(),
            ],
        );

        let mut app = Self {
            config,
            theme,
            view: View::Tasks,
            should_quit: false,
            git_tx,
            llm,
            event_tx,
            slots: Slots::new(),
            task: options.task,
            task_preselected: options.task != Task::None,
            review_option: options.review_option,
            selected_commit: None,
            branch: options.branch,
            staged_only: options.review_option == ReviewOption::StagedChanges,
            selected_reviewer: None,
            instruction: String::new(),
            preselect_reviewer: options.reviewer,
            preselect_instructions: options.instructions,
            skip_instruction: options.skip_instruction,
            stage_all: options.stage_all,
            hint: options.hint.unwrap_or_default(),
            pr_base: options.pr_base,
            task_picker,
            option_picker,
            commit_picker: None,
            reviewer_picker: None,
            instruction_picker: None,
            branch_editor: Editor::new(""),
            commits: Vec::new(),
            reviewers: Vec::new(),
            instructions: Vec::new(),
            review: None,
            operation: None,
            editor: None,
            editing_prompt: false,
            show_help: false,
            rotator: MessageRotator::new(REVIEW_MESSAGES),
            loading_message: String::new(),
            ticks_since_message: 0,
            spinner_frame: 0,
        };
        app.loading_message = app.rotator.next().to_owned();
        app.start();
        app
    }

    /// Dispatches CLI pre-selections; falls back to the task picker.
    fn start(&mut self) {
        if self.task_preselected {
            self.dispatch_task();
        } else {
            self.view = View::Tasks;
        }
    }

    fn dispatch_task(&mut self) {
        match self.task {
            Task::Review => {
                if self.branch.is_some() && self.review_option == ReviewOption::None {
                    self.review_option = ReviewOption::Branch;
                }
                if self.review_option != ReviewOption::None {
                    self.dispatch_review_option();
                } else {
                    self.view = View::ReviewOptions;
                }
            }
            Task::Commit => self.begin_commit(),
            Task::PrDescription => self.begin_pr(),
            Task::None => self.view = View::Tasks,
        }
    }

    fn dispatch_review_option(&mut self) {
        match self.review_option {
            ReviewOption::CurrentChanges => {
                self.staged_only = false;
                self.proceed_to_reviewers();
            }
            ReviewOption::StagedChanges => {
                self.staged_only = true;
                self.proceed_to_reviewers();
            }
            ReviewOption::Commit => {
                self.commit_picker = None;
                self.view = View::Commits;
                self.send_git(GitRequest::RecentCommits { limit: COMMIT_LIST_LIMIT });
            }
            ReviewOption::Branch => {
                if self.branch.is_some() {
                    self.proceed_to_reviewers();
                } else {
                    self.branch_editor = Editor::new("");
                    self.view = View::BranchInput;
                }
            }
            ReviewOption::None => self.view = View::ReviewOptions,
        }
    }

    /// Loads reviewer personas; a missing asset directory is fatal.
    fn proceed_to_reviewers(&mut self) {
        match assets::list(self.config.storage(), Category::Reviewers) {
            Ok(list) => self.reviewers = list,
            Err(err) => {
                self.view = View::Fatal(err.to_string());
                return;
            }
        }

        if let Some(wanted) = self.preselect_reviewer.take() {
            if let Some(found) = assets::find(&wanted, &self.reviewers) {
                self.selected_reviewer = Some(found.clone());
                self.proceed_to_instructions();
                return;
            }
        }

        let names: Vec<String> = self.reviewers.iter().map(|a| a.name.clone()).collect();
        self.reviewer_picker = Some(Picker::new("Who should review this?", names));
        self.view = View::Reviewers;
    }

    /// Instruction selection, with skip and auto-skip paths.
    fn proceed_to_instructions(&mut self) {
        if self.skip_instruction {
            self.instruction.clear();
            self.start_review();
            return;
        }

        match assets::list(self.config.storage(), Category::Instructions) {
            Ok(list) => self.instructions = list,
            Err(err) => {
                self.view = View::Fatal(err.to_string());
                return;
            }
        }

        if let Some(wanted) = self.preselect_instructions.take() {
            if let Some(found) = assets::find(&wanted, &self.instructions) {
                self.instruction = found.prompt.clone();
                self.start_review();
                return;
            }
        }

        if self.instructions.is_empty() {
            self.instruction.clear();
            self.start_review();
            return;
        }

        let names: Vec<String> = self.instructions.iter().map(|a| a.name.clone()).collect();
        self.instruction_picker =
            Some(Picker::new("Any special instructions? (x to skip)", names));
        self.view = View::Instructions;
    }

    /// Requests the diff for the chosen review source. The stream itself
    /// starts when the reply arrives.
    fn start_review(&mut self) {
        self.review = None;
        self.begin_loading(REVIEW_MESSAGES);
        self.view = View::Review;

        let request = if let Some(branch) = &self.branch {
            GitRequest::BranchDiff { branch: branch.clone() }
        } else if let Some(commit) = &self.selected_commit {
            GitRequest::CommitDiff { hash: commit.hash.clone() }
        } else {
            GitRequest::WorkingTreeDiff { include_unstaged: !self.staged_only }
        };
        self.send_git(request);
    }

    fn begin_commit(&mut self) {
        self.task = Task::Commit;
        self.operation = None;
        self.editor = None;
        self.begin_loading(COMMIT_MESSAGES);
        self.view = View::CommitMessage;
        self.send_git(GitRequest::WorkingTreeDiff { include_unstaged: self.stage_all });
    }

    fn begin_pr(&mut self) {
        self.task = Task::PrDescription;
        self.operation = None;
        self.begin_loading(PR_MESSAGES);
        self.view = View::PrDescription;
        self.send_git(GitRequest::BranchInfo { base: self.pr_base.clone() });
    }

    fn begin_loading(&mut self, pool: &'static [&'static str]) {
        self.rotator = MessageRotator::new(pool);
        self.loading_message = self.rotator.next().to_owned();
        self.ticks_since_message = 0;
    }

    fn send_git(&mut self, request: GitRequest) {
        if self.git_tx.send(request).is_err() {
            self.view = View::Fatal("git worker is gone".to_owned());
        }
    }

    fn info(&mut self, title: &str, body: String, back: InfoReturn) {
        self.view = View::Info(InfoMessage { title: title.to_owned(), body, back });
    }

    /// True while something is waiting on git or the model.
    pub fn is_loading(&self) -> bool {
        match self.view {
            View::Review => self.review.as_ref().map_or(true, |s| s.phase == Phase::Pending),
            View::CommitMessage | View::PrDescription => {
                self.operation.as_ref().map_or(true, |s| s.is_running())
            }
            View::Commits => self.commit_picker.is_none(),
            _ => false,
        }
    }

    // ---- event entry points -------------------------------------------------

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => self.on_tick(),
            AppEvent::Git(response) => self.on_git(*response),
            AppEvent::StreamChunk(chunk) => {
                if let Some(session) = &mut self.review {
                    session.push_chunk(&chunk);
                }
            }
            AppEvent::StreamComplete => {
                if let Some(session) = &mut self.review {
                    session.complete();
                }
                self.slots.finish(Slot::Review);
            }
            AppEvent::StreamCanceled => {
                if let Some(session) = &mut self.review {
                    session.cancel();
                }
            }
            AppEvent::StreamError(err) => {
                if let Some(session) = &mut self.review {
                    session.fail(err.to_string());
                }
                self.slots.finish(Slot::Review);
            }
            AppEvent::GenerateDone(result) => self.on_generate_done(result),
            AppEvent::Quit => self.quit(),
            AppEvent::Render | AppEvent::Resize(..) => {}
        }
    }

    fn on_tick(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
        if self.is_loading() {
            self.ticks_since_message += 1;
            if self.ticks_since_message >= MESSAGE_REFRESH_TICKS {
                self.loading_message = self.rotator.next().to_owned();
                self.ticks_since_message = 0;
            }
        }
    }

    fn quit(&mut self) {
        self.slots.cancel_all();
        self.should_quit = true;
    }

    // ---- git replies --------------------------------------------------------

    fn on_git(&mut self, response: GitResponse) {
        match response {
            GitResponse::Commits(Ok(commits)) => {
                let labels: Vec<String> = commits
                    .iter()
                    .map(|c| format!("{} {} ({}, {})", c.hash, c.subject, c.author, c.date))
                    .collect();
                self.commits = commits;
                self.commit_picker = Some(Picker::new("Which commit?", labels));
            }
            GitResponse::Commits(Err(GitError::NoCommitsInRepository)) => {
                self.info(
                    "Nothing to review",
                    "The repository does not have any commits yet.\n\
                     Try `gruff --staged` to review staged changes."
                        .to_owned(),
                    InfoReturn::ReviewOptions,
                );
            }
            GitResponse::Commits(Err(err)) => self.view = View::Fatal(err.to_string()),

            GitResponse::WorkingTreeDiff(result) | GitResponse::CommitDiff(result)
                if self.task == Task::Review =>
            {
                match result {
                    Ok(diff) => self.launch_review_stream(diff),
                    Err(GitError::NoChangesInRepository) => self.info(
                        "Nothing to review",
                        "No changes found in the repository.".to_owned(),
                        InfoReturn::ReviewOptions,
                    ),
                    Err(GitError::NoCommitsInRepository) => self.info(
                        "Nothing to review",
                        "The repository does not have any commits yet.\n\
                         Try `gruff --staged` to review staged changes."
                            .to_owned(),
                        InfoReturn::ReviewOptions,
                    ),
                    Err(err) => self.view = View::Fatal(err.to_string()),
                }
            }

            GitResponse::BranchDiff { branch, result } => match result {
                Ok(diff) => self.launch_review_stream(diff),
                Err(err) => {
                    // Recoverable: let the user fix the branch name.
                    self.branch = None;
                    self.info(
                        "Branch diff failed",
                        format!("Could not diff against '{branch}': {err}"),
                        InfoReturn::BranchInput,
                    );
                }
            },

            GitResponse::WorkingTreeDiff(result) => match result {
                Ok(diff) => self.launch_commit_generation(diff),
                Err(GitError::NoChangesInRepository) => {
                    let tip = if self.stage_all {
                        ""
                    } else {
                        "\nTip: run with --all to include unstaged changes."
                    };
                    self.info(
                        "No changes to commit",
                        format!("There is nothing staged to commit.{tip}"),
                        InfoReturn::Quit,
                    );
                }
                Err(err) => self.view = View::Fatal(err.to_string()),
            },

            GitResponse::CommitDiff(result) => {
                if let Err(err) = result {
                    self.view = View::Fatal(err.to_string());
                }
            }

            GitResponse::BranchInfo(Ok(info)) => {
                let prompt = prompt::pr_prompt(&self.config.pr_instructions(), &info);
                let session = OperationSession::new(OperationKind::PrDescription, prompt, false);
                let token = self.slots.supersede(Slot::Operation);
                bridge::spawn_generate(
                    Arc::clone(&self.llm),
                    session.prompt.clone(),
                    token,
                    self.event_tx.clone(),
                );
                self.operation = Some(session);
            }
            GitResponse::BranchInfo(Err(err)) => self.view = View::Fatal(err.to_string()),

            GitResponse::Committed(Ok(())) => {
                self.info(
                    "Committed",
                    "Your changes have been committed.".to_owned(),
                    InfoReturn::Quit,
                );
            }
            GitResponse::Committed(Err(GitError::NoChangesInRepository)) => {
                self.info(
                    "No changes to commit",
                    "There is nothing staged to commit.".to_owned(),
                    InfoReturn::Quit,
                );
            }
            GitResponse::Committed(Err(err)) => {
                if let Some(session) = &mut self.operation {
                    session.fail(err.to_string());
                }
            }
        }
    }

    fn launch_review_stream(&mut self, diff: String) {
        let reviewer = match &self.selected_reviewer {
            Some(r) => r.clone(),
            None => {
                self.view = View::Fatal("no reviewer selected".to_owned());
                return;
            }
        };
        let prompt_text = prompt::review_prompt(
            FORMAT_REQUIREMENTS,
            &reviewer.prompt,
            &self.instruction,
            &diff,
        );
        let session = ReviewSession::new(reviewer.name, prompt_text);
        let token = self.slots.supersede(Slot::Review);
        bridge::spawn_review_stream(
            Arc::clone(&self.llm),
            session.prompt.clone(),
            token,
            self.event_tx.clone(),
        );
        self.review = Some(session);
        self.view = View::Review;
    }

    fn launch_commit_generation(&mut self, diff: String) {
        let prompt_text =
            prompt::commit_prompt(&self.config.commit_instructions(), &self.hint, &diff);
        let session = OperationSession::new(OperationKind::CommitMessage, prompt_text, self.stage_all);
        let token = self.slots.supersede(Slot::Operation);
        bridge::spawn_generate(
            Arc::clone(&self.llm),
            session.prompt.clone(),
            token,
            self.event_tx.clone(),
        );
        self.operation = Some(session);
    }

    fn on_generate_done(&mut self, result: Result<String, crate::llm::LlmError>) {
        self.slots.finish(Slot::Operation);
        let Some(session) = &mut self.operation else { return };
        match result {
            Ok(text) => {
                session.complete(text);
                if session.kind == OperationKind::CommitMessage {
                    let output = session.output.clone();
                    self.editor = Some(Editor::new(&output));
                    self.editing_prompt = false;
                }
            }
            Err(err) => session.fail(err.to_string()),
        }
    }

    // ---- key handling -------------------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        match self.view.clone() {
            View::Tasks => self.key_tasks(key),
            View::ReviewOptions => self.key_review_options(key),
            View::Commits => self.key_commits(key),
            View::BranchInput => self.key_branch_input(key),
            View::Reviewers => self.key_reviewers(key),
            View::Instructions => self.key_instructions(key),
            View::Review => self.key_review(key),
            View::CommitMessage => self.key_commit_message(key),
            View::PrDescription => self.key_pr_description(key),
            View::Info(message) => self.key_info(key, message.back),
            View::Fatal(_) => self.quit(),
        }
    }

    fn key_tasks(&mut self, key: KeyEvent) {
        match self.task_picker.handle_key(key) {
            PickerOutcome::Selected(idx) => {
                self.task = [Task::Review, Task::Commit, Task::PrDescription][idx];
                self.dispatch_task();
            }
            PickerOutcome::Dismissed => self.quit(),
            PickerOutcome::Pending => {}
        }
    }

    fn key_review_options(&mut self, key: KeyEvent) {
        match self.option_picker.handle_key(key) {
            PickerOutcome::Selected(idx) => {
                self.review_option = [
                    ReviewOption::CurrentChanges,
                    ReviewOption::StagedChanges,
                    ReviewOption::Commit,
                    ReviewOption::Branch,
                ][idx];
                self.dispatch_review_option();
            }
            PickerOutcome::Dismissed => {
                // A CLI-selected task has no task picker to return to.
                if !self.task_preselected {
                    self.view = View::Tasks;
                }
            }
            PickerOutcome::Pending => {}
        }
    }

    fn key_commits(&mut self, key: KeyEvent) {
        let Some(picker) = &mut self.commit_picker else {
            if key.code == KeyCode::Esc {
                self.view = View::ReviewOptions;
            }
            return;
        };
        match picker.handle_key(key) {
            PickerOutcome::Selected(idx) => {
                self.selected_commit = Some(self.commits[idx].clone());
                self.proceed_to_reviewers();
            }
            PickerOutcome::Dismissed => {
                self.selected_commit = None;
                self.view = View::ReviewOptions;
            }
            PickerOutcome::Pending => {}
        }
    }

    fn key_branch_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                let name = self.branch_editor.text().trim().to_owned();
                if !name.is_empty() {
                    self.branch = Some(name);
                    self.proceed_to_reviewers();
                }
            }
            KeyCode::Esc => {
                self.branch = None;
                self.view = View::ReviewOptions;
            }
            _ => self.branch_editor.handle_key(key),
        }
    }

    fn key_reviewers(&mut self, key: KeyEvent) {
        let Some(picker) = &mut self.reviewer_picker else { return };
        match picker.handle_key(key) {
            PickerOutcome::Selected(idx) => {
                self.selected_reviewer = Some(self.reviewers[idx].clone());
                self.proceed_to_instructions();
            }
            PickerOutcome::Dismissed => {
                // Return to wherever this flow came from.
                if self.selected_commit.is_some() {
                    self.view = View::Commits;
                } else if self.branch.is_some() {
                    self.view = View::BranchInput;
                } else {
                    self.view = View::ReviewOptions;
                }
            }
            PickerOutcome::Pending => {}
        }
    }

    fn key_instructions(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('x') {
            self.instruction.clear();
            self.start_review();
            return;
        }
        let Some(picker) = &mut self.instruction_picker else { return };
        match picker.handle_key(key) {
            PickerOutcome::Selected(idx) => {
                self.instruction = self.instructions[idx].prompt.clone();
                self.start_review();
            }
            PickerOutcome::Dismissed => {
                self.instruction.clear();
                self.view = View::Reviewers;
            }
            PickerOutcome::Pending => {}
        }
    }

    fn key_review(&mut self, key: KeyEvent) {
        if self.show_help {
            self.show_help = false;
            return;
        }

        // Prompt editing takes over all input until Esc.
        if self.editing_prompt {
            if key.code == KeyCode::Esc {
                if let (Some(editor), Some(session)) = (&self.editor, &mut self.review) {
                    session.prompt = editor.text();
                }
                self.editor = None;
                self.editing_prompt = false;
            } else if let Some(editor) = &mut self.editor {
                editor.handle_key(key);
            }
            return;
        }

        let running = self.review.as_ref().is_some_and(|s| s.is_running());
        match key.code {
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Tab => {
                if let Some(session) = &mut self.review {
                    session.show_raw = !session.show_raw;
                }
            }
            KeyCode::Char('p') if !running => {
                if let Some(session) = &self.review {
                    self.editor = Some(Editor::new(&session.prompt));
                    self.editing_prompt = true;
                }
            }
            KeyCode::Char('r') if !running => {
                if let Some(session) = &mut self.review {
                    let prompt_text = session.retry();
                    let token = self.slots.supersede(Slot::Review);
                    bridge::spawn_review_stream(
                        Arc::clone(&self.llm),
                        prompt_text,
                        token,
                        self.event_tx.clone(),
                    );
                    self.begin_loading(REVIEW_MESSAGES);
                }
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                // Jump straight to commit-message generation.
                self.slots.cancel(Slot::Review);
                self.stage_all = key.code == KeyCode::Char('C');
                self.begin_commit();
            }
            KeyCode::Esc if running => self.slots.cancel(Slot::Review),
            KeyCode::Char('q') if !running => self.quit(),
            KeyCode::Esc => self.quit(),
            KeyCode::Up => self.scroll_review(-1),
            KeyCode::Down => self.scroll_review(1),
            KeyCode::PageUp => self.scroll_review(-10),
            KeyCode::PageDown => self.scroll_review(10),
            _ => {}
        }
    }

    fn scroll_review(&mut self, delta: i32) {
        if let Some(session) = &mut self.review {
            session.scroll = session.scroll.saturating_add_signed(delta as i16);
        }
    }

    fn key_commit_message(&mut self, key: KeyEvent) {
        let running = self.operation.as_ref().is_none_or(|s| s.is_running());
        if running {
            if key.code == KeyCode::Esc {
                self.slots.cancel(Slot::Operation);
                self.quit();
            }
            return;
        }

        // Control-key actions; everything else edits the active buffer.
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => {
                    if !self.editing_prompt {
                        let message =
                            self.editor.as_ref().map(Editor::text).unwrap_or_default();
                        let stage_all =
                            self.operation.as_ref().is_some_and(|s| s.stage_all);
                        if !message.trim().is_empty() {
                            self.send_git(GitRequest::Commit { message, stage_all });
                        }
                    }
                }
                KeyCode::Char('r') => self.retry_operation(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Tab => self.toggle_prompt_editing(),
            KeyCode::Esc => {
                if self.editing_prompt {
                    self.toggle_prompt_editing();
                } else {
                    self.quit();
                }
            }
            _ => {
                if let Some(editor) = &mut self.editor {
                    editor.handle_key(key);
                }
            }
        }
    }

    fn key_pr_description(&mut self, key: KeyEvent) {
        let running = self.operation.as_ref().is_none_or(|s| s.is_running());
        if running {
            if key.code == KeyCode::Esc {
                self.slots.cancel(Slot::Operation);
                self.quit();
            }
            return;
        }

        if self.editing_prompt {
            if key.code == KeyCode::Esc || key.code == KeyCode::Tab {
                self.toggle_prompt_editing();
            } else if let Some(editor) = &mut self.editor {
                editor.handle_key(key);
            }
            return;
        }

        match key.code {
            KeyCode::Tab => self.toggle_prompt_editing(),
            KeyCode::Char('r') => self.retry_operation(),
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Up => self.scroll_operation(-1),
            KeyCode::Down => self.scroll_operation(1),
            KeyCode::PageUp => self.scroll_operation(-10),
            KeyCode::PageDown => self.scroll_operation(10),
            _ => {}
        }
    }

    fn scroll_operation(&mut self, delta: i32) {
        if let Some(session) = &mut self.operation {
            session.scroll = session.scroll.saturating_add_signed(delta as i16);
        }
    }

    /// Swaps the active editor between the output buffer and the prompt.
    fn toggle_prompt_editing(&mut self) {
        let Some(session) = &mut self.operation else { return };
        if self.editing_prompt {
            if let Some(editor) = &self.editor {
                session.prompt = editor.text();
            }
            self.editing_prompt = false;
            self.editor = match session.kind {
                OperationKind::CommitMessage => Some(Editor::new(&session.output)),
                OperationKind::PrDescription => None,
            };
        } else {
            if let (Some(editor), OperationKind::CommitMessage) = (&self.editor, session.kind) {
                session.output = editor.text();
            }
            self.editor = Some(Editor::new(&session.prompt));
            self.editing_prompt = true;
        }
        session.show_prompt = self.editing_prompt;
    }

    fn retry_operation(&mut self) {
        if self.editing_prompt {
            self.toggle_prompt_editing();
        }
        let pool = match self.operation.as_ref().map(|s| s.kind) {
            Some(OperationKind::CommitMessage) => COMMIT_MESSAGES,
            _ => PR_MESSAGES,
        };
        if let Some(session) = &mut self.operation {
            let prompt_text = session.retry();
            let token = self.slots.supersede(Slot::Operation);
            bridge::spawn_generate(
                Arc::clone(&self.llm),
                prompt_text,
                token,
                self.event_tx.clone(),
            );
            self.editor = None;
        }
        self.begin_loading(pool);
    }

    fn key_info(&mut self, key: KeyEvent, back: InfoReturn) {
        match key.code {
            KeyCode::Esc => match back {
                InfoReturn::ReviewOptions => self.view = View::ReviewOptions,
                InfoReturn::BranchInput => {
                    self.branch_editor = Editor::new("");
                    self.view = View::BranchInput;
                }
                InfoReturn::Quit => self.quit(),
            },
            KeyCode::Char('q') | KeyCode::Enter => self.quit(),
            _ => {}
        }
    }
}
