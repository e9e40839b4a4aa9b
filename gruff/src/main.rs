//! gruff — AI-assisted code reviews, commit messages, and PR
//! descriptions in the terminal.
//!
//! Entry point for the `gruff` binary. Asset-management subcommands run
//! without a terminal UI; everything else wires together the terminal
//! lifecycle (`tui`), unified event bus (`event`), orchestrator (`app`),
//! git background thread (`git`), and the LLM bridge (`llm`).
//!
//! # Startup sequence (order matters)
//!
//! 1. Parse the CLI and load config — read-only, safe before terminal
//!    init; non-TUI subcommands return here.
//! 2. Fail fast outside the alternate screen: repository check and LLM
//!    provider construction print a plain error instead of a TUI flash.
//! 3. `install_panic_hook()` — installed before `init_tui` so a panic
//!    restores the terminal before the message prints.
//! 4. `register_sigterm()` — flag polled in the event loop.
//! 5. `init_tui()`, event channel, `spawn_event_task()`, git worker.
//!
//! The event loop exits only via `break`, never via `?` (except draw
//! errors), so `restore_tui()` is reached on every quit path: the `q`
//! key, Ctrl+C, SIGTERM, and channel close.

mod app;
mod cli;
mod event;
mod git;
mod llm;
mod session;
mod slots;
mod theme;
mod tui;
mod ui;

use std::io::Write;
use std::path::Path;
use std::sync::atomic::Ordering;

use clap::Parser;

use gruff_core::assets::{self, Category};
use gruff_core::config::Config;
use gruff_core::types::{ReviewOption, Task};

use app::{App, LaunchOptions};
use cli::{Cli, Command, ReviewArgs};

fn fatal(message: impl std::fmt::Display) -> ! {
    eprintln!("gruff: {message}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => fatal(err),
    };
    // First run: write default config, instruction files, and personas.
    if let Err(err) = config.init_files() {
        fatal(err);
    }
    if let Err(err) = assets::seed_defaults(config.storage(), false) {
        fatal(err);
    }

    let options = match cli.command {
        Some(Command::Add { category, name }) => return add_asset(&config, category.into(), &name),
        Some(Command::Delete { category, name }) => {
            return delete_asset(&config, category.into(), &name)
        }
        Some(Command::Edit { category, name }) => {
            return edit_asset(&config, category.into(), &name)
        }
        Some(Command::Config) => {
            println!("{}", config.config_path().display());
            return open_editor(&config.editor_path(), &config.config_path());
        }
        Some(Command::Reset) => {
            assets::seed_defaults(config.storage(), true)
                .map_err(std::io::Error::other)?;
            println!("Default reviewers and instruction sets restored.");
            return Ok(());
        }
        Some(Command::Review(args)) => launch_options(Task::Review, args),
        Some(Command::Commit { all, hint }) => LaunchOptions {
            task: Task::Commit,
            stage_all: all,
            hint,
            ..Default::default()
        },
        Some(Command::Pr { branch }) => LaunchOptions {
            task: Task::PrDescription,
            pr_base: branch,
            ..Default::default()
        },
        None => {
            // Bare `gruff` opens the task picker, but review flags still
            // pre-select the review flow when any of them is set.
            let args = cli.review;
            let has_review_flags = args.reviewer.is_some()
                || args.changes
                || args.staged
                || args.commit
                || args.branch.is_some()
                || args.instructions.is_some()
                || args.skip_instruction;
            if has_review_flags {
                launch_options(Task::Review, args)
            } else {
                LaunchOptions::default()
            }
        }
    };

    run_tui(config, options).await
}

fn launch_options(task: Task, args: ReviewArgs) -> LaunchOptions {
    let review_option = if args.changes {
        ReviewOption::CurrentChanges
    } else if args.staged {
        ReviewOption::StagedChanges
    } else if args.commit {
        ReviewOption::Commit
    } else if args.branch.is_some() {
        ReviewOption::Branch
    } else {
        ReviewOption::None
    };
    LaunchOptions {
        task,
        review_option,
        branch: args.branch,
        reviewer: args.reviewer,
        instructions: args.instructions,
        skip_instruction: args.skip_instruction,
        ..Default::default()
    }
}

async fn run_tui(config: Config, options: LaunchOptions) -> std::io::Result<()> {
    // Fail fast with readable errors before entering the alternate
    // screen.
    if git2::Repository::discover(".").is_err() {
        fatal("not a git repository");
    }
    let llm_provider = match llm::from_config(&config) {
        Ok(provider) => provider,
        Err(err) => fatal(err),
    };
    let theme = theme::Theme::from_name(config.theme_name());

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm();
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let git_tx = git::spawn_worker(".".to_owned(), handler.tx.clone());

    let mut app = App::new(config, theme, git_tx, llm_provider, handler.tx.clone(), options);
    let mut rx = handler.rx;

    'event_loop: loop {
        tokio::select! {
            // Heartbeat: guarantees SIGTERM is checked at least every
            // 50 ms even when no events arrive.
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(event::AppEvent::Render) => {
                        // Exactly one draw() call per Render event.
                        terminal.draw(|frame| ui::render(frame, &mut app))?;
                    }
                    Some(event) => app.handle_event(event),
                    None => break 'event_loop,
                }
                if app.should_quit || term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    // Single exit point — covers normal quit, Ctrl+C, SIGTERM, and
    // channel close. The panic hook handles the panic path.
    tui::restore_tui()?;
    Ok(())
}

// ---- asset subcommands (no TUI) --------------------------------------------

/// Opens the user's editor on a scratch file and stores the result.
fn add_asset(config: &Config, category: Category, name: &str) -> std::io::Result<()> {
    // Refuse duplicates before the user spends time writing.
    if assets::path_for(config.storage(), category, name).is_ok() {
        fatal(format!("'{name}' already exists"));
    }

    let scratch = tempfile::Builder::new()
        .prefix("gruff-")
        .suffix(".md")
        .tempfile()?;
    open_editor(&config.editor_path(), scratch.path())?;

    let content = std::fs::read_to_string(scratch.path())?;
    match assets::add(config.storage(), category, name, &content) {
        Ok(path) => {
            println!("Created {}", path.display());
            Ok(())
        }
        Err(err) => fatal(err),
    }
}

fn delete_asset(config: &Config, category: Category, name: &str) -> std::io::Result<()> {
    match assets::delete(config.storage(), category, name) {
        Ok(()) => {
            println!("Deleted '{name}'.");
            Ok(())
        }
        Err(err) => fatal(err),
    }
}

fn edit_asset(config: &Config, category: Category, name: &str) -> std::io::Result<()> {
    match assets::path_for(config.storage(), category, name) {
        Ok(path) => open_editor(&config.editor_path(), &path),
        Err(err) => fatal(err),
    }
}

/// Runs the configured editor command on `path`, blocking until exit.
///
/// The command may carry arguments ("code --wait"); it is split on
/// whitespace, which covers the common cases without a shell.
fn open_editor(editor: &str, path: &Path) -> std::io::Result<()> {
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or("vim");
    let status = std::process::Command::new(program)
        .args(parts)
        .arg(path)
        .status()?;
    if !status.success() {
        // Flush anything the editor printed before our error.
        std::io::stdout().flush()?;
        fatal(format!("editor '{editor}' exited with {status}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_editor_runs_command_with_arguments() {
        let scratch = tempfile::NamedTempFile::new().unwrap();
        // `true` ignores its arguments and exits 0; the extra flag
        // exercises the whitespace split.
        open_editor("true --wait", scratch.path()).unwrap();
    }
}
