//! Git integration for gruff.
//!
//! All repository access runs on a background `std::thread` that owns
//! the `git2::Repository` for its lifetime — Repository is !Send, so it
//! must never cross a thread boundary. Requests go in over a crossbeam
//! channel; replies come back on the unified event bus.
pub mod types;
pub mod worker;

use crossbeam_channel::Sender;
use tokio::sync::mpsc::UnboundedSender;

use crate::event::AppEvent;
use types::GitRequest;

/// Spawns the git worker thread and returns the request sender.
///
/// The thread exits when the returned sender (and all clones) are
/// dropped.
pub fn spawn_worker(path: String, event_tx: UnboundedSender<AppEvent>) -> Sender<GitRequest> {
    let (tx, rx) = crossbeam_channel::unbounded();
    std::thread::spawn(move || worker::git_worker_loop(path, rx, event_tx));
    tx
}
