//! Pure logic for gruff: asset storage, configuration, prompt assembly,
//! loading-message rotation, and LLM-output post-processing.
//!
//! Nothing in this crate touches a terminal, the network, or git — it is
//! the fully unit-testable half of the application. The `gruff` binary
//! provides the event loop, collaborators, and rendering on top.

pub mod assets;
pub mod config;
pub mod loading;
pub mod prompt;
pub mod text;
pub mod types;
