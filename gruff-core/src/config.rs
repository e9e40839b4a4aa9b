//! Configuration value object.
//!
//! Built once at startup from `~/.gruff/config.toml` and passed into the
//! components that need it — core logic never does ambient lookups. The
//! commit and PR instruction texts are user-editable markdown files in
//! the storage directory, seeded from embedded defaults on first run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const CONFIG_FILE: &str = "config.toml";
const COMMIT_INSTRUCTIONS_FILE: &str = "commit.md";
const PR_INSTRUCTIONS_FILE: &str = "pull_request_description.md";

const DEFAULT_COMMIT_INSTRUCTIONS: &str = include_str!("../prompts/commit.md");
const DEFAULT_PR_INSTRUCTIONS: &str = include_str!("../prompts/pull_request_description.md");

/// The review format preamble prepended to every review prompt.
pub const FORMAT_REQUIREMENTS: &str = include_str!("../prompts/format.md");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine home directory")]
    NoHome,
    #[error("config i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{0} not set in config")]
    MissingKey(&'static str),
}

/// On-disk shape of `config.toml`. All keys optional.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    editor: Option<String>,
    theme: Option<String>,
    llm_provider: Option<String>,
    llm_model: Option<String>,
}

/// Resolved configuration passed by reference into every component that
/// needs it.
#[derive(Debug, Clone)]
pub struct Config {
    storage: PathBuf,
    editor: Option<String>,
    theme: Option<String>,
    llm_provider: Option<String>,
    llm_model: Option<String>,
}

impl Config {
    /// Loads configuration from the default storage directory
    /// (`~/.gruff`), creating it if needed.
    pub fn load() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
        Self::load_from(home.join(".gruff"))
    }

    /// Loads configuration rooted at an explicit storage directory.
    ///
    /// A missing `config.toml` is not an error — everything has a
    /// default or is only required when actually used. A malformed one
    /// is an error: silently ignoring a typo'd config is worse.
    pub fn load_from(storage: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&storage)?;

        let path = storage.join(CONFIG_FILE);
        let file: FileConfig = match fs::read_to_string(&path) {
            Ok(raw) => {
                toml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })?
            }
            Err(_) => FileConfig::default(),
        };

        Ok(Self {
            storage,
            editor: file.editor,
            theme: file.theme,
            llm_provider: file.llm_provider,
            llm_model: file.llm_model,
        })
    }

    pub fn storage(&self) -> &Path {
        &self.storage
    }

    pub fn config_path(&self) -> PathBuf {
        self.storage.join(CONFIG_FILE)
    }

    /// The editor command used for `add`/`edit`: config key, then
    /// `$EDITOR`, then `vim`.
    pub fn editor_path(&self) -> String {
        if let Some(editor) = &self.editor {
            if !editor.is_empty() {
                return editor.clone();
            }
        }
        std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_owned())
    }

    /// Theme name for the TUI; unknown names fall back at the UI layer.
    pub fn theme_name(&self) -> &str {
        self.theme.as_deref().unwrap_or("dark")
    }

    pub fn llm_provider(&self) -> Result<&str, ConfigError> {
        self.llm_provider
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingKey("llm_provider"))
    }

    pub fn llm_model(&self) -> Result<&str, ConfigError> {
        self.llm_model
            .as_deref()
            .filter(|m| !m.is_empty())
            .ok_or(ConfigError::MissingKey("llm_model"))
    }

    /// Instruction text for commit-message generation.
    ///
    /// Reads the user-editable file from storage; falls back to the
    /// embedded default when the file is missing or unreadable.
    pub fn commit_instructions(&self) -> String {
        fs::read_to_string(self.storage.join(COMMIT_INSTRUCTIONS_FILE))
            .unwrap_or_else(|_| DEFAULT_COMMIT_INSTRUCTIONS.to_owned())
    }

    /// Instruction text for PR-description generation.
    ///
    /// A `pull_request_description.md` in the current directory takes
    /// precedence, so repositories can ship their own PR template.
    pub fn pr_instructions(&self) -> String {
        if let Ok(local) = fs::read_to_string(PR_INSTRUCTIONS_FILE) {
            return local;
        }
        fs::read_to_string(self.storage.join(PR_INSTRUCTIONS_FILE))
            .unwrap_or_else(|_| DEFAULT_PR_INSTRUCTIONS.to_owned())
    }

    /// Writes the default config and instruction files when absent.
    /// Existing files are never touched.
    pub fn init_files(&self) -> Result<(), ConfigError> {
        let config_path = self.config_path();
        if !config_path.exists() {
            fs::write(
                &config_path,
                "# gruff configuration\n\
                 #editor = \"vim\"\n\
                 #theme = \"dark\"\n\
                 llm_provider = \"gemini\"\n\
                 llm_model = \"gemini-2.0-flash\"\n",
            )?;
        }

        let commit_path = self.storage.join(COMMIT_INSTRUCTIONS_FILE);
        if !commit_path.exists() {
            fs::write(&commit_path, DEFAULT_COMMIT_INSTRUCTIONS)?;
        }

        let pr_path = self.storage.join(PR_INSTRUCTIONS_FILE);
        if !pr_path.exists() {
            fs::write(&pr_path, DEFAULT_PR_INSTRUCTIONS)?;
        }

        Ok(())
    }
}
