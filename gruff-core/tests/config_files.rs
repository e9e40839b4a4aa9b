//! Integration test for configuration loading and instruction files.

use gruff_core::config::Config;

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = Config::load_from(dir.path().to_path_buf()).unwrap();

    assert!(config.llm_provider().is_err());
    assert!(config.llm_model().is_err());
    assert!(!config.commit_instructions().is_empty());
    assert!(!config.pr_instructions().is_empty());
}

#[test]
fn malformed_config_is_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "llm_provider = [broken").unwrap();
    assert!(Config::load_from(dir.path().to_path_buf()).is_err());
}

#[test]
fn config_keys_are_read() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "editor = \"hx\"\nllm_provider = \"gemini\"\nllm_model = \"gemini-2.0-flash\"\n",
    )
    .unwrap();

    let config = Config::load_from(dir.path().to_path_buf()).unwrap();
    assert_eq!(config.editor_path(), "hx");
    assert_eq!(config.llm_provider().unwrap(), "gemini");
    assert_eq!(config.llm_model().unwrap(), "gemini-2.0-flash");
}

#[test]
fn init_files_writes_defaults_once() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = Config::load_from(dir.path().to_path_buf()).unwrap();
    config.init_files().unwrap();

    assert!(dir.path().join("config.toml").exists());
    assert!(dir.path().join("commit.md").exists());
    assert!(dir.path().join("pull_request_description.md").exists());

    // A user edit survives a second init.
    std::fs::write(dir.path().join("commit.md"), "my commit rules").unwrap();
    config.init_files().unwrap();
    assert_eq!(config.commit_instructions(), "my commit rules");
}

#[test]
fn storage_commit_instructions_take_precedence_over_default() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = Config::load_from(dir.path().to_path_buf()).unwrap();

    let default = config.commit_instructions();
    std::fs::write(dir.path().join("commit.md"), "custom instructions").unwrap();
    assert_eq!(config.commit_instructions(), "custom instructions");
    assert_ne!(default, "custom instructions");
}
