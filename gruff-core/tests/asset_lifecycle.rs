//! Integration test for the flat-file asset store.
//!
//! Exercises: seed_defaults, list, add, path_for, delete, find, and the
//! duplicate/empty-content failure paths.

use gruff_core::assets::{self, AssetError, Category};

#[test]
fn seed_then_list_returns_default_personas() {
    let dir = tempfile::TempDir::new().unwrap();
    assets::seed_defaults(dir.path(), false).unwrap();

    let reviewers = assets::list(dir.path(), Category::Reviewers).unwrap();
    assert!(!reviewers.is_empty(), "seeding should create default reviewers");
    assert!(reviewers.iter().all(|a| !a.prompt.is_empty()));

    // Sorted by name: deterministic listing order.
    let names: Vec<&str> = reviewers.iter().map(|a| a.name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    let instructions = assets::list(dir.path(), Category::Instructions).unwrap();
    assert!(!instructions.is_empty(), "seeding should create default instructions");
}

#[test]
fn seed_is_idempotent_without_reset() {
    let dir = tempfile::TempDir::new().unwrap();
    assets::seed_defaults(dir.path(), false).unwrap();

    // User edits a default persona; a second seed must not clobber it.
    let path = assets::path_for(dir.path(), Category::Reviewers, "The Maintainer").unwrap();
    std::fs::write(&path, "my edited persona").unwrap();

    assets::seed_defaults(dir.path(), false).unwrap();
    let reviewers = assets::list(dir.path(), Category::Reviewers).unwrap();
    let edited = reviewers.iter().find(|a| a.name == "The Maintainer").unwrap();
    assert_eq!(edited.prompt, "my edited persona");
}

#[test]
fn reset_restores_default_content() {
    let dir = tempfile::TempDir::new().unwrap();
    assets::seed_defaults(dir.path(), false).unwrap();

    let path = assets::path_for(dir.path(), Category::Reviewers, "The Maintainer").unwrap();
    std::fs::write(&path, "clobbered").unwrap();

    assets::seed_defaults(dir.path(), true).unwrap();
    let reviewers = assets::list(dir.path(), Category::Reviewers).unwrap();
    let restored = reviewers.iter().find(|a| a.name == "The Maintainer").unwrap();
    assert_ne!(restored.prompt, "clobbered");
}

#[test]
fn add_path_for_delete_roundtrip() {
    let dir = tempfile::TempDir::new().unwrap();

    let path = assets::add(dir.path(), Category::Instructions, "house-style", "Prefer clarity.")
        .unwrap();
    assert!(path.ends_with("instructions/house-style.md"));

    let listed = assets::list(dir.path(), Category::Instructions).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "house-style");
    assert_eq!(listed[0].prompt, "Prefer clarity.");

    let resolved = assets::path_for(dir.path(), Category::Instructions, "house-style").unwrap();
    assert_eq!(resolved, path);

    assets::delete(dir.path(), Category::Instructions, "house-style").unwrap();
    assert!(matches!(
        assets::path_for(dir.path(), Category::Instructions, "house-style"),
        Err(AssetError::NotFound(_))
    ));
}

#[test]
fn add_rejects_duplicates_and_empty_content() {
    let dir = tempfile::TempDir::new().unwrap();

    assets::add(dir.path(), Category::Reviewers, "dup", "persona").unwrap();
    assert!(matches!(
        assets::add(dir.path(), Category::Reviewers, "dup", "other"),
        Err(AssetError::AlreadyExists(_))
    ));

    assert!(matches!(
        assets::add(dir.path(), Category::Reviewers, "blank", "   \n"),
        Err(AssetError::EmptyContent)
    ));
}

#[test]
fn list_on_missing_directory_is_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    // No seeding: the category directory does not exist, which the
    // orchestrator treats as fatal rather than retryable.
    assert!(assets::list(dir.path(), Category::Reviewers).is_err());
}
