//! Flat-file storage for named prompt assets.
//!
//! Reviewer personas and instruction sets live as markdown files under
//! `<storage>/reviewers/` and `<storage>/instructions/`. The asset name
//! is the file stem; the prompt is the file content. There is no cache —
//! every orchestrator run reads the directory fresh, which keeps manual
//! edits visible without a restart.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The two asset categories gruff knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Reviewers,
    Instructions,
}

impl Category {
    /// Directory name under the storage root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Reviewers => "reviewers",
            Category::Instructions => "instructions",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reviewer" | "reviewers" => Ok(Category::Reviewers),
            "instruction" | "instructions" => Ok(Category::Instructions),
            other => Err(format!("unknown category '{other}' (expected 'reviewer' or 'instruction')")),
        }
    }
}

/// A named prompt loaded from storage. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub name: String,
    pub prompt: String,
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read assets: {0}")]
    Io(#[from] std::io::Error),
    #[error("'{0}' already exists")]
    AlreadyExists(String),
    #[error("'{0}' not found")]
    NotFound(String),
    #[error("content cannot be empty")]
    EmptyContent,
}

/// Loads all assets in `category`, sorted by name.
///
/// Sorting makes the listing order deterministic across platforms, which
/// matters because [`find`] is first-match-wins.
pub fn list(storage: &Path, category: Category) -> Result<Vec<Asset>, AssetError> {
    let dir = storage.join(category.dir_name());
    let mut assets = Vec::new();

    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let prompt = fs::read_to_string(&path)?;
        assets.push(Asset { name: stem.to_owned(), prompt });
    }

    assets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(assets)
}

/// Resolves an asset by name: case-insensitive substring match against
/// asset names, first match in listing order wins.
///
/// Deliberately not an exact match — `--as linus` should find "Linus"
/// without the user typing the full name. The cost is ambiguity when
/// names overlap ("Linus" shadows "Linus Jr"); see DESIGN.md.
pub fn find<'a>(name: &str, assets: &'a [Asset]) -> Option<&'a Asset> {
    let needle = name.to_lowercase();
    assets
        .iter()
        .find(|asset| asset.name.to_lowercase().contains(&needle))
}

/// Writes a new asset file. Errors if the name is taken or `content` is
/// empty.
pub fn add(
    storage: &Path,
    category: Category,
    name: &str,
    content: &str,
) -> Result<PathBuf, AssetError> {
    if content.trim().is_empty() {
        return Err(AssetError::EmptyContent);
    }

    let dir = storage.join(category.dir_name());
    fs::create_dir_all(&dir)?;

    let path = dir.join(format!("{name}.md"));
    if path.exists() {
        return Err(AssetError::AlreadyExists(name.to_owned()));
    }

    fs::write(&path, content)?;
    Ok(path)
}

/// Deletes a stored asset by name.
pub fn delete(storage: &Path, category: Category, name: &str) -> Result<(), AssetError> {
    let path = path_for(storage, category, name)?;
    fs::remove_file(path)?;
    Ok(())
}

/// Returns the path of a stored asset, or `NotFound`.
///
/// Used by the `edit` subcommand to hand the file to the user's editor.
pub fn path_for(storage: &Path, category: Category, name: &str) -> Result<PathBuf, AssetError> {
    let path = storage.join(category.dir_name()).join(format!("{name}.md"));
    if !path.exists() {
        return Err(AssetError::NotFound(name.to_owned()));
    }
    Ok(path)
}

const DEFAULT_REVIEWERS: &[(&str, &str)] = &[
    ("The Maintainer", include_str!("../prompts/reviewers/the-maintainer.md")),
    ("The Bard", include_str!("../prompts/reviewers/the-bard.md")),
    ("The Zen Master", include_str!("../prompts/reviewers/the-zen-master.md")),
];

const DEFAULT_INSTRUCTIONS: &[(&str, &str)] = &[
    ("Security focus", include_str!("../prompts/instructions/security-focus.md")),
    ("Performance focus", include_str!("../prompts/instructions/performance-focus.md")),
];

/// Unpacks the embedded default personas and instruction sets into
/// storage.
///
/// A no-op when the category directory already exists, unless `reset` is
/// set — then the defaults are re-written (user-added files are left
/// alone).
pub fn seed_defaults(storage: &Path, reset: bool) -> Result<(), AssetError> {
    seed_category(storage, Category::Reviewers, DEFAULT_REVIEWERS, reset)?;
    seed_category(storage, Category::Instructions, DEFAULT_INSTRUCTIONS, reset)?;
    Ok(())
}

fn seed_category(
    storage: &Path,
    category: Category,
    defaults: &[(&str, &str)],
    reset: bool,
) -> Result<(), AssetError> {
    let dir = storage.join(category.dir_name());

    if dir.exists() && !reset {
        return Ok(());
    }
    fs::create_dir_all(&dir)?;

    for (name, content) in defaults {
        fs::write(dir.join(format!("{name}.md")), content)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> Asset {
        Asset { name: name.to_owned(), prompt: format!("prompt for {name}") }
    }

    #[test]
    fn find_is_case_insensitive_substring_first_match() {
        let assets = vec![asset("Linus"), asset("Linus Jr")];
        let found = find("linus", &assets).expect("should match");
        assert_eq!(found.name, "Linus");
    }

    #[test]
    fn find_matches_partial_names() {
        let assets = vec![asset("The Bard"), asset("The Zen Master")];
        assert_eq!(find("zen", &assets).unwrap().name, "The Zen Master");
        assert_eq!(find("BARD", &assets).unwrap().name, "The Bard");
    }

    #[test]
    fn find_returns_none_when_nothing_matches() {
        let assets = vec![asset("The Bard")];
        assert!(find("gordon", &assets).is_none());
    }
}
