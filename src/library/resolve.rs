use std::path::{Path, PathBuf};

use super::error::ResolveError;

/// Turns a stored media locator into something the audio backend can open.
pub trait LocatorResolver: Send {
    fn resolve(&self, locator: &str) -> Result<PathBuf, ResolveError>;
}

/// Resolves locators relative to the library root directory.
#[derive(Debug, Clone)]
pub struct LibraryRoot {
    root: PathBuf,
}

impl LibraryRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

impl LocatorResolver for LibraryRoot {
    fn resolve(&self, locator: &str) -> Result<PathBuf, ResolveError> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(ResolveError::Empty);
        }

        let candidate = Path::new(locator);
        let full = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        };

        if full.is_file() {
            Ok(full)
        } else {
            Err(ResolveError::NotFound(full))
        }
    }
}
