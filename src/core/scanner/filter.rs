//! File filtering logic for the scanner.

use crate::error::ScanError;
use glob::{MatchOptions, Pattern};
use std::ffi::OsStr;
use std::path::{Component, Path};

/// Pattern every candidate must match, relative to the scan root
pub const DEFAULT_PATTERN: &str = "**/*.mp3";

/// Decides which relative paths are candidate audio files
#[derive(Debug, Clone)]
pub struct AudioFilter {
    /// Glob the relative path must match
    pattern: Pattern,
    /// Whether to include hidden files
    include_hidden: bool,
}

impl AudioFilter {
    /// Compile a filter for `pattern`
    pub fn new(pattern: &str) -> Result<Self, ScanError> {
        let pattern = Pattern::new(pattern).map_err(|e| ScanError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.msg.to_string(),
        })?;

        Ok(Self {
            pattern,
            include_hidden: false,
        })
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    /// Check if a path relative to the scan root should be included
    pub fn should_include(&self, relative: &Path) -> bool {
        if !self.include_hidden
            && relative.components().any(|c| match c {
                Component::Normal(name) => is_hidden(name),
                _ => false,
            })
        {
            return false;
        }

        self.pattern.matches_path_with(relative, Self::match_options())
    }

    fn match_options() -> MatchOptions {
        MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        }
    }
}

/// Names starting with a dot are hidden
pub fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|n| n.starts_with('.'))
}
