//! Parse options

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Apache refuses to nest includes deeper than this
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 128;

/// Options controlling how sources are parsed and includes resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Directory relative include patterns are resolved against. Unset means
    /// the current working directory.
    pub server_root: Option<PathBuf>,

    /// Load the files named by Include and IncludeOptional
    pub resolve_includes: bool,

    /// Maximum include nesting depth
    pub max_include_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            server_root: None,
            resolve_includes: true,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn with_server_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.server_root = Some(root.into());
        self
    }

    pub fn without_includes(mut self) -> Self {
        self.resolve_includes = false;
        self
    }
}
