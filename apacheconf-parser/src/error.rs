//! Error types for apacheconf-parser

use std::path::PathBuf;
use thiserror::Error;

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    /// The token stream carried a token the lexer could not match
    #[error("{}line {line}: unexpected input {text:?}", .file.as_ref().map(|f| format!("{}: ", f.display())).unwrap_or_default())]
    Lex {
        file: Option<PathBuf>,
        line: usize,
        offset: usize,
        text: String,
    },

    /// Include or IncludeOptional without a path
    #[error("{directive} directive has no path")]
    IncludeMissingPath { directive: String },

    /// Include pattern matched no files
    #[error("{directive} '{pattern}' did not match any files")]
    IncludeNoMatch { directive: String, pattern: String },

    /// Include argument is not a valid glob pattern
    #[error("invalid include pattern '{pattern}': {source}")]
    IncludePattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Includes nested deeper than the configured limit
    #[error("includes nested deeper than {limit} levels at '{}'", .path.display())]
    IncludeDepthExceeded { limit: usize, path: PathBuf },

    /// IO error
    #[error("IO error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_error_message() {
        let err = Error::Lex {
            file: None,
            line: 3,
            offset: 20,
            text: "\"".to_string(),
        };
        assert_eq!(err.to_string(), "line 3: unexpected input \"\\\"\"");

        let err = Error::Lex {
            file: Some(PathBuf::from("httpd.conf")),
            line: 3,
            offset: 20,
            text: "\"".to_string(),
        };
        assert_eq!(err.to_string(), "httpd.conf: line 3: unexpected input \"\\\"\"");
    }

    #[test]
    fn test_include_messages() {
        let err = Error::IncludeNoMatch {
            directive: "Include".to_string(),
            pattern: "missing.conf".to_string(),
        };
        assert_eq!(err.to_string(), "Include 'missing.conf' did not match any files");
    }
}
