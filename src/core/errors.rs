//! Error types for the pkgmove-rs library.
//!
//! Every phase of a relocation (scan, collect, load, rewrite, write) reports
//! through [`PkgMoveError`]. Per-file problems during collection are logged
//! and skipped by the callers; only errors that make the whole run unsafe
//! are propagated with `?`.

use std::io;
use std::str::Utf8Error;

use thiserror::Error;

/// Main result type for pkgmove operations.
pub type Result<T> = std::result::Result<T, PkgMoveError>;

/// Comprehensive error type for all pkgmove operations.
#[derive(Error, Debug)]
pub enum PkgMoveError {
    /// I/O related errors (file operations, directory listing, moves)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// Parsing errors, either from the header scan or the full parse
    #[error("Parse error in {language}: {message}")]
    Parse {
        /// Programming language being parsed
        language: String,
        /// Error description
        message: String,
        /// File path where error occurred
        file_path: Option<String>,
        /// Line number (if available)
        line: Option<usize>,
        /// Column number (if available)
        column: Option<usize>,
    },

    /// A package or scope root that does not exist under any source root
    #[error("not found {what}: {path}")]
    NotFound {
        /// What was being looked up (package, scope root, file)
        what: String,
        /// Import path or filesystem path that was requested
        path: String,
    },

    /// Symbol resolution / program loading failures
    #[error("Resolution error in package '{package}': {message}")]
    Resolution {
        /// Import path of the package being resolved
        package: String,
        /// Error description
        message: String,
    },

    /// An import literal the full parse cannot unquote
    #[error("invalid import path {literal} in {file}")]
    MalformedImport {
        /// Raw literal text as written in the source
        literal: String,
        /// File containing the literal
        file: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data type being serialized
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for input data
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field or input that failed validation
        field: Option<String>,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error description
        message: String,
        /// Additional context
        context: Option<String>,
    },
}

impl PkgMoveError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new parse error
    pub fn parse(language: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            language: language.into(),
            message: message.into(),
            file_path: None,
            line: None,
            column: None,
        }
    }

    /// Create a new parse error with file context
    pub fn parse_with_location(
        language: impl Into<String>,
        message: impl Into<String>,
        file_path: impl Into<String>,
        line: Option<usize>,
        column: Option<usize>,
    ) -> Self {
        Self::Parse {
            language: language.into(),
            message: message.into(),
            file_path: Some(file_path.into()),
            line,
            column,
        }
    }

    /// Create a not-found error
    pub fn not_found(what: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NotFound {
            what: what.into(),
            path: path.into(),
        }
    }

    /// Create a resolution error
    pub fn resolution(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            package: package.into(),
            message: message.into(),
        }
    }

    /// Create a malformed import literal error
    pub fn malformed_import(literal: impl Into<String>, file: impl Into<String>) -> Self {
        Self::MalformedImport {
            literal: literal.into(),
            file: file.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new validation error naming the offending field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: None,
        }
    }

    /// True for the "module does not exist" outcome, which callers treat
    /// as "needs creation" rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Add context to an existing error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        match &mut self {
            Self::Internal { context: ctx, .. } => {
                *ctx = Some(context.into());
            }
            Self::Io { message, .. } => {
                *message = format!("{}: {}", context.into(), message);
            }
            _ => {}
        }
        self
    }
}

impl From<io::Error> for PkgMoveError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for PkgMoveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for PkgMoveError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<Utf8Error> for PkgMoveError {
    fn from(err: Utf8Error) -> Self {
        Self::parse("go", format!("UTF-8 encoding error: {err}"))
    }
}

/// Result extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error result
    fn context(self, msg: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<PkgMoveError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }

    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| e.into().with_context(msg))
    }
}
