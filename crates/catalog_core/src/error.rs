//! Core error types for the catalog toolchain.

/// Core result type
pub type CatalogResult<T> = Result<T, CatalogError>;

/// A single syntax error reported by the DSL parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
    /// Human readable message
    pub message: String,
}

impl SyntaxError {
    /// Create a new syntax error
    #[must_use]
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}:{} {}", self.line, self.column, self.message)
    }
}

/// Core error type
///
/// Import records everything but `Parse` against the failing resource and
/// keeps going; export treats every variant as fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The DSL source did not parse; nothing is written
    #[error("Parse errors in {source_name}:\n{}", format_syntax_errors(.errors))]
    Parse {
        /// File name or `<stdin>`
        source_name: String,
        /// Every error the parser reported
        errors: Vec<SyntaxError>,
    },

    /// A requested resource (or version of it) does not exist
    #[error("{kind} '{id}{}' not found", version_suffix(.version))]
    NotFound {
        /// Resource kind keyword
        kind: String,
        /// Resource id
        id: String,
        /// Requested version, `None` for latest
        version: Option<String>,
    },

    /// Unknown resource type keyword
    #[error("Invalid resource type '{found}'. Must be one of: {expected}")]
    UnsupportedType {
        /// What the caller asked for
        found: String,
        /// Comma separated list of accepted keywords
        expected: String,
    },

    /// A version bump was requested but the new version is not newer
    #[error("Cannot version {kind} '{id}': new version {requested} must be greater than {existing}")]
    WriteConflict {
        /// Resource kind keyword
        kind: String,
        /// Resource id
        id: String,
        /// Current latest version on disk
        existing: String,
        /// Version being written
        requested: String,
    },

    /// Write without override hit an existing resource
    #[error("{kind} '{id}@{version}' already exists")]
    AlreadyExists {
        /// Resource kind keyword
        kind: String,
        /// Resource id
        id: String,
        /// Version on disk
        version: String,
    },

    /// An id or version that cannot name a catalog directory
    #[error("Invalid {kind} {field} '{value}': must be a single path segment")]
    InvalidPathSegment {
        /// Resource kind keyword
        kind: String,
        /// `id` or `version`
        field: String,
        /// Rejected value
        value: String,
    },

    /// A version string could not be interpreted
    #[error("Invalid version: {reason}")]
    InvalidVersion {
        /// Why parsing failed
        reason: String,
    },

    /// A markdown document or its frontmatter is malformed
    #[error("Invalid document {path}: {reason}")]
    Document {
        /// Offending file
        path: String,
        /// Decoder message
        reason: String,
    },

    /// File system failure
    #[error("IO error: {reason}")]
    Io {
        /// Underlying error message
        reason: String,
    },
}

impl CatalogError {
    /// Shorthand for a not-found error
    #[must_use]
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>, version: Option<&str>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
            version: version.map(str::to_string),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

fn version_suffix(version: &Option<String>) -> String {
    match version {
        Some(v) => format!("@{v}"),
        None => " (latest)".to_string(),
    }
}

fn format_syntax_errors(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(|e| format!("  {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
