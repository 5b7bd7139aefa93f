use core::fmt;
use std::io;
use thiserror::Error;

/// Generic result type for finder and storage operations
pub type Result<T> = core::result::Result<T, Error>;

/// The reason a size or date expression was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::exhaustive_enums)]
pub enum ExpressionErrorKind {
    /// Nothing but whitespace was supplied
    Empty,
    /// The expression does not start with a comparison operator
    MissingOperator,
    /// An operator was found but is not valid for this kind of expression
    UnsupportedOperator(String),
    /// The operator is not followed by an amount
    MissingOperand,
    /// The numeric portion could not be read as an unsigned integer
    InvalidNumber(String),
    /// A unit token outside of the recognised set
    UnsupportedUnit(String),
    /// `YYYY-MM-DD` that is not a real calendar date
    InvalidDate(String),
    /// Tokens left over after a complete expression
    TrailingInput(String),
    /// The amount times its unit does not fit the threshold type
    Overflow,
    /// A size predicate was configured without restricting the search to files
    SizeRequiresFiles,
    /// A size predicate was evaluated against an entry that has no size
    MissingSize(String),
}

impl fmt::Display for ExpressionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty expression"),
            Self::MissingOperator => write!(f, "expected a comparison operator"),
            Self::UnsupportedOperator(op) => write!(f, "unsupported operator '{op}'"),
            Self::MissingOperand => write!(f, "expected an amount after the operator"),
            Self::InvalidNumber(num) => write!(f, "invalid number '{num}'"),
            Self::UnsupportedUnit(unit) => write!(f, "unsupported unit '{unit}'"),
            Self::InvalidDate(date) => write!(f, "invalid date '{date}', expected YYYY-MM-DD"),
            Self::TrailingInput(rest) => write!(f, "unexpected trailing input '{rest}'"),
            Self::Overflow => write!(f, "amount is out of range"),
            Self::SizeRequiresFiles => {
                write!(f, "size filters require the search to be restricted to files")
            }
            Self::MissingSize(path) => write!(f, "'{path}' has no size (is it a directory?)"),
        }
    }
}

/// A malformed size or date predicate.
///
/// Raised while parsing, before any entry is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid expression '{expression}': {kind}")]
pub struct ExpressionError {
    pub(crate) expression: String,
    pub(crate) kind: ExpressionErrorKind,
}

impl ExpressionError {
    pub(crate) fn new<S: Into<String>>(expression: S, kind: ExpressionErrorKind) -> Self {
        Self {
            expression: expression.into(),
            kind,
        }
    }

    /// The raw expression that failed
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Why it failed
    #[must_use]
    pub const fn kind(&self) -> &ExpressionErrorKind {
        &self.kind
    }

    /// True when the expression failed only because of an unrecognised unit
    #[must_use]
    pub const fn is_unsupported_unit(&self) -> bool {
        matches!(self.kind, ExpressionErrorKind::UnsupportedUnit(_))
    }
}

/// The storage operation that was being attempted when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::exhaustive_enums)]
pub enum Operation {
    List,
    Read,
    Write,
    Delete,
    Copy,
    Move,
    CreateDirectory,
    DeleteDirectory,
    CheckExistence,
    Metadata,
    SetVisibility,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match *self {
            Self::List => "list contents of",
            Self::Read => "read from",
            Self::Write => "write to",
            Self::Delete => "delete",
            Self::Copy => "copy",
            Self::Move => "move",
            Self::CreateDirectory => "create directory",
            Self::DeleteDirectory => "delete directory",
            Self::CheckExistence => "check existence of",
            Self::Metadata => "read metadata of",
            Self::SetVisibility => "set visibility of",
        };
        f.write_str(verb)
    }
}

/**
 A failure at the storage boundary.

 Always carries the operation, the offending path and the underlying cause.
 Copy and move failures also record the destination.
*/
#[derive(Debug, Error)]
#[error(
    "failed to {operation} '{path}'{}: {source}",
    .destination.as_ref().map(|dest| format!(" to '{dest}'")).unwrap_or_default()
)]
pub struct StorageError {
    pub(crate) operation: Operation,
    pub(crate) path: String,
    pub(crate) destination: Option<String>,
    #[source]
    pub(crate) source: io::Error,
}

impl StorageError {
    pub(crate) fn new<P: Into<String>>(operation: Operation, path: P, source: io::Error) -> Self {
        Self {
            operation,
            path: path.into(),
            destination: None,
            source,
        }
    }

    pub(crate) fn with_destination<D: Into<String>>(mut self, destination: D) -> Self {
        self.destination = Some(destination.into());
        self
    }

    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// The kind of the wrapped IO error
    #[must_use]
    pub fn io_kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

/// Errors raised while loading a [`StorageConfig`](crate::StorageConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level error for everything the crate exposes.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    InvalidExpression(#[from] ExpressionError),
    #[error(transparent)]
    StorageAccess(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Returns the expression error if this is one
    #[must_use]
    pub const fn as_expression_error(&self) -> Option<&ExpressionError> {
        match self {
            Self::InvalidExpression(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the storage error if this is one
    #[must_use]
    pub const fn as_storage_error(&self) -> Option<&StorageError> {
        match self {
            Self::StorageAccess(err) => Some(err),
            _ => None,
        }
    }
}
