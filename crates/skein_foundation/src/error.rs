//! Error types for the Skein system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

/// The main error type for Skein operations.
#[derive(Debug, Error)]
#[error("{}{}", .kind, .context.as_ref().map(|c| format!(" {c}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

/// Result type for Skein operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Records one path segment while the error unwinds.
    ///
    /// Call from the innermost frame outwards.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.context = Some(self.context.take().unwrap_or_default().with_frame(frame));
        self
    }

    /// Creates a parse error for text that is not well-formed.
    #[must_use]
    pub fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::new(ErrorKind::ParseError {
            message: message.into(),
            line,
            column,
        })
    }

    /// Creates an error for a well-formed document with an invalid node.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedNode {
            message: message.into(),
        })
    }

    /// Creates a dangling back-reference error.
    #[must_use]
    pub fn dangling_reference(id: impl Into<String>) -> Self {
        Self::new(ErrorKind::DanglingReference(id.into()))
    }

    /// Creates an error for a failure to render encoded output.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization(message.into()))
    }

    /// Returns true for errors caused by malformed input.
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ParseError { .. } | ErrorKind::MalformedNode { .. }
        )
    }

    /// Returns true for unresolved back-references.
    #[must_use]
    pub fn is_dangling_reference(&self) -> bool {
        matches!(self.kind, ErrorKind::DanglingReference(_))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Input text is not well-formed.
    #[error("parse error at {line}:{column}: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Line number (1-indexed, 0 if unknown).
        line: usize,
        /// Column number (1-indexed, 0 if unknown).
        column: usize,
    },

    /// Input is well-formed but a node has an invalid shape.
    #[error("malformed node: {message}")]
    MalformedNode {
        /// What was wrong with the node.
        message: String,
    },

    /// A back-reference names an id that was never recorded.
    #[error("dangling reference: {0}")]
    DanglingReference(String),

    /// Rendering the encoded tree to text failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Path segments from the failing node up to the root.
    pub frames: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a path segment outside the ones already recorded.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.frames.push(frame.into());
        self
    }

    /// Renders the path from the root, e.g. `$.owner.pets[2]`.
    #[must_use]
    pub fn path(&self) -> String {
        let mut path = String::from("$");
        for frame in self.frames.iter().rev() {
            if !frame.starts_with('[') {
                path.push('.');
            }
            path.push_str(frame);
        }
        path
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}", self.path())
    }
}
