use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

use tracing_error::{SpanTrace, SpanTraceStatus};

/* 📖 # Why a custom error type and not use anyhow/eyre/thiserror etc?

- Callers need to pattern match on the failure category (not-found, bad pattern,
  short write, ...) and read structured data such as the bytes moved before a
  transfer failed
- No dependencies to compile and integrate beyond tracing-error
- More transparency into error handling logic
 */

/// Stage of a buffered transfer in which a stream failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStage {
    Read,
    Write,
    Flush,
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStage::Read => write!(f, "read"),
            TransferStage::Write => write!(f, "write"),
            TransferStage::Flush => write!(f, "flush"),
        }
    }
}

/// Error variants that can occur in pathkit operations.
/// Each variant represents a specific error category with its associated context.
#[derive(Debug)]
pub enum ErrorKind {
    /// File system operation failed
    FileError {
        path: PathBuf,
        source: io::Error,
    },

    /// A glob pattern could not be compiled
    InvalidPattern { pattern: String, message: String },

    /// No lexical path leads from `base` to `target`
    NoRelativePath { base: String, target: String },

    /// A transfer was requested with a zero-sized buffer
    InvalidBufferSize { size: usize },

    /// The destination accepted fewer bytes than it was offered
    ShortWrite {
        copied: u64,
        offered: usize,
        accepted: usize,
    },

    /// A stream failed in the middle of a transfer
    Transfer {
        stage: TransferStage,
        copied: u64,
        source: io::Error,
    },

    /// A well-known per-user directory is not defined on this platform
    DirectoryUnavailable { name: &'static str },

    /// Catch-all for other errors with a message
    Message { message: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::FileError { path, source } => {
                write!(f, "File error at {}: {}", path.display(), source)
            }
            ErrorKind::InvalidPattern { pattern, message } => {
                write!(f, "Invalid glob pattern '{}': {}", pattern, message)
            }
            ErrorKind::NoRelativePath { base, target } => {
                write!(f, "Cannot make '{}' relative to '{}'", target, base)
            }
            ErrorKind::InvalidBufferSize { size } => {
                write!(f, "Invalid buffer size {}: must be greater than zero", size)
            }
            ErrorKind::ShortWrite {
                copied,
                offered,
                accepted,
            } => write!(
                f,
                "Short write after {} bytes: offered {} bytes, accepted {}",
                copied, offered, accepted
            ),
            ErrorKind::Transfer {
                stage,
                copied,
                source,
            } => write!(
                f,
                "Transfer {} failed after {} bytes: {}",
                stage, copied, source
            ),
            ErrorKind::DirectoryUnavailable { name } => {
                write!(f, "Unable to determine the {} directory", name)
            }
            ErrorKind::Message { message } => write!(f, "{}", message),
        }
    }
}

/* 📖 # Why separate ErrorKind and PathkitError?
This two-layer design provides a clear separation of concerns:
- ErrorKind: structural variants with specific contexts (file paths, byte counts, etc.)
- PathkitError: wraps ErrorKind with runtime context strings, an optional cause and
  the span trace captured where the error was created

Users pattern match on ErrorKind; PathkitError carries everything needed to explain
how the failure came about.
*/

/// Error type wrapping [`ErrorKind`] with context, an optional cause and a span trace.
pub struct PathkitError {
    kind: ErrorKind,
    context: Vec<String>,
    cause: Option<Box<PathkitError>>,
    span_trace: SpanTrace,
}

impl PathkitError {
    /// Creates a new error from an ErrorKind, capturing the current span trace.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
            cause: None,
            span_trace: SpanTrace::capture(),
        }
    }

    /// Creates a free-form message error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    /// Creates a file error for an OS failure on `path`.
    pub fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::new(ErrorKind::FileError {
            path: path.into(),
            source,
        })
    }

    /// Attaches context to an error.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches context using lazy evaluation.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Records the error that led to this one.
    pub fn caused_by(mut self, cause: PathkitError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Returns a reference to the underlying ErrorKind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Context strings in the order they were attached.
    pub fn get_context(&self) -> &[String] {
        &self.context
    }

    /// The error recorded with [`PathkitError::caused_by`], if any.
    pub fn cause(&self) -> Option<&PathkitError> {
        self.cause.as_deref()
    }

    /// Span trace captured when the error was created.
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// Returns the innermost error in the chain.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    /// Bytes moved by a transfer before it failed; zero for every other failure.
    pub fn bytes_copied(&self) -> u64 {
        match &self.kind {
            ErrorKind::ShortWrite { copied, .. } | ErrorKind::Transfer { copied, .. } => *copied,
            _ => 0,
        }
    }

    /// The `io::ErrorKind` of the underlying OS or stream failure, if there is one.
    pub fn io_error_kind(&self) -> Option<io::ErrorKind> {
        match &self.kind {
            ErrorKind::FileError { source, .. } | ErrorKind::Transfer { source, .. } => {
                Some(source.kind())
            }
            _ => self.cause.as_ref().and_then(|cause| cause.io_error_kind()),
        }
    }

    /// True when the target path does not exist.
    pub fn is_not_found(&self) -> bool {
        self.io_error_kind() == Some(io::ErrorKind::NotFound)
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: &str) -> fmt::Result {
        let entries = self.context.len() + usize::from(self.cause.is_some());
        for (i, ctx) in self.context.iter().enumerate() {
            let branch = if i + 1 == entries { "└─" } else { "├─" };
            writeln!(f, "{}{} {}", indent, branch, ctx)?;
        }
        if let Some(cause) = &self.cause {
            writeln!(f, "{}└─ cause: {}", indent, cause.kind)?;
            cause.fmt_tree(f, &format!("{}   ", indent))?;
        }
        Ok(())
    }
}

impl From<ErrorKind> for PathkitError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl StdError for PathkitError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::FileError { source, .. } | ErrorKind::Transfer { source, .. } => {
                Some(source)
            }
            _ => self
                .cause
                .as_deref()
                .map(|cause| cause as &(dyn StdError + 'static)),
        }
    }
}

impl fmt::Display for PathkitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ctx in &self.context {
            write!(f, "{}: ", ctx)?;
        }
        write!(f, "{}", self.kind)
    }
}

impl fmt::Debug for PathkitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;
        self.fmt_tree(f, "")?;
        if self.span_trace.status() == SpanTraceStatus::CAPTURED {
            writeln!(f, "Trace: {}", self.span_trace)?;
        }
        Ok(())
    }
}

/* 📖 # Why use Box<PathkitError> in the result type?

Boxing the error reduces the size of the result type, making it more efficient to return in the common case.

*/

/// Standard result type for pathkit operations.
pub type PathkitResult<T> = std::result::Result<T, Box<PathkitError>>;

/// Extension trait for attaching context to Results.
pub trait ResultExt<T> {
    /// Attaches context to an error, consuming and re-wrapping it.
    fn context(self, context: impl Into<String>) -> PathkitResult<T>;

    /// Attaches context using lazy evaluation.
    /// Prefer this to avoid expensive string formatting in the success path.
    fn with_context<F>(self, f: F) -> PathkitResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for PathkitResult<T> {
    fn context(self, context: impl Into<String>) -> PathkitResult<T> {
        self.map_err(|err| Box::new((*err).context(context)))
    }

    fn with_context<F>(self, f: F) -> PathkitResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new((*err).with_context(f)))
    }
}

/// Builds a boxed message error from format arguments.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::PathkitError::message(format!($($arg)*)))
    };
}
