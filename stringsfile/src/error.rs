//! All error types for the stringsfile crate.
//!
//! Fallible loads also record the same message in the store's last-error
//! slot, so callers can use either the returned [`Error`] or
//! [`StringsFile::error`](crate::StringsFile::error).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Allocation(String),

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Syntax { line: usize, message: String },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("format error: {0}")]
    Format(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            message: source.to_string(),
            source,
        }
    }
}

impl Error {
    /// Creates an I/O error whose message already includes the OS reason.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source,
        }
    }

    /// Creates a syntax error for a 1-based line number.
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Error::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Line number of a syntax error, if this is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Syntax { line, .. } => Some(*line),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error_keeps_message_and_source() {
        let source = io::Error::new(io::ErrorKind::NotFound, "No such file or directory");
        let error = Error::io("Unable to open 'x.strings': No such file or directory", source);
        assert_eq!(
            error.to_string(),
            "Unable to open 'x.strings': No such file or directory"
        );
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_syntax_error_line() {
        let error = Error::syntax(3, "Missing terminator on line 3.");
        assert_eq!(error.line(), Some(3));
        assert_eq!(error.to_string(), "Missing terminator on line 3.");
    }

    #[test]
    fn test_unsupported_format_error() {
        let error = Error::UnsupportedFormat("xyz".to_string());
        assert_eq!(error.to_string(), "unsupported format: xyz");
        assert_eq!(error.line(), None);
    }

    #[test]
    fn test_error_display() {
        let errors = vec![
            Error::InvalidArgument("test".to_string()),
            Error::Allocation("test".to_string()),
            Error::UnsupportedFormat("test".to_string()),
            Error::Format("test".to_string()),
        ];

        for error in errors {
            let display = format!("{}", error);
            assert!(display.contains("test"));
        }
    }

    #[test]
    fn test_error_debug() {
        let error = Error::InvalidArgument("test".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("InvalidArgument"));
    }
}
