//! Global error handling for catdir
//!
//! Per-file failures during collection and reconstruction never surface
//! here; they are logged and the run continues. This type carries the
//! errors that abort a run or that a caller wants to inspect.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::clipboard::ClipboardError;

/// Global error type for catdir operations
#[derive(Error, Debug)]
pub enum CatDirError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A source file could not be read
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A destination file could not be written
    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A destination directory could not be created
    #[error("Failed to create directory {path}: {source}")]
    DirCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A reconstructed path would land outside the target root
    #[error("Refusing to write outside the target root: {0}")]
    UnsafePath(String),

    /// An encoded file body could not be decoded
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: hex::FromHexError,
    },

    /// Clipboard errors
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),
}

/// Specialized Result type for catdir operations
pub type Result<T> = std::result::Result<T, CatDirError>;

/// Creates a CatDirError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::CatDirError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

// Lets `main` return io::Result like the rest of the binary plumbing
impl From<CatDirError> for io::Error {
    fn from(err: CatDirError) -> Self {
        match err {
            CatDirError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_positive(n: i32) -> Result<i32> {
        ensure!(n > 0, InvalidArgument, "expected a positive number, got {}", n);
        Ok(n)
    }

    #[test]
    fn test_ensure_macro() {
        assert_eq!(check_positive(3).unwrap(), 3);
        let err = check_positive(-1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: expected a positive number, got -1"
        );
    }

    #[test]
    fn test_into_io_error_keeps_kind() {
        let err = CatDirError::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);

        let io_err: io::Error = error!(Config, "bad {}", "value").into();
        assert_eq!(io_err.kind(), io::ErrorKind::Other);
        assert!(io_err.to_string().contains("bad value"));
    }

    #[test]
    fn test_file_read_names_path_and_cause() {
        use std::error::Error as _;

        let err = CatDirError::FileRead {
            path: PathBuf::from("src/secret.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "Failed to read src/secret.txt: denied");
        assert!(err.source().is_some());
    }
}
