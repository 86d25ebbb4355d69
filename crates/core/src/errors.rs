use std::path::PathBuf;

/// Result type alias for assetcache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for assetcache operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Encoding or decoding of persisted data
    #[error("serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::FileSystem {
            path: PathBuf::new(),
            operation: "unknown".to_string(),
            source: error,
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(error: bincode::Error) -> Self {
        Error::Serialization {
            message: error.to_string(),
            source: Some(error),
        }
    }
}

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a file system error
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_system_error_display() {
        let err = Error::file_system(
            "/cache/1234/abcd1234",
            "read",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("read"));
        assert!(msg.contains("/cache/1234/abcd1234"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_io_error_converts_to_file_system() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"));
        match err {
            Error::FileSystem { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bincode_error_keeps_source() {
        let decoded: std::result::Result<String, bincode::Error> = bincode::deserialize(&[0xFF]);
        let err = Error::from(decoded.unwrap_err());
        assert!(matches!(err, Error::Serialization { source: Some(_), .. }));
        assert!(err.to_string().starts_with("serialization error: "));
    }
}
