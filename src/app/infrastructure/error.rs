use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Error opening file: {0}")]
    FileRead(String),

    #[error("Error saving file: {0}")]
    FileWrite(String),

    #[error("Clipboard access denied: {0}")]
    ClipboardDenied(String),

    #[error("Not found: \"{0}\"")]
    SearchNotFound(String),

    #[error("Line {0} is out of range")]
    InvalidLine(usize),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Asset cache error: {0}")]
    Asset(String),
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
        assert!(app_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_display() {
        let err = AppError::FileWrite("permission denied".to_string());
        assert_eq!(err.to_string(), "Error saving file: permission denied");

        let err = AppError::SearchNotFound("needle".to_string());
        assert_eq!(err.to_string(), "Not found: \"needle\"");

        let err = AppError::InvalidLine(42);
        assert_eq!(err.to_string(), "Line 42 is out of range");

        let err = AppError::Session("corrupt session".to_string());
        assert_eq!(err.to_string(), "Session error: corrupt session");
    }
}
