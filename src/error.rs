// Reader error taxonomy

/// Failure reported by a telemetry reader (a whole source or a single volume).
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl ReaderError {
    pub fn permission_denied<S: Into<String>>(msg: S) -> Self {
        ReaderError::PermissionDenied(msg.into())
    }

    pub fn not_ready<S: Into<String>>(msg: S) -> Self {
        ReaderError::NotReady(msg.into())
    }

    pub fn unavailable<S: Into<String>>(msg: S) -> Self {
        ReaderError::Unavailable(msg.into())
    }

    pub fn invalid_data<S: Into<String>>(msg: S) -> Self {
        ReaderError::InvalidData(msg.into())
    }

    /// True for authorization failures, whether reported directly or as an OS error.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            ReaderError::PermissionDenied(_) => true,
            ReaderError::Io(e) => e.kind() == std::io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }

    /// Short reason used in degraded volume labels ("(Error: <reason>)").
    pub fn reason(&self) -> String {
        match self {
            ReaderError::Io(e) => e.to_string(),
            ReaderError::PermissionDenied(m)
            | ReaderError::NotReady(m)
            | ReaderError::Unavailable(m)
            | ReaderError::InvalidData(m) => m.clone(),
        }
    }
}
