/// Result alias that carries the custom [`GestureTreeError`] type.
pub type Result<T> = std::result::Result<T, GestureTreeError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum GestureTreeError {
    /// Free-form message for failures that do not warrant their own variant.
    #[error("{0}")]
    Message(String),
    /// The external hand-landmark detector could not be started or stopped
    /// answering before its first frame.
    #[error("hand landmark detector unavailable: {0}")]
    DetectorUnavailable(String),
    /// A detector result that does not describe a usable landmark frame.
    #[error("malformed landmark frame: {0}")]
    MalformedFrame(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Wrapper around JSON encoding and decoding errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl GestureTreeError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Returns true when the error means gesture tracking cannot be used at all.
    pub fn is_detector_unavailable(&self) -> bool {
        matches!(self, Self::DetectorUnavailable(_))
    }
}

impl From<&str> for GestureTreeError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for GestureTreeError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
