/// Errors that can occur within the notification subsystem.
///
/// # Examples
///
/// ```rust
/// use shopmon_notify::error::NotifyError;
///
/// let err = NotifyError::Other("chat webhook URL missing".to_string());
/// assert!(err.to_string().contains("webhook"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// An HTTP request to an external notification endpoint failed.
    #[error("Notify: HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The external endpoint returned a non-success response.
    #[error("Notify: API error from {service}: status={status}, body={body}")]
    Api {
        service: String,
        status: u16,
        body: String,
    },

    /// JSON serialization or deserialization failed (payloads, stored
    /// dispatch results).
    #[error("Notify: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Persisting or completing an alert record failed.
    #[error("Notify: storage error: {0}")]
    Storage(#[from] shopmon_storage::error::StorageError),

    /// Generic notification error for cases not covered by other variants.
    #[error("Notify: {0}")]
    Other(String),
}

/// Convenience `Result` alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
