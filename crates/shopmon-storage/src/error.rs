/// Errors that can occur within the storage layer.
///
/// # Examples
///
/// ```rust
/// use shopmon_storage::error::StorageError;
///
/// let err = StorageError::InvalidValue {
///     column: "severity",
///     value: "fatal".to_string(),
/// };
/// assert!(err.to_string().contains("severity"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// An underlying SQLite error.
    #[error("Storage: SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON serialization or deserialization failure (e.g. data columns).
    #[error("Storage: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored value could not be parsed back into its domain type.
    #[error("Storage: invalid value in column '{column}': {value}")]
    InvalidValue { column: &'static str, value: String },

    /// Generic storage error for cases not covered by other variants.
    #[error("Storage: {0}")]
    Other(String),
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
