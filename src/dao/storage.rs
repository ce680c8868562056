use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not serve the request.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// What was being attempted.
        message: String,
        /// Backend-specific cause.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// No document matched the filter.
    #[error("no matching document in `{collection}`")]
    NotFound { collection: &'static str },
    /// A document with the same `_id` is already stored.
    #[error("document with this `_id` already exists in `{collection}`")]
    DuplicateKey { collection: &'static str },
    /// A record could not be converted to BSON.
    #[error("failed to encode a `{collection}` document")]
    Encode {
        /// Collection the document belongs to.
        collection: &'static str,
        /// Serializer error.
        #[source]
        source: bson::ser::Error,
    },
    /// A stored document does not match its record type.
    #[error("failed to decode a `{collection}` document")]
    Decode {
        /// Collection the document belongs to.
        collection: &'static str,
        /// Deserializer error.
        #[source]
        source: bson::de::Error,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
