//! # Error Handling
//!
//! Error types for the edgekit provisioning core, built on `thiserror`.
//!
//! The taxonomy is deliberately small: caller mistakes (`Config`), inputs
//! that reference entities which cannot be resolved
//! (`ReferentialIntegrity`), and failures reported by an infrastructure or
//! DNS provider (`Provider`). Provider failures are propagated unchanged —
//! the provider owns its own retry policy, and recovery is always an
//! idempotent re-run of the whole pipeline rather than a partial patch.

/// Custom result type for edgekit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the edgekit provisioning core
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Invalid or missing caller-supplied input. Fatal, never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An input references another logical entity that cannot be resolved,
    /// e.g. a route pointing at a backend with no reference. Fatal.
    #[error("Referential integrity error: {entity} references unresolved '{reference}'")]
    ReferentialIntegrity { entity: String, reference: String },

    /// The infrastructure or DNS provider rejected or failed an operation.
    /// Propagated unchanged; no local recovery.
    #[error("Provider error during {operation}: {message}")]
    Provider {
        operation: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Resource spec payload serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a referential integrity error
    pub fn referential<E: Into<String>, R: Into<String>>(entity: E, reference: R) -> Self {
        Self::ReferentialIntegrity { entity: entity.into(), reference: reference.into() }
    }

    /// Create a provider error without an underlying source
    pub fn provider<O: Into<String>, M: Into<String>>(operation: O, message: M) -> Self {
        Self::Provider { operation: operation.into(), message: message.into(), source: None }
    }

    /// Create a provider error wrapping an underlying failure
    pub fn provider_with_source<O: Into<String>, M: Into<String>>(
        operation: O,
        message: M,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Provider {
            operation: operation.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Whether re-running the pipeline can possibly succeed without the
    /// caller changing its input. Only provider failures qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Provider { .. })
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::config(format!("Validation failed: {}", message))
    }
}
