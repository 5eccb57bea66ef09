//! Ports and Adapters Infrastructure
//!
//! Domains describe the external systems they depend on as port traits
//! extending [`DomainPort`]. Adapters implement those traits; every adapter
//! reports failures through the shared [`PortError`] type.
//!
//! ```text
//!   BillingService ──► FundsTransferPort ──► InMemoryTransferGateway
//!                                       └──► (payment rail adapter)
//! ```

use thiserror::Error;

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// The external system refused the request
    #[error("Rejected: {message}")]
    Rejected {
        message: String,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// The external system is unavailable
    #[error("Service unavailable: {service}")]
    ServiceUnavailable {
        service: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a Rejected error
    pub fn rejected(message: impl Into<String>) -> Self {
        PortError::Rejected {
            message: message.into(),
        }
    }

    /// Creates an Internal error wrapping an adapter failure
    pub fn internal(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PortError::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Timeout { .. } | PortError::ServiceUnavailable { .. }
        )
    }
}

/// Marker trait for all domain ports
///
/// Ports are shared between request handlers, so every implementation must
/// be thread-safe.
pub trait DomainPort: Send + Sync + 'static {}
