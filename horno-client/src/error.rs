//! Client error types
//!
//! The taxonomy splits along where an error is resolved: validation
//! errors never leave the client, submission errors are translated at
//! the submission boundary and shown once, channel errors are absorbed
//! by the reconnect loop and only drive the connectivity indicator.

use thiserror::Error;

/// A draft failed one of the order-type rules. Checked in a fixed
/// order; the first violated rule wins. Display strings are the
/// user-facing messages.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Ingrese el número de mesa")]
    TableRequired,
    #[error("Ingrese el nombre del cliente")]
    CustomerNameRequired,
    #[error("Ingrese la dirección de entrega")]
    DeliveryAddressRequired,
    #[error("El pedido no tiene productos")]
    EmptyCart,
}

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Draft failed a validation rule; never reaches the network
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Request sent, no response
    #[error("Sin conexión con el servidor, verifique la red")]
    NetworkUnreachable,

    /// 400-class rejection, with server-provided detail when available
    #[error("Datos inválidos: {0}")]
    InvalidData(String),

    /// 404-class rejection
    #[error("Servicio no encontrado, verifique que el backend esté disponible")]
    ServiceNotFound,

    /// 500-class rejection
    #[error("Error del servidor, intente nuevamente")]
    ServerError,

    /// Any other rejection, with the status echoed
    #[error("Solicitud rechazada (HTTP {status})")]
    Rejected { status: u16 },

    /// A submission is already in flight for this draft
    #[error("Ya hay un envío en curso")]
    SubmissionInFlight,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Draft snapshot I/O error
    #[error("Draft persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    /// The sync channel was torn down while a subscriber waited on it
    #[error("Sync channel closed")]
    ChannelClosed,

    /// Transport-level failure outside the status-code taxonomy
    #[error("Connection error: {0}")]
    Connection(String),
}

impl ClientError {
    /// Whether this error left the draft untouched and a retry without
    /// re-entering data makes sense.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::NetworkUnreachable
                | ClientError::ServerError
                | ClientError::Connection(_)
        )
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
