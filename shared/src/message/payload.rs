use serde::{Deserialize, Serialize};
use std::fmt;

// ==================== Station Identity ====================

/// Display role announced in the handshake so the server can route
/// role-specific signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationRole {
    /// Cashier station
    Caja,
    /// Kitchen display
    Cocina,
    /// Order-intake counter
    Mostrador,
}

impl fmt::Display for StationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Caja => write!(f, "caja"),
            Self::Cocina => write!(f, "cocina"),
            Self::Mostrador => write!(f, "mostrador"),
        }
    }
}

/// Handshake payload (client -> server)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakePayload {
    /// Protocol version
    pub version: u16,
    /// Display role of this station
    pub role: StationRole,
    /// Human-readable station name (e.g. "caja-1")
    pub station_name: String,
    /// Client identifier, None lets the server assign one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

// ==================== Sync Signal ====================

/// Change kind on the order resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Created,
    Updated,
}

/// Sync payload (server -> all clients)
///
/// The signal carries only the resource identity, never a diff:
/// receivers invalidate and re-pull the current server state, so a
/// refresh triggered by signal N also reflects everything the server
/// applied before N.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Resource type, currently always "order"
    pub resource: String,
    /// Change kind
    pub action: SyncAction,
    /// Resource id
    pub id: String,
}

impl SyncPayload {
    pub fn created(id: impl Into<String>) -> Self {
        Self {
            resource: "order".to_string(),
            action: SyncAction::Created,
            id: id.into(),
        }
    }

    pub fn updated(id: impl Into<String>) -> Self {
        Self {
            resource: "order".to_string(),
            action: SyncAction::Updated,
            id: id.into(),
        }
    }
}

// ==================== Attention Signal ====================

/// Attention payload (server -> all clients)
///
/// An external channel hand-off needs a human. Must surface as a
/// persistent high-visibility notification, distinct from refresh
/// signals, even when no order refresh follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionPayload {
    /// Originating channel (e.g. "whatsapp")
    pub source: String,
    /// Message to show the operator
    pub message: String,
}
