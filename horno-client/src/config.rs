//! Client configuration

use shared::message::{HandshakePayload, StationRole, PROTOCOL_VERSION};
use std::path::PathBuf;

/// Configuration for one POS station
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g. "http://localhost:8080")
    pub base_url: String,

    /// Realtime sync TCP address (e.g. "localhost:8081"); None keeps
    /// the station offline from the order-events topic
    pub sync_addr: Option<String>,

    /// Display role announced on the sync handshake
    pub role: StationRole,

    /// Station name (e.g. "caja-1")
    pub station_name: String,

    /// Directory holding the draft snapshot
    pub draft_dir: PathBuf,

    /// Trailing debounce for draft snapshots, milliseconds
    pub debounce_ms: u64,

    /// HTTP request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            sync_addr: None,
            role: StationRole::Mostrador,
            station_name: "mostrador-1".to_string(),
            draft_dir: PathBuf::from("."),
            debounce_ms: 800,
            timeout: 30,
        }
    }

    /// Set the realtime sync address
    pub fn with_sync_addr(mut self, addr: impl Into<String>) -> Self {
        self.sync_addr = Some(addr.into());
        self
    }

    /// Set the station identity
    pub fn with_station(mut self, role: StationRole, name: impl Into<String>) -> Self {
        self.role = role;
        self.station_name = name.into();
        self
    }

    /// Set the draft snapshot directory
    pub fn with_draft_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.draft_dir = dir.into();
        self
    }

    /// Set the snapshot debounce interval
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Handshake identity for the sync channel
    pub fn handshake(&self) -> HandshakePayload {
        HandshakePayload {
            version: PROTOCOL_VERSION,
            role: self.role,
            station_name: self.station_name.clone(),
            client_id: None,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
