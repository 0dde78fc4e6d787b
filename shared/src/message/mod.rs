//! Realtime message protocol
//!
//! Frame and payload types shared by the order-events topic server and
//! every connected display client. The channel is read-only
//! notification infrastructure: it carries refresh signals and the
//! out-of-band attention signal, never order writes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// Protocol version carried in the handshake
pub const PROTOCOL_VERSION: u16 = 1;

/// Topic the order-intake and display clients subscribe to
pub const ORDERS_TOPIC: &str = "orders";

/// Frame type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Client -> server identity announcement
    Handshake = 0,
    /// Server -> clients: an order was created or updated, re-fetch
    Sync = 1,
    /// Server -> clients: a human needs to look at something
    Attention = 2,
}

/// A frame carried an event type byte outside the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type {0}")]
pub struct UnknownEventType(pub u8);

impl TryFrom<u8> for EventType {
    type Error = UnknownEventType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EventType::Handshake),
            1 => Ok(EventType::Sync),
            2 => Ok(EventType::Attention),
            other => Err(UnknownEventType(other)),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Handshake => write!(f, "handshake"),
            EventType::Sync => write!(f, "sync"),
            EventType::Attention => write!(f, "attention"),
        }
    }
}

/// One frame on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub id: Uuid,
    pub event_type: EventType,
    pub payload: Vec<u8>,
}

impl WireMessage {
    pub fn new(event_type: EventType, payload: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            payload,
        }
    }

    /// Build a handshake frame
    pub fn handshake(payload: &HandshakePayload) -> Result<Self, serde_json::Error> {
        Ok(Self::new(EventType::Handshake, serde_json::to_vec(payload)?))
    }

    /// Build a sync frame
    pub fn sync(payload: &SyncPayload) -> Result<Self, serde_json::Error> {
        Ok(Self::new(EventType::Sync, serde_json::to_vec(payload)?))
    }

    /// Build an attention frame
    pub fn attention(payload: &AttentionPayload) -> Result<Self, serde_json::Error> {
        Ok(Self::new(EventType::Attention, serde_json::to_vec(payload)?))
    }

    /// Parse the payload as a typed value
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_round_trips_through_u8() {
        for ty in [EventType::Handshake, EventType::Sync, EventType::Attention] {
            assert_eq!(EventType::try_from(ty as u8), Ok(ty));
        }
        assert!(EventType::try_from(9).is_err());
    }

    #[test]
    fn handshake_frame_carries_identity() {
        let payload = HandshakePayload {
            version: PROTOCOL_VERSION,
            role: StationRole::Caja,
            station_name: "caja-1".to_string(),
            client_id: None,
        };

        let msg = WireMessage::handshake(&payload).unwrap();
        assert_eq!(msg.event_type, EventType::Handshake);
        assert!(!msg.id.is_nil());

        let parsed: HandshakePayload = msg.parse_payload().unwrap();
        assert_eq!(parsed.role, StationRole::Caja);
        assert_eq!(parsed.version, PROTOCOL_VERSION);
    }

    #[test]
    fn sync_frame_round_trip() {
        let payload = SyncPayload::created("order-42");
        let msg = WireMessage::sync(&payload).unwrap();
        let parsed: SyncPayload = msg.parse_payload().unwrap();
        assert_eq!(parsed.action, SyncAction::Created);
        assert_eq!(parsed.id, "order-42");
        assert_eq!(parsed.resource, "order");
    }
}
