//! Shared types for the HORNO point-of-sale
//!
//! Domain models and the realtime message protocol used by both the
//! order-intake client and any display client (cashier, kitchen).

pub mod message;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Message protocol re-exports (for convenient access)
pub use message::{EventType, WireMessage};
