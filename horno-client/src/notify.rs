//! Delivery hand-off notification
//!
//! When a delivery order is accepted and a courier is assigned, one
//! ticket goes out through an external messaging collaborator.
//! Fire-and-forget: a failed notification is logged and never blocks
//! order completion.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Itemized line on the hand-off ticket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandoffItem {
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
}

/// Everything the courier-coordination channel needs for one delivery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandoffTicket {
    pub order_id: String,
    pub customer_name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    pub courier_phone: String,
    pub items: Vec<HandoffItem>,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

#[derive(Debug, Error)]
#[error("delivery notification failed: {0}")]
pub struct NotifyError(pub String);

/// External messaging collaborator
#[async_trait]
pub trait DeliveryNotifier: Send + Sync {
    async fn notify(&self, ticket: &HandoffTicket) -> Result<(), NotifyError>;
}
