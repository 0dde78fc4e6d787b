//! Order model
//!
//! Server-side order entity as consumed by display clients, plus the
//! request payloads for the order endpoints. The client never owns an
//! authoritative order; it only submits drafts and caches what the
//! backend returns.

use serde::{Deserialize, Serialize};

/// Order kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    /// Dine-in at a numbered table
    #[default]
    Mesa,
    /// Delivery
    Domicilio,
    /// Takeaway
    Llevar,
}

/// Order lifecycle state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    #[default]
    Pendiente,
    EnPreparacion,
    /// Delivery handed to a courier (domicilio only)
    Enviado,
    Entregado,
    Completada,
    Cancelado,
}

impl OrderState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Completada | OrderState::Cancelado)
    }

    /// Whether the state machine admits `next` from `self` for the
    /// given order kind. `Enviado` is only reachable for deliveries;
    /// any non-terminal state may be cancelled.
    pub fn can_transition_to(&self, next: OrderState, kind: OrderKind) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == OrderState::Cancelado {
            return true;
        }
        match (self, next) {
            (OrderState::Pendiente, OrderState::EnPreparacion) => true,
            (OrderState::EnPreparacion, OrderState::Enviado) => kind == OrderKind::Domicilio,
            (OrderState::EnPreparacion, OrderState::Entregado) => kind == OrderKind::Domicilio,
            (OrderState::EnPreparacion, OrderState::Completada) => kind != OrderKind::Domicilio,
            (OrderState::Enviado, OrderState::Entregado) => true,
            (OrderState::Entregado, OrderState::Completada) => true,
            _ => false,
        }
    }
}

/// One submitted cart line on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub product_name: String,
    pub variant_name: String,
    pub variant_id: String,
    /// Unit price in currency unit
    pub unit_price: f64,
    pub quantity: i32,
    /// Selected flavor names (pizza lines only, at most 3)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flavors: Vec<String>,
}

/// Order entity as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub kind: OrderKind,
    pub state: OrderState,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier_phone: Option<String>,
    pub lines: Vec<OrderLine>,
    /// Total amount in currency unit
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Invoice reference once bookkeeping has picked the order up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_ref: Option<String>,
}

/// Payload for creating an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub kind: OrderKind,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier_phone: Option<String>,
    pub lines: Vec<OrderLine>,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update payload (state changes included)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<OrderState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
