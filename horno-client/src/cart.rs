//! Cart aggregation and the order draft
//!
//! The draft is an explicit value owned by exactly one
//! [`crate::draft::DraftSession`]; nothing reaches it through ambient
//! state. All cart operations are synchronous, mutate only the owning
//! draft, and never touch the network.

use crate::pricing::{to_decimal, to_f64};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{OrderKind, OrderLine};
use uuid::Uuid;

/// Maximum flavors on one pizza line
pub const MAX_FLAVORS: usize = 3;

/// One cart entry, possibly covering several units of the same plain
/// or customized product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Client-generated, unique within the draft
    pub id: Uuid,
    pub product_name: String,
    pub variant_name: String,
    pub variant_id: String,
    /// Unit price in currency unit, already resolved by the caller
    pub unit_price: f64,
    pub quantity: i32,
    /// Selected flavor names, pizza lines only. At most 3, unique,
    /// order preserved.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flavors: Vec<String>,
}

impl CartLine {
    pub fn line_total(&self) -> f64 {
        to_f64(to_decimal(self.unit_price) * Decimal::from(self.quantity))
    }

    fn is_plain(&self) -> bool {
        self.flavors.is_empty()
    }

    fn to_order_line(&self) -> OrderLine {
        OrderLine {
            product_name: self.product_name.clone(),
            variant_name: self.variant_name.clone(),
            variant_id: self.variant_id.clone(),
            unit_price: self.unit_price,
            quantity: self.quantity,
            flavors: self.flavors.clone(),
        }
    }
}

/// Input for adding a line (the id is generated on insert)
#[derive(Debug, Clone)]
pub struct NewLine {
    pub product_name: String,
    pub variant_name: String,
    pub variant_id: String,
    pub unit_price: f64,
    pub flavors: Vec<String>,
}

/// The in-progress cart
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Add a product to the cart.
    ///
    /// A plain (unflavored) addition merges into an existing plain
    /// line with the same variant id by bumping its quantity. A
    /// flavored addition always appends a fresh line, even when an
    /// existing line carries the identical flavor set, so every
    /// customization stays independently adjustable.
    ///
    /// Returns the id of the affected line.
    pub fn add_line(&mut self, new: NewLine) -> Uuid {
        let flavors = normalize_flavors(new.flavors);
        if flavors.is_empty() {
            if let Some(existing) = self
                .lines
                .iter_mut()
                .find(|l| l.is_plain() && l.variant_id == new.variant_id)
            {
                if existing.unit_price != new.unit_price {
                    // Merge identity is variant-only; a price drift
                    // (e.g. promo changed mid-order) keeps the stored
                    // price. Traced so the case stays observable.
                    tracing::debug!(
                        variant_id = %new.variant_id,
                        stored = existing.unit_price,
                        incoming = new.unit_price,
                        "merging plain line with differing unit price"
                    );
                }
                existing.quantity += 1;
                return existing.id;
            }
        }

        let line = CartLine {
            id: Uuid::new_v4(),
            product_name: new.product_name,
            variant_name: new.variant_name,
            variant_id: new.variant_id,
            unit_price: new.unit_price,
            quantity: 1,
            flavors,
        };
        let id = line.id;
        self.lines.push(line);
        id
    }

    /// Drop a line. No error if absent.
    pub fn remove_line(&mut self, id: Uuid) {
        self.lines.retain(|l| l.id != id);
    }

    /// Set a line's quantity, clamped to a minimum of 1. Removing a
    /// line is only done through [`Cart::remove_line`].
    pub fn set_quantity(&mut self, id: Uuid, quantity: i32) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.id == id) {
            line.quantity = quantity.max(1);
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of unit price times quantity over all lines
    pub fn subtotal(&self) -> f64 {
        let sum = self
            .lines
            .iter()
            .map(|l| to_decimal(l.unit_price) * Decimal::from(l.quantity))
            .sum::<Decimal>();
        to_f64(sum)
    }

    /// Subtotal plus the delivery fee, fee floored at zero
    pub fn total(&self, delivery_fee: f64) -> f64 {
        let fee = to_decimal(delivery_fee).max(Decimal::ZERO);
        to_f64(to_decimal(self.subtotal()) + fee)
    }

    pub fn to_order_lines(&self) -> Vec<OrderLine> {
        self.lines.iter().map(CartLine::to_order_line).collect()
    }
}

/// Dedupe preserving selection order and cap at [`MAX_FLAVORS`].
fn normalize_flavors(flavors: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(flavors.len().min(MAX_FLAVORS));
    for flavor in flavors {
        if seen.len() == MAX_FLAVORS {
            break;
        }
        if !seen.contains(&flavor) {
            seen.push(flavor);
        }
    }
    seen
}

/// Delivery address selection: a saved address of a known customer or
/// a freshly typed one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum AddressSelection {
    #[default]
    None,
    Saved {
        id: String,
        address: String,
    },
    New {
        address: String,
    },
}

impl AddressSelection {
    /// The address text, whichever way it was chosen
    pub fn resolved(&self) -> Option<&str> {
        match self {
            AddressSelection::None => None,
            AddressSelection::Saved { address, .. } | AddressSelection::New { address } => {
                let trimmed = address.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
        }
    }
}

/// The in-progress, not-yet-submitted order of one client session
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderDraft {
    #[serde(default)]
    pub kind: OrderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<String>,
    #[serde(default)]
    pub address: AddressSelection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_fee: Option<f64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub cart: Cart,
}

impl OrderDraft {
    pub fn total(&self) -> f64 {
        self.cart.total(self.delivery_fee.unwrap_or(0.0))
    }

    /// Clear the draft for the next order. Kind and payment method are
    /// kept so the operator does not re-pick them between orders.
    pub fn reset_after_submit(&mut self) {
        let kind = self.kind;
        let payment_method = self.payment_method.take();
        *self = OrderDraft {
            kind,
            payment_method,
            ..OrderDraft::default()
        };
    }
}
