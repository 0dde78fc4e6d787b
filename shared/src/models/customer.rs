//! Customer model (consumed read-only)
//!
//! Looked up by phone when taking a delivery order so a returning
//! customer's saved addresses can be offered instead of retyping.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerAddress {
    pub id: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub addresses: Vec<CustomerAddress>,
}
