//! Courier model (consumed read-only)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Courier {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub active: bool,
}
