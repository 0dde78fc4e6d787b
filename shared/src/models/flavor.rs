//! Flavor catalog
//!
//! Read-only catalog of pizza flavors fetched from the backend. Each
//! entry carries per-size surcharges; a special `configuracion` entry
//! named `RECARGO_3_SABORES` holds the flat fee applied when three
//! flavors are chosen on one pizza.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Catalog key of the configuracion entry carrying the 3-flavor fee.
pub const TRIPLE_SURCHARGE_KEY: &str = "RECARGO_3_SABORES";

/// Flat 3-flavor fee used when the catalog has no
/// `RECARGO_3_SABORES` entry for the requested size.
pub const DEFAULT_TRIPLE_SURCHARGE: f64 = 3000.0;

/// Flavor classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlavorKind {
    /// No surcharge
    #[default]
    Tradicional,
    /// Carries a per-size surcharge
    Especial,
    /// Non-flavor entry holding a pricing constant
    Configuracion,
}

/// Catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flavor {
    pub id: String,
    pub name: String,
    pub kind: FlavorKind,
    /// Surcharge per variant size name (e.g. "personal", "mediana", "grande")
    #[serde(default)]
    pub surcharges: HashMap<String, f64>,
}

impl Flavor {
    /// Surcharge for a size, coerced to a usable number.
    ///
    /// Missing sizes and non-finite values count as zero.
    pub fn surcharge_for(&self, size: &str) -> f64 {
        match self.surcharges.get(size) {
            Some(v) if v.is_finite() => *v,
            _ => 0.0,
        }
    }
}

/// Read-only flavor catalog keyed by flavor name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlavorCatalog {
    flavors: HashMap<String, Flavor>,
}

impl FlavorCatalog {
    pub fn new(entries: Vec<Flavor>) -> Self {
        let flavors = entries.into_iter().map(|f| (f.name.clone(), f)).collect();
        Self { flavors }
    }

    pub fn get(&self, name: &str) -> Option<&Flavor> {
        self.flavors.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.flavors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.flavors.len()
    }

    /// Flat fee applied when a line carries three flavors.
    ///
    /// Reads the `RECARGO_3_SABORES` configuracion entry; falls back to
    /// [`DEFAULT_TRIPLE_SURCHARGE`] when the entry or size is absent.
    pub fn triple_surcharge(&self, size: &str) -> f64 {
        match self.flavors.get(TRIPLE_SURCHARGE_KEY) {
            Some(entry) => {
                let fee = entry.surcharge_for(size);
                if fee > 0.0 {
                    fee
                } else {
                    DEFAULT_TRIPLE_SURCHARGE
                }
            }
            None => DEFAULT_TRIPLE_SURCHARGE,
        }
    }
}
