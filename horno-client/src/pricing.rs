//! Flavor pricing engine
//!
//! Pure unit-price computation for a cart line: base variant price,
//! plus the single priciest especial surcharge among the selected
//! flavors, plus the flat 3-flavor fee when three flavors are chosen.
//!
//! Uses rust_decimal for the arithmetic; f64 at the edges.

use rust_decimal::prelude::*;
use shared::models::{FlavorCatalog, FlavorKind};

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Number of flavors that triggers the flat surcharge
const TRIPLE_FLAVOR_THRESHOLD: usize = 3;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Compute the unit price for a variant with the given flavor
/// selection.
///
/// # Calculation Steps
/// 1. Start from the variant base price.
/// 2. Among selected flavors whose catalog kind is especial, take the
///    **maximum** per-size surcharge. Only the priciest one applies,
///    once per line; tradicional flavors and names missing from the
///    catalog contribute nothing.
/// 3. If three or more flavors are selected, add the catalog's flat
///    `RECARGO_3_SABORES` fee for the size (fallback constant when
///    the catalog does not configure it).
///
/// Deterministic and side-effect free.
pub fn unit_price(
    base_price: f64,
    size: &str,
    flavor_names: &[String],
    catalog: &FlavorCatalog,
) -> f64 {
    let mut price = to_decimal(base_price);

    let especial_max = flavor_names
        .iter()
        .filter_map(|name| catalog.get(name))
        .filter(|flavor| flavor.kind == FlavorKind::Especial)
        .map(|flavor| to_decimal(flavor.surcharge_for(size)))
        .max()
        .unwrap_or(Decimal::ZERO);
    price += especial_max;

    if flavor_names.len() >= TRIPLE_FLAVOR_THRESHOLD {
        price += to_decimal(catalog.triple_surcharge(size));
    }

    to_f64(price)
}
