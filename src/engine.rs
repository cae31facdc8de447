//! The pricing engine: a pure, total function from a product configuration
//! and a material catalog to a full cost breakdown and price figures.
//!
//! The engine has no error channel. Every degenerate input (unresolved
//! material reference, zero target price, 100%+ margin, non-finite numbers
//! from a malformed snapshot) maps to a defined numeric fallback, so callers
//! always get a renderable number mid-edit.

use crate::models::{CalculatedPricing, CalculationMode, Material, MaterialRow, ProductConfig};

/// Normalize a possibly malformed number: anything non-finite becomes 0.
fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Resolve a reference row's unit price against the catalog.
/// An unselected (`None`) or stale material id contributes 0.
fn resolved_unit_price(row: &MaterialRow, materials: &[Material]) -> f64 {
    row.material_id
        .and_then(|id| materials.iter().find(|m| m.id == id))
        .map(|m| sanitize(m.unit_price))
        .unwrap_or(0.0)
}

/// Sum one reference-row bucket (materials or packaging).
/// The `+ 0.0` keeps empty buckets at positive zero: the empty float sum is
/// -0.0, which would otherwise render as "-0.00".
fn reference_cost(rows: &[MaterialRow], materials: &[Material]) -> f64 {
    rows.iter()
        .map(|row| resolved_unit_price(row, materials) * sanitize(row.qty))
        .sum::<f64>()
        + 0.0
}

/// Compute the full pricing breakdown for a product against a material
/// catalog. Pure and deterministic: identical inputs yield bit-identical
/// output, and row order within each list never affects the result.
pub fn compute_pricing(product: &ProductConfig, materials: &[Material]) -> CalculatedPricing {
    let material_cost = reference_cost(&product.material_rows, materials);
    let packaging_cost = reference_cost(&product.packaging_rows, materials);

    let hourly_rate = sanitize(product.hourly_rate);
    let labor_cost: f64 = product
        .labor_rows
        .iter()
        .map(|row| sanitize(row.hours) * hourly_rate)
        .sum::<f64>()
        + 0.0;

    let fees_cost: f64 = product
        .fee_rows
        .iter()
        .map(|row| sanitize(row.qty) * sanitize(row.unit_price))
        .sum::<f64>()
        + 0.0;

    let base_cost = material_cost + packaging_cost + labor_cost + fees_cost;

    let (final_price, margin) = match product.mode {
        CalculationMode::Margin => {
            // The target margin is a percentage of the final price that is
            // profit, not a markup over cost. A margin of 100% or more would
            // imply an infinite or negative price; fall back to base cost.
            let target_margin = sanitize(product.target_margin);
            let m = target_margin / 100.0;
            let final_price = if m < 1.0 {
                base_cost / (1.0 - m)
            } else {
                base_cost
            };
            (final_price, target_margin)
        }
        CalculationMode::Price => {
            // Price is user-supplied; the margin is computed backward and
            // may be negative when cost exceeds price.
            let final_price = sanitize(product.target_price);
            let margin = if final_price > 0.0 {
                (final_price - base_cost) / final_price * 100.0
            } else {
                0.0
            };
            (final_price, margin)
        }
    };

    // Discount is intentionally unclamped: a discount above 100% yields a
    // negative discounted price, which is an accepted degenerate state.
    let discounted_price = final_price * (1.0 - sanitize(product.discount) / 100.0);
    let profit = discounted_price - base_cost;

    CalculatedPricing {
        material_cost,
        packaging_cost,
        labor_cost,
        fees_cost,
        base_cost,
        final_price,
        margin,
        discounted_price,
        profit,
    }
}
