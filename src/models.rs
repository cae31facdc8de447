use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A purchasable input with a derived per-unit price.
///
/// `unit_price` is always derived from `total_cost` and `qty` at create or
/// update time (see `catalog::derive_unit_price`); it is never edited on its
/// own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    /// Total paid for the purchased batch
    pub total_cost: f64,
    /// Quantity purchased in that batch
    pub qty: f64,
    /// Unit of measurement (free-text label, e.g. "g", "m", "pcs")
    pub unit: String,
    /// Derived: total_cost / qty, or 0 when qty <= 0
    pub unit_price: f64,
}

/// A cost row referencing a catalog material (used for both the materials
/// and packaging buckets). `material_id` is `None` while the user has not
/// picked a material yet; it may also point at a material that has since
/// been deleted, in which case the row contributes zero cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRow {
    pub id: Uuid,
    #[serde(default)]
    pub material_id: Option<Uuid>,
    #[serde(default)]
    pub qty: f64,
}

impl MaterialRow {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            material_id: None,
            qty: 0.0,
        }
    }
}

impl Default for MaterialRow {
    fn default() -> Self {
        Self::new()
    }
}

/// A labor cost row. All labor rows share the product's single hourly rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborRow {
    pub id: Uuid,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub hours: f64,
}

impl LaborRow {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            task: String::new(),
            hours: 0.0,
        }
    }
}

impl Default for LaborRow {
    fn default() -> Self {
        Self::new()
    }
}

/// A standalone fee row with a row-local unit price (not catalog-derived).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeRow {
    pub id: Uuid,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub qty: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub unit_price: f64,
}

impl FeeRow {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            label: String::new(),
            qty: 0.0,
            unit: String::new(),
            unit_price: 0.0,
        }
    }
}

impl Default for FeeRow {
    fn default() -> Self {
        Self::new()
    }
}

/// Which reference-row bucket a material row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPurpose {
    Materials,
    Packaging,
}

/// Pricing strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMode {
    /// Derive the final price from a target profit percentage of that price
    Margin,
    /// Take the final price as direct input and derive the resulting margin
    Price,
}

/// Full product configuration: cost rows plus the pricing strategy.
/// Row order is insertion order (display-significant only; the engine's
/// totals are order-independent sums).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductConfig {
    pub name: String,
    /// One hourly rate applied to every labor row; no per-row override
    pub hourly_rate: f64,
    pub material_rows: Vec<MaterialRow>,
    pub packaging_rows: Vec<MaterialRow>,
    pub labor_rows: Vec<LaborRow>,
    pub fee_rows: Vec<FeeRow>,
    pub mode: CalculationMode,
    pub target_margin: f64,
    pub target_price: f64,
    pub discount: f64,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            hourly_rate: 0.0,
            material_rows: Vec::new(),
            packaging_rows: Vec::new(),
            labor_rows: Vec::new(),
            fee_rows: Vec::new(),
            mode: CalculationMode::Margin,
            target_margin: 50.0,
            target_price: 0.0,
            discount: 0.0,
        }
    }
}

/// Engine output: the full derived cost breakdown and price figures.
/// Fully derived, recomputed from scratch on every call; no identity or
/// lifecycle of its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculatedPricing {
    pub material_cost: f64,
    pub packaging_cost: f64,
    pub labor_cost: f64,
    pub fees_cost: f64,
    /// Sum of the four cost buckets
    pub base_cost: f64,
    /// Pre-discount price
    pub final_price: f64,
    /// Target margin in margin mode; computed backward in price mode
    pub margin: f64,
    /// Price actually charged after the discount
    pub discounted_price: f64,
    /// discounted_price - base_cost; negative means a loss
    pub profit: f64,
}
