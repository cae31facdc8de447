//! Material catalog operations: create, update, delete.
//!
//! Unit prices are derived here and only here. Deleting a material cascades
//! into the product configuration: every reference row pointing at the
//! deleted id is removed in the same step, so the catalog and the product
//! never hold a dangling reference for longer than a single mutation.
//! (The engine still tolerates stale ids: they price at 0.)

use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Material, ProductConfig};

/// User-supplied fields for creating or updating a material.
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialInput {
    #[serde(default)]
    pub sku: Option<String>,
    pub name: String,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub qty: f64,
    #[serde(default)]
    pub unit: String,
}

/// Derive a unit price from a batch purchase. A non-positive quantity (or a
/// non-finite input) yields 0 rather than a division error.
pub fn derive_unit_price(total_cost: f64, qty: f64) -> f64 {
    if !total_cost.is_finite() || !qty.is_finite() || qty <= 0.0 {
        return 0.0;
    }
    total_cost / qty
}

/// Add a material to the catalog. The human dedup key is the name,
/// case-insensitively.
pub fn create_material(
    materials: &mut Vec<Material>,
    input: MaterialInput,
) -> Result<Material, AppError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("material name cannot be empty".to_string()));
    }
    if find_by_name(materials, &name, None).is_some() {
        return Err(AppError::DuplicateMaterial(format!(
            "a material named '{}' already exists",
            name
        )));
    }

    let material = Material {
        id: Uuid::new_v4(),
        sku: input.sku,
        name,
        supplier: input.supplier,
        total_cost: input.total_cost,
        qty: input.qty,
        unit: input.unit,
        unit_price: derive_unit_price(input.total_cost, input.qty),
    };
    materials.push(material.clone());
    Ok(material)
}

/// Update an existing material, re-deriving its unit price. The uniqueness
/// check excludes the material being updated.
pub fn update_material(
    materials: &mut [Material],
    id: Uuid,
    input: MaterialInput,
) -> Result<Material, AppError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("material name cannot be empty".to_string()));
    }
    if find_by_name(materials, &name, Some(id)).is_some() {
        return Err(AppError::DuplicateMaterial(format!(
            "a material named '{}' already exists",
            name
        )));
    }

    let material = materials
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or_else(|| AppError::MaterialNotFound(id.to_string()))?;

    material.sku = input.sku;
    material.name = name;
    material.supplier = input.supplier;
    material.total_cost = input.total_cost;
    material.qty = input.qty;
    material.unit = input.unit;
    material.unit_price = derive_unit_price(input.total_cost, input.qty);

    Ok(material.clone())
}

/// Remove a material and cascade: every reference row in the product
/// configuration pointing at it is removed as part of the same mutation.
pub fn delete_material(
    materials: &mut Vec<Material>,
    product: &mut ProductConfig,
    id: Uuid,
) -> Result<(), AppError> {
    let before = materials.len();
    materials.retain(|m| m.id != id);
    if materials.len() == before {
        return Err(AppError::MaterialNotFound(id.to_string()));
    }

    product.material_rows.retain(|r| r.material_id != Some(id));
    product.packaging_rows.retain(|r| r.material_id != Some(id));
    Ok(())
}

fn find_by_name<'a>(
    materials: &'a [Material],
    name: &str,
    exclude: Option<Uuid>,
) -> Option<&'a Material> {
    let lowered = name.to_lowercase();
    materials
        .iter()
        .find(|m| Some(m.id) != exclude && m.name.to_lowercase() == lowered)
}
