//! Shared editing state: the material catalog and the product configuration
//! behind one lock, plus the typed mutation API.
//!
//! Pricing is never cached: every read recomputes from the current snapshot
//! through the pure engine, so redundant recomputation is always safe.
//! Mutations are applied under the write lock (the material-delete cascade
//! happens atomically with the delete) and followed by a snapshot write
//! whose failure is logged and swallowed.

use serde::Deserialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::catalog::{self, MaterialInput};
use crate::engine::compute_pricing;
use crate::error::AppError;
use crate::models::{
    CalculatedPricing, CalculationMode, FeeRow, LaborRow, Material, MaterialRow, ProductConfig,
    RowPurpose,
};
use crate::store::{Store, MATERIALS_KEY, PRODUCT_KEY};

/// One typed operation against the product configuration.
///
/// Replaces name-keyed generic field updates with an explicit variant per
/// logical field group and row operation, keeping the mutation surface
/// statically checked.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ProductUpdate {
    SetName { name: String },
    SetHourlyRate { rate: f64 },
    SetMode { mode: CalculationMode },
    SetTargetMargin { margin: f64 },
    SetTargetPrice { price: f64 },
    SetDiscount { discount: f64 },
    AddMaterialRow { purpose: RowPurpose },
    UpdateMaterialRow {
        purpose: RowPurpose,
        id: Uuid,
        material_id: Option<Uuid>,
        qty: f64,
    },
    RemoveMaterialRow { purpose: RowPurpose, id: Uuid },
    AddLaborRow,
    UpdateLaborRow { id: Uuid, task: String, hours: f64 },
    RemoveLaborRow { id: Uuid },
    AddFeeRow,
    UpdateFeeRow {
        id: Uuid,
        label: String,
        qty: f64,
        unit: String,
        unit_price: f64,
    },
    RemoveFeeRow { id: Uuid },
}

struct WorkspaceState {
    materials: Vec<Material>,
    product: ProductConfig,
}

pub struct Workspace {
    state: RwLock<WorkspaceState>,
    store: Store,
}

impl Workspace {
    /// Load the latest snapshots from the store into memory.
    pub async fn load(store: Store) -> Self {
        let materials = store.load_materials().await;
        let product = store.load_product().await;
        tracing::info!(
            materials = materials.len(),
            product = %product.name,
            "Workspace loaded from snapshots"
        );
        Self {
            state: RwLock::new(WorkspaceState { materials, product }),
            store,
        }
    }

    /// Current catalog.
    pub async fn materials(&self) -> Vec<Material> {
        self.state.read().await.materials.clone()
    }

    /// Current product configuration.
    pub async fn product(&self) -> ProductConfig {
        self.state.read().await.product.clone()
    }

    /// Recompute pricing from the current snapshot.
    pub async fn pricing(&self) -> CalculatedPricing {
        let state = self.state.read().await;
        compute_pricing(&state.product, &state.materials)
    }

    /// Consistent snapshot of everything the advice prompt needs.
    pub async fn advice_snapshot(&self) -> (ProductConfig, CalculatedPricing) {
        let state = self.state.read().await;
        let pricing = compute_pricing(&state.product, &state.materials);
        (state.product.clone(), pricing)
    }

    pub async fn create_material(&self, input: MaterialInput) -> Result<Material, AppError> {
        let mut state = self.state.write().await;
        let created = catalog::create_material(&mut state.materials, input)?;
        self.persist_materials(&state).await;
        Ok(created)
    }

    pub async fn update_material(
        &self,
        id: Uuid,
        input: MaterialInput,
    ) -> Result<Material, AppError> {
        let mut state = self.state.write().await;
        let updated = catalog::update_material(&mut state.materials, id, input)?;
        self.persist_materials(&state).await;
        Ok(updated)
    }

    /// Delete a material; the cascade into the product's reference rows
    /// happens in the same critical section.
    pub async fn delete_material(&self, id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let WorkspaceState { materials, product } = &mut *state;
        catalog::delete_material(materials, product, id)?;
        self.persist_materials(&state).await;
        self.persist_product(&state).await;
        Ok(())
    }

    /// Apply one typed product mutation and return the updated configuration.
    pub async fn update_product(&self, update: ProductUpdate) -> Result<ProductConfig, AppError> {
        let mut state = self.state.write().await;
        apply_update(&mut state.product, update)?;
        self.persist_product(&state).await;
        Ok(state.product.clone())
    }

    async fn persist_materials(&self, state: &WorkspaceState) {
        if let Err(e) = self.store.save(MATERIALS_KEY, &state.materials).await {
            tracing::warn!(error = %e, "Failed to persist materials snapshot");
        }
    }

    async fn persist_product(&self, state: &WorkspaceState) {
        if let Err(e) = self.store.save(PRODUCT_KEY, &state.product).await {
            tracing::warn!(error = %e, "Failed to persist product snapshot");
        }
    }
}

fn reference_rows<'a>(product: &'a mut ProductConfig, purpose: RowPurpose) -> &'a mut Vec<MaterialRow> {
    match purpose {
        RowPurpose::Materials => &mut product.material_rows,
        RowPurpose::Packaging => &mut product.packaging_rows,
    }
}

/// Apply one mutation to the product configuration.
///
/// Removing a row that no longer exists is a no-op (deletes are idempotent;
/// the client may retry). Updating an unknown row is an error, since it
/// means the client is editing state the server never had.
fn apply_update(product: &mut ProductConfig, update: ProductUpdate) -> Result<(), AppError> {
    match update {
        ProductUpdate::SetName { name } => product.name = name,
        ProductUpdate::SetHourlyRate { rate } => product.hourly_rate = rate,
        ProductUpdate::SetMode { mode } => product.mode = mode,
        ProductUpdate::SetTargetMargin { margin } => product.target_margin = margin,
        ProductUpdate::SetTargetPrice { price } => product.target_price = price,
        ProductUpdate::SetDiscount { discount } => product.discount = discount,

        ProductUpdate::AddMaterialRow { purpose } => {
            reference_rows(product, purpose).push(MaterialRow::new());
        }
        ProductUpdate::UpdateMaterialRow {
            purpose,
            id,
            material_id,
            qty,
        } => {
            let row = reference_rows(product, purpose)
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| AppError::RowNotFound(id.to_string()))?;
            row.material_id = material_id;
            row.qty = qty;
        }
        ProductUpdate::RemoveMaterialRow { purpose, id } => {
            reference_rows(product, purpose).retain(|r| r.id != id);
        }

        ProductUpdate::AddLaborRow => product.labor_rows.push(LaborRow::new()),
        ProductUpdate::UpdateLaborRow { id, task, hours } => {
            let row = product
                .labor_rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| AppError::RowNotFound(id.to_string()))?;
            row.task = task;
            row.hours = hours;
        }
        ProductUpdate::RemoveLaborRow { id } => {
            product.labor_rows.retain(|r| r.id != id);
        }

        ProductUpdate::AddFeeRow => product.fee_rows.push(FeeRow::new()),
        ProductUpdate::UpdateFeeRow {
            id,
            label,
            qty,
            unit,
            unit_price,
        } => {
            let row = product
                .fee_rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| AppError::RowNotFound(id.to_string()))?;
            row.label = label;
            row.qty = qty;
            row.unit = unit;
            row.unit_price = unit_price;
        }
        ProductUpdate::RemoveFeeRow { id } => {
            product.fee_rows.retain(|r| r.id != id);
        }
    }
    Ok(())
}
