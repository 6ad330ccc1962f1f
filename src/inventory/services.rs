use tracing::{info, warn};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    inventory::{
        dto::UpdateInventoryRequest,
        repo_types::{BloodInventory, InventoryPatch},
    },
    models::{BloodGroup, InventoryStatus},
    store::Store,
};

pub async fn list(store: &dyn Store) -> AppResult<Vec<BloodInventory>> {
    Ok(store.list_inventory().await?)
}

pub async fn update(
    store: &dyn Store,
    group: &str,
    payload: UpdateInventoryRequest,
) -> AppResult<BloodInventory> {
    let group: BloodGroup = group
        .parse()
        .map_err(|e: crate::models::ParseEnumError| AppError::Validation(e.to_string()))?;
    payload.validate()?;

    let status = payload
        .status
        .as_deref()
        .map(str::parse::<InventoryStatus>)
        .transpose()
        .map_err(|e| {
            warn!(blood_group = %group, error = %e, "rejected inventory status");
            AppError::Validation("Status must be one of available, low, urgent".into())
        })?;

    let row = store
        .upsert_inventory(
            group,
            InventoryPatch {
                units_available: payload.units_available,
                status,
            },
        )
        .await?;
    info!(blood_group = %group, units = row.units_available, status = %row.status, "inventory updated");
    Ok(row)
}

/// Gives every blood group a row, so the public board always lists all eight.
pub async fn initialize(store: &dyn Store) -> anyhow::Result<()> {
    let created = store.ensure_inventory_rows().await?;
    if created > 0 {
        info!(created, "blood inventory initialized");
    }
    Ok(())
}
