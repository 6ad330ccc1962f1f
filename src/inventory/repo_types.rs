use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{BloodGroup, InventoryStatus};

/// One row per blood group.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BloodInventory {
    pub id: Uuid,
    pub blood_group: BloodGroup,
    pub units_available: i32,
    pub status: InventoryStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

/// Partial update; `None` leaves the column untouched (or defaulted on insert).
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryPatch {
    pub units_available: Option<i32>,
    pub status: Option<InventoryStatus>,
}
