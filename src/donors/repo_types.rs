use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{ApprovalStatus, BloodGroup};

/// Donor record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub blood_group: BloodGroup,
    pub city: String,
    pub batch: Option<String>,
    pub whatsapp_number: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_donation_date: Option<OffsetDateTime>,
    pub approval_status: ApprovalStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated fields for a new donor. Approval always starts at pending.
#[derive(Debug, Clone)]
pub struct NewDonor {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub blood_group: BloodGroup,
    pub city: String,
    pub batch: Option<String>,
    pub whatsapp_number: Option<String>,
    pub last_donation_date: Option<OffsetDateTime>,
}
