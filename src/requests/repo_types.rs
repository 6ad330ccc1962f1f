use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{ApprovalStatus, BloodGroup, RequestStatus, UrgencyLevel};

/// Blood request record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequest {
    pub id: Uuid,
    pub patient_name: String,
    pub blood_group: BloodGroup,
    pub units_needed: i32,
    pub urgency_level: UrgencyLevel,
    pub location: String,
    pub hospital_name: String,
    pub contact_person: String,
    pub contact_phone: String,
    pub contact_whatsapp: Option<String>,
    pub status: RequestStatus,
    pub approval_status: ApprovalStatus,
    pub remarks: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl BloodRequest {
    /// Publicly listed and open to matching.
    pub fn is_active(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved && self.status == RequestStatus::Pending
    }
}

#[derive(Debug, Clone)]
pub struct NewBloodRequest {
    pub patient_name: String,
    pub blood_group: BloodGroup,
    pub units_needed: i32,
    pub urgency_level: UrgencyLevel,
    pub location: String,
    pub hospital_name: String,
    pub contact_person: String,
    pub contact_phone: String,
    pub contact_whatsapp: Option<String>,
    pub remarks: Option<String>,
}
