use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{donors::repo_types::Donor, requests::repo_types::BloodRequest};

/// Case-closure log entry.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub request_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub donation_date: OffsetDateTime,
    pub units_contributed: i32,
    pub remarks: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewDonation {
    pub donor_id: Uuid,
    pub request_id: Uuid,
    pub donation_date: OffsetDateTime,
    pub units_contributed: i32,
    pub remarks: Option<String>,
}

/// Donation joined with its donor and request. Either side is `None` if the
/// referenced row is gone.
#[derive(Debug, Clone, Serialize)]
pub struct DonationWithDetails {
    #[serde(flatten)]
    pub donation: Donation,
    pub donor: Option<Donor>,
    pub request: Option<BloodRequest>,
}
