use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::{donations::repo_types::NewDonation, validation};

fn one() -> i32 {
    1
}

/// Case closure form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordDonationRequest {
    pub donor_id: Uuid,
    pub request_id: Uuid,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub donation_date: Option<OffsetDateTime>,
    #[serde(default = "one")]
    #[validate(range(min = 1, message = "At least 1 unit is required"))]
    pub units_contributed: i32,
    pub remarks: Option<String>,
}

impl RecordDonationRequest {
    /// Missing dates fall back to `now`.
    pub fn into_new_donation(mut self, now: OffsetDateTime) -> NewDonation {
        validation::trim_opt(&mut self.remarks);
        NewDonation {
            donor_id: self.donor_id,
            request_id: self.request_id,
            donation_date: self.donation_date.unwrap_or(now),
            units_contributed: self.units_contributed,
            remarks: self.remarks,
        }
    }
}
