use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

use crate::{
    donors::repo_types::{Donor, NewDonor},
    models::BloodGroup,
    rules::eligibility::{self, Eligibility},
    validation,
};

/// Public donor registration form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonorRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(
        length(min = 10, message = "Please enter a valid phone number"),
        regex(path = "crate::validation::PHONE_RE", message = "Please enter a valid phone number")
    )]
    pub phone: String,
    pub blood_group: BloodGroup,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    pub batch: Option<String>,
    #[validate(regex(path = "crate::validation::PHONE_RE", message = "Please enter a valid WhatsApp number"))]
    pub whatsapp_number: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_donation_date: Option<OffsetDateTime>,
}

impl CreateDonorRequest {
    pub fn normalize(&mut self) {
        self.email = self.email.trim().to_lowercase();
        validation::trim(&mut self.name);
        validation::trim(&mut self.phone);
        validation::trim(&mut self.city);
        validation::trim_opt(&mut self.batch);
        validation::trim_opt(&mut self.whatsapp_number);
    }

    pub fn into_new_donor(self) -> NewDonor {
        NewDonor {
            name: self.name,
            email: self.email,
            phone: self.phone,
            blood_group: self.blood_group,
            city: self.city,
            batch: self.batch,
            whatsapp_number: self.whatsapp_number,
            last_donation_date: self.last_donation_date,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalUpdate {
    pub approval_status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchQuery {
    pub blood_group: String,
    pub city: Option<String>,
}

/// Donor plus eligibility evaluated at response time.
#[derive(Debug, Serialize)]
pub struct DonorResponse {
    #[serde(flatten)]
    pub donor: Donor,
    pub eligibility: Eligibility,
}

impl DonorResponse {
    pub fn at(donor: Donor, now: OffsetDateTime) -> Self {
        let eligibility = eligibility::evaluate(donor.last_donation_date, now);
        Self { donor, eligibility }
    }
}
