use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    models::{BloodGroup, UrgencyLevel},
    requests::repo_types::{BloodRequest, NewBloodRequest},
    validation,
};

pub const ACTIVE_LIMIT_DEFAULT: i64 = 10;
pub const ACTIVE_LIMIT_MAX: i64 = 100;

fn one() -> i32 {
    1
}

/// Public blood request form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBloodRequest {
    #[validate(length(min = 1, message = "Patient name is required"))]
    pub patient_name: String,
    pub blood_group: BloodGroup,
    #[serde(default = "one")]
    #[validate(range(min = 1, message = "At least 1 unit is required"))]
    pub units_needed: i32,
    #[serde(default)]
    pub urgency_level: UrgencyLevel,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[validate(length(min = 1, message = "Hospital name is required"))]
    pub hospital_name: String,
    #[validate(length(min = 1, message = "Contact person is required"))]
    pub contact_person: String,
    #[validate(
        length(min = 10, message = "Please enter a valid phone number"),
        regex(path = "crate::validation::PHONE_RE", message = "Please enter a valid phone number")
    )]
    pub contact_phone: String,
    #[validate(regex(path = "crate::validation::PHONE_RE", message = "Please enter a valid WhatsApp number"))]
    pub contact_whatsapp: Option<String>,
    pub remarks: Option<String>,
}

impl CreateBloodRequest {
    pub fn normalize(&mut self) {
        validation::trim(&mut self.patient_name);
        validation::trim(&mut self.location);
        validation::trim(&mut self.hospital_name);
        validation::trim(&mut self.contact_person);
        validation::trim(&mut self.contact_phone);
        validation::trim_opt(&mut self.contact_whatsapp);
        validation::trim_opt(&mut self.remarks);
    }

    pub fn into_new_request(self) -> NewBloodRequest {
        NewBloodRequest {
            patient_name: self.patient_name,
            blood_group: self.blood_group,
            units_needed: self.units_needed,
            urgency_level: self.urgency_level,
            location: self.location,
            hospital_name: self.hospital_name,
            contact_person: self.contact_person,
            contact_phone: self.contact_phone,
            contact_whatsapp: self.contact_whatsapp,
            remarks: self.remarks,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalUpdate {
    pub approval_status: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    pub limit: Option<i64>,
}

impl ActiveQuery {
    pub fn clamped(&self) -> i64 {
        self.limit
            .unwrap_or(ACTIVE_LIMIT_DEFAULT)
            .clamp(1, ACTIVE_LIMIT_MAX)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequestResponse {
    #[serde(flatten)]
    pub request: BloodRequest,
    pub response_time: &'static str,
}

impl From<BloodRequest> for BloodRequestResponse {
    fn from(request: BloodRequest) -> Self {
        let response_time = request.urgency_level.response_time();
        Self {
            request,
            response_time,
        }
    }
}
