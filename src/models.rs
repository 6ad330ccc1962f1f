use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// ABO/Rh blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "blood_group")]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    #[sqlx(rename = "A+")]
    APos,
    #[serde(rename = "A-")]
    #[sqlx(rename = "A-")]
    ANeg,
    #[serde(rename = "B+")]
    #[sqlx(rename = "B+")]
    BPos,
    #[serde(rename = "B-")]
    #[sqlx(rename = "B-")]
    BNeg,
    #[serde(rename = "O+")]
    #[sqlx(rename = "O+")]
    OPos,
    #[serde(rename = "O-")]
    #[sqlx(rename = "O-")]
    ONeg,
    #[serde(rename = "AB+")]
    #[sqlx(rename = "AB+")]
    AbPos,
    #[serde(rename = "AB-")]
    #[sqlx(rename = "AB-")]
    AbNeg,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APos,
        BloodGroup::ANeg,
        BloodGroup::BPos,
        BloodGroup::BNeg,
        BloodGroup::OPos,
        BloodGroup::ONeg,
        BloodGroup::AbPos,
        BloodGroup::AbNeg,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BloodGroup::APos => "A+",
            BloodGroup::ANeg => "A-",
            BloodGroup::BPos => "B+",
            BloodGroup::BNeg => "B-",
            BloodGroup::OPos => "O+",
            BloodGroup::ONeg => "O-",
            BloodGroup::AbPos => "AB+",
            BloodGroup::AbNeg => "AB-",
        }
    }
}

/// Approval gate shared by donors and blood requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "approval_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

/// Processing lifecycle of a blood request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "urgency_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    #[default]
    Normal,
    Urgent,
    Emergency,
}

impl UrgencyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyLevel::Normal => "normal",
            UrgencyLevel::Urgent => "urgent",
            UrgencyLevel::Emergency => "emergency",
        }
    }

    /// Nominal response time shown next to the request. Nothing enforces it.
    pub fn response_time(self) -> &'static str {
        match self {
            UrgencyLevel::Normal => "24 hrs",
            UrgencyLevel::Urgent => "6 hrs",
            UrgencyLevel::Emergency => "Immediate",
        }
    }
}

/// Admin-set stock label. Never derived from the unit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "inventory_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InventoryStatus {
    #[default]
    Available,
    Low,
    Urgent,
}

impl InventoryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InventoryStatus::Available => "available",
            InventoryStatus::Low => "low",
            InventoryStatus::Urgent => "urgent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Donor,
    Hospital,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Donor => "donor",
            UserRole::Hospital => "hospital",
        }
    }
}

/// Returned when a string does not name a variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! str_enum {
    ($ty:ty, $kind:literal, [$($variant:expr),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                [$($variant),+]
                    .into_iter()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| ParseEnumError { kind: $kind, value: s.to_string() })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(BloodGroup, "blood group", [
    BloodGroup::APos, BloodGroup::ANeg, BloodGroup::BPos, BloodGroup::BNeg,
    BloodGroup::OPos, BloodGroup::ONeg, BloodGroup::AbPos, BloodGroup::AbNeg,
]);
str_enum!(ApprovalStatus, "approval status", [
    ApprovalStatus::Pending, ApprovalStatus::Approved, ApprovalStatus::Rejected,
]);
str_enum!(RequestStatus, "request status", [
    RequestStatus::Pending, RequestStatus::InProgress, RequestStatus::Completed, RequestStatus::Cancelled,
]);
str_enum!(UrgencyLevel, "urgency level", [
    UrgencyLevel::Normal, UrgencyLevel::Urgent, UrgencyLevel::Emergency,
]);
str_enum!(InventoryStatus, "inventory status", [
    InventoryStatus::Available, InventoryStatus::Low, InventoryStatus::Urgent,
]);
str_enum!(UserRole, "user role", [
    UserRole::Admin, UserRole::Donor, UserRole::Hospital,
]);
