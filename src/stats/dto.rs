use serde::Serialize;

use crate::stats::repo_types::StoreCounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_donors: i64,
    pub approved_donors: i64,
    pub pending_donors: i64,
    pub total_requests: i64,
    pub active_requests: i64,
    pub completed_requests: i64,
    pub total_donations: i64,
    pub today_donations: i64,
}

impl From<StoreCounts> for AdminStats {
    fn from(c: StoreCounts) -> Self {
        Self {
            total_donors: c.total_donors,
            approved_donors: c.approved_donors,
            pending_donors: c.pending_donors,
            total_requests: c.total_requests,
            active_requests: c.active_requests,
            completed_requests: c.completed_requests,
            total_donations: c.total_donations,
            today_donations: c.today_donations,
        }
    }
}

/// Public dashboard numbers. `total_donors` counts approved donors only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicStats {
    pub total_donors: i64,
    pub total_donations: i64,
    pub active_requests: i64,
    pub completed_requests: i64,
}

impl From<StoreCounts> for PublicStats {
    fn from(c: StoreCounts) -> Self {
        Self {
            total_donors: c.approved_donors,
            total_donations: c.total_donations,
            active_requests: c.active_requests,
            completed_requests: c.completed_requests,
        }
    }
}
