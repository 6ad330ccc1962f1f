use sqlx::FromRow;

/// Raw counters read in one pass over the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct StoreCounts {
    pub total_donors: i64,
    pub approved_donors: i64,
    pub pending_donors: i64,
    pub total_requests: i64,
    pub active_requests: i64,
    pub completed_requests: i64,
    pub total_donations: i64,
    pub today_donations: i64,
}
