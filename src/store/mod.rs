//! Persistence boundary. Services only see `dyn Store`; `PgStore` backs the
//! running service and `MemoryStore` backs tests.

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::repo_types::{NewUser, User},
    donations::repo_types::{Donation, DonationWithDetails, NewDonation},
    donors::repo_types::{Donor, NewDonor},
    inventory::repo_types::{BloodInventory, InventoryPatch},
    models::{ApprovalStatus, BloodGroup, RequestStatus},
    requests::repo_types::{BloodRequest, NewBloodRequest},
    stats::repo_types::StoreCounts,
};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} already exists")]
    Duplicate(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    // ---- users ----
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    // ---- donors ----
    async fn create_donor(&self, donor: NewDonor) -> StoreResult<Donor>;
    async fn get_donor(&self, id: Uuid) -> StoreResult<Option<Donor>>;
    async fn find_donor_by_email(&self, email: &str) -> StoreResult<Option<Donor>>;
    /// Newest first.
    async fn list_donors(&self) -> StoreResult<Vec<Donor>>;
    /// Approved donors of exactly this blood group.
    async fn approved_donors_by_group(&self, group: BloodGroup) -> StoreResult<Vec<Donor>>;
    /// Compare-and-set: returns `None` if the donor is missing or no longer in `from`.
    async fn set_donor_approval(
        &self,
        id: Uuid,
        from: ApprovalStatus,
        to: ApprovalStatus,
    ) -> StoreResult<Option<Donor>>;

    // ---- blood requests ----
    async fn create_request(&self, request: NewBloodRequest) -> StoreResult<BloodRequest>;
    async fn get_request(&self, id: Uuid) -> StoreResult<Option<BloodRequest>>;
    /// Newest first.
    async fn list_requests(&self) -> StoreResult<Vec<BloodRequest>>;
    /// Approved and pending, newest first.
    async fn list_active_requests(&self, limit: i64) -> StoreResult<Vec<BloodRequest>>;
    async fn set_request_approval(
        &self,
        id: Uuid,
        from: ApprovalStatus,
        to: ApprovalStatus,
    ) -> StoreResult<Option<BloodRequest>>;
    async fn set_request_status(
        &self,
        id: Uuid,
        from: RequestStatus,
        to: RequestStatus,
    ) -> StoreResult<Option<BloodRequest>>;

    // ---- donations ----
    /// Inserts the donation and advances the donor's last donation date as one
    /// unit. Fails with `NotFound` if the donor or request does not exist.
    async fn record_donation(&self, donation: NewDonation) -> StoreResult<Donation>;
    /// Newest donation date first.
    async fn list_donations(&self) -> StoreResult<Vec<DonationWithDetails>>;

    // ---- inventory ----
    async fn list_inventory(&self) -> StoreResult<Vec<BloodInventory>>;
    async fn upsert_inventory(
        &self,
        group: BloodGroup,
        patch: InventoryPatch,
    ) -> StoreResult<BloodInventory>;
    /// Creates an empty "urgent" row for every blood group that has none.
    /// Returns how many rows were created.
    async fn ensure_inventory_rows(&self) -> StoreResult<usize>;

    // ---- stats ----
    async fn counts(&self, today_start: OffsetDateTime) -> StoreResult<StoreCounts>;
}
