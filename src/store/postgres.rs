use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::OffsetDateTime;
use tracing::{debug, error};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::{
    auth::repo_types::{NewUser, User},
    donations::repo_types::{Donation, DonationWithDetails, NewDonation},
    donors::repo_types::{Donor, NewDonor},
    inventory::repo_types::{BloodInventory, InventoryPatch},
    models::{ApprovalStatus, BloodGroup, RequestStatus},
    requests::repo_types::{BloodRequest, NewBloodRequest},
    stats::repo_types::StoreCounts,
};

const USER_COLS: &str =
    "id, email, password_hash, name, role, phone, is_active, created_at, updated_at";
const DONOR_COLS: &str = "id, name, email, phone, blood_group, city, batch, whatsapp_number, \
     last_donation_date, approval_status, created_at, updated_at";
const REQUEST_COLS: &str = "id, patient_name, blood_group, units_needed, urgency_level, location, \
     hospital_name, contact_person, contact_phone, contact_whatsapp, status, approval_status, \
     remarks, created_at, updated_at";
const DONATION_COLS: &str =
    "id, donor_id, request_id, donation_date, units_contributed, remarks, created_at";
const INVENTORY_COLS: &str = "id, blood_group, units_available, status, last_updated";

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

fn on_unique(e: sqlx::Error, field: &'static str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(field),
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (id, email, password_hash, name, role, phone)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.name)
            .bind(user.role)
            .bind(&user.phone)
            .fetch_one(&self.db)
            .await
            .map_err(|e| on_unique(e, "email"))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn create_donor(&self, donor: NewDonor) -> StoreResult<Donor> {
        let sql = format!(
            "INSERT INTO donors (id, name, email, phone, blood_group, city, batch,
                                 whatsapp_number, last_donation_date, approval_status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending')
             RETURNING {DONOR_COLS}"
        );
        sqlx::query_as::<_, Donor>(&sql)
            .bind(Uuid::new_v4())
            .bind(&donor.name)
            .bind(&donor.email)
            .bind(&donor.phone)
            .bind(donor.blood_group)
            .bind(&donor.city)
            .bind(&donor.batch)
            .bind(&donor.whatsapp_number)
            .bind(donor.last_donation_date)
            .fetch_one(&self.db)
            .await
            .map_err(|e| on_unique(e, "email"))
    }

    async fn get_donor(&self, id: Uuid) -> StoreResult<Option<Donor>> {
        let sql = format!("SELECT {DONOR_COLS} FROM donors WHERE id = $1");
        Ok(sqlx::query_as::<_, Donor>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn find_donor_by_email(&self, email: &str) -> StoreResult<Option<Donor>> {
        let sql = format!("SELECT {DONOR_COLS} FROM donors WHERE email = $1");
        Ok(sqlx::query_as::<_, Donor>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn list_donors(&self) -> StoreResult<Vec<Donor>> {
        let sql = format!("SELECT {DONOR_COLS} FROM donors ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, Donor>(&sql).fetch_all(&self.db).await?)
    }

    async fn approved_donors_by_group(&self, group: BloodGroup) -> StoreResult<Vec<Donor>> {
        let sql = format!(
            "SELECT {DONOR_COLS} FROM donors
             WHERE blood_group = $1 AND approval_status = 'approved'
             ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, Donor>(&sql)
            .bind(group)
            .fetch_all(&self.db)
            .await?)
    }

    async fn set_donor_approval(
        &self,
        id: Uuid,
        from: ApprovalStatus,
        to: ApprovalStatus,
    ) -> StoreResult<Option<Donor>> {
        let sql = format!(
            "UPDATE donors SET approval_status = $3, updated_at = now()
             WHERE id = $1 AND approval_status = $2
             RETURNING {DONOR_COLS}"
        );
        Ok(sqlx::query_as::<_, Donor>(&sql)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn create_request(&self, request: NewBloodRequest) -> StoreResult<BloodRequest> {
        let sql = format!(
            "INSERT INTO blood_requests (id, patient_name, blood_group, units_needed, urgency_level,
                                         location, hospital_name, contact_person, contact_phone,
                                         contact_whatsapp, remarks)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {REQUEST_COLS}"
        );
        Ok(sqlx::query_as::<_, BloodRequest>(&sql)
            .bind(Uuid::new_v4())
            .bind(&request.patient_name)
            .bind(request.blood_group)
            .bind(request.units_needed)
            .bind(request.urgency_level)
            .bind(&request.location)
            .bind(&request.hospital_name)
            .bind(&request.contact_person)
            .bind(&request.contact_phone)
            .bind(&request.contact_whatsapp)
            .bind(&request.remarks)
            .fetch_one(&self.db)
            .await?)
    }

    async fn get_request(&self, id: Uuid) -> StoreResult<Option<BloodRequest>> {
        let sql = format!("SELECT {REQUEST_COLS} FROM blood_requests WHERE id = $1");
        Ok(sqlx::query_as::<_, BloodRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn list_requests(&self) -> StoreResult<Vec<BloodRequest>> {
        let sql = format!("SELECT {REQUEST_COLS} FROM blood_requests ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, BloodRequest>(&sql)
            .fetch_all(&self.db)
            .await?)
    }

    async fn list_active_requests(&self, limit: i64) -> StoreResult<Vec<BloodRequest>> {
        let sql = format!(
            "SELECT {REQUEST_COLS} FROM blood_requests
             WHERE approval_status = 'approved' AND status = 'pending'
             ORDER BY created_at DESC
             LIMIT $1"
        );
        Ok(sqlx::query_as::<_, BloodRequest>(&sql)
            .bind(limit)
            .fetch_all(&self.db)
            .await?)
    }

    async fn set_request_approval(
        &self,
        id: Uuid,
        from: ApprovalStatus,
        to: ApprovalStatus,
    ) -> StoreResult<Option<BloodRequest>> {
        let sql = format!(
            "UPDATE blood_requests SET approval_status = $3, updated_at = now()
             WHERE id = $1 AND approval_status = $2
             RETURNING {REQUEST_COLS}"
        );
        Ok(sqlx::query_as::<_, BloodRequest>(&sql)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn set_request_status(
        &self,
        id: Uuid,
        from: RequestStatus,
        to: RequestStatus,
    ) -> StoreResult<Option<BloodRequest>> {
        let sql = format!(
            "UPDATE blood_requests SET status = $3, updated_at = now()
             WHERE id = $1 AND status = $2
             RETURNING {REQUEST_COLS}"
        );
        Ok(sqlx::query_as::<_, BloodRequest>(&sql)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(&self.db)
            .await?)
    }

    async fn record_donation(&self, donation: NewDonation) -> StoreResult<Donation> {
        let mut tx = self.db.begin().await?;

        // Lock the donor row so concurrent recordings serialize on the clock update.
        let donor: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM donors WHERE id = $1 FOR UPDATE")
                .bind(donation.donor_id)
                .fetch_optional(&mut *tx)
                .await?;
        if donor.is_none() {
            return Err(StoreError::NotFound("donor"));
        }

        let request: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM blood_requests WHERE id = $1")
            .bind(donation.request_id)
            .fetch_optional(&mut *tx)
            .await?;
        if request.is_none() {
            return Err(StoreError::NotFound("blood request"));
        }

        let sql = format!(
            "INSERT INTO donations (id, donor_id, request_id, donation_date, units_contributed, remarks)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {DONATION_COLS}"
        );
        let inserted = sqlx::query_as::<_, Donation>(&sql)
            .bind(Uuid::new_v4())
            .bind(donation.donor_id)
            .bind(donation.request_id)
            .bind(donation.donation_date)
            .bind(donation.units_contributed)
            .bind(&donation.remarks)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE donors
               SET last_donation_date = GREATEST(COALESCE(last_donation_date, $2), $2),
                   updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(donation.donor_id)
        .bind(donation.donation_date)
        .execute(&mut *tx)
        .await?;

        if let Err(e) = tx.commit().await {
            error!(
                error = %e,
                donor_id = %donation.donor_id,
                request_id = %donation.request_id,
                "donation commit failed; nothing was recorded"
            );
            return Err(e.into());
        }

        debug!(donation_id = %inserted.id, "donation committed");
        Ok(inserted)
    }

    async fn list_donations(&self) -> StoreResult<Vec<DonationWithDetails>> {
        let sql = format!("SELECT {DONATION_COLS} FROM donations ORDER BY donation_date DESC");
        let donations = sqlx::query_as::<_, Donation>(&sql)
            .fetch_all(&self.db)
            .await?;

        let donor_ids: Vec<Uuid> = donations.iter().map(|d| d.donor_id).collect();
        let request_ids: Vec<Uuid> = donations.iter().map(|d| d.request_id).collect();

        let sql = format!("SELECT {DONOR_COLS} FROM donors WHERE id = ANY($1)");
        let donors: HashMap<Uuid, Donor> = sqlx::query_as::<_, Donor>(&sql)
            .bind(&donor_ids)
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(|d| (d.id, d))
            .collect();

        let sql = format!("SELECT {REQUEST_COLS} FROM blood_requests WHERE id = ANY($1)");
        let requests: HashMap<Uuid, BloodRequest> = sqlx::query_as::<_, BloodRequest>(&sql)
            .bind(&request_ids)
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        Ok(donations
            .into_iter()
            .map(|donation| DonationWithDetails {
                donor: donors.get(&donation.donor_id).cloned(),
                request: requests.get(&donation.request_id).cloned(),
                donation,
            })
            .collect())
    }

    async fn list_inventory(&self) -> StoreResult<Vec<BloodInventory>> {
        let sql = format!("SELECT {INVENTORY_COLS} FROM blood_inventory ORDER BY blood_group");
        Ok(sqlx::query_as::<_, BloodInventory>(&sql)
            .fetch_all(&self.db)
            .await?)
    }

    async fn upsert_inventory(
        &self,
        group: BloodGroup,
        patch: InventoryPatch,
    ) -> StoreResult<BloodInventory> {
        let sql = format!(
            "INSERT INTO blood_inventory (id, blood_group, units_available, status)
             VALUES ($1, $2, COALESCE($3, 0), COALESCE($4, 'available'::inventory_status))
             ON CONFLICT (blood_group) DO UPDATE
                SET units_available = COALESCE($3, blood_inventory.units_available),
                    status = COALESCE($4, blood_inventory.status),
                    last_updated = now()
             RETURNING {INVENTORY_COLS}"
        );
        Ok(sqlx::query_as::<_, BloodInventory>(&sql)
            .bind(Uuid::new_v4())
            .bind(group)
            .bind(patch.units_available)
            .bind(patch.status)
            .fetch_one(&self.db)
            .await?)
    }

    async fn ensure_inventory_rows(&self) -> StoreResult<usize> {
        let mut created = 0;
        for group in BloodGroup::ALL {
            let res = sqlx::query(
                r#"
                INSERT INTO blood_inventory (id, blood_group, units_available, status)
                VALUES ($1, $2, 0, 'urgent')
                ON CONFLICT (blood_group) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(group)
            .execute(&self.db)
            .await?;
            created += res.rows_affected() as usize;
        }
        Ok(created)
    }

    async fn counts(&self, today_start: OffsetDateTime) -> StoreResult<StoreCounts> {
        Ok(sqlx::query_as::<_, StoreCounts>(
            r#"
            SELECT
              (SELECT count(*) FROM donors) AS total_donors,
              (SELECT count(*) FROM donors WHERE approval_status = 'approved') AS approved_donors,
              (SELECT count(*) FROM donors WHERE approval_status = 'pending') AS pending_donors,
              (SELECT count(*) FROM blood_requests) AS total_requests,
              (SELECT count(*) FROM blood_requests
                WHERE approval_status = 'approved' AND status = 'pending') AS active_requests,
              (SELECT count(*) FROM blood_requests WHERE status = 'completed') AS completed_requests,
              (SELECT count(*) FROM donations) AS total_donations,
              (SELECT count(*) FROM donations WHERE donation_date >= $1) AS today_donations
            "#,
        )
        .bind(today_start)
        .fetch_one(&self.db)
        .await?)
    }
}
