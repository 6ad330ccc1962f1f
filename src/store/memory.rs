use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::{
    auth::repo_types::{NewUser, User},
    donations::repo_types::{Donation, DonationWithDetails, NewDonation},
    donors::repo_types::{Donor, NewDonor},
    inventory::repo_types::{BloodInventory, InventoryPatch},
    models::{ApprovalStatus, BloodGroup, InventoryStatus, RequestStatus},
    requests::repo_types::{BloodRequest, NewBloodRequest},
    stats::repo_types::StoreCounts,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    donors: HashMap<Uuid, Donor>,
    requests: HashMap<Uuid, BloodRequest>,
    donations: Vec<Donation>,
    inventory: HashMap<BloodGroup, BloodInventory>,
}

/// In-process store. Every operation holds the lock for its whole duration,
/// which gives the same all-or-nothing behaviour as a database transaction.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock leaves plain data behind; keep serving it.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> OffsetDateTime) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.lock();
        if t.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }
        let now = OffsetDateTime::now_utc();
        let row = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            role: user.role,
            phone: user.phone,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.lock().users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn create_donor(&self, donor: NewDonor) -> StoreResult<Donor> {
        let mut t = self.lock();
        if t.donors.values().any(|d| d.email == donor.email) {
            return Err(StoreError::Duplicate("email"));
        }
        let now = OffsetDateTime::now_utc();
        let row = Donor {
            id: Uuid::new_v4(),
            name: donor.name,
            email: donor.email,
            phone: donor.phone,
            blood_group: donor.blood_group,
            city: donor.city,
            batch: donor.batch,
            whatsapp_number: donor.whatsapp_number,
            last_donation_date: donor.last_donation_date,
            approval_status: ApprovalStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        t.donors.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_donor(&self, id: Uuid) -> StoreResult<Option<Donor>> {
        Ok(self.lock().donors.get(&id).cloned())
    }

    async fn find_donor_by_email(&self, email: &str) -> StoreResult<Option<Donor>> {
        Ok(self.lock().donors.values().find(|d| d.email == email).cloned())
    }

    async fn list_donors(&self) -> StoreResult<Vec<Donor>> {
        let mut rows: Vec<Donor> = self.lock().donors.values().cloned().collect();
        newest_first(&mut rows, |d| d.created_at);
        Ok(rows)
    }

    async fn approved_donors_by_group(&self, group: BloodGroup) -> StoreResult<Vec<Donor>> {
        let mut rows: Vec<Donor> = self
            .lock()
            .donors
            .values()
            .filter(|d| d.blood_group == group && d.approval_status == ApprovalStatus::Approved)
            .cloned()
            .collect();
        newest_first(&mut rows, |d| d.created_at);
        Ok(rows)
    }

    async fn set_donor_approval(
        &self,
        id: Uuid,
        from: ApprovalStatus,
        to: ApprovalStatus,
    ) -> StoreResult<Option<Donor>> {
        let mut t = self.lock();
        Ok(t.donors
            .get_mut(&id)
            .filter(|d| d.approval_status == from)
            .map(|d| {
                d.approval_status = to;
                d.updated_at = OffsetDateTime::now_utc();
                d.clone()
            }))
    }

    async fn create_request(&self, request: NewBloodRequest) -> StoreResult<BloodRequest> {
        let now = OffsetDateTime::now_utc();
        let row = BloodRequest {
            id: Uuid::new_v4(),
            patient_name: request.patient_name,
            blood_group: request.blood_group,
            units_needed: request.units_needed,
            urgency_level: request.urgency_level,
            location: request.location,
            hospital_name: request.hospital_name,
            contact_person: request.contact_person,
            contact_phone: request.contact_phone,
            contact_whatsapp: request.contact_whatsapp,
            status: RequestStatus::Pending,
            approval_status: ApprovalStatus::Pending,
            remarks: request.remarks,
            created_at: now,
            updated_at: now,
        };
        self.lock().requests.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_request(&self, id: Uuid) -> StoreResult<Option<BloodRequest>> {
        Ok(self.lock().requests.get(&id).cloned())
    }

    async fn list_requests(&self) -> StoreResult<Vec<BloodRequest>> {
        let mut rows: Vec<BloodRequest> = self.lock().requests.values().cloned().collect();
        newest_first(&mut rows, |r| r.created_at);
        Ok(rows)
    }

    async fn list_active_requests(&self, limit: i64) -> StoreResult<Vec<BloodRequest>> {
        let mut rows: Vec<BloodRequest> = self
            .lock()
            .requests
            .values()
            .filter(|r| r.is_active())
            .cloned()
            .collect();
        newest_first(&mut rows, |r| r.created_at);
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn set_request_approval(
        &self,
        id: Uuid,
        from: ApprovalStatus,
        to: ApprovalStatus,
    ) -> StoreResult<Option<BloodRequest>> {
        let mut t = self.lock();
        Ok(t.requests
            .get_mut(&id)
            .filter(|r| r.approval_status == from)
            .map(|r| {
                r.approval_status = to;
                r.updated_at = OffsetDateTime::now_utc();
                r.clone()
            }))
    }

    async fn set_request_status(
        &self,
        id: Uuid,
        from: RequestStatus,
        to: RequestStatus,
    ) -> StoreResult<Option<BloodRequest>> {
        let mut t = self.lock();
        Ok(t.requests
            .get_mut(&id)
            .filter(|r| r.status == from)
            .map(|r| {
                r.status = to;
                r.updated_at = OffsetDateTime::now_utc();
                r.clone()
            }))
    }

    async fn record_donation(&self, donation: NewDonation) -> StoreResult<Donation> {
        let mut t = self.lock();
        // same order as PgStore: donor, then request
        if !t.donors.contains_key(&donation.donor_id) {
            return Err(StoreError::NotFound("donor"));
        }
        if !t.requests.contains_key(&donation.request_id) {
            return Err(StoreError::NotFound("blood request"));
        }
        let now = OffsetDateTime::now_utc();
        let donor = t
            .donors
            .get_mut(&donation.donor_id)
            .ok_or(StoreError::NotFound("donor"))?;

        let clock = donor
            .last_donation_date
            .map_or(donation.donation_date, |last| last.max(donation.donation_date));
        donor.last_donation_date = Some(clock);
        donor.updated_at = now;

        let row = Donation {
            id: Uuid::new_v4(),
            donor_id: donation.donor_id,
            request_id: donation.request_id,
            donation_date: donation.donation_date,
            units_contributed: donation.units_contributed,
            remarks: donation.remarks,
            created_at: now,
        };
        t.donations.push(row.clone());
        Ok(row)
    }

    async fn list_donations(&self) -> StoreResult<Vec<DonationWithDetails>> {
        let t = self.lock();
        let mut rows: Vec<DonationWithDetails> = t
            .donations
            .iter()
            .map(|d| DonationWithDetails {
                donation: d.clone(),
                donor: t.donors.get(&d.donor_id).cloned(),
                request: t.requests.get(&d.request_id).cloned(),
            })
            .collect();
        newest_first(&mut rows, |d| d.donation.donation_date);
        Ok(rows)
    }

    async fn list_inventory(&self) -> StoreResult<Vec<BloodInventory>> {
        let mut rows: Vec<BloodInventory> = self.lock().inventory.values().cloned().collect();
        rows.sort_by_key(|r| r.blood_group);
        Ok(rows)
    }

    async fn upsert_inventory(
        &self,
        group: BloodGroup,
        patch: InventoryPatch,
    ) -> StoreResult<BloodInventory> {
        let mut t = self.lock();
        let now = OffsetDateTime::now_utc();
        let row = t
            .inventory
            .entry(group)
            .and_modify(|row| {
                if let Some(units) = patch.units_available {
                    row.units_available = units;
                }
                if let Some(status) = patch.status {
                    row.status = status;
                }
                row.last_updated = now;
            })
            .or_insert_with(|| BloodInventory {
                id: Uuid::new_v4(),
                blood_group: group,
                units_available: patch.units_available.unwrap_or(0),
                status: patch.status.unwrap_or_default(),
                last_updated: now,
            });
        Ok(row.clone())
    }

    async fn ensure_inventory_rows(&self) -> StoreResult<usize> {
        let mut t = self.lock();
        let now = OffsetDateTime::now_utc();
        let mut created = 0;
        for group in BloodGroup::ALL {
            t.inventory.entry(group).or_insert_with(|| {
                created += 1;
                BloodInventory {
                    id: Uuid::new_v4(),
                    blood_group: group,
                    units_available: 0,
                    status: InventoryStatus::Urgent,
                    last_updated: now,
                }
            });
        }
        Ok(created)
    }

    async fn counts(&self, today_start: OffsetDateTime) -> StoreResult<StoreCounts> {
        let t = self.lock();
        let count_donors = |s: ApprovalStatus| {
            t.donors.values().filter(|d| d.approval_status == s).count() as i64
        };
        Ok(StoreCounts {
            total_donors: t.donors.len() as i64,
            approved_donors: count_donors(ApprovalStatus::Approved),
            pending_donors: count_donors(ApprovalStatus::Pending),
            total_requests: t.requests.len() as i64,
            active_requests: t.requests.values().filter(|r| r.is_active()).count() as i64,
            completed_requests: t
                .requests
                .values()
                .filter(|r| r.status == RequestStatus::Completed)
                .count() as i64,
            total_donations: t.donations.len() as i64,
            today_donations: t
                .donations
                .iter()
                .filter(|d| d.donation_date >= today_start)
                .count() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn new_donor(email: &str) -> NewDonor {
        NewDonor {
            name: "Ayesha Khan".into(),
            email: email.into(),
            phone: "03001234567".into(),
            blood_group: BloodGroup::OPos,
            city: "Islamabad".into(),
            batch: None,
            whatsapp_number: None,
            last_donation_date: None,
        }
    }

    fn new_request() -> NewBloodRequest {
        NewBloodRequest {
            patient_name: "Patient".into(),
            blood_group: BloodGroup::OPos,
            units_needed: 2,
            urgency_level: Default::default(),
            location: "Islamabad".into(),
            hospital_name: "PIMS".into(),
            contact_person: "Ali".into(),
            contact_phone: "03007654321".into(),
            contact_whatsapp: None,
            remarks: None,
        }
    }

    #[tokio::test]
    async fn duplicate_donor_email_is_rejected() {
        let store = MemoryStore::new();
        store.create_donor(new_donor("a@example.com")).await.unwrap();
        let err = store.create_donor(new_donor("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("email")));
    }

    #[tokio::test]
    async fn approval_update_is_compare_and_set() {
        let store = MemoryStore::new();
        let d = store.create_donor(new_donor("b@example.com")).await.unwrap();
        let wrong = store
            .set_donor_approval(d.id, ApprovalStatus::Approved, ApprovalStatus::Rejected)
            .await
            .unwrap();
        assert!(wrong.is_none());
        let ok = store
            .set_donor_approval(d.id, ApprovalStatus::Pending, ApprovalStatus::Approved)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ok.approval_status, ApprovalStatus::Approved);
    }

    #[tokio::test]
    async fn record_donation_never_moves_clock_back() {
        let store = MemoryStore::new();
        let d = store.create_donor(new_donor("c@example.com")).await.unwrap();
        let r = store.create_request(new_request()).await.unwrap();
        let recent = OffsetDateTime::now_utc() - Duration::days(2);

        store
            .record_donation(NewDonation {
                donor_id: d.id,
                request_id: r.id,
                donation_date: recent,
                units_contributed: 1,
                remarks: None,
            })
            .await
            .unwrap();
        store
            .record_donation(NewDonation {
                donor_id: d.id,
                request_id: r.id,
                donation_date: recent - Duration::days(30),
                units_contributed: 1,
                remarks: Some("late entry".into()),
            })
            .await
            .unwrap();

        let donor = store.get_donor(d.id).await.unwrap().unwrap();
        assert_eq!(donor.last_donation_date, Some(recent));
        assert_eq!(store.list_donations().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn record_donation_with_unknown_request_writes_nothing() {
        let store = MemoryStore::new();
        let d = store.create_donor(new_donor("d@example.com")).await.unwrap();
        let err = store
            .record_donation(NewDonation {
                donor_id: d.id,
                request_id: Uuid::new_v4(),
                donation_date: OffsetDateTime::now_utc(),
                units_contributed: 1,
                remarks: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound("blood request")));
        assert!(store.list_donations().await.unwrap().is_empty());
        let donor = store.get_donor(d.id).await.unwrap().unwrap();
        assert!(donor.last_donation_date.is_none());
    }

    #[tokio::test]
    async fn record_donation_reports_missing_donor_first() {
        let store = MemoryStore::new();
        let err = store
            .record_donation(NewDonation {
                donor_id: Uuid::new_v4(),
                request_id: Uuid::new_v4(),
                donation_date: OffsetDateTime::now_utc(),
                units_contributed: 1,
                remarks: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound("donor")));
    }

    #[tokio::test]
    async fn ensure_inventory_rows_fills_gaps_only() {
        let store = MemoryStore::new();
        store
            .upsert_inventory(
                BloodGroup::ANeg,
                InventoryPatch {
                    units_available: Some(7),
                    status: Some(InventoryStatus::Low),
                },
            )
            .await
            .unwrap();
        assert_eq!(store.ensure_inventory_rows().await.unwrap(), 7);
        assert_eq!(store.ensure_inventory_rows().await.unwrap(), 0);

        let rows = store.list_inventory().await.unwrap();
        assert_eq!(rows.len(), 8);
        let a_neg = rows.iter().find(|r| r.blood_group == BloodGroup::ANeg).unwrap();
        assert_eq!(a_neg.units_available, 7);
        assert_eq!(a_neg.status, InventoryStatus::Low);
        let o_pos = rows.iter().find(|r| r.blood_group == BloodGroup::OPos).unwrap();
        assert_eq!(o_pos.units_available, 0);
        assert_eq!(o_pos.status, InventoryStatus::Urgent);
    }
}
