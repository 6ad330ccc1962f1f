use time::OffsetDateTime;
use tracing::{error, info};
use validator::Validate;

use crate::{
    donations::{
        dto::RecordDonationRequest,
        repo_types::{Donation, DonationWithDetails},
    },
    error::AppResult,
    store::{Store, StoreError},
};

/// Logs the donation and resets the donor's eligibility clock in one unit.
pub async fn record_donation(
    store: &dyn Store,
    payload: RecordDonationRequest,
    now: OffsetDateTime,
) -> AppResult<Donation> {
    payload.validate()?;
    let new = payload.into_new_donation(now);
    let (donor_id, request_id) = (new.donor_id, new.request_id);

    let donation = store.record_donation(new).await.inspect_err(|e| {
        if let StoreError::Database(db) = e {
            error!(%donor_id, %request_id, error = %db, "donation write failed");
        }
    })?;

    info!(
        donation_id = %donation.id,
        %donor_id,
        %request_id,
        units = donation.units_contributed,
        "donation recorded"
    );
    Ok(donation)
}

pub async fn list_donations(store: &dyn Store) -> AppResult<Vec<DonationWithDetails>> {
    Ok(store.list_donations().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        donors::repo_types::NewDonor,
        error::AppError,
        models::{BloodGroup, UrgencyLevel},
        requests::repo_types::NewBloodRequest,
        rules::eligibility::{self, Eligibility},
        store::MemoryStore,
    };
    use time::macros::datetime;
    use uuid::Uuid;

    async fn seed(store: &MemoryStore) -> (Uuid, Uuid) {
        let donor = store
            .create_donor(NewDonor {
                name: "Farah".into(),
                email: "farah@example.com".into(),
                phone: "03331234567".into(),
                blood_group: BloodGroup::ONeg,
                city: "Quetta".into(),
                batch: None,
                whatsapp_number: None,
                last_donation_date: None,
            })
            .await
            .unwrap();
        let request = store
            .create_request(NewBloodRequest {
                patient_name: "Nadia".into(),
                blood_group: BloodGroup::ONeg,
                units_needed: 3,
                urgency_level: UrgencyLevel::Emergency,
                location: "Quetta".into(),
                hospital_name: "BMC".into(),
                contact_person: "Kamran".into(),
                contact_phone: "03451234567".into(),
                contact_whatsapp: None,
                remarks: None,
            })
            .await
            .unwrap();
        (donor.id, request.id)
    }

    fn form(donor_id: Uuid, request_id: Uuid, date: Option<OffsetDateTime>) -> RecordDonationRequest {
        RecordDonationRequest {
            donor_id,
            request_id,
            donation_date: date,
            units_contributed: 2,
            remarks: Some("  ".into()),
        }
    }

    #[tokio::test]
    async fn recording_resets_eligibility() {
        let store = MemoryStore::new();
        let (donor_id, request_id) = seed(&store).await;
        let now = datetime!(2024-06-01 12:00 UTC);

        let d = record_donation(&store, form(donor_id, request_id, None), now)
            .await
            .unwrap();
        assert_eq!(d.donation_date, now);
        assert_eq!(d.units_contributed, 2);
        assert!(d.remarks.is_none());

        let donor = store.get_donor(donor_id).await.unwrap().unwrap();
        assert_eq!(donor.last_donation_date, Some(now));
        assert_eq!(
            eligibility::evaluate(donor.last_donation_date, now),
            Eligibility::NotEligible { days_remaining: 90 }
        );
    }

    #[tokio::test]
    async fn backdated_entry_keeps_later_clock() {
        let store = MemoryStore::new();
        let (donor_id, request_id) = seed(&store).await;
        let recent = datetime!(2024-06-01 00:00 UTC);
        let older = datetime!(2024-03-01 00:00 UTC);

        record_donation(&store, form(donor_id, request_id, Some(recent)), recent)
            .await
            .unwrap();
        record_donation(&store, form(donor_id, request_id, Some(older)), recent)
            .await
            .unwrap();

        let donor = store.get_donor(donor_id).await.unwrap().unwrap();
        assert_eq!(donor.last_donation_date, Some(recent));

        let listed = list_donations(&store).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].donation.donation_date, recent);
        assert_eq!(listed[0].donor.as_ref().map(|d| d.id), Some(donor_id));
        assert_eq!(listed[0].request.as_ref().map(|r| r.id), Some(request_id));
    }

    #[tokio::test]
    async fn missing_references_are_not_found() {
        let store = MemoryStore::new();
        let (donor_id, request_id) = seed(&store).await;
        let now = OffsetDateTime::now_utc();

        let err = record_donation(&store, form(Uuid::new_v4(), request_id, None), now)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = record_donation(&store, form(donor_id, Uuid::new_v4(), None), now)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(list_donations(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_units_are_rejected() {
        let store = MemoryStore::new();
        let (donor_id, request_id) = seed(&store).await;
        let mut f = form(donor_id, request_id, None);
        f.units_contributed = 0;
        let err = record_donation(&store, f, OffsetDateTime::now_utc())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let donor = store.get_donor(donor_id).await.unwrap().unwrap();
        assert!(donor.last_donation_date.is_none());
    }
}
