use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    donors::{
        dto::{CreateDonorRequest, DonorResponse},
        repo_types::Donor,
    },
    error::{AppError, AppResult},
    models::{ApprovalStatus, BloodGroup},
    rules::{lifecycle::Lifecycle, matching},
    store::Store,
};

pub async fn create_donor(store: &dyn Store, mut payload: CreateDonorRequest) -> AppResult<Donor> {
    payload.normalize();
    payload.validate()?;

    if store.find_donor_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "donor email already registered");
        return Err(AppError::Duplicate("Email already registered".into()));
    }

    let donor = store.create_donor(payload.into_new_donor()).await?;
    info!(donor_id = %donor.id, blood_group = %donor.blood_group, city = %donor.city, "donor registered");
    Ok(donor)
}

pub async fn list_donors(store: &dyn Store, now: OffsetDateTime) -> AppResult<Vec<DonorResponse>> {
    Ok(store
        .list_donors()
        .await?
        .into_iter()
        .map(|d| DonorResponse::at(d, now))
        .collect())
}

pub async fn get_donor(store: &dyn Store, id: Uuid, now: OffsetDateTime) -> AppResult<DonorResponse> {
    store
        .get_donor(id)
        .await?
        .map(|d| DonorResponse::at(d, now))
        .ok_or_else(|| AppError::NotFound("Donor not found".into()))
}

/// Parses an admin decision. Only `approved` and `rejected` are decisions.
pub(crate) fn parse_decision(raw: &str) -> AppResult<ApprovalStatus> {
    match raw.parse::<ApprovalStatus>() {
        Ok(s @ (ApprovalStatus::Approved | ApprovalStatus::Rejected)) => Ok(s),
        _ => Err(AppError::InvalidState("Invalid approval status".into())),
    }
}

pub async fn set_donor_approval(store: &dyn Store, id: Uuid, target: &str) -> AppResult<Donor> {
    let to = parse_decision(target).inspect_err(|_| {
        warn!(donor_id = %id, requested = target, "rejected approval value");
    })?;

    let donor = store
        .get_donor(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Donor not found".into()))?;

    let from = donor.approval_status;
    from.transition(to).inspect_err(|e| {
        warn!(donor_id = %id, error = %e, terminal = from.is_terminal(), "donor approval transition refused");
    })?;

    let updated = store
        .set_donor_approval(id, from, to)
        .await?
        .ok_or_else(|| AppError::InvalidState("Donor was updated concurrently".into()))?;

    info!(donor_id = %id, from = %from, to = %to, "donor approval changed");
    Ok(updated)
}

/// Parses a blood group taken from a query string, where an unescaped `+`
/// arrives as a space.
pub fn parse_blood_group(raw: &str) -> AppResult<BloodGroup> {
    let trimmed = raw.trim_start();
    let fixed = match trimmed.strip_suffix(' ') {
        Some(stem) if !stem.trim_end().ends_with(['+', '-']) => format!("{}+", stem.trim_end()),
        _ => trimmed.to_string(),
    };
    fixed
        .parse::<BloodGroup>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

pub async fn match_donors(
    store: &dyn Store,
    blood_group: BloodGroup,
    city: Option<&str>,
    now: OffsetDateTime,
) -> AppResult<Vec<DonorResponse>> {
    let candidates = store.approved_donors_by_group(blood_group).await?;
    let found: Vec<DonorResponse> = matching::filter_matching(candidates, blood_group, city)
        .into_iter()
        .map(|d| DonorResponse::at(d, now))
        .collect();
    debug!(
        %blood_group,
        city = city.unwrap_or(""),
        matched = found.len(),
        eligible_now = found.iter().filter(|d| d.eligibility.is_eligible()).count(),
        "donors matched"
    );
    Ok(found)
}

/// Matches against a stored request's blood group and location. The request
/// must have been approved.
pub async fn match_donors_for_request(
    store: &dyn Store,
    request_id: Uuid,
    now: OffsetDateTime,
) -> AppResult<Vec<DonorResponse>> {
    let request = store
        .get_request(request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Request not found".into()))?;
    if request.approval_status != ApprovalStatus::Approved {
        warn!(%request_id, approval = %request.approval_status, "matching refused for unapproved request");
        return Err(AppError::InvalidState("Request is not approved".into()));
    }
    match_donors(store, request.blood_group, Some(&request.location), now).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{rules::eligibility::Eligibility, store::MemoryStore};

    fn body(email: &str, group: BloodGroup, city: &str) -> CreateDonorRequest {
        CreateDonorRequest {
            name: "Hamza".into(),
            email: email.into(),
            phone: "0300 1234567".into(),
            blood_group: group,
            city: city.into(),
            batch: Some("  ".into()),
            whatsapp_number: None,
            last_donation_date: None,
        }
    }

    async fn approved(store: &MemoryStore, email: &str, group: BloodGroup, city: &str) -> Donor {
        let d = create_donor(store, body(email, group, city)).await.unwrap();
        set_donor_approval(store, d.id, "approved").await.unwrap()
    }

    #[tokio::test]
    async fn new_donor_starts_pending() {
        let store = MemoryStore::new();
        let d = create_donor(&store, body(" Hamza@Example.com", BloodGroup::APos, "Lahore"))
            .await
            .unwrap();
        assert_eq!(d.approval_status, ApprovalStatus::Pending);
        assert_eq!(d.email, "hamza@example.com");
        assert!(d.batch.is_none());
    }

    #[tokio::test]
    async fn create_donor_validates_input() {
        let store = MemoryStore::new();
        let mut b = body("not-an-email", BloodGroup::APos, "Lahore");
        let err = create_donor(&store, b).await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid email address");

        b = body("ok@example.com", BloodGroup::APos, "Lahore");
        b.phone = "12345".into();
        let err = create_donor(&store, b).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        b = body("ok@example.com", BloodGroup::APos, "   ");
        let err = create_donor(&store, b).await.unwrap_err();
        assert_eq!(err.to_string(), "City is required");
    }

    #[tokio::test]
    async fn duplicate_email_is_reported() {
        let store = MemoryStore::new();
        create_donor(&store, body("same@example.com", BloodGroup::APos, "Lahore"))
            .await
            .unwrap();
        let err = create_donor(&store, body("SAME@example.com", BloodGroup::BPos, "Karachi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));
    }

    #[tokio::test]
    async fn pending_is_not_a_valid_decision() {
        let store = MemoryStore::new();
        let d = create_donor(&store, body("p@example.com", BloodGroup::OPos, "Islamabad"))
            .await
            .unwrap();
        let err = set_donor_approval(&store, d.id, "pending").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        let err = set_donor_approval(&store, d.id, "maybe").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        let after = store.get_donor(d.id).await.unwrap().unwrap();
        assert_eq!(after.approval_status, ApprovalStatus::Pending);
    }

    #[tokio::test]
    async fn rejection_is_final() {
        let store = MemoryStore::new();
        let d = create_donor(&store, body("r@example.com", BloodGroup::OPos, "Islamabad"))
            .await
            .unwrap();
        set_donor_approval(&store, d.id, "rejected").await.unwrap();
        let err = set_donor_approval(&store, d.id, "approved").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn unknown_donor_is_not_found() {
        let store = MemoryStore::new();
        let err = set_donor_approval(&store, Uuid::new_v4(), "approved")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn matching_filters_group_status_and_city() {
        let store = MemoryStore::new();
        let hit = approved(&store, "a@example.com", BloodGroup::OPos, "Islamabad").await;
        approved(&store, "b@example.com", BloodGroup::APos, "Islamabad").await;
        create_donor(&store, body("c@example.com", BloodGroup::OPos, "Islamabad"))
            .await
            .unwrap();
        approved(&store, "d@example.com", BloodGroup::OPos, "Multan").await;

        let found = match_donors(&store, BloodGroup::OPos, Some("islamabad"), OffsetDateTime::now_utc())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].donor.id, hit.id);
        assert_eq!(
            found[0].eligibility,
            Eligibility::Eligible {
                days_since_last_donation: None
            }
        );
    }

    #[tokio::test]
    async fn request_matching_requires_approval() {
        use crate::{models::UrgencyLevel, requests::repo_types::NewBloodRequest};

        let store = MemoryStore::new();
        approved(&store, "m@example.com", BloodGroup::ANeg, "Faisalabad").await;
        let request = store
            .create_request(NewBloodRequest {
                patient_name: "Zara".into(),
                blood_group: BloodGroup::ANeg,
                units_needed: 1,
                urgency_level: UrgencyLevel::Normal,
                location: "Faisalabad".into(),
                hospital_name: "Allied".into(),
                contact_person: "Imran".into(),
                contact_phone: "03211234567".into(),
                contact_whatsapp: None,
                remarks: None,
            })
            .await
            .unwrap();
        let now = OffsetDateTime::now_utc();

        let err = match_donors_for_request(&store, request.id, now).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        store
            .set_request_approval(request.id, ApprovalStatus::Pending, ApprovalStatus::Approved)
            .await
            .unwrap();
        let found = match_donors_for_request(&store, request.id, now).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn blood_group_from_query_string() {
        assert_eq!(parse_blood_group("O+").unwrap(), BloodGroup::OPos);
        assert_eq!(parse_blood_group("O ").unwrap(), BloodGroup::OPos);
        assert_eq!(parse_blood_group("AB ").unwrap(), BloodGroup::AbPos);
        assert_eq!(parse_blood_group("B-").unwrap(), BloodGroup::BNeg);
        assert!(matches!(parse_blood_group("Z+"), Err(AppError::Validation(_))));
    }
}
