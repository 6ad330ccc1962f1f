use crate::{
    donors::repo_types::Donor,
    models::{ApprovalStatus, BloodGroup},
};

/// Exact blood-group equality on approved donors, optionally narrowed to
/// donors whose city contains `city` ignoring case. No ABO/Rh compatibility
/// is applied.
pub fn is_match(donor: &Donor, blood_group: BloodGroup, city: Option<&str>) -> bool {
    if donor.approval_status != ApprovalStatus::Approved || donor.blood_group != blood_group {
        return false;
    }
    match normalized_city(city) {
        Some(needle) => donor.city.to_lowercase().contains(&needle),
        None => true,
    }
}

pub fn filter_matching(
    donors: impl IntoIterator<Item = Donor>,
    blood_group: BloodGroup,
    city: Option<&str>,
) -> Vec<Donor> {
    donors
        .into_iter()
        .filter(|d| is_match(d, blood_group, city))
        .collect()
}

fn normalized_city(city: Option<&str>) -> Option<String> {
    city.map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn donor(group: BloodGroup, city: &str, status: ApprovalStatus) -> Donor {
        let now = OffsetDateTime::now_utc();
        Donor {
            id: Uuid::new_v4(),
            name: "Test Donor".into(),
            email: format!("{}@example.com", Uuid::new_v4()),
            phone: "03001234567".into(),
            blood_group: group,
            city: city.into(),
            batch: None,
            whatsapp_number: None,
            last_donation_date: None,
            approval_status: status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn matches_group_and_city_substring() {
        let donors = vec![
            donor(BloodGroup::OPos, "Islamabad", ApprovalStatus::Approved),
            donor(BloodGroup::OPos, "North ISLAMABAD Sector", ApprovalStatus::Approved),
            donor(BloodGroup::APos, "Islamabad", ApprovalStatus::Approved),
            donor(BloodGroup::OPos, "Islamabad", ApprovalStatus::Pending),
            donor(BloodGroup::OPos, "Islamabad", ApprovalStatus::Rejected),
            donor(BloodGroup::OPos, "Lahore", ApprovalStatus::Approved),
        ];
        let matched = filter_matching(donors, BloodGroup::OPos, Some("Islamabad"));
        assert_eq!(matched.len(), 2);
        assert!(matched
            .iter()
            .all(|d| d.blood_group == BloodGroup::OPos
                && d.approval_status == ApprovalStatus::Approved
                && d.city.to_lowercase().contains("islamabad")));
    }

    #[test]
    fn no_city_means_any_city() {
        let donors = vec![
            donor(BloodGroup::BNeg, "Karachi", ApprovalStatus::Approved),
            donor(BloodGroup::BNeg, "Quetta", ApprovalStatus::Approved),
        ];
        assert_eq!(filter_matching(donors.clone(), BloodGroup::BNeg, None).len(), 2);
        assert_eq!(filter_matching(donors, BloodGroup::BNeg, Some("  ")).len(), 2);
    }

    #[test]
    fn universal_donor_is_not_special() {
        let o_neg = donor(BloodGroup::ONeg, "Islamabad", ApprovalStatus::Approved);
        assert!(!is_match(&o_neg, BloodGroup::AbPos, None));
    }
}
