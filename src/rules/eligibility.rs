use serde::Serialize;
use time::OffsetDateTime;

/// Minimum interval between two donations.
pub const COOLDOWN_DAYS: i64 = 90;
/// Donors this close to the end of their cooldown are reported as "eligible soon".
pub const SOON_WINDOW_DAYS: i64 = 14;

const DAY_MS: i128 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Eligibility {
    Eligible {
        #[serde(rename = "daysSinceLastDonation", skip_serializing_if = "Option::is_none")]
        days_since_last_donation: Option<i64>,
    },
    EligibleSoon {
        #[serde(rename = "daysRemaining")]
        days_remaining: i64,
    },
    NotEligible {
        #[serde(rename = "daysRemaining")]
        days_remaining: i64,
    },
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible { .. })
    }
}

/// Whole days elapsed since `since`, rounded up.
pub fn days_since(since: OffsetDateTime, now: OffsetDateTime) -> i64 {
    let ms = (now - since).whole_milliseconds();
    // ceil(ms / DAY_MS) for any sign of ms
    (ms + DAY_MS - 1).div_euclid(DAY_MS) as i64
}

pub fn evaluate(last_donation: Option<OffsetDateTime>, now: OffsetDateTime) -> Eligibility {
    let Some(last) = last_donation else {
        return Eligibility::Eligible {
            days_since_last_donation: None,
        };
    };

    let days = days_since(last, now);
    if days >= COOLDOWN_DAYS {
        return Eligibility::Eligible {
            days_since_last_donation: Some(days),
        };
    }

    let days_remaining = COOLDOWN_DAYS - days;
    if days_remaining <= SOON_WINDOW_DAYS {
        Eligibility::EligibleSoon { days_remaining }
    } else {
        Eligibility::NotEligible { days_remaining }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::datetime, Duration};

    const NOW: OffsetDateTime = datetime!(2025-03-10 12:00 UTC);

    #[test]
    fn never_donated_is_eligible() {
        assert_eq!(
            evaluate(None, NOW),
            Eligibility::Eligible {
                days_since_last_donation: None
            }
        );
    }

    #[test]
    fn exactly_ninety_days_is_eligible() {
        let e = evaluate(Some(NOW - Duration::days(90)), NOW);
        assert_eq!(
            e,
            Eligibility::Eligible {
                days_since_last_donation: Some(90)
            }
        );
        assert!(e.is_eligible());
    }

    #[test]
    fn eighty_days_is_eligible_soon() {
        let e = evaluate(Some(NOW - Duration::days(80)), NOW);
        assert_eq!(e, Eligibility::EligibleSoon { days_remaining: 10 });
        assert!(!e.is_eligible());
    }

    #[test]
    fn ten_days_is_not_eligible() {
        let e = evaluate(Some(NOW - Duration::days(10)), NOW);
        assert_eq!(e, Eligibility::NotEligible { days_remaining: 80 });
    }

    #[test]
    fn soon_window_boundary() {
        assert_eq!(
            evaluate(Some(NOW - Duration::days(76)), NOW),
            Eligibility::EligibleSoon { days_remaining: 14 }
        );
        assert_eq!(
            evaluate(Some(NOW - Duration::days(75)), NOW),
            Eligibility::NotEligible { days_remaining: 15 }
        );
    }

    #[test]
    fn partial_days_round_up() {
        assert_eq!(days_since(NOW - Duration::hours(1), NOW), 1);
        assert_eq!(days_since(NOW - Duration::days(89) - Duration::minutes(5), NOW), 90);
        assert_eq!(days_since(NOW, NOW), 0);
        assert_eq!(days_since(NOW + Duration::hours(12), NOW), 0);
        assert_eq!(days_since(NOW + Duration::days(1), NOW), -1);
    }

    #[test]
    fn evaluation_is_repeatable() {
        let last = Some(NOW - Duration::days(33));
        assert_eq!(evaluate(last, NOW), evaluate(last, NOW));
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_value(Eligibility::EligibleSoon { days_remaining: 3 }).unwrap();
        assert_eq!(json["status"], "eligible_soon");
        assert_eq!(json["daysRemaining"], 3);

        let json = serde_json::to_value(evaluate(None, NOW)).unwrap();
        assert_eq!(json["status"], "eligible");
        assert!(json.get("daysSinceLastDonation").is_none());
    }
}
