//! Transition tables for the donor/request approval gate and the request
//! processing lifecycle. Anything not listed is rejected.

use std::fmt;

use crate::models::{ApprovalStatus, RequestStatus};

const APPROVAL_TRANSITIONS: &[(ApprovalStatus, ApprovalStatus)] = &[
    (ApprovalStatus::Pending, ApprovalStatus::Approved),
    (ApprovalStatus::Pending, ApprovalStatus::Rejected),
];

const REQUEST_TRANSITIONS: &[(RequestStatus, RequestStatus)] = &[
    (RequestStatus::Pending, RequestStatus::InProgress),
    (RequestStatus::InProgress, RequestStatus::Completed),
    (RequestStatus::Pending, RequestStatus::Cancelled),
    (RequestStatus::InProgress, RequestStatus::Cancelled),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot move {field} from {from} to {to}")]
pub struct TransitionError {
    pub field: &'static str,
    pub from: String,
    pub to: String,
}

pub trait Lifecycle: Copy + PartialEq + fmt::Display + 'static {
    const FIELD: &'static str;

    fn table() -> &'static [(Self, Self)];

    fn is_terminal(self) -> bool {
        !Self::table().iter().any(|(from, _)| *from == self)
    }

    fn transition(self, to: Self) -> Result<Self, TransitionError> {
        if Self::table().iter().any(|&(f, t)| f == self && t == to) {
            Ok(to)
        } else {
            Err(TransitionError {
                field: Self::FIELD,
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }
}

impl Lifecycle for ApprovalStatus {
    const FIELD: &'static str = "approvalStatus";

    fn table() -> &'static [(Self, Self)] {
        APPROVAL_TRANSITIONS
    }
}

impl Lifecycle for RequestStatus {
    const FIELD: &'static str = "status";

    fn table() -> &'static [(Self, Self)] {
        REQUEST_TRANSITIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_moves_out_of_pending_only() {
        use ApprovalStatus::*;
        assert_eq!(Pending.transition(Approved), Ok(Approved));
        assert_eq!(Pending.transition(Rejected), Ok(Rejected));
        assert!(Pending.transition(Pending).is_err());
        assert!(Approved.transition(Rejected).is_err());
        assert!(Rejected.transition(Approved).is_err());
        assert!(Approved.is_terminal());
        assert!(Rejected.is_terminal());
        assert!(!Pending.is_terminal());
    }

    #[test]
    fn request_status_table() {
        use RequestStatus::*;
        assert_eq!(Pending.transition(InProgress), Ok(InProgress));
        assert_eq!(InProgress.transition(Completed), Ok(Completed));
        assert_eq!(Pending.transition(Cancelled), Ok(Cancelled));
        assert_eq!(InProgress.transition(Cancelled), Ok(Cancelled));

        assert!(Pending.transition(Completed).is_err());
        assert!(InProgress.transition(Pending).is_err());
        assert!(Completed.transition(Cancelled).is_err());
        assert!(Cancelled.transition(Pending).is_err());
        assert!(Completed.is_terminal() && Cancelled.is_terminal());
    }

    #[test]
    fn error_message_names_field_and_states() {
        let err = RequestStatus::Completed
            .transition(RequestStatus::InProgress)
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot move status from completed to in_progress");
    }
}
