//! Access rules for per-student resources.
//!
//! Every handler that exposes data belonging to a particular student asks
//! [`authorize`] before touching it, so the rules live in one place.

use tracing::warn;

use crate::data::{Role, User};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReadStudentData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Mentors may read any student's data; students only their own.
pub fn authorize(requester: &User, owner_id: &str, action: Action) -> Decision {
    match action {
        Action::ReadStudentData => {
            if requester.role == Role::Mentor || requester.id == owner_id {
                Decision::Allow
            } else {
                Decision::Deny
            }
        }
    }
}

/// [`authorize`] as a `Result`, for use with `?` in handlers.
pub fn require(requester: &User, owner_id: &str, action: Action) -> Result<(), AppError> {
    match authorize(requester, owner_id, action) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            warn!(requester = %requester.id, owner = %owner_id, ?action, "access denied");
            Err(AppError::Forbidden(
                "Not authorized to access this student's data".into(),
            ))
        }
    }
}
