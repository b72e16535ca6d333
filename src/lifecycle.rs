//! Booking record lifecycle.
//!
//! Every booking carries two independent flags, confirmed and paid. A new
//! booking starts pending and unpaid; an owner or admin may flip either flag
//! in any order. Monetary fields are never accepted from the client and are
//! recomputed by the handlers on every write.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusFlags {
    pub booking_status: bool,
    pub payment_status: bool,
}

impl StatusFlags {
    /// Pending and unpaid.
    pub const INITIAL: StatusFlags = StatusFlags {
        booking_status: false,
        payment_status: false,
    };

    pub fn apply(self, patch: &StatusPatch) -> Self {
        StatusFlags {
            booking_status: patch.booking_status.unwrap_or(self.booking_status),
            payment_status: patch.payment_status.unwrap_or(self.payment_status),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct StatusPatch {
    pub booking_status: Option<bool>,
    pub payment_status: Option<bool>,
}

/// Decides who owns a booking being written. Without an explicit request the
/// current owner (or the actor, for a new booking) is kept; only staff may
/// name somebody else.
pub fn resolve_owner(
    actor: &CurrentUser,
    requested: Option<Uuid>,
    current: Option<Uuid>,
) -> AppResult<Uuid> {
    let fallback = current.unwrap_or(actor.id);
    match requested {
        None => Ok(fallback),
        Some(id) if id == fallback || actor.is_staff => Ok(id),
        Some(_) => Err(AppError::Forbidden(
            "Only administrators may book on behalf of another user".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(id: u128, is_staff: bool) -> CurrentUser {
        CurrentUser {
            id: Uuid::from_u128(id),
            email: "someone@example.com".to_string(),
            name: "Someone".to_string(),
            is_staff,
            token: String::new(),
        }
    }

    #[test]
    fn test_flags_change_independently() {
        let paid_first = StatusFlags::INITIAL.apply(&StatusPatch {
            booking_status: None,
            payment_status: Some(true),
        });
        assert_eq!(
            paid_first,
            StatusFlags {
                booking_status: false,
                payment_status: true
            }
        );

        let confirmed = paid_first.apply(&StatusPatch {
            booking_status: Some(true),
            payment_status: None,
        });
        assert!(confirmed.booking_status && confirmed.payment_status);

        let reverted = confirmed.apply(&StatusPatch {
            booking_status: Some(false),
            payment_status: Some(false),
        });
        assert_eq!(reverted, StatusFlags::INITIAL);
    }

    #[test]
    fn test_owner_defaults_to_actor() {
        assert_eq!(resolve_owner(&actor(1, false), None, None).unwrap(), Uuid::from_u128(1));
        assert_eq!(
            resolve_owner(&actor(1, false), Some(Uuid::from_u128(1)), None).unwrap(),
            Uuid::from_u128(1)
        );
    }

    #[test]
    fn test_only_staff_books_for_others() {
        assert!(matches!(
            resolve_owner(&actor(1, false), Some(Uuid::from_u128(2)), None),
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(
            resolve_owner(&actor(1, true), Some(Uuid::from_u128(2)), None).unwrap(),
            Uuid::from_u128(2)
        );
    }

    #[test]
    fn test_update_keeps_existing_owner() {
        let staff = actor(9, true);
        assert_eq!(
            resolve_owner(&staff, None, Some(Uuid::from_u128(3))).unwrap(),
            Uuid::from_u128(3)
        );
    }
}
