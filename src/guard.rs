//! Ownership rules for booking-like records.
//!
//! A record is visible to its owner and to staff. Asking for somebody else's
//! record by id answers 404 so existence is not leaked; refusing a verb on a
//! collection answers 403.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;

pub fn can_access(owner: Uuid, actor: &CurrentUser) -> bool {
    actor.is_staff || owner == actor.id
}

/// Passes the record through when `actor` may see it, otherwise reports it
/// as missing.
pub fn owned_or_not_found<T>(
    record: Option<T>,
    owner: impl Fn(&T) -> Uuid,
    actor: &CurrentUser,
    label: &str,
) -> AppResult<T> {
    record
        .filter(|r| can_access(owner(r), actor))
        .ok_or_else(|| AppError::NotFound(format!("{} not found", label)))
}

/// Restricts a listing to the actor's own rows unless the actor is staff.
pub fn scope_to_owner<E: EntityTrait>(
    select: Select<E>,
    owner_column: E::Column,
    actor: &CurrentUser,
) -> Select<E> {
    if actor.is_staff {
        select
    } else {
        select.filter(owner_column.eq(actor.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::room_booking;
    use sea_orm::{DbBackend, QueryTrait};

    fn actor(id: u128, is_staff: bool) -> CurrentUser {
        CurrentUser {
            id: Uuid::from_u128(id),
            email: format!("user{}@example.com", id),
            name: "Test".to_string(),
            is_staff,
            token: String::new(),
        }
    }

    #[test]
    fn test_owner_and_staff_can_access() {
        let owner = Uuid::from_u128(1);
        assert!(can_access(owner, &actor(1, false)));
        assert!(can_access(owner, &actor(2, true)));
        assert!(!can_access(owner, &actor(2, false)));
    }

    #[test]
    fn test_foreign_record_is_not_found() {
        let record = Some(Uuid::from_u128(1));
        let result = owned_or_not_found(record, |owner| *owner, &actor(2, false), "Room booking");
        match result {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Room booking not found"),
            other => panic!("expected not found, got {:?}", other),
        }

        let visible = owned_or_not_found(record, |owner| *owner, &actor(1, false), "Room booking");
        assert_eq!(visible.unwrap(), Uuid::from_u128(1));
    }

    #[test]
    fn test_listing_scope() {
        let base = room_booking::Entity::find();
        let staff_sql = scope_to_owner(base.clone(), room_booking::Column::UserId, &actor(9, true))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(!staff_sql.contains("WHERE"));

        let owner_sql = scope_to_owner(base, room_booking::Column::UserId, &actor(9, false))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(owner_sql.contains(r#"WHERE "room_booking"."user_id" ="#));
    }
}
