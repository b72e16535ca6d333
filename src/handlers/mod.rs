pub mod accommodation;
pub mod dining;
pub mod event_logs;
pub mod events;
pub mod online_orders;
pub mod ride_bookings;
pub mod room_bookings;
pub mod tour_bookings;
pub mod tours;
pub mod transport;
pub mod users;
pub mod venue_bookings;

use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, EntityTrait};
use uuid::Uuid;

use crate::entities::{event_promotion::DISCOUNT_SCALE, user};
use crate::error::{AppError, AppResult};
use crate::money::Money;

/// Catalog prices and fees: non-negative, stored in cents.
pub(crate) fn price_cents(field: &str, amount: Money) -> AppResult<i64> {
    if amount.is_negative() {
        return Err(AppError::validation(
            field,
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    if amount.round() != amount {
        return Err(AppError::validation(
            field,
            "Ensure that there are no more than 2 decimal places.",
        ));
    }
    Ok(amount.to_cents()?)
}

/// Counts and capacities that must be at least one.
pub(crate) fn positive(field: &str, value: i32) -> AppResult<i32> {
    if value < 1 {
        return Err(AppError::validation(
            field,
            "Ensure this value is greater than or equal to 1.",
        ));
    }
    Ok(value)
}

/// Promotion discounts are fractions in `[0, 1]` with at most four decimals.
pub(crate) fn discount_bps(discount: Decimal) -> AppResult<i32> {
    if discount < Decimal::ZERO || discount > Decimal::ONE {
        return Err(AppError::validation(
            "discount",
            "Discount must be a fraction between 0 and 1.",
        ));
    }

    let mut scaled = discount.normalize();
    if scaled.scale() > DISCOUNT_SCALE {
        return Err(AppError::validation(
            "discount",
            "Ensure that there are no more than 4 decimal places.",
        ));
    }
    scaled.rescale(DISCOUNT_SCALE);
    i32::try_from(scaled.mantissa())
        .map_err(|_| AppError::validation("discount", "Discount is out of range."))
}

/// Narrows a quantity accepted as `i64` to its `INTEGER` column.
pub(crate) fn to_column(field: &str, value: u32) -> AppResult<i32> {
    i32::try_from(value).map_err(|_| AppError::validation(field, "Value is too large."))
}

pub(crate) async fn ensure_user_exists<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<()> {
    user::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
