use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{accommodation, room_booking, room_type};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::guard::{owned_or_not_found, scope_to_owner};
use crate::handlers::ensure_user_exists;
use crate::lifecycle::{resolve_owner, StatusFlags, StatusPatch};
use crate::middleware::auth::CurrentUser;
use crate::money::Money;
use crate::pricing::{price_nights, price_room_stay};
use crate::utils::time::now;
use crate::AppState;

const LABEL: &str = "Room booking";

#[derive(Debug, Deserialize)]
pub struct CreateRoomBookingRequest {
    pub accommodation_id: Uuid,
    pub room_type_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoomBookingRequest {
    pub accommodation_id: Option<Uuid>,
    pub room_type_id: Option<Uuid>,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub user_id: Option<Uuid>,
    #[serde(flatten)]
    pub status: StatusPatch,
}

#[derive(Debug, Deserialize)]
pub struct RoomQuoteRequest {
    pub accommodation_id: Uuid,
    pub room_type_id: Uuid,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub number_of_days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RoomQuoteResponse {
    pub accommodation_id: Uuid,
    pub accommodation_name: String,
    pub room_type_id: Uuid,
    pub room_type_name: String,
    pub price_per_night: Money,
    pub number_of_days: i64,
    pub total_price: Money,
}

#[derive(Debug, Serialize)]
pub struct RoomBookingResponse {
    pub id: Uuid,
    pub accommodation_id: Uuid,
    pub room_type_id: Uuid,
    pub user_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_price: Money,
    pub booking_status: bool,
    pub payment_status: bool,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<room_booking::Model> for RoomBookingResponse {
    fn from(b: room_booking::Model) -> Self {
        RoomBookingResponse {
            id: b.id,
            accommodation_id: b.accommodation_id,
            room_type_id: b.room_type_id,
            user_id: b.user_id,
            check_in_date: b.check_in_date,
            check_out_date: b.check_out_date,
            total_price: Money::from_cents(b.total_price_cents),
            booking_status: b.booking_status,
            payment_status: b.payment_status,
            created_at: b.created_at,
        }
    }
}

/// Loads the room type and checks it is offered by the accommodation.
async fn room_in_accommodation<C: ConnectionTrait>(
    conn: &C,
    accommodation_id: Uuid,
    room_type_id: Uuid,
) -> AppResult<room_type::Model> {
    let room = room_type::Entity::find_by_id(room_type_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Room type not found".to_string()))?;

    if room.accommodation_id != accommodation_id {
        return Err(AppError::Integrity(format!(
            "Room type {} does not belong to accommodation {}",
            room_type_id, accommodation_id
        )));
    }

    Ok(room)
}

fn ensure_available(room: &room_type::Model) -> AppResult<()> {
    if !room.available {
        return Err(AppError::BadRequest(format!(
            "Room type {} is not available",
            room.name
        )));
    }
    Ok(())
}

/// Quote a stay without booking it
pub async fn calculate_price(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RoomQuoteRequest>,
) -> AppResult<Json<RoomQuoteResponse>> {
    let accommodation = accommodation::Entity::find_by_id(payload.accommodation_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Accommodation not found".to_string()))?;
    let room = room_in_accommodation(&state.db, accommodation.id, payload.room_type_id).await?;
    let nightly = Money::from_cents(room.price_per_night_cents);

    let requested = (
        payload.number_of_days,
        payload.check_in_date,
        payload.check_out_date,
    );
    let (nights, total_price) = match requested {
        (Some(days), _, _) => (days, price_nights(nightly, days)?),
        (None, Some(check_in), Some(check_out)) => (
            (check_out - check_in).num_days(),
            price_room_stay(nightly, check_in, check_out)?,
        ),
        (None, None, _) => {
            return Err(AppError::validation("check_in_date", "This field is required."));
        }
        (None, Some(_), None) => {
            return Err(AppError::validation("check_out_date", "This field is required."));
        }
    };

    Ok(Json(RoomQuoteResponse {
        accommodation_id: accommodation.id,
        accommodation_name: accommodation.name,
        room_type_id: room.id,
        room_type_name: room.name,
        price_per_night: nightly,
        number_of_days: nights,
        total_price: total_price.round(),
    }))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
) -> AppResult<Json<Vec<RoomBookingResponse>>> {
    let bookings = scope_to_owner(
        room_booking::Entity::find(),
        room_booking::Column::UserId,
        &actor,
    )
    .order_by_desc(room_booking::Column::CreatedAt)
    .all(&state.db)
    .await?;

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RoomBookingResponse>> {
    let booking = room_booking::Entity::find_by_id(id).one(&state.db).await?;
    let booking = owned_or_not_found(booking, |b| b.user_id, &actor, LABEL)?;

    Ok(Json(booking.into()))
}

pub async fn create_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    AppJson(payload): AppJson<CreateRoomBookingRequest>,
) -> AppResult<(StatusCode, Json<RoomBookingResponse>)> {
    let owner = resolve_owner(&actor, payload.user_id, None)?;
    let flags = StatusFlags::INITIAL;

    let txn = state.db.begin().await?;

    if owner != actor.id {
        ensure_user_exists(&txn, owner).await?;
    }
    let room = room_in_accommodation(&txn, payload.accommodation_id, payload.room_type_id).await?;
    ensure_available(&room)?;

    let total = price_room_stay(
        Money::from_cents(room.price_per_night_cents),
        payload.check_in_date,
        payload.check_out_date,
    )?;

    let booking = room_booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        room_type_id: Set(room.id),
        accommodation_id: Set(room.accommodation_id),
        user_id: Set(owner),
        check_in_date: Set(payload.check_in_date),
        check_out_date: Set(payload.check_out_date),
        total_price_cents: Set(total.to_cents()?),
        booking_status: Set(flags.booking_status),
        payment_status: Set(flags.payment_status),
        created_at: Set(now()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        user_id = %owner,
        total = %total,
        "Room booking created"
    );

    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// Serves both `PUT` and `PATCH`: absent fields keep their stored value and
/// the total is always recomputed.
pub async fn update_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateRoomBookingRequest>,
) -> AppResult<Json<RoomBookingResponse>> {
    let txn = state.db.begin().await?;

    let existing = room_booking::Entity::find_by_id(id).one(&txn).await?;
    let existing = owned_or_not_found(existing, |b| b.user_id, &actor, LABEL)?;

    let owner = resolve_owner(&actor, payload.user_id, Some(existing.user_id))?;
    if owner != existing.user_id {
        ensure_user_exists(&txn, owner).await?;
    }

    let accommodation_id = payload.accommodation_id.unwrap_or(existing.accommodation_id);
    let room_type_id = payload.room_type_id.unwrap_or(existing.room_type_id);
    let check_in = payload.check_in_date.unwrap_or(existing.check_in_date);
    let check_out = payload.check_out_date.unwrap_or(existing.check_out_date);

    let room = room_in_accommodation(&txn, accommodation_id, room_type_id).await?;
    if room.id != existing.room_type_id {
        ensure_available(&room)?;
    }

    let nightly = Money::from_cents(room.price_per_night_cents);
    let total = price_room_stay(nightly, check_in, check_out)?;
    let flags = StatusFlags {
        booking_status: existing.booking_status,
        payment_status: existing.payment_status,
    }
    .apply(&payload.status);

    let mut active: room_booking::ActiveModel = existing.into();
    active.accommodation_id = Set(accommodation_id);
    active.room_type_id = Set(room_type_id);
    active.user_id = Set(owner);
    active.check_in_date = Set(check_in);
    active.check_out_date = Set(check_out);
    active.total_price_cents = Set(total.to_cents()?);
    active.booking_status = Set(flags.booking_status);
    active.payment_status = Set(flags.payment_status);

    let booking = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(booking.into()))
}

pub async fn delete_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let booking = room_booking::Entity::find_by_id(id).one(&state.db).await?;
    let booking = owned_or_not_found(booking, |b| b.user_id, &actor, LABEL)?;

    room_booking::Entity::delete_by_id(booking.id)
        .exec(&state.db)
        .await?;

    tracing::info!(booking_id = %booking.id, "Room booking deleted");

    Ok(StatusCode::NO_CONTENT)
}
