use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{ride_booking, transportation_provider};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::guard::{owned_or_not_found, scope_to_owner};
use crate::handlers::{ensure_user_exists, to_column};
use crate::lifecycle::{resolve_owner, StatusFlags, StatusPatch};
use crate::middleware::auth::CurrentUser;
use crate::money::Money;
use crate::pricing::{distance_km, price_ride, RideQuote};
use crate::utils::time::now;
use crate::AppState;

const LABEL: &str = "Ride booking";

#[derive(Debug, Deserialize)]
pub struct CreateRideBookingRequest {
    pub provider_id: Uuid,
    pub pickup_location: String,
    pub drop_off_location: String,
    pub ride_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub distance_km: Decimal,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRideBookingRequest {
    pub provider_id: Option<Uuid>,
    pub pickup_location: Option<String>,
    pub drop_off_location: Option<String>,
    pub ride_date: Option<NaiveDate>,
    pub pickup_time: Option<NaiveTime>,
    pub distance_km: Option<Decimal>,
    pub user_id: Option<Uuid>,
    #[serde(flatten)]
    pub status: StatusPatch,
}

#[derive(Debug, Serialize)]
pub struct RideBookingResponse {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub user_id: Uuid,
    pub pickup_location: String,
    pub drop_off_location: String,
    pub ride_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub distance_km: Decimal,
    pub estimated_fare: Money,
    pub booking_status: bool,
    pub payment_status: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl From<ride_booking::Model> for RideBookingResponse {
    fn from(b: ride_booking::Model) -> Self {
        RideBookingResponse {
            id: b.id,
            provider_id: b.provider_id,
            user_id: b.user_id,
            pickup_location: b.pickup_location,
            drop_off_location: b.drop_off_location,
            ride_date: b.ride_date,
            pickup_time: b.pickup_time,
            distance_km: distance_km(b.distance_m.unsigned_abs()),
            estimated_fare: Money::from_cents(b.estimated_fare_cents),
            booking_status: b.booking_status,
            payment_status: b.payment_status,
            created_at: b.created_at,
        }
    }
}

/// Prices a ride at the provider's current fares.
async fn quote_ride<C: ConnectionTrait>(
    conn: &C,
    provider_id: Uuid,
    distance: Decimal,
) -> AppResult<(transportation_provider::Model, RideQuote)> {
    let provider = transportation_provider::Entity::find_by_id(provider_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Transportation provider not found".to_string()))?;

    let quote = price_ride(
        Money::from_cents(provider.base_fare_cents),
        Money::from_cents(provider.price_per_km_cents),
        distance,
    )?;

    Ok((provider, quote))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
) -> AppResult<Json<Vec<RideBookingResponse>>> {
    let bookings = scope_to_owner(
        ride_booking::Entity::find(),
        ride_booking::Column::UserId,
        &actor,
    )
    .order_by_desc(ride_booking::Column::CreatedAt)
    .all(&state.db)
    .await?;

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RideBookingResponse>> {
    let booking = ride_booking::Entity::find_by_id(id).one(&state.db).await?;
    let booking = owned_or_not_found(booking, |b| b.user_id, &actor, LABEL)?;

    Ok(Json(booking.into()))
}

pub async fn create_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    AppJson(payload): AppJson<CreateRideBookingRequest>,
) -> AppResult<(StatusCode, Json<RideBookingResponse>)> {
    let owner = resolve_owner(&actor, payload.user_id, None)?;
    let flags = StatusFlags::INITIAL;

    let txn = state.db.begin().await?;

    if owner != actor.id {
        ensure_user_exists(&txn, owner).await?;
    }

    let (provider, quote) = quote_ride(&txn, payload.provider_id, payload.distance_km).await?;

    let booking = ride_booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        provider_id: Set(provider.id),
        user_id: Set(owner),
        pickup_location: Set(payload.pickup_location),
        drop_off_location: Set(payload.drop_off_location),
        ride_date: Set(payload.ride_date),
        pickup_time: Set(payload.pickup_time),
        distance_m: Set(to_column("distance_km", quote.distance_m)?),
        estimated_fare_cents: Set(quote.estimated_fare.to_cents()?),
        booking_status: Set(flags.booking_status),
        payment_status: Set(flags.payment_status),
        created_at: Set(now()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        provider_id = %provider.id,
        fare = %quote.estimated_fare,
        "Ride booked"
    );

    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// Serves both `PUT` and `PATCH`; the fare follows the provider's current rates.
pub async fn update_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateRideBookingRequest>,
) -> AppResult<Json<RideBookingResponse>> {
    let txn = state.db.begin().await?;

    let existing = ride_booking::Entity::find_by_id(id).one(&txn).await?;
    let existing = owned_or_not_found(existing, |b| b.user_id, &actor, LABEL)?;

    let owner = resolve_owner(&actor, payload.user_id, Some(existing.user_id))?;
    if owner != existing.user_id {
        ensure_user_exists(&txn, owner).await?;
    }

    let distance = payload
        .distance_km
        .unwrap_or_else(|| distance_km(existing.distance_m.unsigned_abs()));
    let provider_id = payload.provider_id.unwrap_or(existing.provider_id);
    let (provider, quote) = quote_ride(&txn, provider_id, distance).await?;

    let flags = StatusFlags {
        booking_status: existing.booking_status,
        payment_status: existing.payment_status,
    }
    .apply(&payload.status);

    let mut active: ride_booking::ActiveModel = existing.into();
    active.provider_id = Set(provider.id);
    active.user_id = Set(owner);
    if let Some(pickup) = payload.pickup_location {
        active.pickup_location = Set(pickup);
    }
    if let Some(drop_off) = payload.drop_off_location {
        active.drop_off_location = Set(drop_off);
    }
    if let Some(ride_date) = payload.ride_date {
        active.ride_date = Set(ride_date);
    }
    if let Some(pickup_time) = payload.pickup_time {
        active.pickup_time = Set(pickup_time);
    }
    active.distance_m = Set(to_column("distance_km", quote.distance_m)?);
    active.estimated_fare_cents = Set(quote.estimated_fare.to_cents()?);
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
    let booking = ride_booking::Entity::find_by_id(id).one(&state.db).await?;
    let booking = owned_or_not_found(booking, |b| b.user_id, &actor, LABEL)?;

    ride_booking::Entity::delete_by_id(booking.id)
        .exec(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
