use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, FixedOffset, NaiveDate};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{tour, tour_booking};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::guard::{owned_or_not_found, scope_to_owner};
use crate::handlers::{ensure_user_exists, to_column};
use crate::lifecycle::{resolve_owner, StatusFlags, StatusPatch};
use crate::middleware::auth::CurrentUser;
use crate::money::Money;
use crate::pricing::price_tour;
use crate::utils::time::now;
use crate::AppState;

const LABEL: &str = "Tour booking";

#[derive(Debug, Deserialize)]
pub struct CreateTourBookingRequest {
    pub tour_id: Uuid,
    pub persons: i64,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTourBookingRequest {
    pub tour_id: Option<Uuid>,
    pub persons: Option<i64>,
    pub user_id: Option<Uuid>,
    #[serde(flatten)]
    pub status: StatusPatch,
}

#[derive(Debug, Deserialize)]
pub struct TourQuoteRequest {
    pub tour_id: Uuid,
    pub persons: i64,
}

#[derive(Debug, Serialize)]
pub struct TourQuoteResponse {
    pub tour_id: Uuid,
    pub tour_name: String,
    pub tour_date: NaiveDate,
    pub price_per_person: Money,
    pub persons: u32,
    pub total_price: Money,
}

#[derive(Debug, Serialize)]
pub struct TourBookingResponse {
    pub id: Uuid,
    pub tour_id: Uuid,
    pub user_id: Uuid,
    pub persons: i32,
    pub total_price: Money,
    pub booking_status: bool,
    pub payment_status: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl From<tour_booking::Model> for TourBookingResponse {
    fn from(b: tour_booking::Model) -> Self {
        TourBookingResponse {
            id: b.id,
            tour_id: b.tour_id,
            user_id: b.user_id,
            persons: b.persons,
            total_price: Money::from_cents(b.total_price_cents),
            booking_status: b.booking_status,
            payment_status: b.payment_status,
            created_at: b.created_at,
        }
    }
}

async fn find_tour<C: ConnectionTrait>(conn: &C, tour_id: Uuid) -> AppResult<tour::Model> {
    tour::Entity::find_by_id(tour_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Tour not found".to_string()))
}

async fn ensure_places<C: ConnectionTrait>(
    conn: &C,
    tour: &tour::Model,
    requested: i32,
    excluding: Option<Uuid>,
) -> AppResult<()> {
    let mut query = tour_booking::Entity::find().filter(tour_booking::Column::TourId.eq(tour.id));
    if let Some(id) = excluding {
        query = query.filter(tour_booking::Column::Id.ne(id));
    }

    let booked: i64 = query
        .all(conn)
        .await?
        .iter()
        .map(|b| i64::from(b.persons))
        .sum();

    let available = (i64::from(tour.max_capacity) - booked).max(0);
    if i64::from(requested) > available {
        return Err(AppError::BadRequest(format!(
            "Only {} places available",
            available
        )));
    }

    Ok(())
}

pub async fn calculate_price(
    State(state): State<AppState>,
    AppJson(payload): AppJson<TourQuoteRequest>,
) -> AppResult<Json<TourQuoteResponse>> {
    let tour = find_tour(&state.db, payload.tour_id).await?;
    let price_per_person = Money::from_cents(tour.price_per_person_cents);
    let quote = price_tour(price_per_person, payload.persons)?;

    Ok(Json(TourQuoteResponse {
        tour_id: tour.id,
        tour_name: tour.name,
        tour_date: tour.tour_date,
        price_per_person,
        persons: quote.persons,
        total_price: quote.total_price,
    }))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
) -> AppResult<Json<Vec<TourBookingResponse>>> {
    let bookings = scope_to_owner(
        tour_booking::Entity::find(),
        tour_booking::Column::UserId,
        &actor,
    )
    .order_by_desc(tour_booking::Column::CreatedAt)
    .all(&state.db)
    .await?;

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TourBookingResponse>> {
    let booking = tour_booking::Entity::find_by_id(id).one(&state.db).await?;
    let booking = owned_or_not_found(booking, |b| b.user_id, &actor, LABEL)?;

    Ok(Json(booking.into()))
}

pub async fn create_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    AppJson(payload): AppJson<CreateTourBookingRequest>,
) -> AppResult<(StatusCode, Json<TourBookingResponse>)> {
    let owner = resolve_owner(&actor, payload.user_id, None)?;
    let flags = StatusFlags::INITIAL;

    let txn = state.db.begin().await?;

    if owner != actor.id {
        ensure_user_exists(&txn, owner).await?;
    }

    let tour = find_tour(&txn, payload.tour_id).await?;
    let quote = price_tour(Money::from_cents(tour.price_per_person_cents), payload.persons)?;
    let persons = to_column("persons", quote.persons)?;
    ensure_places(&txn, &tour, persons, None).await?;

    let booking = tour_booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        tour_id: Set(tour.id),
        user_id: Set(owner),
        persons: Set(persons),
        total_price_cents: Set(quote.total_price.to_cents()?),
        booking_status: Set(flags.booking_status),
        payment_status: Set(flags.payment_status),
        created_at: Set(now()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        tour_id = %tour.id,
        persons,
        total = %quote.total_price,
        "Tour booked"
    );

    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// Serves both `PUT` and `PATCH`.
pub async fn update_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateTourBookingRequest>,
) -> AppResult<Json<TourBookingResponse>> {
    let txn = state.db.begin().await?;

    let existing = tour_booking::Entity::find_by_id(id).one(&txn).await?;
    let existing = owned_or_not_found(existing, |b| b.user_id, &actor, LABEL)?;

    let owner = resolve_owner(&actor, payload.user_id, Some(existing.user_id))?;
    if owner != existing.user_id {
        ensure_user_exists(&txn, owner).await?;
    }

    let tour = find_tour(&txn, payload.tour_id.unwrap_or(existing.tour_id)).await?;
    let requested = payload.persons.unwrap_or(i64::from(existing.persons));
    let quote = price_tour(Money::from_cents(tour.price_per_person_cents), requested)?;
    let persons = to_column("persons", quote.persons)?;
    ensure_places(&txn, &tour, persons, Some(existing.id)).await?;

    let flags = StatusFlags {
        booking_status: existing.booking_status,
        payment_status: existing.payment_status,
    }
    .apply(&payload.status);

    let mut active: tour_booking::ActiveModel = existing.into();
    active.tour_id = Set(tour.id);
    active.user_id = Set(owner);
    active.persons = Set(persons);
    active.total_price_cents = Set(quote.total_price.to_cents()?);
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
    let booking = tour_booking::Entity::find_by_id(id).one(&state.db).await?;
    let booking = owned_or_not_found(booking, |b| b.user_id, &actor, LABEL)?;

    tour_booking::Entity::delete_by_id(booking.id)
        .exec(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
