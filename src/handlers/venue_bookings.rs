use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{event, event_promotion, venue_booking};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::guard::{owned_or_not_found, scope_to_owner};
use crate::handlers::{ensure_user_exists, to_column};
use crate::lifecycle::{resolve_owner, StatusFlags, StatusPatch};
use crate::middleware::auth::CurrentUser;
use crate::money::Money;
use crate::pricing::{price_event_tickets, select_promotion, Promotion, TicketQuote};
use crate::utils::time::now;
use crate::AppState;

const LABEL: &str = "Venue booking";

#[derive(Debug, Deserialize)]
pub struct CreateVenueBookingRequest {
    pub event_id: Uuid,
    pub number_of_tickets: i64,
    pub booking_date: Option<DateTime<FixedOffset>>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVenueBookingRequest {
    pub event_id: Option<Uuid>,
    pub number_of_tickets: Option<i64>,
    pub booking_date: Option<DateTime<FixedOffset>>,
    pub user_id: Option<Uuid>,
    #[serde(flatten)]
    pub status: StatusPatch,
}

#[derive(Debug, Deserialize)]
pub struct VenueQuoteRequest {
    pub event_id: Uuid,
    pub number_of_tickets: i64,
}

#[derive(Debug, Serialize)]
pub struct VenueQuoteResponse {
    pub event_id: Uuid,
    pub event_name: String,
    pub number_of_tickets: u32,
    pub entry_fee: Money,
    pub promotion_id: Option<Uuid>,
    pub discount: Decimal,
    pub base_amount: Money,
    pub discount_amount: Money,
    pub total_amount: Money,
}

#[derive(Debug, Serialize)]
pub struct VenueBookingResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub promotion_id: Option<Uuid>,
    pub booking_date: DateTime<FixedOffset>,
    pub number_of_tickets: i32,
    pub base_amount: Money,
    pub discount_amount: Money,
    pub total_amount: Money,
    pub booking_status: bool,
    pub payment_status: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl From<venue_booking::Model> for VenueBookingResponse {
    fn from(b: venue_booking::Model) -> Self {
        VenueBookingResponse {
            id: b.id,
            event_id: b.event_id,
            user_id: b.user_id,
            promotion_id: b.promotion_id,
            booking_date: b.booking_date,
            number_of_tickets: b.number_of_tickets,
            base_amount: Money::from_cents(b.base_amount_cents),
            discount_amount: Money::from_cents(b.discount_amount_cents),
            total_amount: Money::from_cents(b.total_amount_cents),
            booking_status: b.booking_status,
            payment_status: b.payment_status,
            created_at: b.created_at,
        }
    }
}

struct PricedTickets {
    event: event::Model,
    promotion_id: Option<Uuid>,
    quote: TicketQuote,
}

/// Prices tickets for `event_id` with the best promotion active on `on_date`.
async fn price_tickets<C: ConnectionTrait>(
    conn: &C,
    event_id: Uuid,
    tickets: i64,
    on_date: NaiveDate,
) -> AppResult<PricedTickets> {
    let event = event::Entity::find_by_id(event_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let promotions: Vec<Promotion> = event_promotion::Entity::find()
        .filter(event_promotion::Column::EventId.eq(event.id))
        .all(conn)
        .await?
        .iter()
        .map(event_promotion::Model::to_promotion)
        .collect();

    let promotion = select_promotion(&promotions, on_date);
    let quote = price_event_tickets(Money::from_cents(event.entry_fee_cents), tickets, promotion)?;

    Ok(PricedTickets {
        promotion_id: promotion.map(|p| p.id),
        event,
        quote,
    })
}

/// Rejects the request when the event cannot seat `requested` more people.
async fn ensure_seats<C: ConnectionTrait>(
    conn: &C,
    event: &event::Model,
    requested: i32,
    excluding: Option<Uuid>,
) -> AppResult<()> {
    let mut query =
        venue_booking::Entity::find().filter(venue_booking::Column::EventId.eq(event.id));
    if let Some(id) = excluding {
        query = query.filter(venue_booking::Column::Id.ne(id));
    }

    let booked: i64 = query
        .all(conn)
        .await?
        .iter()
        .map(|b| i64::from(b.number_of_tickets))
        .sum();

    let available = (i64::from(event.max_participants) - booked).max(0);
    if i64::from(requested) > available {
        return Err(AppError::BadRequest(format!(
            "Only {} tickets available",
            available
        )));
    }

    Ok(())
}

/// Quote tickets at today's promotions without booking them
pub async fn calculate_price(
    State(state): State<AppState>,
    AppJson(payload): AppJson<VenueQuoteRequest>,
) -> AppResult<Json<VenueQuoteResponse>> {
    let today = now().date_naive();
    let priced =
        price_tickets(&state.db, payload.event_id, payload.number_of_tickets, today).await?;

    Ok(Json(VenueQuoteResponse {
        event_id: priced.event.id,
        event_name: priced.event.name,
        number_of_tickets: priced.quote.tickets,
        entry_fee: Money::from_cents(priced.event.entry_fee_cents),
        promotion_id: priced.promotion_id,
        discount: priced.quote.discount.normalize(),
        base_amount: priced.quote.base_amount,
        discount_amount: priced.quote.discount_amount,
        total_amount: priced.quote.total_amount,
    }))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
) -> AppResult<Json<Vec<VenueBookingResponse>>> {
    let bookings = scope_to_owner(
        venue_booking::Entity::find(),
        venue_booking::Column::UserId,
        &actor,
    )
    .order_by_desc(venue_booking::Column::CreatedAt)
    .all(&state.db)
    .await?;

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<VenueBookingResponse>> {
    let booking = venue_booking::Entity::find_by_id(id).one(&state.db).await?;
    let booking = owned_or_not_found(booking, |b| b.user_id, &actor, LABEL)?;

    Ok(Json(booking.into()))
}

pub async fn create_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    AppJson(payload): AppJson<CreateVenueBookingRequest>,
) -> AppResult<(StatusCode, Json<VenueBookingResponse>)> {
    let owner = resolve_owner(&actor, payload.user_id, None)?;
    let flags = StatusFlags::INITIAL;
    let booking_date = payload.booking_date.unwrap_or_else(now);

    let txn = state.db.begin().await?;

    if owner != actor.id {
        ensure_user_exists(&txn, owner).await?;
    }

    let priced = price_tickets(
        &txn,
        payload.event_id,
        payload.number_of_tickets,
        booking_date.date_naive(),
    )
    .await?;
    let tickets = to_column("number_of_tickets", priced.quote.tickets)?;
    ensure_seats(&txn, &priced.event, tickets, None).await?;

    let booking = venue_booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        event_id: Set(priced.event.id),
        user_id: Set(owner),
        promotion_id: Set(priced.promotion_id),
        booking_date: Set(booking_date),
        number_of_tickets: Set(tickets),
        base_amount_cents: Set(priced.quote.base_amount.to_cents()?),
        discount_amount_cents: Set(priced.quote.discount_amount.to_cents()?),
        total_amount_cents: Set(priced.quote.total_amount.to_cents()?),
        booking_status: Set(flags.booking_status),
        payment_status: Set(flags.payment_status),
        created_at: Set(now()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        event_id = %booking.event_id,
        tickets = booking.number_of_tickets,
        total = %priced.quote.total_amount,
        "Venue booking created"
    );

    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// Serves both `PUT` and `PATCH`; amounts and the promotion are always
/// re-derived from the stored event.
pub async fn update_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateVenueBookingRequest>,
) -> AppResult<Json<VenueBookingResponse>> {
    let txn = state.db.begin().await?;

    let existing = venue_booking::Entity::find_by_id(id).one(&txn).await?;
    let existing = owned_or_not_found(existing, |b| b.user_id, &actor, LABEL)?;

    let owner = resolve_owner(&actor, payload.user_id, Some(existing.user_id))?;
    if owner != existing.user_id {
        ensure_user_exists(&txn, owner).await?;
    }

    let event_id = payload.event_id.unwrap_or(existing.event_id);
    let requested = payload
        .number_of_tickets
        .unwrap_or(i64::from(existing.number_of_tickets));
    let booking_date = payload.booking_date.unwrap_or(existing.booking_date);

    let priced = price_tickets(&txn, event_id, requested, booking_date.date_naive()).await?;
    let tickets = to_column("number_of_tickets", priced.quote.tickets)?;
    ensure_seats(&txn, &priced.event, tickets, Some(existing.id)).await?;

    let flags = StatusFlags {
        booking_status: existing.booking_status,
        payment_status: existing.payment_status,
    }
    .apply(&payload.status);

    let mut active: venue_booking::ActiveModel = existing.into();
    active.event_id = Set(priced.event.id);
    active.user_id = Set(owner);
    active.promotion_id = Set(priced.promotion_id);
    active.booking_date = Set(booking_date);
    active.number_of_tickets = Set(tickets);
    active.base_amount_cents = Set(priced.quote.base_amount.to_cents()?);
    active.discount_amount_cents = Set(priced.quote.discount_amount.to_cents()?);
    active.total_amount_cents = Set(priced.quote.total_amount.to_cents()?);
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
    let booking = venue_booking::Entity::find_by_id(id).one(&state.db).await?;
    let booking = owned_or_not_found(booking, |b| b.user_id, &actor, LABEL)?;

    venue_booking::Entity::delete_by_id(booking.id)
        .exec(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
