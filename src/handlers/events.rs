use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{event, event_promotion};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::{discount_bps, positive, price_cents};
use crate::money::Money;
use crate::AppState;

// ============ Events ============

#[derive(Debug, Deserialize)]
pub struct EventRequest {
    pub name: String,
    pub venue: String,
    #[serde(default)]
    pub description: String,
    pub event_date: NaiveDate,
    pub entry_fee: Money,
    pub max_participants: i32,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub name: String,
    pub venue: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub entry_fee: Money,
    pub max_participants: i32,
}

impl From<event::Model> for EventResponse {
    fn from(event: event::Model) -> Self {
        EventResponse {
            id: event.id,
            name: event.name,
            venue: event.venue,
            description: event.description,
            event_date: event.event_date,
            entry_fee: Money::from_cents(event.entry_fee_cents),
            max_participants: event.max_participants,
        }
    }
}

pub async fn list_events(State(state): State<AppState>) -> AppResult<Json<Vec<EventResponse>>> {
    let events = event::Entity::find()
        .order_by_asc(event::Column::EventDate)
        .all(&state.db)
        .await?;

    Ok(Json(events.into_iter().map(Into::into).collect()))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EventResponse>> {
    let event = event::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    Ok(Json(event.into()))
}

pub async fn create_event(
    State(state): State<AppState>,
    AppJson(payload): AppJson<EventRequest>,
) -> AppResult<(StatusCode, Json<EventResponse>)> {
    let fee = price_cents("entry_fee", payload.entry_fee)?;
    positive("max_participants", payload.max_participants)?;

    let event = event::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        venue: Set(payload.venue),
        description: Set(payload.description),
        event_date: Set(payload.event_date),
        entry_fee_cents: Set(fee),
        max_participants: Set(payload.max_participants),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(event.into())))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<EventRequest>,
) -> AppResult<Json<EventResponse>> {
    let fee = price_cents("entry_fee", payload.entry_fee)?;
    positive("max_participants", payload.max_participants)?;

    let existing = event::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let mut active: event::ActiveModel = existing.into();
    active.name = Set(payload.name);
    active.venue = Set(payload.venue);
    active.description = Set(payload.description);
    active.event_date = Set(payload.event_date);
    active.entry_fee_cents = Set(fee);
    active.max_participants = Set(payload.max_participants);

    Ok(Json(active.update(&state.db).await?.into()))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let result = event::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Event not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ============ Promotions ============

#[derive(Debug, Deserialize)]
pub struct PromotionRequest {
    pub event_id: Uuid,
    pub promotion_start_date: NaiveDate,
    pub promotion_end_date: NaiveDate,
    /// Fraction of the price removed, `0.2` for twenty percent.
    pub discount: Decimal,
}

impl PromotionRequest {
    fn validate(&self) -> AppResult<i32> {
        if self.promotion_end_date < self.promotion_start_date {
            return Err(AppError::validation(
                "promotion_end_date",
                "Promotion cannot end before it starts.",
            ));
        }
        discount_bps(self.discount)
    }
}

#[derive(Debug, Serialize)]
pub struct PromotionResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub promotion_start_date: NaiveDate,
    pub promotion_end_date: NaiveDate,
    pub discount: Decimal,
}

impl From<event_promotion::Model> for PromotionResponse {
    fn from(promotion: event_promotion::Model) -> Self {
        PromotionResponse {
            id: promotion.id,
            event_id: promotion.event_id,
            promotion_start_date: promotion.promotion_start_date,
            promotion_end_date: promotion.promotion_end_date,
            discount: promotion.discount().normalize(),
        }
    }
}

async fn ensure_event(state: &AppState, id: Uuid) -> AppResult<()> {
    event::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::validation("event_id", "Event does not exist."))
}

pub async fn list_promotions(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PromotionResponse>>> {
    let promotions = event_promotion::Entity::find()
        .order_by_asc(event_promotion::Column::PromotionStartDate)
        .all(&state.db)
        .await?;

    Ok(Json(promotions.into_iter().map(Into::into).collect()))
}

pub async fn get_promotion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PromotionResponse>> {
    let promotion = event_promotion::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Promotion not found".to_string()))?;

    Ok(Json(promotion.into()))
}

pub async fn create_promotion(
    State(state): State<AppState>,
    AppJson(payload): AppJson<PromotionRequest>,
) -> AppResult<(StatusCode, Json<PromotionResponse>)> {
    let bps = payload.validate()?;
    ensure_event(&state, payload.event_id).await?;

    let promotion = event_promotion::ActiveModel {
        id: Set(Uuid::new_v4()),
        event_id: Set(payload.event_id),
        promotion_start_date: Set(payload.promotion_start_date),
        promotion_end_date: Set(payload.promotion_end_date),
        discount_bps: Set(bps),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(promotion.into())))
}

pub async fn update_promotion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<PromotionRequest>,
) -> AppResult<Json<PromotionResponse>> {
    let bps = payload.validate()?;

    let existing = event_promotion::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Promotion not found".to_string()))?;
    ensure_event(&state, payload.event_id).await?;

    let mut active: event_promotion::ActiveModel = existing.into();
    active.event_id = Set(payload.event_id);
    active.promotion_start_date = Set(payload.promotion_start_date);
    active.promotion_end_date = Set(payload.promotion_end_date);
    active.discount_bps = Set(bps);

    Ok(Json(active.update(&state.db).await?.into()))
}

pub async fn delete_promotion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let result = event_promotion::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Promotion not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
