use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{destination, tour};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::{positive, price_cents};
use crate::money::Money;
use crate::AppState;

// ============ Destinations ============

#[derive(Debug, Deserialize)]
pub struct DestinationRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
}

pub async fn list_destinations(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<destination::Model>>> {
    let destinations = destination::Entity::find()
        .order_by_asc(destination::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(destinations))
}

pub async fn get_destination(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<destination::Model>> {
    let destination = destination::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Destination not found".to_string()))?;

    Ok(Json(destination))
}

pub async fn create_destination(
    State(state): State<AppState>,
    AppJson(payload): AppJson<DestinationRequest>,
) -> AppResult<(StatusCode, Json<destination::Model>)> {
    let destination = destination::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        category: Set(payload.category),
        description: Set(payload.description),
        location: Set(payload.location),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(destination)))
}

pub async fn update_destination(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<DestinationRequest>,
) -> AppResult<Json<destination::Model>> {
    let existing = destination::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Destination not found".to_string()))?;

    let mut active: destination::ActiveModel = existing.into();
    active.name = Set(payload.name);
    active.category = Set(payload.category);
    active.description = Set(payload.description);
    active.location = Set(payload.location);

    Ok(Json(active.update(&state.db).await?))
}

pub async fn delete_destination(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let result = destination::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Destination not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ============ Tours ============

#[derive(Debug, Deserialize)]
pub struct TourRequest {
    pub destination_id: Uuid,
    pub name: String,
    pub tour_type: String,
    pub duration: String,
    pub price_per_person: Money,
    pub max_capacity: i32,
    pub tour_date: NaiveDate,
    #[serde(default)]
    pub guide_name: String,
}

#[derive(Debug, Serialize)]
pub struct TourResponse {
    pub id: Uuid,
    pub destination_id: Uuid,
    pub name: String,
    pub tour_type: String,
    pub duration: String,
    pub price_per_person: Money,
    pub max_capacity: i32,
    pub tour_date: NaiveDate,
    pub guide_name: String,
}

impl From<tour::Model> for TourResponse {
    fn from(tour: tour::Model) -> Self {
        TourResponse {
            id: tour.id,
            destination_id: tour.destination_id,
            name: tour.name,
            tour_type: tour.tour_type,
            duration: tour.duration,
            price_per_person: Money::from_cents(tour.price_per_person_cents),
            max_capacity: tour.max_capacity,
            tour_date: tour.tour_date,
            guide_name: tour.guide_name,
        }
    }
}

async fn ensure_destination(state: &AppState, id: Uuid) -> AppResult<()> {
    destination::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::validation("destination_id", "Destination does not exist."))
}

pub async fn list_tours(State(state): State<AppState>) -> AppResult<Json<Vec<TourResponse>>> {
    let tours = tour::Entity::find()
        .order_by_asc(tour::Column::TourDate)
        .all(&state.db)
        .await?;

    Ok(Json(tours.into_iter().map(Into::into).collect()))
}

pub async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TourResponse>> {
    let tour = tour::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tour not found".to_string()))?;

    Ok(Json(tour.into()))
}

pub async fn create_tour(
    State(state): State<AppState>,
    AppJson(payload): AppJson<TourRequest>,
) -> AppResult<(StatusCode, Json<TourResponse>)> {
    let price = price_cents("price_per_person", payload.price_per_person)?;
    positive("max_capacity", payload.max_capacity)?;
    ensure_destination(&state, payload.destination_id).await?;

    let tour = tour::ActiveModel {
        id: Set(Uuid::new_v4()),
        destination_id: Set(payload.destination_id),
        name: Set(payload.name),
        tour_type: Set(payload.tour_type),
        duration: Set(payload.duration),
        price_per_person_cents: Set(price),
        max_capacity: Set(payload.max_capacity),
        tour_date: Set(payload.tour_date),
        guide_name: Set(payload.guide_name),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(tour.into())))
}

pub async fn update_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<TourRequest>,
) -> AppResult<Json<TourResponse>> {
    let price = price_cents("price_per_person", payload.price_per_person)?;
    positive("max_capacity", payload.max_capacity)?;

    let existing = tour::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tour not found".to_string()))?;
    ensure_destination(&state, payload.destination_id).await?;

    let mut active: tour::ActiveModel = existing.into();
    active.destination_id = Set(payload.destination_id);
    active.name = Set(payload.name);
    active.tour_type = Set(payload.tour_type);
    active.duration = Set(payload.duration);
    active.price_per_person_cents = Set(price);
    active.max_capacity = Set(payload.max_capacity);
    active.tour_date = Set(payload.tour_date);
    active.guide_name = Set(payload.guide_name);

    Ok(Json(active.update(&state.db).await?.into()))
}

pub async fn delete_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let result = tour::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Tour not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
