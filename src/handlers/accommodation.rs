use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{accommodation, room_type};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::{positive, price_cents};
use crate::money::Money;
use crate::AppState;

// ============ Accommodations ============

#[derive(Debug, Deserialize)]
pub struct AccommodationRequest {
    pub name: String,
    pub location: String,
    pub star_rating: i32,
    pub total_rooms: i32,
    #[serde(default)]
    pub amenities: String,
    pub accommodation_type: String,
    #[serde(default)]
    pub contact_info: String,
}

impl AccommodationRequest {
    fn validate(&self) -> AppResult<()> {
        if !(1..=5).contains(&self.star_rating) {
            return Err(AppError::validation("star_rating", "Star rating must be between 1 and 5."));
        }
        positive("total_rooms", self.total_rooms)?;
        Ok(())
    }
}

pub async fn list_accommodations(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<accommodation::Model>>> {
    let accommodations = accommodation::Entity::find()
        .order_by_asc(accommodation::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(accommodations))
}

pub async fn get_accommodation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<accommodation::Model>> {
    let accommodation = accommodation::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Accommodation not found".to_string()))?;

    Ok(Json(accommodation))
}

pub async fn create_accommodation(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AccommodationRequest>,
) -> AppResult<(StatusCode, Json<accommodation::Model>)> {
    payload.validate()?;

    let accommodation = accommodation::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        location: Set(payload.location),
        star_rating: Set(payload.star_rating),
        total_rooms: Set(payload.total_rooms),
        amenities: Set(payload.amenities),
        accommodation_type: Set(payload.accommodation_type),
        contact_info: Set(payload.contact_info),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(accommodation)))
}

pub async fn update_accommodation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<AccommodationRequest>,
) -> AppResult<Json<accommodation::Model>> {
    payload.validate()?;

    let existing = accommodation::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Accommodation not found".to_string()))?;

    let mut active: accommodation::ActiveModel = existing.into();
    active.name = Set(payload.name);
    active.location = Set(payload.location);
    active.star_rating = Set(payload.star_rating);
    active.total_rooms = Set(payload.total_rooms);
    active.amenities = Set(payload.amenities);
    active.accommodation_type = Set(payload.accommodation_type);
    active.contact_info = Set(payload.contact_info);

    Ok(Json(active.update(&state.db).await?))
}

pub async fn delete_accommodation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let result = accommodation::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Accommodation not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ============ Room types ============

#[derive(Debug, Deserialize)]
pub struct RoomTypeRequest {
    pub accommodation_id: Uuid,
    pub name: String,
    pub price_per_night: Money,
    pub max_occupancy: i32,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct RoomTypeResponse {
    pub id: Uuid,
    pub accommodation_id: Uuid,
    pub name: String,
    pub price_per_night: Money,
    pub max_occupancy: i32,
    pub available: bool,
}

impl From<room_type::Model> for RoomTypeResponse {
    fn from(room: room_type::Model) -> Self {
        RoomTypeResponse {
            id: room.id,
            accommodation_id: room.accommodation_id,
            name: room.name,
            price_per_night: Money::from_cents(room.price_per_night_cents),
            max_occupancy: room.max_occupancy,
            available: room.available,
        }
    }
}

async fn ensure_accommodation(state: &AppState, id: Uuid) -> AppResult<()> {
    accommodation::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::validation("accommodation_id", "Accommodation does not exist."))
}

pub async fn list_room_types(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RoomTypeResponse>>> {
    let rooms = room_type::Entity::find()
        .order_by_asc(room_type::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(rooms.into_iter().map(Into::into).collect()))
}

pub async fn get_room_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RoomTypeResponse>> {
    let room = room_type::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Room type not found".to_string()))?;

    Ok(Json(room.into()))
}

pub async fn create_room_type(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RoomTypeRequest>,
) -> AppResult<(StatusCode, Json<RoomTypeResponse>)> {
    let price = price_cents("price_per_night", payload.price_per_night)?;
    positive("max_occupancy", payload.max_occupancy)?;
    ensure_accommodation(&state, payload.accommodation_id).await?;

    let room = room_type::ActiveModel {
        id: Set(Uuid::new_v4()),
        accommodation_id: Set(payload.accommodation_id),
        name: Set(payload.name),
        price_per_night_cents: Set(price),
        max_occupancy: Set(payload.max_occupancy),
        available: Set(payload.available),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(room.into())))
}

pub async fn update_room_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<RoomTypeRequest>,
) -> AppResult<Json<RoomTypeResponse>> {
    let price = price_cents("price_per_night", payload.price_per_night)?;
    positive("max_occupancy", payload.max_occupancy)?;

    let existing = room_type::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Room type not found".to_string()))?;
    ensure_accommodation(&state, payload.accommodation_id).await?;

    let mut active: room_type::ActiveModel = existing.into();
    active.accommodation_id = Set(payload.accommodation_id);
    active.name = Set(payload.name);
    active.price_per_night_cents = Set(price);
    active.max_occupancy = Set(payload.max_occupancy);
    active.available = Set(payload.available);

    Ok(Json(active.update(&state.db).await?.into()))
}

pub async fn delete_room_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let result = room_type::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Room type not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
