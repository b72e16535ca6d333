use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{menu, restaurant};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::price_cents;
use crate::money::Money;
use crate::AppState;

// ============ Restaurants ============

#[derive(Debug, Deserialize)]
pub struct RestaurantRequest {
    pub name: String,
    pub location: String,
    pub cuisine_type: String,
    #[serde(default)]
    pub opening_hours: String,
    #[serde(default)]
    pub contact_info: String,
}

pub async fn list_restaurants(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<restaurant::Model>>> {
    let restaurants = restaurant::Entity::find()
        .order_by_asc(restaurant::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(restaurants))
}

pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<restaurant::Model>> {
    let restaurant = restaurant::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))?;

    Ok(Json(restaurant))
}

pub async fn create_restaurant(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RestaurantRequest>,
) -> AppResult<(StatusCode, Json<restaurant::Model>)> {
    let restaurant = restaurant::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        location: Set(payload.location),
        cuisine_type: Set(payload.cuisine_type),
        opening_hours: Set(payload.opening_hours),
        contact_info: Set(payload.contact_info),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(restaurant)))
}

pub async fn update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<RestaurantRequest>,
) -> AppResult<Json<restaurant::Model>> {
    let existing = restaurant::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))?;

    let mut active: restaurant::ActiveModel = existing.into();
    active.name = Set(payload.name);
    active.location = Set(payload.location);
    active.cuisine_type = Set(payload.cuisine_type);
    active.opening_hours = Set(payload.opening_hours);
    active.contact_info = Set(payload.contact_info);

    Ok(Json(active.update(&state.db).await?))
}

pub async fn delete_restaurant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let result = restaurant::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Restaurant not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ============ Menu items ============

#[derive(Debug, Deserialize)]
pub struct MenuRequest {
    pub restaurant_id: Uuid,
    pub item_name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
}

#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub item_name: String,
    pub description: String,
    pub price: Money,
}

impl From<menu::Model> for MenuResponse {
    fn from(item: menu::Model) -> Self {
        MenuResponse {
            id: item.id,
            restaurant_id: item.restaurant_id,
            item_name: item.item_name,
            description: item.description,
            price: Money::from_cents(item.price_cents),
        }
    }
}

async fn ensure_restaurant(state: &AppState, id: Uuid) -> AppResult<()> {
    restaurant::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::validation("restaurant_id", "Restaurant does not exist."))
}

pub async fn list_menus(State(state): State<AppState>) -> AppResult<Json<Vec<MenuResponse>>> {
    let items = menu::Entity::find()
        .order_by_asc(menu::Column::ItemName)
        .all(&state.db)
        .await?;

    Ok(Json(items.into_iter().map(Into::into).collect()))
}

pub async fn get_menu(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MenuResponse>> {
    let item = menu::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu item not found".to_string()))?;

    Ok(Json(item.into()))
}

pub async fn create_menu(
    State(state): State<AppState>,
    AppJson(payload): AppJson<MenuRequest>,
) -> AppResult<(StatusCode, Json<MenuResponse>)> {
    let price = price_cents("price", payload.price)?;
    ensure_restaurant(&state, payload.restaurant_id).await?;

    let item = menu::ActiveModel {
        id: Set(Uuid::new_v4()),
        restaurant_id: Set(payload.restaurant_id),
        item_name: Set(payload.item_name),
        description: Set(payload.description),
        price_cents: Set(price),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(item.into())))
}

pub async fn update_menu(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<MenuRequest>,
) -> AppResult<Json<MenuResponse>> {
    let price = price_cents("price", payload.price)?;

    let existing = menu::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu item not found".to_string()))?;
    ensure_restaurant(&state, payload.restaurant_id).await?;

    let mut active: menu::ActiveModel = existing.into();
    active.restaurant_id = Set(payload.restaurant_id);
    active.item_name = Set(payload.item_name);
    active.description = Set(payload.description);
    active.price_cents = Set(price);

    Ok(Json(active.update(&state.db).await?.into()))
}

pub async fn delete_menu(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let result = menu::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Menu item not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
