use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::transportation_provider;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::price_cents;
use crate::money::Money;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProviderRequest {
    pub name: String,
    pub service_type: String,
    pub base_fare: Money,
    pub price_per_km: Money,
    #[serde(default)]
    pub contact_info: String,
}

#[derive(Debug, Serialize)]
pub struct ProviderResponse {
    pub id: Uuid,
    pub name: String,
    pub service_type: String,
    pub base_fare: Money,
    pub price_per_km: Money,
    pub contact_info: String,
}

impl From<transportation_provider::Model> for ProviderResponse {
    fn from(p: transportation_provider::Model) -> Self {
        ProviderResponse {
            id: p.id,
            name: p.name,
            service_type: p.service_type,
            base_fare: Money::from_cents(p.base_fare_cents),
            price_per_km: Money::from_cents(p.price_per_km_cents),
            contact_info: p.contact_info,
        }
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Transportation provider not found".to_string())
}

pub async fn list_providers(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProviderResponse>>> {
    let providers = transportation_provider::Entity::find()
        .order_by_asc(transportation_provider::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(providers.into_iter().map(Into::into).collect()))
}

pub async fn get_provider(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProviderResponse>> {
    let provider = transportation_provider::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(provider.into()))
}

pub async fn create_provider(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ProviderRequest>,
) -> AppResult<(StatusCode, Json<ProviderResponse>)> {
    let base_fare = price_cents("base_fare", payload.base_fare)?;
    let per_km = price_cents("price_per_km", payload.price_per_km)?;

    let provider = transportation_provider::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        service_type: Set(payload.service_type),
        base_fare_cents: Set(base_fare),
        price_per_km_cents: Set(per_km),
        contact_info: Set(payload.contact_info),
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(provider.into())))
}

pub async fn update_provider(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ProviderRequest>,
) -> AppResult<Json<ProviderResponse>> {
    let base_fare = price_cents("base_fare", payload.base_fare)?;
    let per_km = price_cents("price_per_km", payload.price_per_km)?;

    let existing = transportation_provider::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(not_found)?;

    let mut active: transportation_provider::ActiveModel = existing.into();
    active.name = Set(payload.name);
    active.service_type = Set(payload.service_type);
    active.base_fare_cents = Set(base_fare);
    active.price_per_km_cents = Set(per_km);
    active.contact_info = Set(payload.contact_info);

    Ok(Json(active.update(&state.db).await?.into()))
}

pub async fn delete_provider(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let result = transportation_provider::Entity::delete_by_id(id)
        .exec(&state.db)
        .await?;

    if result.rows_affected == 0 {
        return Err(not_found());
    }

    Ok(StatusCode::NO_CONTENT)
}
