use axum::{extract::State, http::StatusCode, Extension, Json};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::entities::{auth_token, user};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::CurrentUser;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::time::now;
use crate::utils::token::generate_key;
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_staff: bool,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
            is_staff: user.is_staff,
        }
    }
}

fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::validation("email", "Enter a valid email address.")),
    }
}

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let email = normalize_email(&payload.email)?;
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(
            "password",
            format!("Ensure this field has at least {} characters.", MIN_PASSWORD_LEN),
        ));
    }
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("name", "This field may not be blank."));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(hash_password(&payload.password)?),
        name: Set(payload.name.trim().to_string()),
        is_staff: Set(false),
        is_active: Set(true),
        created_at: Set(now()),
    };

    let user = new_user.insert(&state.db).await?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Exchange credentials for the account's API token
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let invalid =
        || AppError::BadRequest("Unable to log in with provided credentials.".to_string());

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(payload.email.trim().to_lowercase()))
        .one(&state.db)
        .await?
        .ok_or_else(invalid)?;

    if !user.is_active || !verify_password(&payload.password, &user.password_hash)? {
        return Err(invalid());
    }

    let existing = auth_token::Entity::find()
        .filter(auth_token::Column::UserId.eq(user.id))
        .one(&state.db)
        .await?;

    let token = match existing {
        Some(token) => token,
        None => {
            auth_token::ActiveModel {
                key: Set(generate_key()),
                user_id: Set(user.id),
                created_at: Set(now()),
            }
            .insert(&state.db)
            .await?
        }
    };

    Ok(Json(TokenResponse {
        token: token.key,
        user_id: user.id,
    }))
}

/// The authenticated account
pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let user = user::Entity::find_by_id(actor.id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Revoke the token used for this request
pub async fn logout(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
) -> AppResult<Json<Value>> {
    auth_token::Entity::delete_by_id(actor.token.clone())
        .exec(&state.db)
        .await?;

    Ok(Json(json!({ "message": "Successfully logged out" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM ").unwrap(), "ana@example.com");
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("ana@localhost").is_err());
    }
}
