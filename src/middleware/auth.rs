use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Credentials, Authorization, HeaderMapExt};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::entities::{auth_token, user};
use crate::error::{AppError, AppResult};
use crate::AppState;

/// `Authorization: Token <key>` credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenKey(String);

impl TokenKey {
    pub fn key(&self) -> &str {
        &self.0
    }
}

impl Credentials for TokenKey {
    const SCHEME: &'static str = "Token";

    fn decode(value: &HeaderValue) -> Option<Self> {
        let raw = value.to_str().ok()?;
        let key = raw.get(Self::SCHEME.len()..)?.trim();
        (!key.is_empty()).then(|| TokenKey(key.to_string()))
    }

    fn encode(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("{} {}", Self::SCHEME, self.0))
            .unwrap_or_else(|_| HeaderValue::from_static(""))
    }
}

/// The authenticated caller, as resolved from its API token.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_staff: bool,
    pub token: String,
}

impl CurrentUser {
    pub fn case_id(&self) -> String {
        format!("user_{}", self.id)
    }
}

/// Resolved identity of the request; `None` is an anonymous caller.
#[derive(Debug, Clone, Default)]
pub struct Identity(pub Option<CurrentUser>);

impl Identity {
    pub fn user(&self) -> Option<&CurrentUser> {
        self.0.as_ref()
    }
}

async fn resolve(state: &AppState, key: &str) -> AppResult<Option<CurrentUser>> {
    let found = auth_token::Entity::find_by_id(key.to_string())
        .find_also_related(user::Entity)
        .one(&state.db)
        .await?;

    Ok(match found {
        Some((token, Some(user))) if user.is_active => Some(CurrentUser {
            id: user.id,
            email: user.email,
            name: user.name,
            is_staff: user.is_staff,
            token: token.key,
        }),
        _ => None,
    })
}

/// Resolves the token, if any, into an [`Identity`]. An absent, malformed or
/// unknown token yields an anonymous identity rather than an error.
pub async fn identify(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let header = request.headers().typed_get::<Authorization<TokenKey>>();

    let current = match header {
        Some(Authorization(credentials)) => resolve(&state, credentials.key()).await?,
        None => None,
    };

    if let Some(user) = &current {
        request.extensions_mut().insert(user.clone());
    }
    request.extensions_mut().insert(Identity(current));

    Ok(next.run(request).await)
}

fn identity(request: &Request) -> Option<&CurrentUser> {
    request.extensions().get::<Identity>().and_then(Identity::user)
}

fn not_authenticated() -> AppError {
    AppError::Unauthorized("Authentication credentials were not provided".to_string())
}

/// Require any authenticated user
pub async fn require_auth(request: Request, next: Next) -> AppResult<Response> {
    identity(&request).ok_or_else(not_authenticated)?;
    Ok(next.run(request).await)
}

/// Require a staff account
pub async fn require_admin(request: Request, next: Next) -> AppResult<Response> {
    let user = identity(&request).ok_or_else(not_authenticated)?;

    if !user.is_staff {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    Ok(next.run(request).await)
}

/// Safe methods pass; anything else needs a staff account.
pub async fn admin_or_read_only(request: Request, next: Next) -> AppResult<Response> {
    if is_safe(request.method()) {
        return Ok(next.run(request).await);
    }

    require_admin(request, next).await
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_credentials_decode() {
        let value = HeaderValue::from_static("Token 0123456789abcdef");
        assert_eq!(
            TokenKey::decode(&value).map(|t| t.key().to_string()),
            Some("0123456789abcdef".to_string())
        );
    }

    #[test]
    fn test_token_header_lookup() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Token abc123"));
        let auth = headers.typed_get::<Authorization<TokenKey>>();
        assert_eq!(auth.map(|a| a.0.key().to_string()), Some("abc123".to_string()));

        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));
        assert!(headers.typed_get::<Authorization<TokenKey>>().is_none());
    }

    #[test]
    fn test_safe_methods() {
        assert!(is_safe(&Method::GET));
        assert!(is_safe(&Method::HEAD));
        assert!(is_safe(&Method::OPTIONS));
        assert!(!is_safe(&Method::POST));
        assert!(!is_safe(&Method::DELETE));
    }
}
