//! Request-scoped audit recording.
//!
//! Opens an `event_log` row before the request is dispatched and closes it
//! with the response status afterwards. Failures to write the log are
//! reported through `tracing` and never change the response.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::{sea_query::Expr, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::event_log;
use crate::middleware::auth::{CurrentUser, Identity};
use crate::utils::time::now;
use crate::AppState;

pub const ANONYMOUS_USER_NAME: &str = "Anonymous";

/// An opened log row. Dropping it without [`OpenEntry::close`] (the request
/// future was cancelled) still stamps the end time in the background.
struct OpenEntry {
    db: DatabaseConnection,
    id: Option<i32>,
}

impl OpenEntry {
    async fn open(
        db: &DatabaseConnection,
        case_id: String,
        activity: String,
        user: Option<&CurrentUser>,
    ) -> Option<Self> {
        let entry = event_log::ActiveModel {
            case_id: Set(case_id),
            activity: Set(activity),
            start_time: Set(now()),
            end_time: Set(None),
            user_id: Set(user.map(|u| u.id)),
            user_name: Set(user
                .map(|u| u.email.clone())
                .unwrap_or_else(|| ANONYMOUS_USER_NAME.to_string())),
            status_code: Set(None),
            ..Default::default()
        };

        match event_log::Entity::insert(entry).exec(db).await {
            Ok(inserted) => Some(OpenEntry {
                db: db.clone(),
                id: Some(inserted.last_insert_id),
            }),
            Err(e) => {
                tracing::error!(error = %e, "Failed to open audit log entry");
                None
            }
        }
    }

    async fn close(mut self, status: Option<u16>) {
        if let Some(id) = self.id.take() {
            stamp_end(&self.db, id, status).await;
        }
    }
}

impl Drop for OpenEntry {
    fn drop(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        let db = self.db.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { stamp_end(&db, id, None).await });
            }
            Err(_) => tracing::error!(entry = id, "Audit log entry left open"),
        }
    }
}

async fn stamp_end(db: &DatabaseConnection, id: i32, status: Option<u16>) {
    let result = event_log::Entity::update_many()
        .col_expr(event_log::Column::EndTime, Expr::value(now()))
        .col_expr(
            event_log::Column::StatusCode,
            Expr::value(status.map(i32::from)),
        )
        .filter(event_log::Column::Id.eq(id))
        .exec(db)
        .await;

    if let Err(e) = result {
        tracing::error!(error = %e, entry = id, "Failed to close audit log entry");
    }
}

fn session_cookie(name: &str, key: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), key.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Records one `event_log` row per request.
///
/// Authenticated callers are grouped under `user_<id>`. Anonymous callers are
/// grouped under their session, which is retired after a logout or an error
/// response so the next request opens a new case.
pub async fn record_activity(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let identity = request
        .extensions()
        .get::<Identity>()
        .cloned()
        .unwrap_or_default();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string());
    let activity = state.activities.resolve(request.method(), route.as_deref());

    let (case_id, session) = match identity.user() {
        Some(user) => (user.case_id(), None),
        None => {
            let presented = jar
                .get(&state.config.session_cookie_name)
                .map(|cookie| cookie.value().to_string());
            let session = state.sessions.touch(presented.as_deref()).await;
            (session.case_id(), Some(session))
        }
    };

    let entry = OpenEntry::open(&state.db, case_id, activity.name, identity.user()).await;

    let response = next.run(request).await;
    let status = response.status();

    if let Some(entry) = entry {
        entry.close(Some(status.as_u16())).await;
    }

    let Some(session) = session else {
        return response;
    };

    if activity.terminal || status.is_client_error() || status.is_server_error() {
        state.sessions.retire(&session.key).await;
        return response;
    }

    if session.is_new {
        let jar = jar.add(session_cookie(&state.config.session_cookie_name, &session.key));
        return (jar, response).into_response();
    }

    response
}
