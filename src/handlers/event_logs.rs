use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::audit::export::{self, CSV_FILENAME, XES_FILENAME};
use crate::entities::event_log;
use crate::error::{AppError, AppResult};
use crate::AppState;

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl PageParams {
    fn page(&self) -> u64 {
        self.page.unwrap_or(1)
    }

    fn page_size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogPage {
    pub count: u64,
    pub page: u64,
    pub page_size: u64,
    pub results: Vec<event_log::Model>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub count: u64,
}

/// Newest entries first.
pub async fn list_event_logs(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<EventLogPage>> {
    let page = params.page();
    let page_size = params.page_size();

    let paginator = event_log::Entity::find()
        .order_by_desc(event_log::Column::StartTime)
        .order_by_desc(event_log::Column::Id)
        .paginate(&state.db, page_size);

    let count = paginator.num_items().await?;
    let pages = paginator.num_pages().await?;
    if page == 0 || (page > pages && page != 1) {
        return Err(AppError::NotFound("Invalid page.".to_string()));
    }

    let results = paginator.fetch_page(page - 1).await?;

    Ok(Json(EventLogPage {
        count,
        page,
        page_size,
        results,
    }))
}

async fn all_in_order(state: &AppState) -> AppResult<Vec<event_log::Model>> {
    Ok(event_log::Entity::find()
        .order_by_asc(event_log::Column::StartTime)
        .order_by_asc(event_log::Column::Id)
        .all(&state.db)
        .await?)
}

fn attachment(content_type: &'static str, filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

pub async fn export_csv(State(state): State<AppState>) -> AppResult<Response> {
    let rows = all_in_order(&state).await?;
    let body = export::to_csv(&rows)?;

    tracing::info!(rows = rows.len(), "Event log exported as CSV");

    Ok(attachment("text/csv", CSV_FILENAME, body))
}

pub async fn export_xes(State(state): State<AppState>) -> AppResult<Response> {
    let rows = all_in_order(&state).await?;
    let body = export::to_xes(&rows)?;

    tracing::info!(rows = rows.len(), "Event log exported as XES");

    Ok(attachment("application/xml", XES_FILENAME, body))
}

pub async fn clear_event_logs(State(state): State<AppState>) -> AppResult<Json<ClearResponse>> {
    let deleted = event_log::Entity::delete_many().exec(&state.db).await?;

    tracing::warn!(count = deleted.rows_affected, "Event log cleared");

    Ok(Json(ClearResponse {
        message: format!("Deleted {} event logs.", deleted.rows_affected),
        count: deleted.rows_affected,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_capped() {
        let params = PageParams {
            page: None,
            page_size: Some(500),
        };
        assert_eq!(params.page_size(), MAX_PAGE_SIZE);
        assert_eq!(params.page(), 1);
        assert_eq!(PageParams::default().page_size(), DEFAULT_PAGE_SIZE);
    }
}
