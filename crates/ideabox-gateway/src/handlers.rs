// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the moderation API.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use ideabox_core::{
    Category, Complexity, IdeaFilter, IdeaId, IdeaRecord, IdeaStatus, IdeaboxError, Priority,
};

use crate::server::GatewayState;

/// Page size when the request does not name one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;
/// Largest accepted page size.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler failure mapped onto a status code.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(IdeaId),
    Storage(IdeaboxError),
}

impl From<IdeaboxError> for ApiError {
    fn from(e: IdeaboxError) -> Self {
        if let IdeaboxError::NotFound { id, .. } = &e
            && let Ok(id) = id.parse()
        {
            return Self::NotFound(IdeaId(id));
        }
        Self::Storage(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::NotFound(id) => (StatusCode::NOT_FOUND, format!("idea {id} not found")),
            Self::Storage(e) => {
                tracing::error!(error = %e, "storage request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Query string for GET /api/ideas. Filters are comma-separated.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListParams {
    pub fn to_filter(&self) -> Result<IdeaFilter, ApiError> {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(ApiError::BadRequest(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(IdeaFilter {
            statuses: parse_list(self.status.as_deref(), "status")?,
            categories: parse_list(self.category.as_deref(), "category")?,
            priorities: parse_list(self.priority.as_deref(), "priority")?,
            limit: Some(limit),
            offset: self.offset,
        })
    }
}

fn parse_list<T: FromStr>(raw: Option<&str>, field: &str) -> Result<Vec<T>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            T::from_str(s).map_err(|_| ApiError::BadRequest(format!("invalid {field} `{s}`")))
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct IdeaListResponse {
    pub ideas: Vec<IdeaRecord>,
    /// Matching records ignoring pagination.
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: IdeaStatus,
}

#[derive(Debug, Deserialize)]
pub struct NotesUpdate {
    pub notes: String,
}

/// A machine value with its display label.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    pub statuses: Vec<Choice>,
    pub categories: Vec<Choice>,
    pub priorities: Vec<Choice>,
    pub complexities: Vec<Choice>,
}

/// GET /health (unauthenticated)
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started.elapsed().as_secs(),
    })
}

/// GET /api/ideas
pub async fn list_ideas(
    State(state): State<GatewayState>,
    Query(params): Query<ListParams>,
) -> Result<Json<IdeaListResponse>, ApiError> {
    let filter = params.to_filter()?;
    let ideas = state.storage.list_records(&filter).await?;
    let total = state.storage.count_records(&filter).await?;
    Ok(Json(IdeaListResponse { ideas, total }))
}

/// GET /api/ideas/{id}
pub async fn get_idea(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> Result<Json<IdeaRecord>, ApiError> {
    let id = IdeaId(id);
    state
        .storage
        .get_record(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

/// PATCH /api/ideas/{id}/status
pub async fn update_status(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<IdeaRecord>, ApiError> {
    let id = IdeaId(id);
    if !state.storage.update_status(id, body.status).await? {
        return Err(ApiError::NotFound(id));
    }
    tracing::info!(idea_id = %id, status = %body.status, "idea status changed");
    reread(&state, id).await
}

/// PATCH /api/ideas/{id}/notes
pub async fn update_notes(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
    Json(body): Json<NotesUpdate>,
) -> Result<Json<IdeaRecord>, ApiError> {
    let id = IdeaId(id);
    if !state.storage.update_notes(id, body.notes.trim()).await? {
        return Err(ApiError::NotFound(id));
    }
    tracing::info!(idea_id = %id, "idea notes updated");
    reread(&state, id).await
}

/// DELETE /api/ideas/{id}
pub async fn delete_idea(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let id = IdeaId(id);
    if !state.storage.delete_record(id).await? {
        return Err(ApiError::NotFound(id));
    }
    tracing::info!(idea_id = %id, "idea deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/meta
pub async fn get_meta() -> Json<MetaResponse> {
    Json(MetaResponse {
        statuses: IdeaStatus::iter()
            .map(|s| choice(s.to_string(), s.label()))
            .collect(),
        categories: Category::iter()
            .map(|c| choice(c.to_string(), c.label()))
            .collect(),
        priorities: Priority::iter()
            .map(|p| choice(p.to_string(), p.label()))
            .collect(),
        complexities: Complexity::iter()
            .map(|c| choice(c.to_string(), c.label()))
            .collect(),
    })
}

fn choice(value: String, label: &'static str) -> Choice {
    Choice { value, label }
}

async fn reread(state: &GatewayState, id: IdeaId) -> Result<Json<IdeaRecord>, ApiError> {
    state
        .storage
        .get_record(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_use_default_page() {
        let filter = ListParams::default().to_filter().unwrap();
        assert!(filter.statuses.is_empty());
        assert_eq!(filter.limit, Some(DEFAULT_PAGE_SIZE));
        assert_eq!(filter.offset, None);
    }

    #[test]
    fn comma_separated_filters_parse() {
        let params = ListParams {
            status: Some("new, in_progress".into()),
            category: Some("bug".into()),
            priority: Some("high,critical".into()),
            limit: Some(10),
            offset: Some(20),
        };
        let filter = params.to_filter().unwrap();
        assert_eq!(filter.statuses, vec![IdeaStatus::New, IdeaStatus::InProgress]);
        assert_eq!(filter.categories, vec![Category::Bug]);
        assert_eq!(filter.priorities, vec![Priority::High, Priority::Critical]);
        assert_eq!(filter.offset, Some(20));
    }

    #[test]
    fn unknown_filter_value_is_rejected() {
        let params = ListParams {
            status: Some("archived".into()),
            ..Default::default()
        };
        assert!(matches!(params.to_filter(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn page_size_is_bounded() {
        for limit in [0, MAX_PAGE_SIZE + 1] {
            let params = ListParams {
                limit: Some(limit),
                ..Default::default()
            };
            assert!(params.to_filter().is_err());
        }
    }

    #[test]
    fn storage_not_found_maps_to_404() {
        let err: ApiError = IdeaboxError::NotFound {
            entity: "idea",
            id: "9".into(),
        }
        .into();
        assert!(matches!(err, ApiError::NotFound(IdeaId(9))));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
