use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentAccount;
use super::validation::{non_blank, parse_id};
use super::{ApiError, ApiResponse, AppState, AuditEntryDto, MessageResponse, NonMemberDto, audit_trail};
use crate::db::NonMemberFilter;
use crate::membership::IdFormat;
use crate::services::NonMemberInput;

#[derive(Debug, Deserialize)]
pub struct NonMemberListQuery {
    pub name: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
}

async fn display_format(state: &AppState) -> IdFormat {
    IdFormat::non_members(&state.config().read().await.membership)
}

/// GET /non-members
pub async fn list_non_members(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Query(query): Query<NonMemberListQuery>,
) -> Result<Json<ApiResponse<Vec<NonMemberDto>>>, ApiError> {
    current.require_staff()?;

    let filter = NonMemberFilter {
        name: non_blank(query.name),
        company: non_blank(query.company),
        address: non_blank(query.address),
    };

    let format = display_format(&state).await;
    let rows = state.non_members().list(filter).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter()
            .map(|row| NonMemberDto::new(row, &format))
            .collect(),
    )))
}

/// POST /non-members
pub async fn create_non_member(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Json(input): Json<NonMemberInput>,
) -> Result<(StatusCode, Json<ApiResponse<NonMemberDto>>), ApiError> {
    current.require_staff()?;
    let model = state.non_members().create(current.id(), input).await?;
    let format = display_format(&state).await;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(NonMemberDto::new(model, &format))),
    ))
}

/// GET /non-members/{id}
pub async fn get_non_member(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<NonMemberDto>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("non-member", &id)?;
    let model = state.non_members().get(id).await?;
    let format = display_format(&state).await;
    Ok(Json(ApiResponse::success(NonMemberDto::new(model, &format))))
}

/// PUT /non-members/{id}
pub async fn update_non_member(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
    Json(input): Json<NonMemberInput>,
) -> Result<Json<ApiResponse<NonMemberDto>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("non-member", &id)?;
    let model = state.non_members().update(current.id(), id, input).await?;
    let format = display_format(&state).await;
    Ok(Json(ApiResponse::success(NonMemberDto::new(model, &format))))
}

/// DELETE /non-members/{id}
pub async fn delete_non_member(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("non-member", &id)?;
    state.non_members().delete(id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Non-member deleted",
    ))))
}

/// GET /non-members/{id}/history
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<AuditEntryDto>>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("non-member", &id)?;
    let entries = state.non_members().history(id).await?;
    Ok(Json(ApiResponse::success(audit_trail(entries))))
}
