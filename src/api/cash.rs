//! Cash boxes (sandouqcha) and their collections.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentAccount;
use super::validation::{non_blank, parse_id};
use super::{
    ApiError, ApiResponse, AppState, AuditEntryDto, CashBoxDto, CollectionDto, MessageResponse,
    audit_trail,
};
use crate::db::{BoxFilter, BoxStats};
use crate::services::{BoxInput, CollectionInput, ImportReport, ids};

#[derive(Debug, Deserialize)]
pub struct BoxListQuery {
    pub in_use: Option<bool>,
    pub number: Option<String>,
    pub member_id: Option<String>,
    pub non_member_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionListQuery {
    pub box_id: Option<String>,
}

fn optional_id(resource: &str, raw: Option<String>) -> Result<Option<i64>, ApiError> {
    non_blank(raw)
        .map(|raw| {
            ids::parse(&raw).ok_or_else(|| ApiError::validation(format!("Invalid {resource} ID: {raw}")))
        })
        .transpose()
}

// ============================================================================
// Boxes
// ============================================================================

/// GET /cash/boxes
pub async fn list_boxes(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Query(query): Query<BoxListQuery>,
) -> Result<Json<ApiResponse<Vec<CashBoxDto>>>, ApiError> {
    current.require_staff()?;

    let filter = BoxFilter {
        in_use: query.in_use,
        number: non_blank(query.number),
        member_id: optional_id("member", query.member_id)?,
        non_member_id: optional_id("non-member", query.non_member_id)?,
    };

    let boxes = state.cash().list_boxes(filter).await?;
    Ok(Json(ApiResponse::success(
        boxes.into_iter().map(CashBoxDto::from).collect(),
    )))
}

/// GET /cash/boxes/stats
pub async fn box_stats(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
) -> Result<Json<ApiResponse<BoxStats>>, ApiError> {
    current.require_staff()?;
    Ok(Json(ApiResponse::success(state.cash().box_stats().await?)))
}

/// POST /cash/boxes
pub async fn create_box(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Json(input): Json<BoxInput>,
) -> Result<(StatusCode, Json<ApiResponse<CashBoxDto>>), ApiError> {
    current.require_staff()?;
    let model = state.cash().create_box(current.id(), input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(model.into()))))
}

/// GET /cash/boxes/{id}
pub async fn get_box(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CashBoxDto>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("cash box", &id)?;
    Ok(Json(ApiResponse::success(state.cash().get_box(id).await?.into())))
}

/// PUT /cash/boxes/{id}
pub async fn update_box(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
    Json(input): Json<BoxInput>,
) -> Result<Json<ApiResponse<CashBoxDto>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("cash box", &id)?;
    let model = state.cash().update_box(current.id(), id, input).await?;
    Ok(Json(ApiResponse::success(model.into())))
}

/// DELETE /cash/boxes/{id}
pub async fn delete_box(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("cash box", &id)?;
    state.cash().delete_box(id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new("Cash box deleted"))))
}

/// GET /cash/boxes/{id}/history
pub async fn box_history(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<AuditEntryDto>>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("cash box", &id)?;
    Ok(Json(ApiResponse::success(audit_trail(
        state.cash().box_history(id).await?,
    ))))
}

// ============================================================================
// Collections
// ============================================================================

/// GET /cash/collections
pub async fn list_collections(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Query(query): Query<CollectionListQuery>,
) -> Result<Json<ApiResponse<Vec<CollectionDto>>>, ApiError> {
    current.require_staff()?;
    let box_id = optional_id("cash box", query.box_id)?;
    let rows = state.cash().list_collections(box_id).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(CollectionDto::from).collect(),
    )))
}

/// POST /cash/collections
pub async fn create_collection(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Json(input): Json<CollectionInput>,
) -> Result<(StatusCode, Json<ApiResponse<CollectionDto>>), ApiError> {
    current.require_staff()?;
    let model = state.cash().create_collection(current.id(), input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(model.into()))))
}

/// POST /cash/collections/import
/// Rows are processed one by one; failures are reported, not fatal.
pub async fn import_collections(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Json(rows): Json<Vec<serde_json::Value>>,
) -> Result<Json<ApiResponse<ImportReport>>, ApiError> {
    current.require_staff()?;
    let report = state.cash().import_collections(current.id(), rows).await?;

    tracing::info!(
        imported = report.imported,
        failed = report.failed,
        "Collection import finished"
    );

    Ok(Json(ApiResponse::success(report)))
}

/// GET /cash/collections/{id}
pub async fn get_collection(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CollectionDto>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("box collection", &id)?;
    Ok(Json(ApiResponse::success(
        state.cash().get_collection(id).await?.into(),
    )))
}

/// PUT /cash/collections/{id}
pub async fn update_collection(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
    Json(input): Json<CollectionInput>,
) -> Result<Json<ApiResponse<CollectionDto>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("box collection", &id)?;
    let model = state.cash().update_collection(current.id(), id, input).await?;
    Ok(Json(ApiResponse::success(model.into())))
}

/// DELETE /cash/collections/{id}
pub async fn delete_collection(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("box collection", &id)?;
    state.cash().delete_collection(id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Collection deleted",
    ))))
}

/// GET /cash/collections/{id}/history
pub async fn collection_history(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<AuditEntryDto>>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("box collection", &id)?;
    Ok(Json(ApiResponse::success(audit_trail(
        state.cash().collection_history(id).await?,
    ))))
}
