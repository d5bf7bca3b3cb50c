//! Member self-service profile update requests.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use std::sync::Arc;

use super::auth::CurrentAccount;
use super::validation::parse_id;
use super::{ApiError, ApiResponse, AppState, MemberDto};
use crate::membership::MemberPatch;
use crate::services::UpdateRequestView;

#[derive(Debug, Serialize)]
pub struct PendingStatus {
    pub pending: bool,
}

/// POST /profile/requests
pub async fn submit_request(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Json(changes): Json<MemberPatch>,
) -> Result<(StatusCode, Json<ApiResponse<UpdateRequestView>>), ApiError> {
    let view = state.profiles().submit(current.id(), changes).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(view))))
}

/// GET /profile/requests/pending
pub async fn has_pending(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
) -> Result<Json<ApiResponse<PendingStatus>>, ApiError> {
    let pending = state.profiles().has_pending(current.id()).await?;
    Ok(Json(ApiResponse::success(PendingStatus { pending })))
}

/// GET /profile-requests
pub async fn list_requests(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
) -> Result<Json<ApiResponse<Vec<UpdateRequestView>>>, ApiError> {
    current.require_staff()?;
    Ok(Json(ApiResponse::success(
        state.profiles().list_pending().await?,
    )))
}

/// POST /profile-requests/{id}/approve
pub async fn approve_request(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MemberDto>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("update request", &id)?;
    let member = state.profiles().approve(current.id(), id).await?;
    Ok(Json(ApiResponse::success(member.into())))
}
