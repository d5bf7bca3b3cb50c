//! Lucky draw raffle.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::CurrentAccount;
use super::validation::parse_id;
use super::{ApiError, ApiResponse, AppState, DrawDto, MessageResponse, SpinDto, WinnerDto};
use crate::services::DrawInput;

/// GET /events/{id}/draws
pub async fn list_draws(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<DrawDto>>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("event", &id)?;
    let rows = state.raffle().list_draws(id).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(DrawDto::from).collect(),
    )))
}

/// POST /events/{id}/draws
pub async fn create_draw(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
    Json(input): Json<DrawInput>,
) -> Result<(StatusCode, Json<ApiResponse<DrawDto>>), ApiError> {
    current.require_staff()?;
    let id = parse_id("event", &id)?;
    let draw = state.raffle().create_draw(id, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(draw.into()))))
}

/// GET /events/{id}/winners
pub async fn list_winners(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<WinnerDto>>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("event", &id)?;
    let rows = state.raffle().winners(id).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(WinnerDto::from).collect(),
    )))
}

/// POST /draws/{id}/spin
pub async fn spin(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SpinDto>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("draw", &id)?;
    let result = state.raffle().spin(id).await?;

    tracing::info!(
        draw_id = id,
        attendee_id = result.winner.id,
        participants = result.participants,
        "Draw spun"
    );

    Ok(Json(ApiResponse::success(result.into())))
}

/// POST /draws/{id}/reset
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DrawDto>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("draw", &id)?;
    Ok(Json(ApiResponse::success(
        state.raffle().reset(id).await?.into(),
    )))
}

/// DELETE /draws/{id}
pub async fn delete_draw(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("draw", &id)?;
    state.raffle().delete_draw(id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new("Draw deleted"))))
}
