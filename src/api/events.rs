//! Events, tickets and attendance.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::CurrentAccount;
use super::validation::parse_id;
use super::{
    ApiError, ApiResponse, AppState, AttendeeDto, EventDto, MessageResponse, TicketDto,
};
use crate::services::{AttendanceInput, AttendanceSummary, EventInput, TicketInput};

/// GET /events
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
) -> Result<Json<ApiResponse<Vec<EventDto>>>, ApiError> {
    current.require_staff()?;
    let rows = state.events().list_events().await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(EventDto::from).collect(),
    )))
}

/// POST /events
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Json(input): Json<EventInput>,
) -> Result<(StatusCode, Json<ApiResponse<EventDto>>), ApiError> {
    current.require_staff()?;
    let model = state.events().create_event(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(model.into()))))
}

/// GET /events/{id}
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EventDto>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("event", &id)?;
    Ok(Json(ApiResponse::success(
        state.events().get_event(id).await?.into(),
    )))
}

/// PUT /events/{id}
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
    Json(input): Json<EventInput>,
) -> Result<Json<ApiResponse<EventDto>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("event", &id)?;
    Ok(Json(ApiResponse::success(
        state.events().update_event(id, input).await?.into(),
    )))
}

/// DELETE /events/{id}
/// Removes tickets, attendance and draws along with the event.
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("event", &id)?;
    state.events().delete_event(id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new("Event deleted"))))
}

// ============================================================================
// Tickets
// ============================================================================

/// GET /events/{id}/tickets
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<TicketDto>>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("event", &id)?;
    let rows = state.events().list_tickets(id).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(TicketDto::from).collect(),
    )))
}

/// POST /events/{id}/tickets
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
    Json(input): Json<TicketInput>,
) -> Result<(StatusCode, Json<ApiResponse<TicketDto>>), ApiError> {
    current.require_staff()?;
    let id = parse_id("event", &id)?;
    let model = state.events().create_ticket(id, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(model.into()))))
}

/// PUT /tickets/{id}
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
    Json(input): Json<TicketInput>,
) -> Result<Json<ApiResponse<TicketDto>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("ticket", &id)?;
    Ok(Json(ApiResponse::success(
        state.events().update_ticket(id, input).await?.into(),
    )))
}

/// DELETE /tickets/{id}
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("ticket", &id)?;
    state.events().delete_ticket(id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new("Ticket deleted"))))
}

// ============================================================================
// Attendance
// ============================================================================

/// POST /events/{id}/attendance
pub async fn mark_attended(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
    Json(input): Json<AttendanceInput>,
) -> Result<(StatusCode, Json<ApiResponse<AttendeeDto>>), ApiError> {
    current.require_staff()?;
    let id = parse_id("event", &id)?;
    let attendee = state.events().mark_attended(id, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(attendee.into()))))
}

/// GET /events/{id}/attendance
pub async fn list_attendees(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<AttendeeDto>>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("event", &id)?;
    let rows = state.events().list_attendees(id).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(AttendeeDto::from).collect(),
    )))
}

/// GET /events/{id}/attendance/summary
pub async fn attendance_summary(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AttendanceSummary>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("event", &id)?;
    Ok(Json(ApiResponse::success(
        state.events().attendance_summary(id).await?,
    )))
}
