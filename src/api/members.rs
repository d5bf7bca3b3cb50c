use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::CurrentAccount;
use super::validation::{non_blank, parse_id, validate_membership_id};
use super::{ApiError, ApiResponse, AppState, ApprovalDto, AuditEntryDto, MemberDto, audit_trail};
use crate::db::{MemberCounts, MemberFilter, ZoneCount};
use crate::entities::members::MemberStatus;
use crate::membership::MemberPatch;
use crate::services::ApprovalRequest;

#[derive(Debug, Deserialize)]
pub struct MemberListQuery {
    pub status: Option<String>,
    pub zone: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalBody {
    pub status: String,
    #[serde(default)]
    pub changes: MemberPatch,
}

#[derive(Debug, Serialize)]
pub struct NextIdResponse {
    pub membership_id: String,
}

fn parse_status(raw: &str) -> Result<MemberStatus, ApiError> {
    MemberStatus::parse(raw).ok_or_else(|| {
        ApiError::validation(format!(
            "Invalid status: {raw}. Expected pending, approved, inactive or rejected"
        ))
    })
}

/// GET /members
/// Approved and inactive members unless a status is given.
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Query(query): Query<MemberListQuery>,
) -> Result<Json<ApiResponse<Vec<MemberDto>>>, ApiError> {
    current.require_staff()?;

    let status = non_blank(query.status)
        .map(|s| parse_status(&s))
        .transpose()?;

    let filter = MemberFilter {
        status,
        zone: non_blank(query.zone),
        name: non_blank(query.name),
    };

    let members = state.members().list(filter).await?;
    Ok(Json(ApiResponse::success(
        members.into_iter().map(MemberDto::from).collect(),
    )))
}

/// GET /members/pending
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
) -> Result<Json<ApiResponse<Vec<MemberDto>>>, ApiError> {
    current.require_staff()?;

    let members = state.members().list_pending().await?;
    Ok(Json(ApiResponse::success(
        members.into_iter().map(MemberDto::from).collect(),
    )))
}

/// GET /members/counts
pub async fn get_counts(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
) -> Result<Json<ApiResponse<MemberCounts>>, ApiError> {
    current.require_staff()?;
    Ok(Json(ApiResponse::success(state.members().counts().await?)))
}

/// GET /members/zones
pub async fn get_zone_counts(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
) -> Result<Json<ApiResponse<Vec<ZoneCount>>>, ApiError> {
    current.require_staff()?;
    Ok(Json(ApiResponse::success(state.members().zone_counts().await?)))
}

/// GET /members/next-id
/// Preview only; nothing is reserved.
pub async fn preview_next_id(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
) -> Result<Json<ApiResponse<NextIdResponse>>, ApiError> {
    current.require_staff()?;
    let membership_id = state.members().preview_next_id().await?;
    Ok(Json(ApiResponse::success(NextIdResponse { membership_id })))
}

/// GET /members/lookup/{membership_id}
pub async fn get_by_membership_id(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(membership_id): Path<String>,
) -> Result<Json<ApiResponse<MemberDto>>, ApiError> {
    current.require_staff()?;
    let membership_id = validate_membership_id(&membership_id)?;
    let member = state.members().get_by_membership_id(membership_id).await?;
    Ok(Json(ApiResponse::success(member.into())))
}

/// GET /members/{id}
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MemberDto>>, ApiError> {
    let id = parse_id("member", &id)?;
    let member = state.members().get(id).await?;

    if member.account_id != current.id() {
        current.require_staff()?;
    }

    Ok(Json(ApiResponse::success(member.into())))
}

/// PUT /members/{id}
/// Direct edit by staff, audited as `MODIFIED`.
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
    Json(patch): Json<MemberPatch>,
) -> Result<Json<ApiResponse<MemberDto>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("member", &id)?;
    let member = state
        .members()
        .update_profile(current.id(), id, patch)
        .await?;
    Ok(Json(ApiResponse::success(member.into())))
}

/// PUT /members/{id}/approval
pub async fn set_approval(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
    Json(body): Json<ApprovalBody>,
) -> Result<Json<ApiResponse<ApprovalDto>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("member", &id)?;
    let request = ApprovalRequest {
        status: parse_status(&body.status)?,
        changes: body.changes,
    };

    let outcome = state.members().approve(current.id(), id, request).await?;

    if let Some(allocated) = &outcome.allocated {
        tracing::info!(member_id = id, membership_id = %allocated, "Membership ID allocated");
    }

    Ok(Json(ApiResponse::success(outcome.into())))
}

/// GET /members/{id}/history
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<AuditEntryDto>>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("member", &id)?;
    let entries = state.members().history(id).await?;
    Ok(Json(ApiResponse::success(audit_trail(entries))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("Approved").unwrap(), MemberStatus::Approved);
        assert!(parse_status("archived").is_err());
    }

    #[test]
    fn test_approval_body_defaults_changes() {
        let body: ApprovalBody = serde_json::from_str(r#"{"status": "approved"}"#).unwrap();
        assert!(body.changes.is_empty());
    }
}
