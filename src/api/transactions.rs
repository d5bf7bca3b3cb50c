use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::CurrentAccount;
use super::validation::{non_blank, parse_id};
use super::{
    ApiError, ApiResponse, AppState, AuditEntryDto, MessageResponse, TransactionDto, audit_trail,
};
use crate::db::TransactionFilter;
use crate::membership::patch::check_date;
use crate::services::{TransactionInput, ids};

#[derive(Debug, Deserialize)]
pub struct TransactionListQuery {
    pub member_id: Option<String>,
    pub category: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

impl TransactionListQuery {
    fn into_filter(self) -> Result<TransactionFilter, ApiError> {
        let member_id = non_blank(self.member_id)
            .map(|raw| {
                ids::parse(&raw)
                    .ok_or_else(|| ApiError::validation(format!("Invalid member ID: {raw}")))
            })
            .transpose()?;

        let from = non_blank(self.from);
        let to = non_blank(self.to);
        if let Some(from) = &from {
            check_date("from", from)?;
        }
        if let Some(to) = &to {
            check_date("to", to)?;
        }

        Ok(TransactionFilter {
            member_id,
            category: non_blank(self.category),
            from,
            to,
        })
    }
}

/// GET /transactions
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<ApiResponse<Vec<TransactionDto>>>, ApiError> {
    current.require_staff()?;
    let rows = state.transactions().list(query.into_filter()?).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(TransactionDto::from).collect(),
    )))
}

/// GET /transactions/count
pub async fn count_transactions(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    current.require_staff()?;
    let count = state.transactions().count(query.into_filter()?).await?;
    Ok(Json(ApiResponse::success(CountResponse { count })))
}

/// POST /transactions
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Json(input): Json<TransactionInput>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionDto>>), ApiError> {
    current.require_staff()?;
    let model = state.transactions().create(current.id(), input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(model.into()))))
}

/// GET /transactions/{id}
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<TransactionDto>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("transaction", &id)?;
    Ok(Json(ApiResponse::success(
        state.transactions().get(id).await?.into(),
    )))
}

/// PUT /transactions/{id}
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
    Json(input): Json<TransactionInput>,
) -> Result<Json<ApiResponse<TransactionDto>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("transaction", &id)?;
    let model = state.transactions().update(current.id(), id, input).await?;
    Ok(Json(ApiResponse::success(model.into())))
}

/// DELETE /transactions/{id}
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("transaction", &id)?;
    state.transactions().delete(id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Transaction deleted",
    ))))
}

/// GET /transactions/{id}/history
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<AuditEntryDto>>>, ApiError> {
    current.require_staff()?;
    let id = parse_id("transaction", &id)?;
    Ok(Json(ApiResponse::success(audit_trail(
        state.transactions().history(id).await?,
    ))))
}

/// GET /members/{id}/transactions
/// Members may read their own history.
pub async fn member_transactions(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentAccount>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<TransactionDto>>>, ApiError> {
    let id = parse_id("member", &id)?;
    let member = state.members().get(id).await?;
    if member.account_id != current.id() {
        current.require_staff()?;
    }

    let rows = state.transactions().for_member(id).await?;
    Ok(Json(ApiResponse::success(
        rows.into_iter().map(TransactionDto::from).collect(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_rejects_bad_dates() {
        let query = TransactionListQuery {
            member_id: None,
            category: None,
            from: Some("2024-13-01".into()),
            to: None,
        };
        assert!(query.into_filter().is_err());
    }

    #[test]
    fn test_query_blank_values_are_absent() {
        let query = TransactionListQuery {
            member_id: Some(String::new()),
            category: Some("  ".into()),
            from: Some("2024-01-01".into()),
            to: Some("2024-12-31".into()),
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.member_id, None);
        assert_eq!(filter.category, None);
        assert_eq!(filter.from.as_deref(), Some("2024-01-01"));
    }
}
