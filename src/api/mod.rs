use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::services::{
    AuthService, CashService, EventService, MembershipService, NonMemberService, ProfileService,
    RaffleService, TransactionService,
};
use crate::state::SharedState;

pub mod auth;
mod cash;
mod error;
mod events;
mod members;
mod non_members;
mod observability;
mod profiles;
mod raffle;
mod staff;
mod system;
mod transactions;
mod types;
mod validation;

pub use auth::CurrentAccount;
pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn members(&self) -> &Arc<dyn MembershipService> {
        &self.shared.membership_service
    }

    #[must_use]
    pub fn profiles(&self) -> &Arc<dyn ProfileService> {
        &self.shared.profile_service
    }

    #[must_use]
    pub fn non_members(&self) -> &Arc<dyn NonMemberService> {
        &self.shared.non_member_service
    }

    #[must_use]
    pub fn cash(&self) -> &Arc<dyn CashService> {
        &self.shared.cash_service
    }

    #[must_use]
    pub fn transactions(&self) -> &Arc<dyn TransactionService> {
        &self.shared.transaction_service
    }

    #[must_use]
    pub fn events(&self) -> &Arc<dyn EventService> {
        &self.shared.event_service
    }

    #[must_use]
    pub fn raffle(&self) -> &Arc<dyn RaffleService> {
        &self.shared.raffle_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, inactivity_minutes) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_inactivity_minutes,
        )
    };

    let protected_routes = create_protected_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            inactivity_minutes,
        )));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/health", get(system::health))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/register", post(auth::register))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route(
            "/auth/reset-password/verify",
            post(auth::verify_reset_token),
        )
        .layer(session_layer)
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/password", put(auth::change_password))
        .route("/auth/api-key/regenerate", post(auth::regenerate_api_key))
        .route("/members", get(members::list_members))
        .route("/members/pending", get(members::list_pending))
        .route("/members/counts", get(members::get_counts))
        .route("/members/zones", get(members::get_zone_counts))
        .route("/members/next-id", get(members::preview_next_id))
        .route(
            "/members/lookup/{membership_id}",
            get(members::get_by_membership_id),
        )
        .route(
            "/members/{id}",
            get(members::get_member).put(members::update_member),
        )
        .route("/members/{id}/approval", put(members::set_approval))
        .route("/members/{id}/history", get(members::get_history))
        .route(
            "/members/{id}/transactions",
            get(transactions::member_transactions),
        )
        .route("/profile/requests", post(profiles::submit_request))
        .route("/profile/requests/pending", get(profiles::has_pending))
        .route("/profile-requests", get(profiles::list_requests))
        .route(
            "/profile-requests/{id}/approve",
            post(profiles::approve_request),
        )
        .route("/staff", get(staff::list_staff))
        .route("/staff/{username}/roles", put(staff::set_roles))
        .route(
            "/non-members",
            get(non_members::list_non_members).post(non_members::create_non_member),
        )
        .route(
            "/non-members/{id}",
            get(non_members::get_non_member)
                .put(non_members::update_non_member)
                .delete(non_members::delete_non_member),
        )
        .route("/non-members/{id}/history", get(non_members::get_history))
        .route(
            "/cash/boxes",
            get(cash::list_boxes).post(cash::create_box),
        )
        .route("/cash/boxes/stats", get(cash::box_stats))
        .route(
            "/cash/boxes/{id}",
            get(cash::get_box).put(cash::update_box).delete(cash::delete_box),
        )
        .route("/cash/boxes/{id}/history", get(cash::box_history))
        .route(
            "/cash/collections",
            get(cash::list_collections).post(cash::create_collection),
        )
        .route("/cash/collections/import", post(cash::import_collections))
        .route(
            "/cash/collections/{id}",
            get(cash::get_collection)
                .put(cash::update_collection)
                .delete(cash::delete_collection),
        )
        .route(
            "/cash/collections/{id}/history",
            get(cash::collection_history),
        )
        .route(
            "/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route("/transactions/count", get(transactions::count_transactions))
        .route(
            "/transactions/{id}",
            get(transactions::get_transaction)
                .put(transactions::update_transaction)
                .delete(transactions::delete_transaction),
        )
        .route("/transactions/{id}/history", get(transactions::get_history))
        .route(
            "/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/events/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/events/{id}/tickets",
            get(events::list_tickets).post(events::create_ticket),
        )
        .route(
            "/tickets/{id}",
            put(events::update_ticket).delete(events::delete_ticket),
        )
        .route(
            "/events/{id}/attendance",
            get(events::list_attendees).post(events::mark_attended),
        )
        .route(
            "/events/{id}/attendance/summary",
            get(events::attendance_summary),
        )
        .route(
            "/events/{id}/draws",
            get(raffle::list_draws).post(raffle::create_draw),
        )
        .route("/events/{id}/winners", get(raffle::list_winners))
        .route("/draws/{id}", axum::routing::delete(raffle::delete_draw))
        .route("/draws/{id}/spin", post(raffle::spin))
        .route("/draws/{id}/reset", post(raffle::reset))
        .route("/system/status", get(system::status))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
