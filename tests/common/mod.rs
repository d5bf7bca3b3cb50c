#![allow(dead_code)]

use axum::Router;
use std::sync::{Arc, Mutex};
use memberdesk::config::Config;
use memberdesk::services::{Mail, Mailer, RegistrationRequest};
use memberdesk::state::SharedState;

pub use memberdesk::db::DEFAULT_API_KEY;

/// Config pointing at a fresh sqlite file under the temp dir.
pub fn test_config() -> Config {
    let path = std::env::temp_dir().join(format!("memberdesk-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", path.display());
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.server.secure_cookies = false;
    config
}

/// Keeps every message instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Mail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Mail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &Mail) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// Fails every send, like an unreachable mail relay.
pub struct FailingMailer;

#[async_trait::async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _mail: &Mail) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }
}

pub async fn shared_state_with_mailer(config: Config, mailer: Arc<dyn Mailer>) -> Arc<SharedState> {
    let shared = SharedState::with_mailer(config, mailer)
        .await
        .expect("Failed to create shared state");
    Arc::new(shared)
}

pub async fn shared_state(config: Config) -> (Arc<SharedState>, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let shared = SharedState::with_mailer(config, mailer.clone())
        .await
        .expect("Failed to create shared state");
    (Arc::new(shared), mailer)
}

pub async fn spawn_app() -> (Router, Arc<SharedState>) {
    let (shared, _) = shared_state(test_config()).await;
    let state = memberdesk::api::create_app_state(shared.clone(), None);
    (memberdesk::api::router(state).await, shared)
}

pub fn registration(civil_id: &str, email: Option<&str>) -> RegistrationRequest {
    serde_json::from_value(serde_json::json!({
        "civil_id": civil_id,
        "password": "correct horse",
        "first_name": "Test",
        "last_name": format!("Member {civil_id}"),
        "email": email,
    }))
    .expect("valid registration")
}

/// Id of the seeded admin account, used as the acting account.
pub async fn admin_id(shared: &SharedState) -> i64 {
    shared
        .store
        .accounts()
        .get_by_username("admin")
        .await
        .unwrap()
        .expect("admin is seeded")
        .id
}
