use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub observability: ObservabilityConfig,

    pub security: SecurityConfig,

    pub membership: MembershipConfig,

    pub mail: MailConfig,

    pub password_reset: PasswordResetConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "memberdesk".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    /// Sessions expire after this many minutes without a request.
    pub session_inactivity_minutes: i64,

    /// Upper bound for a single state-changing operation, including its transaction.
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8040,
            cors_allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            secure_cookies: true,
            session_inactivity_minutes: 60,
            request_timeout_seconds: 15,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Emit one JSON object per log line instead of human-readable text.
    pub log_json: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/memberdesk.db".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

/// Shape of membership identifiers and non-member display ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MembershipConfig {
    pub id_prefix: String,

    pub id_width: usize,

    /// First number handed out when no member holds an identifier yet.
    pub id_floor: u64,

    /// How many times an approval is retried after losing an identifier race.
    pub allocation_attempts: u32,

    pub non_member_prefix: String,

    pub non_member_width: usize,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            id_prefix: "KWSKW".to_string(),
            id_width: 5,
            id_floor: 5000,
            allocation_attempts: 5,
            non_member_prefix: "KWSKWN".to_string(),
            non_member_width: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// When disabled, outgoing mail is written to the log instead.
    pub enabled: bool,

    pub api_url: String,

    #[serde(skip_serializing)]
    pub api_key: String,

    pub sender_name: String,

    pub sender_address: String,

    /// Used in subjects and signatures.
    pub organisation: String,

    pub timeout_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://api.brevo.com/v3/smtp/email".to_string(),
            api_key: String::new(),
            sender_name: "KWS Admin".to_string(),
            sender_address: String::new(),
            organisation: "KWS".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordResetConfig {
    pub token_ttl_seconds: u64,

    /// Front-end page that receives `?token=`.
    pub reset_url: String,
}

impl Default for PasswordResetConfig {
    fn default() -> Self {
        Self {
            token_ttl_seconds: 3600,
            reset_url: "http://localhost:5173/reset-password".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("MEMBERDESK_DATABASE_URL")
            && !url.is_empty()
        {
            self.general.database_path = url;
        }

        if let Ok(key) = std::env::var("MEMBERDESK_MAIL_API_KEY")
            && !key.is_empty()
        {
            self.mail.api_key = key;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("memberdesk").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".memberdesk").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        let membership = &self.membership;

        if membership.id_prefix.is_empty() {
            anyhow::bail!("membership.id_prefix cannot be empty");
        }

        if membership.id_width == 0 || membership.id_width > 18 {
            anyhow::bail!("membership.id_width must be between 1 and 18");
        }

        if membership.id_floor.to_string().len() > membership.id_width {
            anyhow::bail!(
                "membership.id_floor {} does not fit in {} digits",
                membership.id_floor,
                membership.id_width
            );
        }

        if membership.allocation_attempts == 0 {
            anyhow::bail!("membership.allocation_attempts must be > 0");
        }

        if membership.non_member_prefix.is_empty() || membership.non_member_width == 0 {
            anyhow::bail!("membership.non_member_prefix and non_member_width must be set");
        }

        if self.password_reset.token_ttl_seconds == 0 {
            anyhow::bail!("password_reset.token_ttl_seconds must be > 0");
        }

        if self.server.request_timeout_seconds == 0 {
            anyhow::bail!("server.request_timeout_seconds must be > 0");
        }

        if self.mail.enabled && (self.mail.api_key.is_empty() || self.mail.sender_address.is_empty())
        {
            anyhow::bail!("mail.api_key and mail.sender_address are required when mail is enabled");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.membership.id_prefix, "KWSKW");
        assert_eq!(config.membership.id_width, 5);
        assert_eq!(config.membership.id_floor, 5000);
        assert_eq!(config.password_reset.token_ttl_seconds, 3600);
        assert!(!config.mail.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[membership]"));
        assert!(toml_str.contains("[password_reset]"));
        assert!(!toml_str.contains("api_key"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [membership]
            id_prefix = "ABC"
            id_width = 6
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.membership.id_prefix, "ABC");
        assert_eq!(config.membership.id_width, 6);

        assert_eq!(config.membership.id_floor, 5000);
        assert_eq!(config.server.request_timeout_seconds, 15);
    }

    #[test]
    fn test_validate_rejects_floor_wider_than_width() {
        let mut config = Config::default();
        config.membership.id_width = 3;
        assert!(config.validate().is_err());

        config.membership.id_floor = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_mail_credentials() {
        let mut config = Config::default();
        config.mail.enabled = true;
        assert!(config.validate().is_err());

        config.mail.api_key = "key".to_string();
        config.mail.sender_address = "admin@example.org".to_string();
        assert!(config.validate().is_ok());
    }
}
