//! Environment-backed application configuration

use std::env;
use std::sync::{LazyLock, Once};

static INIT: Once = Once::new();

/// Initializes the environment by loading the .env file.
fn init_env() {
    INIT.call_once(|| {
        if let Err(e) = dotenvy::dotenv() {
            tracing::warn!("Warning: .env file not found or error loading: {e}");
        }
    });
}

/// Retrieves an environment variable by key.
///
/// If the variable is not set, returns the provided default value.
/// If no default is provided and the variable is not set, returns an empty string.
#[must_use]
pub fn get_env(key: &str, default: Option<&str>) -> String {
    init_env();
    env::var(key).unwrap_or_else(|_| default.unwrap_or("").to_string())
}

/// Retrieves an environment variable as a parsed type.
#[must_use]
pub fn get_env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    init_env();
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Server settings
    pub server_port: String,
    /// Front-end origin the identity provider redirects to after login.
    pub frontend_origin: String,

    // AWS settings
    pub aws_region: String,
    pub ses_from_email: String,

    // Contest sources
    pub codeforces_api_url: String,
    pub http_timeout_secs: u64,

    // Reminder sweep
    pub reminder_tick_secs: u64,
    pub reminder_lead_secs: i64,
    pub reminder_tolerance_secs: i64,
    pub send_delay_ms: u64,

    // Database settings
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub db_idle_timeout_secs: u64,

    // Sentry settings
    pub sentry_dsn: String,
    pub sentry_traces_sample_rate: f32,
}

impl AppConfig {
    /// Creates a new `AppConfig` from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server_port: get_env("SERVER_PORT", Some("5001")),
            frontend_origin: get_env("FRONTEND_ORIGIN", Some("http://localhost:3000")),

            aws_region: get_env("AWS_REGION", Some("us-east-1")),
            ses_from_email: get_env("SES_FROM_EMAIL", None),

            codeforces_api_url: get_env(
                "CODEFORCES_API_URL",
                Some("https://codeforces.com/api/contest.list"),
            ),
            http_timeout_secs: get_env_parsed("HTTP_TIMEOUT_SECS", 10),

            reminder_tick_secs: get_env_parsed("REMINDER_TICK_SECS", 60),
            reminder_lead_secs: get_env_parsed("REMINDER_LEAD_SECS", 1200),
            reminder_tolerance_secs: get_env_parsed("REMINDER_TOLERANCE_SECS", 30),
            send_delay_ms: get_env_parsed("SEND_DELAY_MS", 1000),

            database_url: get_env(
                "DATABASE_URL",
                Some("sqlite://contest_reminder.db?mode=rwc"),
            ),
            db_max_connections: get_env_parsed("DB_MAX_CONNECTIONS", 20),
            db_min_connections: get_env_parsed("DB_MIN_CONNECTIONS", 5),
            db_acquire_timeout_secs: get_env_parsed("DB_ACQUIRE_TIMEOUT_SECS", 30),
            db_idle_timeout_secs: get_env_parsed("DB_IDLE_TIMEOUT_SECS", 300),

            sentry_dsn: get_env("SENTRY_DSN", None),
            sentry_traces_sample_rate: get_env_parsed("SENTRY_TRACES_SAMPLE_RATE", 0.1),
        }
    }
}

/// Global application configuration instance.
pub static APP_CONFIG: LazyLock<AppConfig> = LazyLock::new(AppConfig::from_env);
