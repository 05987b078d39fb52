use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub export: ExportConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            export: ExportConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Newsletter collaborator and report export behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Subscription endpoint; when unset subscriptions are only logged.
    pub newsletter_endpoint: Option<String>,
    pub newsletter_source: String,
    pub subscription_timeout: Duration,
    pub reset_delay: Duration,
    pub require_subscription: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            newsletter_endpoint: None,
            newsletter_source: "roi-calculator".to_string(),
            subscription_timeout: Duration::from_secs(10),
            reset_delay: Duration::from_millis(2000),
            require_subscription: true,
        }
    }
}

impl ExportConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let newsletter_endpoint = env::var("NEWSLETTER_ENDPOINT")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let newsletter_source =
            env::var("NEWSLETTER_SOURCE").unwrap_or(defaults.newsletter_source);

        let subscription_timeout = match env::var("NEWSLETTER_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or(ConfigError::InvalidTimeout)?,
            ),
            Err(_) => defaults.subscription_timeout,
        };

        let reset_delay = match env::var("EXPORT_RESET_DELAY_MS") {
            Ok(raw) => Duration::from_millis(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidResetDelay)?,
            ),
            Err(_) => defaults.reset_delay,
        };

        let require_subscription = match env::var("EXPORT_REQUIRE_SUBSCRIPTION") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "EXPORT_REQUIRE_SUBSCRIPTION",
            })?,
            Err(_) => defaults.require_subscription,
        };

        Ok(Self {
            newsletter_endpoint,
            newsletter_source,
            subscription_timeout,
            reset_delay,
            require_subscription,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout,
    InvalidResetDelay,
    InvalidFlag { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "NEWSLETTER_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidResetDelay => {
                write!(f, "EXPORT_RESET_DELAY_MS must be a number of milliseconds")
            }
            ConfigError::InvalidFlag { name } => write!(f, "{name} must be true or false"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidResetDelay
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}
