use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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

/// Longest trailing window the dashboard trend series will cover.
pub const MAX_STATS_WINDOW_DAYS: u32 = 366;

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub board: BoardConfig,
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

        let defaults = BoardConfig::default();
        let board = BoardConfig {
            default_max_applicants: positive_var(
                "APP_DEFAULT_MAX_APPLICANTS",
                defaults.default_max_applicants,
            )?,
            stats_window_days: bounded_var(
                "APP_STATS_WINDOW_DAYS",
                defaults.stats_window_days,
                MAX_STATS_WINDOW_DAYS,
            )?,
            delivery_attempts: positive_var(
                "APP_NOTIFICATION_DELIVERY_ATTEMPTS",
                defaults.delivery_attempts,
            )?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            board,
        })
    }
}

fn positive_var(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<u32>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::InvalidPositive { name, value: raw }),
        },
        Err(_) => Ok(default),
    }
}

fn bounded_var(name: &'static str, default: u32, max: u32) -> Result<u32, ConfigError> {
    let value = positive_var(name, default)?;
    if value > max {
        return Err(ConfigError::OutOfRange { name, value, max });
    }
    Ok(value)
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Job board policy knobs that are not fixed by the domain rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    /// Capacity assigned to a job draft that does not name one.
    pub default_max_applicants: u32,
    /// Trailing window, in days, used by the dashboard trend series.
    pub stats_window_days: u32,
    /// Delivery attempts per notification before the dispatcher gives up.
    pub delivery_attempts: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            default_max_applicants: 50,
            stats_window_days: 7,
            delivery_attempts: 3,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPositive { name: &'static str, value: String },
    OutOfRange { name: &'static str, value: u32, max: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPositive { name, value } => {
                write!(f, "{name} must be a positive integer (found '{value}')")
            }
            ConfigError::OutOfRange { name, value, max } => {
                write!(f, "{name} must be at most {max} (found {value})")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidPositive { .. }
            | ConfigError::OutOfRange { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_DEFAULT_MAX_APPLICANTS");
        env::remove_var("APP_STATS_WINDOW_DAYS");
        env::remove_var("APP_NOTIFICATION_DELIVERY_ATTEMPTS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.board, BoardConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn board_overrides_are_read_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "prod");
        env::set_var("APP_DEFAULT_MAX_APPLICANTS", "12");
        env::set_var("APP_STATS_WINDOW_DAYS", "30");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.board.default_max_applicants, 12);
        assert_eq!(config.board.stats_window_days, 30);
        assert_eq!(config.board.delivery_attempts, 3);
        reset_env();
    }

    #[test]
    fn rejects_zero_capacity_default() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_DEFAULT_MAX_APPLICANTS", "0");
        match AppConfig::load() {
            Err(ConfigError::InvalidPositive { name, .. }) => {
                assert_eq!(name, "APP_DEFAULT_MAX_APPLICANTS")
            }
            other => panic!("expected invalid positive error, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn caps_the_stats_window() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_STATS_WINDOW_DAYS", "366");
        let config = AppConfig::load().expect("a full year is accepted");
        assert_eq!(config.board.stats_window_days, MAX_STATS_WINDOW_DAYS);

        env::set_var("APP_STATS_WINDOW_DAYS", "4000000000");
        match AppConfig::load() {
            Err(ConfigError::OutOfRange { name, value, max }) => {
                assert_eq!(name, "APP_STATS_WINDOW_DAYS");
                assert_eq!(value, 4_000_000_000);
                assert_eq!(max, MAX_STATS_WINDOW_DAYS);
            }
            other => panic!("expected out of range error, got {other:?}"),
        }
        reset_env();
    }
}
