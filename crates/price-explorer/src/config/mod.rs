use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

const DEFAULT_LISTINGS_PATH: &str = "data/listings_with_predictions.csv";
const DEFAULT_NEIGHBOURHOODS_CSV: &str = "data/neighbourhoods.csv";
const DEFAULT_NEIGHBOURHOODS_GEOJSON: &str = "data/neighbourhoods.geojson";
const DEFAULT_DASHBOARD_TITLE: &str = "Amsterdam Airbnb Price Explorer";

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
    pub sources: DataSourcesConfig,
    pub dashboard: DashboardConfig,
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

        let sources = DataSourcesConfig {
            listings: path_var("APP_LISTINGS_PATH", DEFAULT_LISTINGS_PATH),
            neighbourhoods: path_var("APP_NEIGHBOURHOODS_CSV", DEFAULT_NEIGHBOURHOODS_CSV),
            boundaries: path_var("APP_NEIGHBOURHOODS_GEOJSON", DEFAULT_NEIGHBOURHOODS_GEOJSON),
            model: env::var("APP_MODEL_PATH")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
        };

        let title =
            env::var("APP_DASHBOARD_TITLE").unwrap_or_else(|_| DEFAULT_DASHBOARD_TITLE.to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            sources,
            dashboard: DashboardConfig { title },
        })
    }
}

fn path_var(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
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

/// Presentation settings for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub title: String,
}

/// Unvalidated locations of the datasets backing the explorer.
#[derive(Debug, Clone)]
pub struct DataSourcesConfig {
    pub listings: PathBuf,
    pub neighbourhoods: PathBuf,
    pub boundaries: PathBuf,
    pub model: Option<PathBuf>,
}

impl DataSourcesConfig {
    /// Checks every configured file exists and pins it to an absolute path.
    pub fn resolve(&self) -> Result<ResolvedSources, ConfigError> {
        Ok(ResolvedSources {
            listings: resolve_path("listings", &self.listings)?,
            neighbourhoods: resolve_path("neighbourhoods", &self.neighbourhoods)?,
            boundaries: resolve_path("boundaries", &self.boundaries)?,
            model: self
                .model
                .as_deref()
                .map(|path| resolve_path("model", path))
                .transpose()?,
        })
    }
}

fn resolve_path(name: &'static str, path: &Path) -> Result<PathBuf, ConfigError> {
    let resolved = path
        .canonicalize()
        .map_err(|source| ConfigError::MissingSource {
            name,
            path: path.to_path_buf(),
            source,
        })?;

    if !resolved.is_file() {
        return Err(ConfigError::NotAFile {
            name,
            path: resolved,
        });
    }

    Ok(resolved)
}

/// Validated dataset locations handed to the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSources {
    pub listings: PathBuf,
    pub neighbourhoods: PathBuf,
    pub boundaries: PathBuf,
    pub model: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    MissingSource {
        name: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    NotAFile {
        name: &'static str,
        path: PathBuf,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::MissingSource { name, path, .. } => {
                write!(f, "{name} source '{}' could not be found", path.display())
            }
            ConfigError::NotAFile { name, path } => {
                write!(f, "{name} source '{}' is not a regular file", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::NotAFile { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::MissingSource { source, .. } => Some(source),
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
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LISTINGS_PATH",
            "APP_NEIGHBOURHOODS_CSV",
            "APP_NEIGHBOURHOODS_GEOJSON",
            "APP_MODEL_PATH",
            "APP_DASHBOARD_TITLE",
        ] {
            env::remove_var(key);
        }
    }

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
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
        assert_eq!(
            config.sources.listings,
            PathBuf::from("data/listings_with_predictions.csv")
        );
        assert!(config.sources.model.is_none());
        assert_eq!(config.dashboard.title, "Amsterdam Airbnb Price Explorer");
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn rejects_non_numeric_port() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PORT", "eighty");
        let error = AppConfig::load().expect_err("port must be numeric");
        assert!(matches!(error, ConfigError::InvalidPort));
        reset_env();
    }

    #[test]
    fn source_paths_follow_environment() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_LISTINGS_PATH", "/srv/listings.csv");
        env::set_var("APP_MODEL_PATH", "  ");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.sources.listings, PathBuf::from("/srv/listings.csv"));
        assert!(config.sources.model.is_none(), "blank model path is ignored");
        reset_env();
    }

    #[test]
    fn resolve_reports_the_missing_source_by_name() {
        let sources = DataSourcesConfig {
            listings: fixture("listings.csv"),
            neighbourhoods: fixture("does-not-exist.csv"),
            boundaries: fixture("neighbourhoods.geojson"),
            model: None,
        };

        let error = sources.resolve().expect_err("missing file is rejected");
        match error {
            ConfigError::MissingSource { name, .. } => assert_eq!(name, "neighbourhoods"),
            other => panic!("expected missing source, got {other:?}"),
        }
    }

    #[test]
    fn resolve_canonicalises_existing_sources() {
        let sources = DataSourcesConfig {
            listings: fixture("listings.csv"),
            neighbourhoods: fixture("neighbourhoods.csv"),
            boundaries: fixture("neighbourhoods.geojson"),
            model: Some(fixture("model.bin")),
        };

        let resolved = sources.resolve().expect("fixtures exist");
        assert!(resolved.listings.is_absolute());
        assert!(resolved.model.expect("model resolved").is_absolute());
    }
}
