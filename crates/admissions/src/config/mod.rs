use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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

/// Top-level configuration for the admissions service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub intake: IntakeConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let platform_port = env::var("PORT").ok();
        let port = env::var("APP_PORT")
            .ok()
            .or_else(|| platform_port.clone())
            .unwrap_or_else(|| "3000".to_string())
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;
        // A platform-injected PORT expects the service reachable from outside the container.
        let host = env::var("APP_HOST").unwrap_or_else(|_| match platform_port {
            Some(_) => "0.0.0.0".to_string(),
            None => "127.0.0.1".to_string(),
        });
        let max_body_bytes = match env::var("APP_MAX_BODY_BYTES") {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidBodyLimit)?,
            ),
            Err(_) => None,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let backend = match env::var("DATABASE_URL") {
            Ok(url) => StorageBackend::from_url(&url)?,
            Err(_) => StorageBackend::Sqlite {
                path: env::var("APP_SQLITE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("admissions.db")),
            },
        };
        let max_connections = env::var("APP_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|size| *size > 0)
            .ok_or(ConfigError::InvalidPoolSize)?;

        let upload_dir = env::var("APP_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));
        let validation = match env::var("APP_VALIDATION_POLICY") {
            Ok(raw) => ValidationPolicy::parse(&raw)?,
            Err(_) => ValidationPolicy::Legacy,
        };

        Ok(Self {
            environment,
            server: ServerConfig {
                host,
                port,
                max_body_bytes,
            },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            storage: StorageConfig {
                backend,
                max_connections,
            },
            intake: IntakeConfig {
                upload_dir,
                validation,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request-body cap; `None` leaves uploads unbounded.
    pub max_body_bytes: Option<usize>,
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
    pub ansi: bool,
}

/// Which record store backs the `students` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Embedded database file on local disk.
    Sqlite { path: PathBuf },
    /// Networked PostgreSQL server.
    Postgres { url: String },
}

impl StorageBackend {
    pub fn from_url(raw: &str) -> Result<Self, ConfigError> {
        let url = raw.trim();
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return Ok(Self::Postgres {
                url: url.to_string(),
            });
        }

        if let Some(rest) = url.strip_prefix("sqlite:") {
            let path = rest.strip_prefix("//").unwrap_or(rest);
            let path = path.split('?').next().unwrap_or_default();
            if path.is_empty() {
                return Err(ConfigError::UnsupportedDatabaseUrl {
                    url: url.to_string(),
                });
            }
            return Ok(Self::Sqlite {
                path: PathBuf::from(path),
            });
        }

        Err(ConfigError::UnsupportedDatabaseUrl {
            url: redact_credentials(url),
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sqlite { .. } => "sqlite",
            Self::Postgres { .. } => "postgres",
        }
    }
}

fn redact_credentials(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub max_connections: u32,
}

/// How submission failures caused by the client are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Every failure, including a missing field, answers 500.
    #[default]
    Legacy,
    /// Missing fields and malformed forms answer 400.
    Strict,
}

impl ValidationPolicy {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "legacy" | "" => Ok(Self::Legacy),
            "strict" => Ok(Self::Strict),
            other => Err(ConfigError::InvalidValidationPolicy {
                value: other.to_string(),
            }),
        }
    }
}

/// Submission intake settings.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub upload_dir: PathBuf,
    pub validation: ValidationPolicy,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPoolSize,
    InvalidBodyLimit,
    InvalidValidationPolicy { value: String },
    UnsupportedDatabaseUrl { url: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPoolSize => {
                write!(f, "APP_DB_MAX_CONNECTIONS must be a positive integer")
            }
            ConfigError::InvalidBodyLimit => {
                write!(f, "APP_MAX_BODY_BYTES must be a byte count")
            }
            ConfigError::InvalidValidationPolicy { value } => write!(
                f,
                "APP_VALIDATION_POLICY must be 'legacy' or 'strict' (got '{}')",
                value
            ),
            ConfigError::UnsupportedDatabaseUrl { url } => write!(
                f,
                "DATABASE_URL '{}' must use the postgres:// or sqlite: scheme",
                url
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
