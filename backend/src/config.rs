//! Service settings loaded via OrthoConfig.
//!
//! Values layer defaults < configuration file < `FOOD_*` environment
//! variables < command-line flags. Numeric limits carry their defaults in the
//! defaults layer; the remaining fields are optional and accessors supply the
//! fallbacks so that a bare environment still starts a local stack.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const DEFAULT_USER_SERVICE_URL: &str = "http://localhost:8001";
const DEFAULT_MENU_SERVICE_URL: &str = "http://localhost:8002";
const DEFAULT_RESTAURANT_SERVICE_URL: &str = "http://localhost:8003";
const DEFAULT_EMBEDDING_SERVICE_URL: &str = "http://localhost:8004";
const DEFAULT_DATA_PIPELINE_SERVICE_URL: &str = "http://localhost:8004";
const DEFAULT_FILE_SERVICE_URL: &str = "http://localhost:8005";
const DEFAULT_REFERENCE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_COLLABORATOR_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_UPLOAD_ROOT: &str = "uploads";

/// Which of the four services this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServiceKind {
    User,
    Restaurant,
    Menu,
    File,
}

impl ServiceKind {
    pub fn default_port(self) -> u16 {
        match self {
            Self::User => 8001,
            Self::Menu => 8002,
            Self::Restaurant => 8003,
            Self::File => 8005,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Restaurant => "restaurant",
            Self::Menu => "menu",
            Self::File => "file",
        }
    }
}

/// Start-up configuration problems.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("database URL is not configured (set FOOD_DATABASE_URL or DATABASE_URL)")]
    MissingDatabaseUrl,
    #[error("{setting} is not a valid URL ({value}): {source}")]
    InvalidUrl {
        setting: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("bind host {0} is not an IP address")]
    InvalidBindHost(String),
}

/// Layered settings shared by every service process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FOOD")]
pub struct ServiceSettings {
    /// PostgreSQL connection string; `DATABASE_URL` is used when unset.
    pub database_url: Option<String>,
    pub bind_host: Option<String>,
    /// Listening port; defaults per service.
    pub port: Option<u16>,
    pub user_service_url: Option<String>,
    pub menu_service_url: Option<String>,
    pub restaurant_service_url: Option<String>,
    pub file_service_url: Option<String>,
    pub embedding_service_url: Option<String>,
    /// Host of the menu-image processing endpoint.
    pub data_pipeline_service_url: Option<String>,
    #[ortho_config(default = 5)]
    pub reference_timeout_secs: u64,
    #[ortho_config(default = 30)]
    pub collaborator_timeout_secs: u64,
    /// Directory under which uploaded blobs are stored.
    pub upload_root: Option<PathBuf>,
    /// Upper bound on a whole multipart request body.
    #[ortho_config(default = 33_554_432)]
    pub max_upload_bytes: usize,
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_host: None,
            port: None,
            user_service_url: None,
            menu_service_url: None,
            restaurant_service_url: None,
            file_service_url: None,
            embedding_service_url: None,
            data_pipeline_service_url: None,
            reference_timeout_secs: DEFAULT_REFERENCE_TIMEOUT_SECS,
            collaborator_timeout_secs: DEFAULT_COLLABORATOR_TIMEOUT_SECS,
            upload_root: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
        }
    }
}

/// Base URLs of sibling services and collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUrls {
    pub user: Url,
    pub menu: Url,
    pub restaurant: Url,
    pub file: Url,
    pub embedding: Url,
    pub data_pipeline: Url,
}

fn parse_url(
    setting: &'static str,
    value: Option<&str>,
    default: &str,
) -> Result<Url, SettingsError> {
    let value = value.unwrap_or(default);
    Url::parse(value).map_err(|source| SettingsError::InvalidUrl {
        setting,
        value: value.to_owned(),
        source,
    })
}

impl ServiceSettings {
    /// Database URL from settings, else from `DATABASE_URL`.
    pub fn database_url(&self) -> Result<String, SettingsError> {
        self.database_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| {
                std::env::var("DATABASE_URL")
                    .ok()
                    .filter(|url| !url.trim().is_empty())
            })
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    pub fn bind_addr(&self, kind: ServiceKind) -> Result<SocketAddr, SettingsError> {
        let host = match self.bind_host.as_deref() {
            Some(raw) => raw
                .parse::<IpAddr>()
                .map_err(|_| SettingsError::InvalidBindHost(raw.to_owned()))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        Ok(SocketAddr::new(
            host,
            self.port.unwrap_or_else(|| kind.default_port()),
        ))
    }

    /// Parse every service URL, failing on the first malformed one.
    pub fn service_urls(&self) -> Result<ServiceUrls, SettingsError> {
        Ok(ServiceUrls {
            user: parse_url(
                "user_service_url",
                self.user_service_url.as_deref(),
                DEFAULT_USER_SERVICE_URL,
            )?,
            menu: parse_url(
                "menu_service_url",
                self.menu_service_url.as_deref(),
                DEFAULT_MENU_SERVICE_URL,
            )?,
            restaurant: parse_url(
                "restaurant_service_url",
                self.restaurant_service_url.as_deref(),
                DEFAULT_RESTAURANT_SERVICE_URL,
            )?,
            file: parse_url(
                "file_service_url",
                self.file_service_url.as_deref(),
                DEFAULT_FILE_SERVICE_URL,
            )?,
            embedding: parse_url(
                "embedding_service_url",
                self.embedding_service_url.as_deref(),
                DEFAULT_EMBEDDING_SERVICE_URL,
            )?,
            data_pipeline: parse_url(
                "data_pipeline_service_url",
                self.data_pipeline_service_url.as_deref(),
                DEFAULT_DATA_PIPELINE_SERVICE_URL,
            )?,
        })
    }

    pub fn reference_timeout(&self) -> Duration {
        Duration::from_secs(self.reference_timeout_secs)
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator_timeout_secs)
    }

    pub fn upload_root(&self) -> PathBuf {
        self.upload_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_ROOT))
    }

    pub const fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub const fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }
}
