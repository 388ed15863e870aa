//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use food_backend::config::{ServiceKind, ServiceSettings, ServiceUrls, SettingsError};
use food_backend::outbound::persistence::DbPool;

/// Everything one service process needs to build its state and listener.
pub struct ServerConfig {
    pub(crate) kind: ServiceKind,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) urls: ServiceUrls,
    pub(crate) reference_timeout: Duration,
    pub(crate) collaborator_timeout: Duration,
    pub(crate) upload_root: PathBuf,
    pub(crate) max_upload_bytes: usize,
}

impl ServerConfig {
    /// Resolve settings for `kind` against an already-built pool.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the bind address or a collaborator URL
    /// is malformed.
    pub fn from_settings(
        kind: ServiceKind,
        settings: &ServiceSettings,
        db_pool: DbPool,
    ) -> Result<Self, SettingsError> {
        Ok(Self {
            kind,
            bind_addr: settings.bind_addr(kind)?,
            db_pool,
            urls: settings.service_urls()?,
            reference_timeout: settings.reference_timeout(),
            collaborator_timeout: settings.collaborator_timeout(),
            upload_root: settings.upload_root(),
            max_upload_bytes: settings.max_upload_bytes(),
        })
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[must_use]
    pub fn kind(&self) -> ServiceKind {
        self.kind
    }
}
