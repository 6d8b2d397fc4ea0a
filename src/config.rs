//! Configuration for PromoKV
//!
//! Centralized configuration with sensible defaults.

use std::fmt;
use std::str::FromStr;

use crate::error::PromoError;

/// Main configuration for a PromoKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Runtime Profile
    // -------------------------------------------------------------------------
    /// Deployment profile (selects logging defaults)
    pub profile: Profile,

    // -------------------------------------------------------------------------
    // Ingestion Configuration
    // -------------------------------------------------------------------------
    /// Largest upload accepted, in bytes
    pub max_upload_bytes: usize,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Number of worker threads serving connections
    pub worker_threads: usize,

    /// Max accepted connections waiting for a worker
    pub max_connections: usize,

    /// Connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

/// Deployment profile, chosen from `APP_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Verbose logging, the default
    #[default]
    Development,

    /// Quieter logging for release deployments
    Production,
}

impl Profile {
    /// Default `tracing` filter directive for this profile
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Profile::Development => "info,promokv=debug",
            Profile::Production => "warn,promokv=info",
        }
    }
}

impl FromStr for Profile {
    type Err = PromoError;

    /// Only `production` is special; any other value selects development.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("production") {
            Ok(Profile::Production)
        } else {
            Ok(Profile::Development)
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Development => f.write_str("development"),
            Profile::Production => f.write_str("production"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: Profile::Development,
            max_upload_bytes: 32 * 1024 * 1024, // 32 MB
            listen_addr: "127.0.0.1:8080".to_string(),
            worker_threads: 8,
            max_connections: 1024,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.worker_threads == 0 {
            return Err(PromoError::Config("worker_threads must be at least 1".to_string()));
        }
        if self.max_connections == 0 {
            return Err(PromoError::Config("max_connections must be at least 1".to_string()));
        }
        if self.max_upload_bytes > crate::protocol::MAX_PAYLOAD_SIZE as usize {
            return Err(PromoError::Config(format!(
                "max_upload_bytes {} exceeds protocol limit {}",
                self.max_upload_bytes,
                crate::protocol::MAX_PAYLOAD_SIZE
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the deployment profile
    pub fn profile(mut self, profile: Profile) -> Self {
        self.config.profile = profile;
        self
    }

    /// Set the upload size limit (in bytes)
    pub fn max_upload_bytes(mut self, size: usize) -> Self {
        self.config.max_upload_bytes = size;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the maximum number of queued connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
