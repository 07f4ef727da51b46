use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub monitor: MonitorConfig,
    pub security: SecurityConfig,
    pub radius: RadiusConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

/// Settings for the VPN connectivity monitor and its probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub enabled: bool,
    pub handshake_timeout_secs: u64,
    pub period_ms: u64,
    pub interface: String,
    pub wg_binary: String,
    pub probe_timeout_ms: u64,
}

impl MonitorConfig {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            handshake_timeout_secs: 180,
            period_ms: 60_000,
            interface: "wg0".to_string(),
            wg_binary: "wg".to_string(),
            probe_timeout_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadiusConfig {
    /// Shared secret the RADIUS server presents; empty disables the endpoint
    pub shared_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Monitor overrides
        if let Ok(v) = env::var("VPN_MONITOR_ENABLED") {
            self.monitor.enabled = v.parse().unwrap_or(self.monitor.enabled);
        }
        if let Ok(v) = env::var("VPN_HANDSHAKE_TIMEOUT_SECS") {
            self.monitor.handshake_timeout_secs = v.parse().unwrap_or(self.monitor.handshake_timeout_secs);
        }
        if let Ok(v) = env::var("VPN_MONITOR_PERIOD_MS") {
            self.monitor.period_ms = v.parse().unwrap_or(self.monitor.period_ms);
        }
        if let Ok(v) = env::var("VPN_INTERFACE") {
            if !v.trim().is_empty() {
                self.monitor.interface = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("VPN_WG_BINARY") {
            if !v.trim().is_empty() {
                self.monitor.wg_binary = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("VPN_PROBE_TIMEOUT_MS") {
            self.monitor.probe_timeout_ms = v.parse().unwrap_or(self.monitor.probe_timeout_ms);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }

        if let Ok(v) = env::var("RADIUS_SHARED_SECRET") {
            self.radius.shared_secret = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
            },
            monitor: MonitorConfig {
                // Dev boxes rarely run a WireGuard interface
                enabled: false,
                ..MonitorConfig::default()
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
            },
            radius: RadiusConfig {
                shared_secret: String::new(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
            },
            monitor: MonitorConfig::default(),
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
            },
            radius: RadiusConfig {
                shared_secret: String::new(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
            },
            monitor: MonitorConfig::default(),
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: false,
            },
            radius: RadiusConfig {
                shared_secret: String::new(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
