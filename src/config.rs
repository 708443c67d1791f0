// cloudtodo/src/config.rs
use std::env;

pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_VERSION: &str = "v1.0.0";
pub const DEFAULT_REGION: &str = "us-south";
pub const DEFAULT_CLUSTER: &str = "cloudtodo-cluster";
pub const DEFAULT_NAMESPACE: &str = "default";

/// Process configuration read from the environment.
///
/// Only `database_url` changes behaviour. The remaining fields are labels
/// echoed by the health and system-info endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub environment: String,
    pub version: String,
    pub region: String,
    pub cluster: String,
    pub namespace: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig::from_lookup(|_| None)
    }
}

impl AppConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        AppConfig::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let or_default = |key: &str, default: &str| read(key).unwrap_or_else(|| default.to_string());

        AppConfig {
            database_url: read("DATABASE_URL"),
            environment: read("APP_ENV")
                .or_else(|| read("NODE_ENV"))
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            version: or_default("APP_VERSION", DEFAULT_VERSION),
            region: or_default("IBM_CLOUD_REGION", DEFAULT_REGION),
            cluster: or_default("KUBERNETES_CLUSTER_NAME", DEFAULT_CLUSTER),
            namespace: or_default("KUBERNETES_NAMESPACE", DEFAULT_NAMESPACE),
        }
    }
}
