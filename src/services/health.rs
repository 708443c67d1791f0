//! Orchestrator probes and the system-info panel.
//!
//! None of these touch storage. The readiness probe in particular does not
//! verify database connectivity.

use crate::config::AppConfig;
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use rand::Rng;
use rocket::serde::json::Json;
use rocket::{get, routes, State};
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub(crate) static STARTED_AT: Lazy<Instant> = Lazy::new(Instant::now);

pub const MEMORY_TOTAL_MB: u32 = 512;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Readiness {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Liveness {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the process started.
    pub uptime: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    pub used: u32,
    pub total: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub environment: String,
    pub version: String,
    pub region: String,
    pub cluster: String,
    pub namespace: String,
    pub replicas: String,
    pub last_deploy: DateTime<Utc>,
    pub memory: MemoryUsage,
    pub cloud_provider: String,
    pub platform: String,
    pub features: Vec<String>,
}

/// Demo placeholder, not a measurement: a random 50..250 MB out of 512.
pub fn placeholder_memory_usage() -> MemoryUsage {
    MemoryUsage {
        used: rand::thread_rng().gen_range(50..250),
        total: MEMORY_TOTAL_MB,
    }
}

impl SystemInfo {
    pub fn describe(config: &AppConfig, now: DateTime<Utc>) -> Self {
        SystemInfo {
            environment: config.environment.clone(),
            version: config.version.clone(),
            region: config.region.clone(),
            cluster: config.cluster.clone(),
            namespace: config.namespace.clone(),
            replicas: "1/1".to_string(),
            last_deploy: now - Duration::hours(2),
            memory: placeholder_memory_usage(),
            cloud_provider: "IBM Cloud".to_string(),
            platform: "Kubernetes".to_string(),
            features: ["Auto-scaling", "Load Balancing", "TLS Termination", "Health Monitoring"]
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

#[get("/ready")]
pub fn ready(config: &State<AppConfig>) -> Json<Readiness> {
    Json(Readiness {
        status: "ready".to_string(),
        timestamp: Utc::now(),
        environment: config.environment.clone(),
    })
}

#[get("/live")]
pub fn live() -> Json<Liveness> {
    Json(Liveness {
        status: "live".to_string(),
        timestamp: Utc::now(),
        uptime: STARTED_AT.elapsed().as_secs_f64(),
    })
}

#[get("/system-info")]
pub fn system_info(config: &State<AppConfig>) -> Json<SystemInfo> {
    Json(SystemInfo::describe(config, Utc::now()))
}

pub fn health_routes() -> Vec<rocket::Route> {
    routes![ready, live]
}

pub fn info_routes() -> Vec<rocket::Route> {
    routes![system_info]
}
