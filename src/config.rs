use std::{env, net::SocketAddr};

use crate::{error::AppError, filter::DurationMatch};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub seed_sample_trips: bool,
    pub duration_match: DurationMatch,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://tripbook.db".to_string());
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let seed_sample_trips = match env::var("SEED_SAMPLE_TRIPS") {
            Ok(raw) => parse_flag(&raw)
                .ok_or_else(|| AppError::Config(format!("invalid SEED_SAMPLE_TRIPS: {raw}")))?,
            Err(_) => true,
        };

        let duration_match = match env::var("DURATION_FILTER_MODE") {
            Ok(raw) => raw
                .parse()
                .map_err(|err| AppError::Config(format!("invalid DURATION_FILTER_MODE: {err}")))?,
            Err(_) => DurationMatch::Exact,
        };

        Ok(Self {
            database_url,
            listen_addr,
            seed_sample_trips,
            duration_match,
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
