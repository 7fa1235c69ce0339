use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://course_sync.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub database_url: String,
    pub course_dirs: Vec<PathBuf>,
    pub bind_addr: SocketAddr,
    /// Auto-sync interval; `None` disables the scheduler.
    pub sync_interval_secs: Option<u64>,
}

impl SyncConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let course_dirs: Vec<PathBuf> = lookup("COURSE_DIRS")
            .ok_or_else(|| AppError::BadRequest("COURSE_DIRS is not set".to_string()))?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
        if course_dirs.is_empty() {
            return Err(AppError::BadRequest("COURSE_DIRS is empty".to_string()));
        }

        let bind_addr: SocketAddr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|_| AppError::BadRequest("BIND_ADDR is not a socket address".to_string()))?;

        let sync_interval_secs = match lookup("SYNC_INTERVAL_SECS") {
            None => None,
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    AppError::BadRequest("SYNC_INTERVAL_SECS must be a whole number".to_string())
                })?;
                (secs > 0).then_some(secs)
            }
        };

        Ok(Self {
            database_url,
            course_dirs,
            bind_addr,
            sync_interval_secs,
        })
    }
}
