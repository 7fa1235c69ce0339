use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::sync::SyncCoordinator;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub coordinator: Arc<SyncCoordinator>,
    pub course_dirs: Arc<Vec<PathBuf>>,
}
