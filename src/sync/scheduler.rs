use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::SyncCoordinator;

/// Auto-sync スケジューラー
/// 設定されたコースを一定間隔で再同期する
pub struct SyncScheduler {
    coordinator: Arc<SyncCoordinator>,
    course_dirs: Arc<Vec<PathBuf>>,
    interval: Duration,
}

impl SyncScheduler {
    pub fn new(
        coordinator: Arc<SyncCoordinator>,
        course_dirs: Arc<Vec<PathBuf>>,
        interval_secs: u64,
    ) -> Self {
        Self {
            coordinator,
            course_dirs,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// 同期を無限ループで定期実行（最初の同期は 1 インターバル後）
    pub async fn start(self) {
        info!("Starting auto-sync scheduler (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;

            let results = self.coordinator.sync_all(&self.course_dirs).await;
            let failed = results.iter().filter(|r| r.error.is_some()).count();
            if failed == 0 {
                info!("Auto-sync completed for {} courses", results.len());
            } else {
                // 失敗したコースは次回のループで再試行
                warn!("Auto-sync: {} of {} courses failed", failed, results.len());
            }
        }
    }
}
