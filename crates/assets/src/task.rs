use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::decode::{GltfLoader, LoadedAsset};
use crate::error::LoadError;

type LoadResult = Result<LoadedAsset, LoadError>;

/// Handle to an in-flight asset load.
///
/// The decode runs on a worker thread; the owner observes it without
/// blocking through [`LoadTask::poll`], or awaits it with
/// [`LoadTask::join`]. Exactly one result is ever delivered.
#[derive(Debug)]
pub struct LoadTask {
    path: PathBuf,
    rx: flume::Receiver<LoadResult>,
    cancelled: Arc<AtomicBool>,
    delivered: bool,
}

impl LoadTask {
    pub(crate) fn spawn(loader: GltfLoader, path: PathBuf) -> Self {
        let (tx, rx) = flume::bounded(1);
        let cancelled = Arc::new(AtomicBool::new(false));

        let worker_path = path.clone();
        let worker_cancelled = Arc::clone(&cancelled);
        let spawned = std::thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                if worker_cancelled.load(Ordering::Acquire) {
                    return;
                }
                let result = loader.decode(&worker_path);
                if worker_cancelled.load(Ordering::Acquire) {
                    tracing::debug!(path = %worker_path.display(), "load finished after cancel");
                    return;
                }
                // The receiver may already be gone; nobody is waiting then.
                let _ = tx.send(result);
            });

        if let Err(e) = spawned {
            tracing::error!("failed to spawn loader thread: {e}");
            return Self::from_result(path, Err(LoadError::Io(e)));
        }
        tracing::info!(path = %path.display(), "asset load started");

        Self {
            path,
            rx,
            cancelled,
            delivered: false,
        }
    }

    /// A task that is already resolved with `result`.
    pub fn from_result(path: impl Into<PathBuf>, result: LoadResult) -> Self {
        let (tx, rx) = flume::bounded(1);
        let _ = tx.send(result);
        Self {
            path: path.into(),
            rx,
            cancelled: Arc::new(AtomicBool::new(false)),
            delivered: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once the result (or cancellation) has been handed out.
    pub fn is_finished(&self) -> bool {
        self.delivered
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation. The next `poll` reports `LoadError::Cancelled`
    /// and any late worker result is dropped.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            tracing::info!(path = %self.path.display(), "asset load cancelled");
        }
    }

    /// Non-blocking check. Returns `Some` exactly once, when the load
    /// resolves; `None` while pending and after delivery.
    pub fn poll(&mut self) -> Option<LoadResult> {
        if self.delivered {
            return None;
        }
        if self.is_cancelled() {
            self.delivered = true;
            return Some(Err(LoadError::Cancelled));
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.delivered = true;
                Some(result)
            }
            Err(flume::TryRecvError::Empty) => None,
            Err(flume::TryRecvError::Disconnected) => {
                self.delivered = true;
                Some(Err(LoadError::WorkerLost))
            }
        }
    }

    /// Await the result.
    pub async fn join(self) -> LoadResult {
        if self.is_cancelled() {
            return Err(LoadError::Cancelled);
        }
        if self.delivered {
            return Err(LoadError::WorkerLost);
        }
        self.rx
            .recv_async()
            .await
            .map_err(|_| LoadError::WorkerLost)?
    }

    /// Block the calling thread until the result arrives.
    pub fn wait(self) -> LoadResult {
        pollster::block_on(self.join())
    }
}
