//! Single source of truth for the task collection.
//!
//! One logical cache entry holds `{data, fetched_at, inflight, last_error}`.
//! Reads inside the staleness window are served from memory; a stale read
//! starts one network fetch and stores it as a shared future, so concurrent
//! readers coalesce onto the same in-flight request and observe the same
//! resolved value. Successful writes invalidate the entry instead of patching
//! it: the next read re-derives the collection from the server.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;

use crate::config::CacheConfig;
use crate::error::ApiError;
use crate::model::Task;
use crate::repository::TaskRepository;

/// The seam between the cache and the repository, so the caching policies
/// (staleness, retry, coalescing) are testable against a scripted source.
#[async_trait]
pub trait TaskSource: Send + Sync + 'static {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, ApiError>;
    async fn create(&self, title: &str, description: &str, completed: bool)
        -> Result<Task, ApiError>;
    async fn update(
        &self,
        id: i64,
        title: &str,
        description: &str,
        completed: bool,
    ) -> Result<Task, ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
    async fn set_completed(&self, id: i64, completed: bool) -> Result<Task, ApiError>;
}

#[async_trait]
impl TaskSource for TaskRepository {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.list_tasks().await
    }

    async fn create(
        &self,
        title: &str,
        description: &str,
        completed: bool,
    ) -> Result<Task, ApiError> {
        self.create_task(title, description, completed).await
    }

    async fn update(
        &self,
        id: i64,
        title: &str,
        description: &str,
        completed: bool,
    ) -> Result<Task, ApiError> {
        self.update_task(id, title, description, completed).await
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.delete_task(id).await
    }

    async fn set_completed(&self, id: i64, completed: bool) -> Result<Task, ApiError> {
        TaskRepository::set_completed(self, id, completed).await
    }
}

pub type FetchResult = Result<Arc<Vec<Task>>, Arc<ApiError>>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// Observable state of the cached collection: `pending` while a fetch is in
/// flight, last good `data` retained through refetch failures, `error` from
/// the most recent failed fetch.
#[derive(Clone, Default)]
pub struct QuerySnapshot {
    pub data: Option<Arc<Vec<Task>>>,
    pub pending: bool,
    pub error: Option<Arc<ApiError>>,
}

impl QuerySnapshot {
    /// Collection as a slice, or `None` before the first successful fetch.
    pub fn tasks(&self) -> Option<&[Task]> {
        self.data.as_deref().map(Vec::as_slice)
    }
}

#[derive(Default)]
struct CacheEntry {
    data: Option<Arc<Vec<Task>>>,
    fetched_at: Option<Instant>,
    inflight: Option<SharedFetch>,
    last_error: Option<Arc<ApiError>>,
}

pub struct TaskQueryCache<S: TaskSource = TaskRepository> {
    source: Arc<S>,
    stale_after: Duration,
    read_retries: u32,
    retry_delay: Duration,
    entry: Arc<Mutex<CacheEntry>>,
}

impl<S: TaskSource> TaskQueryCache<S> {
    pub fn new(source: S, cfg: &CacheConfig) -> Self {
        Self {
            source: Arc::new(source),
            stale_after: Duration::from_millis(cfg.stale_ms),
            read_retries: cfg.read_retries,
            retry_delay: Duration::from_millis(cfg.retry_delay_ms),
            entry: Arc::new(Mutex::new(CacheEntry::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheEntry> {
        self.entry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the task collection: fresh cache hit, join of an in-flight fetch,
    /// or a new fetch with the read-retry budget applied.
    pub async fn tasks(&self) -> FetchResult {
        let fetch = {
            let mut entry = self.lock();
            if let (Some(data), Some(at)) = (entry.data.as_ref(), entry.fetched_at) {
                if at.elapsed() < self.stale_after {
                    return Ok(Arc::clone(data));
                }
            }
            match entry.inflight.as_ref() {
                Some(inflight) => inflight.clone(),
                None => {
                    let fetch = self.start_fetch();
                    entry.inflight = Some(fetch.clone());
                    fetch
                }
            }
        };
        fetch.await
    }

    fn start_fetch(&self) -> SharedFetch {
        let source = Arc::clone(&self.source);
        let entry = Arc::clone(&self.entry);
        let retries = self.read_retries;
        let delay = self.retry_delay;

        async move {
            let mut attempt = 0u32;
            loop {
                attempt += 1;
                match source.fetch_tasks().await {
                    Ok(tasks) => {
                        let tasks = Arc::new(tasks);
                        let mut guard =
                            entry.lock().unwrap_or_else(PoisonError::into_inner);
                        guard.data = Some(Arc::clone(&tasks));
                        guard.fetched_at = Some(Instant::now());
                        guard.last_error = None;
                        guard.inflight = None;
                        return Ok(tasks);
                    }
                    Err(e) if attempt <= retries => {
                        tracing::warn!(
                            target: "tablero.cache",
                            attempt,
                            error = %e,
                            "task fetch failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    Err(e) => {
                        tracing::warn!(
                            target: "tablero.cache",
                            attempt,
                            error = %e,
                            "task fetch failed, retry budget exhausted"
                        );
                        let e = Arc::new(e);
                        let mut guard =
                            entry.lock().unwrap_or_else(PoisonError::into_inner);
                        // Previous data is kept: last good value survives a
                        // failed refetch.
                        guard.last_error = Some(Arc::clone(&e));
                        guard.inflight = None;
                        return Err(e);
                    }
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Mark the cached collection stale; the next read re-fetches. Data is
    /// kept so consumers can render it while the refetch runs.
    pub fn invalidate(&self) {
        self.lock().fetched_at = None;
    }

    pub fn snapshot(&self) -> QuerySnapshot {
        let entry = self.lock();
        QuerySnapshot {
            data: entry.data.clone(),
            pending: entry.inflight.is_some(),
            error: entry.last_error.clone(),
        }
    }

    // Writes go straight to the source, exactly once. A successful write
    // invalidates the collection rather than patching it client-side.

    pub async fn create_task(
        &self,
        title: &str,
        description: &str,
        completed: bool,
    ) -> Result<Task, ApiError> {
        let task = self.source.create(title, description, completed).await?;
        self.invalidate();
        Ok(task)
    }

    pub async fn update_task(
        &self,
        id: i64,
        title: &str,
        description: &str,
        completed: bool,
    ) -> Result<Task, ApiError> {
        let task = self
            .source
            .update(id, title, description, completed)
            .await?;
        self.invalidate();
        Ok(task)
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        self.source.delete(id).await?;
        self.invalidate();
        Ok(())
    }

    pub async fn set_completed(&self, id: i64, completed: bool) -> Result<Task, ApiError> {
        let task = self.source.set_completed(id, completed).await?;
        self.invalidate();
        Ok(task)
    }
}
