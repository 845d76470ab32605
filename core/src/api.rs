//! Stable re-exports for consumers (`cli` and external crates).
//!
//! Prefer importing from `tablero_core::api` instead of reaching into
//! internal modules.

pub use crate::adapter::{to_backend, to_ui, TaskWrite};
pub use crate::cache::{FetchResult, QuerySnapshot, TaskQueryCache, TaskSource};
pub use crate::config::{load_default, ApiConfig, AppConfig, CacheConfig, LoggingConfig};
pub use crate::error::{ApiError, CliError};
pub use crate::filter::visible_tasks;
pub use crate::model::{BackendTask, Status, StatusFilter, Task};
pub use crate::repository::{TaskRepository, TASKS_PATH};
pub use crate::transport::Transport;
