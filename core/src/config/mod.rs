mod load;
mod types;

pub use load::{get_tablero_data_dir, load_default};
pub use types::{ApiConfig, AppConfig, CacheConfig, LoggingConfig};
