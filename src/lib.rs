pub mod config;
pub mod db;
pub mod error;
pub mod router;
pub mod startup;
pub mod surveys;

pub use config::{Config, ConfigError, HomeWindow};
pub use db::{MemoryStore, PgStore, SurveyStore};
pub use error::{StoreError, SurveyError};
pub use router::build_router;
pub use startup::AppState;
