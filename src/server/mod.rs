mod config;
mod daemon;

pub use config::{CatalogSection, IrodsSection, LoggingSection, ServerConfig, ServerSection};
pub use daemon::{build_router, AppState, Daemon};
