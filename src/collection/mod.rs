pub mod mapping;
mod path;
mod routes;
mod service;
mod types;
pub mod xml;

pub use path::normalize_path;
pub use routes::{get_collection, get_collection_without_path};
pub use service::CollectionService;
pub use types::{CollectionData, FileListingEntry};
