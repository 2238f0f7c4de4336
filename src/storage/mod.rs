mod error;
mod memory;
mod seed;
mod session;
pub mod types;

pub use error::StorageError;
pub use memory::MemoryCatalog;
pub use seed::{CatalogSeed, CollectionSeed, DataObjectSeed, UserSeed};
pub use session::{SessionFactory, SessionGuard, StorageSession};
pub use types::*;
