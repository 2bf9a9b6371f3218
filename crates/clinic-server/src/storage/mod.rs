// Storage layer for the clinic server
// Decision: Support both PostgreSQL (production) and in-memory (dev mode and tests)

pub mod backend;
pub mod error;
pub mod memory;
pub mod models;
pub mod password;
pub mod repositories;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult, UniqueField};
pub use memory::{InMemoryDatabase, RowCounts};
pub use models::*;
pub use repositories::Database;
