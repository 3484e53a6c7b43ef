pub mod db;
pub mod error;
pub mod store;
mod upgrade;

pub use db::{BlobDb, DirDb, MemoryDb};
pub use error::StoreError;
pub use store::{TraceStore, VERSION_KEY};
