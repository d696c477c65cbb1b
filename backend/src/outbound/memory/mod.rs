//! In-memory document store adapter with JSON snapshot persistence and a
//! cross-process snapshot lock.

mod document;
mod file;
mod lock;
mod store;

pub use document::{BagDocument, OwnerBag};
pub use file::{DocumentFileError, load_document, save_document};
pub use lock::SnapshotLock;
pub use store::InMemoryBagStore;
