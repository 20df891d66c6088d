//! storyfeed-store - Transactional local story cache.

mod snapshot;
mod store;

pub use store::LocalStore;
