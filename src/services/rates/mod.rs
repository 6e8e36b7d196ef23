pub mod errors;
pub mod fetcher;
pub mod format;
pub mod models;
pub mod snapshot_store;
pub mod sources;
