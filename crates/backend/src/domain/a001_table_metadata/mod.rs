pub mod repository;
pub mod service;

pub use service::{select_single, Lookup, MetadataStoreClient};
