pub mod aggregate;

pub use aggregate::{MetadataEntry, MetadataKey};
