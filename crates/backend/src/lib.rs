//! Metadata store and Survey launch backend of Tables.

pub mod domain;
pub mod shared;
pub mod system;
pub mod usecases;
