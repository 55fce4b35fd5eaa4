pub mod service;

pub use service::ColumnSettings;
