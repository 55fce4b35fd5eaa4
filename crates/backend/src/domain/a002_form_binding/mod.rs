pub mod service;

pub use service::FormBindingResolver;
