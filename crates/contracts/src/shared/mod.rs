pub mod typed_value;

pub use typed_value::TypedValue;
