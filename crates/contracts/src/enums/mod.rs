pub mod element_data_type;

pub use element_data_type::ElementDataType;
