pub mod a001_table_metadata;
pub mod a002_form_binding;
pub mod a003_column_settings;
