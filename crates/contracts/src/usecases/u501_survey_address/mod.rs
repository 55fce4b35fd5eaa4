pub mod address;

pub use address::{RowAddress, RowOperation};

/// Authority of the forms provider that Survey listens on
pub const FORMS_PROVIDER_URI: &str = "content://org.opendatakit.provider.forms";

/// Prefix of every row (instance) id
pub const INSTANCE_UUID_PREFIX: &str = "uuid:";

/// Fragment parameter carrying the row id
pub const PARAM_INSTANCE_ID: &str = "instanceId";

/// Fragment parameter carrying the start screen
pub const PARAM_SCREEN_PATH: &str = "screenPath";

/// Names that prepopulated element keys may not take
pub const RESERVED_PARAMS: [&str; 2] = [PARAM_INSTANCE_ID, PARAM_SCREEN_PATH];
