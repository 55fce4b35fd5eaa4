pub mod encoder;
pub mod parser;

pub use encoder::{new_row_id, AddressError, RowAddressEncoder};
pub use parser::{parse_address, ParsedAddress};
