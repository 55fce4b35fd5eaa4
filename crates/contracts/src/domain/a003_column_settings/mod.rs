//! Column display settings kept in the metadata store

use crate::domain::a001_table_metadata::MetadataKey;

pub const PARTITION: &str = "SpreadsheetView";
pub const KEY_COLUMN_WIDTH: &str = "SpreadsheetView.columnWidth";

/// Width used when nothing (or nothing readable) is stored
pub const DEFAULT_COL_WIDTH: i32 = 125;
pub const MIN_COL_WIDTH: i32 = 1;
pub const MAX_COL_WIDTH: i32 = 500;

/// Key of the width record; the column's element key is the aspect
pub fn column_width_key(table_id: &str, element_key: &str) -> MetadataKey {
    MetadataKey::new(table_id, PARTITION, element_key, KEY_COLUMN_WIDTH)
}

pub fn is_valid_width(width: i32) -> bool {
    (MIN_COL_WIDTH..=MAX_COL_WIDTH).contains(&width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_bounds() {
        assert!(is_valid_width(DEFAULT_COL_WIDTH));
        assert!(is_valid_width(MAX_COL_WIDTH));
        assert!(!is_valid_width(MAX_COL_WIDTH + 1));
        assert!(!is_valid_width(0));
    }
}
