use contracts::domain::a001_table_metadata::MetadataEntry;
use contracts::domain::a003_column_settings::{
    column_width_key, is_valid_width, DEFAULT_COL_WIDTH, MAX_COL_WIDTH, MIN_COL_WIDTH,
};
use contracts::shared::TypedValue;

use crate::domain::a001_table_metadata::MetadataStoreClient;
use crate::shared::data::StoreError;

/// Настройки отображения колонок таблицы
#[derive(Clone)]
pub struct ColumnSettings {
    store: MetadataStoreClient,
}

impl ColumnSettings {
    pub fn new(store: MetadataStoreClient) -> Self {
        Self { store }
    }

    /// Ширина колонки; значение по умолчанию, если записи нет или она нечитаема
    pub async fn column_width(&self, table_id: &str, element_key: &str) -> Result<i32, StoreError> {
        let stored = self
            .store
            .get_typed(&column_width_key(table_id, element_key))
            .await?;
        let width = match stored {
            None => DEFAULT_COL_WIDTH,
            Some(value) => match value.as_i64().and_then(|v| i32::try_from(v).ok()) {
                Some(width) => width,
                None => {
                    tracing::warn!(
                        "Column width for {}.{} is not a usable integer ('{}'), using default",
                        table_id,
                        element_key,
                        value
                    );
                    DEFAULT_COL_WIDTH
                }
            },
        };
        Ok(width)
    }

    /// Сохранить ширину колонки
    ///
    /// Ширина вне допустимых границ не записывается, возвращается `false`.
    pub async fn set_column_width(
        &self,
        table_id: &str,
        element_key: &str,
        width: i32,
    ) -> Result<bool, StoreError> {
        if !is_valid_width(width) {
            tracing::error!(
                "Column width {} for {}.{} outside {}..={}, doing nothing",
                width,
                table_id,
                element_key,
                MIN_COL_WIDTH,
                MAX_COL_WIDTH
            );
            return Ok(false);
        }
        let entry = MetadataEntry::from_typed(
            column_width_key(table_id, element_key),
            &TypedValue::from(width),
        );
        self.store.upsert(&entry).await?;
        Ok(true)
    }
}
