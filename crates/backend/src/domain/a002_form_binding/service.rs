use contracts::domain::a001_table_metadata::MetadataEntry;
use contracts::domain::a002_form_binding::{form_id_key, FormBinding};
use contracts::enums::ElementDataType;

use crate::domain::a001_table_metadata::MetadataStoreClient;
use crate::shared::data::StoreError;

/// Определяет, какой формой Survey работать с таблицей
#[derive(Clone)]
pub struct FormBindingResolver {
    store: MetadataStoreClient,
}

impl FormBindingResolver {
    pub fn new(store: MetadataStoreClient) -> Self {
        Self { store }
    }

    /// Привязка таблицы: сохранённая пользователем или сгенерированная
    pub async fn resolve(&self, table_id: &str) -> Result<FormBinding, StoreError> {
        let entry = self.store.get(&form_id_key(table_id)).await?;
        let binding = match entry {
            Some(entry) => FormBinding::Explicit {
                form_id: entry.value,
                screen_path: None,
            },
            None => FormBinding::implicit_for(table_id),
        };
        tracing::debug!(
            "Resolved form for table '{}': {} (user defined: {})",
            table_id,
            binding.form_id(),
            binding.is_user_defined()
        );
        Ok(binding)
    }

    /// Сохранить привязку
    ///
    /// Хранится только id формы: `screen_path` задаётся при запуске и не
    /// сохраняется. Возврат к сгенерированной форме удаляет запись, а не
    /// пишет заглушку, поэтому `resolve` снова приходит к значению по умолчанию.
    pub async fn persist(&self, table_id: &str, binding: &FormBinding) -> Result<(), StoreError> {
        let key = form_id_key(table_id);
        match binding {
            FormBinding::Explicit {
                form_id,
                screen_path,
            } => {
                if let Some(path) = screen_path {
                    tracing::warn!(
                        "Screen path '{}' for table '{}' is not persisted, only the form id is stored",
                        path,
                        table_id
                    );
                }
                tracing::info!("Binding table '{}' to form '{}'", table_id, form_id);
                self.store
                    .upsert(&MetadataEntry::new(
                        key,
                        ElementDataType::String,
                        form_id.clone(),
                    ))
                    .await
            }
            FormBinding::Implicit { .. } => {
                tracing::info!("Reverting table '{}' to the generated form", table_id);
                self.store.clear(&key).await
            }
        }
    }
}
