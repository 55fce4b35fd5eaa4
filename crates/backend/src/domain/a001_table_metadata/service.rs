use std::sync::Arc;

use contracts::domain::a001_table_metadata::{MetadataEntry, MetadataKey};
use contracts::enums::ElementDataType;
use contracts::shared::TypedValue;
use sea_orm::DbErr;

use super::repository::{self, Model};
use crate::shared::data::{SessionGuard, SessionProvider, StoreError};

/// Результат поиска записи по ключу
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Missing,
    Found(Model),
    /// Больше одной строки на ключ: нарушение согласованности
    Ambiguous(usize),
}

/// Разбор выборки по ключу: ровно одна строка или ничего
pub fn select_single(mut rows: Vec<Model>) -> Lookup {
    match rows.len() {
        0 => Lookup::Missing,
        1 => rows.pop().map(Lookup::Found).unwrap_or(Lookup::Missing),
        n => Lookup::Ambiguous(n),
    }
}

/// Клиент хранилища метаданных одного приложения
///
/// Каждая операция открывает свою сессию и возвращает её при любом исходе.
#[derive(Clone)]
pub struct MetadataStoreClient {
    sessions: Arc<dyn SessionProvider>,
    app_name: String,
}

impl MetadataStoreClient {
    pub fn new(sessions: Arc<dyn SessionProvider>, app_name: impl Into<String>) -> Self {
        Self {
            sessions,
            app_name: app_name.into(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    async fn session(&self) -> Result<SessionGuard<'_>, StoreError> {
        SessionGuard::open(self.sessions.as_ref(), &self.app_name).await
    }

    fn db_error(&self, err: DbErr) -> StoreError {
        StoreError::from_db(&self.app_name, err)
    }

    /// Получить запись по ключу
    ///
    /// Несколько строк на ключ логируются и читаются как отсутствие записи.
    pub async fn get(&self, key: &MetadataKey) -> Result<Option<MetadataEntry>, StoreError> {
        let rows = {
            let session = self.session().await?;
            repository::find_by_key(session.conn(), key)
                .await
                .map_err(|e| self.db_error(e))?
        };

        match select_single(rows) {
            Lookup::Missing => Ok(None),
            Lookup::Found(row) => Ok(Some(entry_from_row(row))),
            Lookup::Ambiguous(count) => {
                tracing::warn!(
                    "Ambiguous metadata for {} in app '{}': {} records, treating as not found",
                    key,
                    self.app_name,
                    count
                );
                Ok(None)
            }
        }
    }

    /// Получить значение, разобранное по объявленному типу
    ///
    /// Значение, которое не разбирается, логируется и возвращается как строка.
    pub async fn get_typed(&self, key: &MetadataKey) -> Result<Option<TypedValue>, StoreError> {
        let Some(entry) = self.get(key).await? else {
            return Ok(None);
        };
        match entry.typed_value() {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(
                    "Malformed stored value for {} (declared {}): {}",
                    key,
                    entry.element_type,
                    e
                );
                Ok(Some(TypedValue::String(entry.value)))
            }
        }
    }

    /// Записать значение, заменив предыдущее
    pub async fn upsert(&self, entry: &MetadataEntry) -> Result<(), StoreError> {
        let session = self.session().await?;
        repository::replace(session.conn(), entry)
            .await
            .map_err(|e| self.db_error(e))?;
        tracing::debug!(
            "Upserted {} = '{}' ({}) in app '{}'",
            entry.key,
            entry.value,
            entry.element_type,
            self.app_name
        );
        Ok(())
    }

    /// Удалить запись; отсутствие записи не ошибка
    pub async fn clear(&self, key: &MetadataKey) -> Result<(), StoreError> {
        let session = self.session().await?;
        let removed = repository::delete(session.conn(), key)
            .await
            .map_err(|e| self.db_error(e))?;
        tracing::debug!(
            "Cleared {} in app '{}' ({} rows)",
            key,
            self.app_name,
            removed
        );
        Ok(())
    }

    /// Запись отсутствующего значения удаляет запись
    pub async fn replace(
        &self,
        key: MetadataKey,
        element_type: ElementDataType,
        value: Option<String>,
    ) -> Result<(), StoreError> {
        match value {
            Some(value) => {
                self.upsert(&MetadataEntry::new(key, element_type, value))
                    .await
            }
            None => self.clear(&key).await,
        }
    }

    /// Все записи таблицы, по порядку ключей
    pub async fn list_table(&self, table_id: &str) -> Result<Vec<MetadataEntry>, StoreError> {
        let rows = {
            let session = self.session().await?;
            repository::list_for_table(session.conn(), table_id)
                .await
                .map_err(|e| self.db_error(e))?
        };
        let mut entries: Vec<MetadataEntry> = rows.into_iter().map(entry_from_row).collect();
        entries.sort_by(|a, b| {
            (&a.key.partition, &a.key.aspect, &a.key.key).cmp(&(
                &b.key.partition,
                &b.key.aspect,
                &b.key.key,
            ))
        });
        Ok(entries)
    }
}

// Неизвестный тег типа: значение остаётся непрозрачной строкой
fn entry_from_row(row: Model) -> MetadataEntry {
    match row.to_entry() {
        Some(entry) => entry,
        None => {
            tracing::warn!(
                "Malformed stored value for {}: unknown type '{}', reading as string",
                row.metadata_key(),
                row.value_type
            );
            MetadataEntry::new(row.metadata_key(), ElementDataType::String, row.value)
        }
    }
}
