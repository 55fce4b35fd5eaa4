use serde::{Deserialize, Serialize};

use crate::enums::ElementDataType;
use crate::shared::TypedValue;

/// Адрес записи метаданных: (таблица, раздел, аспект, ключ)
///
/// Сравнение точное и чувствительное к регистру.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataKey {
    #[serde(rename = "tableId")]
    pub table_id: String,
    pub partition: String,
    pub aspect: String,
    pub key: String,
}

impl MetadataKey {
    pub fn new(
        table_id: impl Into<String>,
        partition: impl Into<String>,
        aspect: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            table_id: table_id.into(),
            partition: partition.into(),
            aspect: aspect.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.table_id, self.partition, self.aspect, self.key
        )
    }
}

/// Одна запись хранилища метаданных
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    #[serde(flatten)]
    pub key: MetadataKey,
    #[serde(rename = "type")]
    pub element_type: ElementDataType,
    pub value: String,
}

impl MetadataEntry {
    pub fn new(key: MetadataKey, element_type: ElementDataType, value: impl Into<String>) -> Self {
        Self {
            key,
            element_type,
            value: value.into(),
        }
    }

    /// Запись из типизированного значения: тип берётся из варианта
    pub fn from_typed(key: MetadataKey, value: &TypedValue) -> Self {
        Self {
            key,
            element_type: value.element_type(),
            value: value.encode(),
        }
    }

    /// Прочитать значение по объявленному типу
    pub fn typed_value(&self) -> Result<TypedValue, String> {
        TypedValue::decode(&self.value, self.element_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_typed_records_declared_type() {
        let key = MetadataKey::new("people", "SpreadsheetView", "age", "width");
        let entry = MetadataEntry::from_typed(key, &TypedValue::Integer(140));
        assert_eq!(entry.element_type, ElementDataType::Integer);
        assert_eq!(entry.value, "140");
        assert_eq!(entry.typed_value(), Ok(TypedValue::Integer(140)));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let a = MetadataKey::new("People", "p", "a", "k");
        let b = MetadataKey::new("people", "p", "a", "k");
        assert_ne!(a, b);
    }
}
