use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::shared::TypedValue;

/// Режим адреса: новая строка или правка существующей
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowOperation {
    Add,
    Edit,
}

impl RowOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowOperation::Add => "add",
            RowOperation::Edit => "edit",
        }
    }
}

impl std::fmt::Display for RowOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Адрес строки, который передаётся в Survey
///
/// Для `Edit` карта `prepopulated` всегда пуста: правка никогда не подставляет
/// значения поверх существующих данных.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowAddress {
    pub operation: RowOperation,
    #[serde(rename = "appName")]
    pub app_name: String,
    #[serde(rename = "tableId")]
    pub table_id: String,
    #[serde(rename = "formId")]
    pub form_id: String,
    #[serde(rename = "rowId")]
    pub row_id: String,
    #[serde(rename = "screenPath", default)]
    pub screen_path: Option<String>,
    /// Ключ элемента → значение, упорядочено по ключу
    #[serde(default)]
    pub prepopulated: BTreeMap<String, TypedValue>,
    /// Готовая строка адреса
    pub uri: String,
}
