use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::usecases::u501_survey_address::RowOperation;

/// Коды результата, с которыми запускается Survey
pub mod request_codes {
    pub const ADD_ROW_SURVEY: i32 = 4;
    pub const EDIT_ROW_SURVEY: i32 = 5;
}

impl RowOperation {
    /// Код результата для этого режима: add и edit различаются
    pub fn request_code(&self) -> i32 {
        match self {
            RowOperation::Add => request_codes::ADD_ROW_SURVEY,
            RowOperation::Edit => request_codes::EDIT_ROW_SURVEY,
        }
    }

    pub fn from_request_code(code: i32) -> Option<Self> {
        match code {
            request_codes::ADD_ROW_SURVEY => Some(RowOperation::Add),
            request_codes::EDIT_ROW_SURVEY => Some(RowOperation::Edit),
            _ => None,
        }
    }
}

/// Операция, ожидающая возврата из Survey
///
/// По ней вызывающая сторона сопоставляет асинхронный возврат с таблицей,
/// которая его инициировала.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    #[serde(rename = "tableId")]
    pub table_id: String,
    pub operation: RowOperation,
    #[serde(rename = "rowId")]
    pub row_id: String,
    #[serde(rename = "requestCode")]
    pub request_code: i32,
    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,
}

/// Результат попытки запустить Survey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DispatchResult {
    /// Адрес передан, ждём возврата
    Dispatched(PendingAction),
    /// Приложение не установлено, ничего не отправлено
    NotInstalled {
        #[serde(rename = "packageName")]
        package_name: String,
    },
}

impl DispatchResult {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, DispatchResult::Dispatched(_))
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        match self {
            DispatchResult::Dispatched(p) => Some(p),
            DispatchResult::NotInstalled { .. } => None,
        }
    }
}
