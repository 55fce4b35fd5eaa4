use serde::{Deserialize, Serialize};

/// Объявленный тип значения в хранилище метаданных
///
/// Само значение всегда хранится строкой, тег сообщает, как её читать.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementDataType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ElementDataType {
    /// Код типа в том виде, в каком он лежит в колонке `_type`
    pub fn code(&self) -> &'static str {
        match self {
            ElementDataType::String => "string",
            ElementDataType::Integer => "integer",
            ElementDataType::Number => "number",
            ElementDataType::Boolean => "boolean",
        }
    }

    /// Все поддерживаемые типы
    pub fn all() -> Vec<ElementDataType> {
        vec![
            ElementDataType::String,
            ElementDataType::Integer,
            ElementDataType::Number,
            ElementDataType::Boolean,
        ]
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "string" => Some(ElementDataType::String),
            "integer" => Some(ElementDataType::Integer),
            "number" => Some(ElementDataType::Number),
            "boolean" => Some(ElementDataType::Boolean),
            _ => None,
        }
    }
}

impl std::fmt::Display for ElementDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
