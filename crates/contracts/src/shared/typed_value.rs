//! Typed scalar values carried as strings
//!
//! `encode`/`decode` are the only place where a value is turned into text or
//! parsed back. Callers never guess types from the raw string themselves.

use serde::{Deserialize, Serialize};

use crate::enums::ElementDataType;

/// Скалярное значение одного из четырёх поддерживаемых типов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TypedValue {
    Integer(i64),
    Number(f64),
    Boolean(bool),
    String(String),
}

impl TypedValue {
    /// Тип, под которым значение записывается в хранилище
    pub fn element_type(&self) -> ElementDataType {
        match self {
            TypedValue::Integer(_) => ElementDataType::Integer,
            TypedValue::Number(_) => ElementDataType::Number,
            TypedValue::Boolean(_) => ElementDataType::Boolean,
            TypedValue::String(_) => ElementDataType::String,
        }
    }

    /// Текстовое представление без экранирования
    ///
    /// Integer и Number пишутся десятичной записью, Boolean как `true`/`false`,
    /// строка как есть.
    pub fn encode(&self) -> String {
        match self {
            TypedValue::Integer(v) => v.to_string(),
            TypedValue::Number(v) => v.to_string(),
            TypedValue::Boolean(v) => v.to_string(),
            TypedValue::String(v) => v.clone(),
        }
    }

    /// Обратная операция к [`TypedValue::encode`] для заданного типа
    pub fn decode(raw: &str, element_type: ElementDataType) -> Result<Self, String> {
        match element_type {
            ElementDataType::String => Ok(TypedValue::String(raw.to_string())),
            ElementDataType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(TypedValue::Integer)
                .map_err(|e| format!("Invalid integer '{}': {}", raw, e)),
            ElementDataType::Number => raw
                .trim()
                .parse::<f64>()
                .map(TypedValue::Number)
                .map_err(|e| format!("Invalid number '{}': {}", raw, e)),
            ElementDataType::Boolean => {
                let trimmed = raw.trim();
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(TypedValue::Boolean(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(TypedValue::Boolean(false))
                } else {
                    Err(format!("Invalid boolean '{}'", raw))
                }
            }
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for TypedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        TypedValue::Integer(v)
    }
}

impl From<i32> for TypedValue {
    fn from(v: i32) -> Self {
        TypedValue::Integer(i64::from(v))
    }
}

impl From<f64> for TypedValue {
    fn from(v: f64) -> Self {
        TypedValue::Number(v)
    }
}

impl From<bool> for TypedValue {
    fn from(v: bool) -> Self {
        TypedValue::Boolean(v)
    }
}

impl From<String> for TypedValue {
    fn from(v: String) -> Self {
        TypedValue::String(v)
    }
}

impl From<&str> for TypedValue {
    fn from(v: &str) -> Self {
        TypedValue::String(v.to_string())
    }
}
