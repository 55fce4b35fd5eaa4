use serde::{Deserialize, Serialize};

/// Префикс id формы, которую Tables генерирует для таблицы без своей формы
///
/// Пользовательская форма с id, начинающимся с этого префикса, по одному id
/// неотличима от сгенерированной. Это известное ограничение.
pub const DEFAULT_FORM_ID_PREFIX: &str = "_generated_";

/// Какой формой Survey добавлять и редактировать строки таблицы
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FormBinding {
    /// Форма назначена пользователем
    Explicit {
        #[serde(rename = "formId")]
        form_id: String,
        #[serde(rename = "screenPath", default)]
        screen_path: Option<String>,
    },
    /// Назначения нет, используется сгенерированная форма
    Implicit {
        #[serde(rename = "formId")]
        form_id: String,
    },
}

impl FormBinding {
    pub fn explicit(form_id: impl Into<String>) -> Self {
        FormBinding::Explicit {
            form_id: form_id.into(),
            screen_path: None,
        }
    }

    /// Привязка по умолчанию: `_generated_` + id таблицы
    pub fn implicit_for(table_id: &str) -> Self {
        FormBinding::Implicit {
            form_id: default_form_id(table_id),
        }
    }

    pub fn form_id(&self) -> &str {
        match self {
            FormBinding::Explicit { form_id, .. } => form_id,
            FormBinding::Implicit { form_id } => form_id,
        }
    }

    pub fn screen_path(&self) -> Option<&str> {
        match self {
            FormBinding::Explicit { screen_path, .. } => screen_path.as_deref(),
            FormBinding::Implicit { .. } => None,
        }
    }

    pub fn is_user_defined(&self) -> bool {
        matches!(self, FormBinding::Explicit { .. })
    }
}

/// Id сгенерированной формы для таблицы
pub fn default_form_id(table_id: &str) -> String {
    format!("{}{}", DEFAULT_FORM_ID_PREFIX, table_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_binding_uses_prefix() {
        let binding = FormBinding::implicit_for("people");
        assert_eq!(binding.form_id(), "_generated_people");
        assert!(!binding.is_user_defined());
        assert_eq!(binding.screen_path(), None);
    }

    #[test]
    fn test_explicit_binding_keeps_screen_path() {
        let binding = FormBinding::Explicit {
            form_id: "custom1".to_string(),
            screen_path: Some("survey/0".to_string()),
        };
        assert!(binding.is_user_defined());
        assert_eq!(binding.form_id(), "custom1");
        assert_eq!(binding.screen_path(), Some("survey/0"));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(FormBinding::explicit("custom1")).unwrap();
        assert_eq!(json["kind"], "explicit");
        assert_eq!(json["formId"], "custom1");
    }
}
