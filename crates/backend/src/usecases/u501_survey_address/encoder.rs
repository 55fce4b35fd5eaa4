//! Row addresses for Survey
//!
//! Survey expects a forms-provider URI of the form
//!
//! ```text
//! content://org.opendatakit.provider.forms/{appName}/{tableId}/{formId}/#instanceId={rowId}[&screenPath={path}][&{elementKey}={value}...]
//! ```
//!
//! A fresh row id means "add", an existing one means "edit". Every segment and
//! parameter is percent-encoded; prepopulated values follow the row id and the
//! screen path, sorted by element key.

use std::collections::BTreeMap;

use contracts::domain::a002_form_binding::FormBinding;
use contracts::shared::TypedValue;
use contracts::usecases::u501_survey_address::{
    RowAddress, RowOperation, FORMS_PROVIDER_URI, INSTANCE_UUID_PREFIX, PARAM_INSTANCE_ID,
    PARAM_SCREEN_PATH, RESERVED_PARAMS,
};
use thiserror::Error;
use uuid::Uuid;

/// Ошибки построения и разбора адреса
#[derive(Debug, Error, PartialEq)]
pub enum AddressError {
    #[error("{0} must not be empty")]
    EmptySegment(&'static str),

    #[error("Row id for edit must not be empty")]
    EmptyRowId,

    #[error("Element key '{0}' collides with a reserved address parameter")]
    ReservedParameter(String),

    #[error("Malformed address: {0}")]
    Malformed(String),

    #[error("No column '{0}' in the table schema")]
    UnknownColumn(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Новый id строки: `uuid:` + случайный UUID v4
///
/// Глобального счётчика нет, два параллельных add не пересекаются.
pub fn new_row_id() -> String {
    format!("{}{}", INSTANCE_UUID_PREFIX, Uuid::new_v4())
}

/// Строит адреса строк для одного приложения
#[derive(Debug, Clone)]
pub struct RowAddressEncoder {
    app_name: String,
}

impl RowAddressEncoder {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Адрес для добавления строки
    ///
    /// Отсутствующая и пустая карта предзаполнения равнозначны.
    pub fn build_add_address(
        &self,
        table_id: &str,
        binding: &FormBinding,
        prepopulated: Option<BTreeMap<String, TypedValue>>,
    ) -> Result<RowAddress, AddressError> {
        let prepopulated = prepopulated.unwrap_or_default();
        for key in prepopulated.keys() {
            if key.is_empty() {
                return Err(AddressError::EmptySegment("elementKey"));
            }
            if RESERVED_PARAMS.contains(&key.as_str()) {
                return Err(AddressError::ReservedParameter(key.clone()));
            }
        }
        self.build(
            RowOperation::Add,
            table_id,
            binding,
            new_row_id(),
            prepopulated,
        )
    }

    /// Адрес для правки существующей строки
    ///
    /// Значения не подставляются никогда, чтобы не затереть данные строки.
    pub fn build_edit_address(
        &self,
        table_id: &str,
        binding: &FormBinding,
        existing_row_id: &str,
    ) -> Result<RowAddress, AddressError> {
        if existing_row_id.trim().is_empty() {
            return Err(AddressError::EmptyRowId);
        }
        self.build(
            RowOperation::Edit,
            table_id,
            binding,
            existing_row_id.to_string(),
            BTreeMap::new(),
        )
    }

    fn build(
        &self,
        operation: RowOperation,
        table_id: &str,
        binding: &FormBinding,
        row_id: String,
        prepopulated: BTreeMap<String, TypedValue>,
    ) -> Result<RowAddress, AddressError> {
        if self.app_name.is_empty() {
            return Err(AddressError::EmptySegment("appName"));
        }
        if table_id.is_empty() {
            return Err(AddressError::EmptySegment("tableId"));
        }
        if binding.form_id().is_empty() {
            return Err(AddressError::EmptySegment("formId"));
        }

        let screen_path = binding.screen_path().map(str::to_string);
        let uri = render_uri(
            &self.app_name,
            table_id,
            binding.form_id(),
            &row_id,
            screen_path.as_deref(),
            &prepopulated,
        );
        tracing::debug!("Built {} address for table '{}': {}", operation, table_id, uri);

        Ok(RowAddress {
            operation,
            app_name: self.app_name.clone(),
            table_id: table_id.to_string(),
            form_id: binding.form_id().to_string(),
            row_id,
            screen_path,
            prepopulated,
            uri,
        })
    }
}

/// Собрать строку адреса; параметры идут в порядке ключей карты
pub fn render_uri(
    app_name: &str,
    table_id: &str,
    form_id: &str,
    row_id: &str,
    screen_path: Option<&str>,
    prepopulated: &BTreeMap<String, TypedValue>,
) -> String {
    let mut uri = format!(
        "{}/{}/{}/{}/#{}={}",
        FORMS_PROVIDER_URI,
        urlencoding::encode(app_name),
        urlencoding::encode(table_id),
        urlencoding::encode(form_id),
        PARAM_INSTANCE_ID,
        urlencoding::encode(row_id)
    );
    if let Some(path) = screen_path {
        uri.push_str(&format!(
            "&{}={}",
            PARAM_SCREEN_PATH,
            urlencoding::encode(path)
        ));
    }
    for (key, value) in prepopulated {
        uri.push_str(&format!(
            "&{}={}",
            urlencoding::encode(key),
            urlencoding::encode(&value.encode())
        ));
    }
    uri
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> RowAddressEncoder {
        RowAddressEncoder::new("default")
    }

    #[test]
    fn test_add_generates_prefixed_unique_row_ids() {
        let binding = FormBinding::implicit_for("people");
        let first = encoder().build_add_address("people", &binding, None).unwrap();
        let second = encoder().build_add_address("people", &binding, None).unwrap();

        assert!(first.row_id.starts_with("uuid:"));
        assert_eq!(first.row_id.len(), "uuid:".len() + 36);
        assert_ne!(first.row_id, second.row_id);
        assert_eq!(first.operation, RowOperation::Add);
    }

    #[test]
    fn test_edit_keeps_row_id_and_has_no_parameters() {
        let binding = FormBinding::explicit("custom1");
        let address = encoder()
            .build_edit_address("people", &binding, "uuid:X")
            .unwrap();

        assert_eq!(address.row_id, "uuid:X");
        assert!(address.prepopulated.is_empty());
        assert_eq!(address.operation, RowOperation::Edit);
        assert_eq!(
            address.uri,
            "content://org.opendatakit.provider.forms/default/people/custom1/#instanceId=uuid%3AX"
        );
    }

    #[test]
    fn test_empty_and_absent_prepopulated_are_identical() {
        let binding = FormBinding::implicit_for("people");
        let absent = encoder().build_add_address("people", &binding, None).unwrap();
        let empty = encoder()
            .build_add_address("people", &binding, Some(BTreeMap::new()))
            .unwrap();

        assert_eq!(absent.prepopulated, empty.prepopulated);
        assert_eq!(
            absent.uri.replace(&absent.row_id.replace(':', "%3A"), "ROW"),
            empty.uri.replace(&empty.row_id.replace(':', "%3A"), "ROW")
        );
    }

    #[test]
    fn test_parameters_render_sorted_and_escaped() {
        let mut values = BTreeMap::new();
        values.insert("zeta".to_string(), TypedValue::Boolean(false));
        values.insert("age".to_string(), TypedValue::Integer(42));
        values.insert("name".to_string(), TypedValue::from("Ann & Bob=1"));
        values.insert("height".to_string(), TypedValue::Number(1.75));

        let uri = render_uri(
            "default",
            "people",
            "_generated_people",
            "uuid:1",
            None,
            &values,
        );
        assert_eq!(
            uri,
            "content://org.opendatakit.provider.forms/default/people/_generated_people/#instanceId=uuid%3A1&age=42&height=1.75&name=Ann%20%26%20Bob%3D1&zeta=false"
        );
    }

    #[test]
    fn test_screen_path_precedes_prepopulated_values() {
        let binding = FormBinding::Explicit {
            form_id: "custom1".to_string(),
            screen_path: Some("survey/_screen2".to_string()),
        };
        let mut values = BTreeMap::new();
        values.insert("age".to_string(), TypedValue::Integer(7));
        let address = encoder()
            .build_add_address("people", &binding, Some(values))
            .unwrap();

        assert_eq!(address.screen_path.as_deref(), Some("survey/_screen2"));
        assert!(address
            .uri
            .ends_with("&screenPath=survey%2F_screen2&age=7"));
    }

    #[test]
    fn test_segments_are_escaped() {
        let uri = render_uri("my app", "a/b", "f#1", "uuid:1", None, &BTreeMap::new());
        assert!(uri.starts_with("content://org.opendatakit.provider.forms/my%20app/a%2Fb/f%231/#"));
    }

    #[test]
    fn test_reserved_keys_are_rejected() {
        let binding = FormBinding::implicit_for("people");
        let mut values = BTreeMap::new();
        values.insert("instanceId".to_string(), TypedValue::from("uuid:evil"));
        assert_eq!(
            encoder().build_add_address("people", &binding, Some(values)),
            Err(AddressError::ReservedParameter("instanceId".to_string()))
        );
    }

    #[test]
    fn test_empty_inputs_are_rejected() {
        let binding = FormBinding::explicit("custom1");
        assert_eq!(
            encoder().build_edit_address("people", &binding, "  "),
            Err(AddressError::EmptyRowId)
        );
        assert_eq!(
            encoder().build_edit_address("", &binding, "uuid:1"),
            Err(AddressError::EmptySegment("tableId"))
        );
        assert_eq!(
            RowAddressEncoder::new("").build_edit_address("people", &binding, "uuid:1"),
            Err(AddressError::EmptySegment("appName"))
        );
    }
}
