//! Receiving side of the row address
//!
//! The address does not carry declared types, so prepopulated values come back
//! as raw strings and are typed against the table's column schema.

use std::collections::{BTreeMap, HashMap};

use contracts::enums::ElementDataType;
use contracts::shared::TypedValue;
use contracts::usecases::u501_survey_address::{
    FORMS_PROVIDER_URI, PARAM_INSTANCE_ID, PARAM_SCREEN_PATH,
};

use super::encoder::AddressError;

/// Разобранный адрес строки
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    pub app_name: String,
    pub table_id: String,
    pub form_id: String,
    pub row_id: String,
    pub screen_path: Option<String>,
    /// Ключ элемента → значение без типа
    pub params: BTreeMap<String, String>,
}

impl ParsedAddress {
    /// Типизировать параметры по схеме колонок таблицы
    pub fn typed_params(
        &self,
        columns: &HashMap<String, ElementDataType>,
    ) -> Result<BTreeMap<String, TypedValue>, AddressError> {
        let mut typed = BTreeMap::new();
        for (key, raw) in &self.params {
            let element_type = columns
                .get(key)
                .ok_or_else(|| AddressError::UnknownColumn(key.clone()))?;
            let value = TypedValue::decode(raw, *element_type).map_err(|reason| {
                AddressError::InvalidValue {
                    key: key.clone(),
                    reason,
                }
            })?;
            typed.insert(key.clone(), value);
        }
        Ok(typed)
    }
}

fn decode_component(raw: &str) -> Result<String, AddressError> {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .map_err(|e| AddressError::Malformed(format!("bad escape in '{}': {}", raw, e)))
}

/// Разобрать адрес, построенный [`super::RowAddressEncoder`]
pub fn parse_address(uri: &str) -> Result<ParsedAddress, AddressError> {
    let rest = uri
        .strip_prefix(FORMS_PROVIDER_URI)
        .and_then(|r| r.strip_prefix('/'))
        .ok_or_else(|| AddressError::Malformed(format!("unexpected authority in '{}'", uri)))?;

    let (path, fragment) = rest
        .split_once("/#")
        .ok_or_else(|| AddressError::Malformed("missing '#' parameters".to_string()))?;

    let segments: Vec<&str> = path.split('/').collect();
    let [app_name, table_id, form_id] = segments.as_slice() else {
        return Err(AddressError::Malformed(format!(
            "expected appName/tableId/formId, got '{}'",
            path
        )));
    };

    let mut row_id = None;
    let mut screen_path = None;
    let mut params = BTreeMap::new();
    for pair in fragment.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair
            .split_once('=')
            .ok_or_else(|| AddressError::Malformed(format!("parameter without value: '{}'", pair)))?;
        let key = decode_component(raw_key)?;
        let value = decode_component(raw_value)?;

        let duplicate = match key.as_str() {
            PARAM_INSTANCE_ID => row_id.replace(value).is_some(),
            PARAM_SCREEN_PATH => screen_path.replace(value).is_some(),
            _ => params.insert(key.clone(), value).is_some(),
        };
        if duplicate {
            return Err(AddressError::Malformed(format!("duplicate parameter '{}'", key)));
        }
    }

    let row_id = row_id.ok_or_else(|| {
        AddressError::Malformed(format!("missing '{}' parameter", PARAM_INSTANCE_ID))
    })?;

    Ok(ParsedAddress {
        app_name: decode_component(app_name)?,
        table_id: decode_component(table_id)?,
        form_id: decode_component(form_id)?,
        row_id,
        screen_path,
        params,
    })
}
