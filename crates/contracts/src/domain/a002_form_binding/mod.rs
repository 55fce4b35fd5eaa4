pub mod aggregate;

pub use aggregate::{default_form_id, FormBinding, DEFAULT_FORM_ID_PREFIX};

use crate::domain::a001_table_metadata::MetadataKey;

/// Адрес записи с пользовательской формой таблицы
pub mod default_survey_form {
    pub const PARTITION: &str = "DefaultSurveyForm";
    pub const ASPECT: &str = "default";
    pub const KEY_FORM_ID: &str = "formId";
}

pub fn form_id_key(table_id: &str) -> MetadataKey {
    MetadataKey::new(
        table_id,
        default_survey_form::PARTITION,
        default_survey_form::ASPECT,
        default_survey_form::KEY_FORM_ID,
    )
}
