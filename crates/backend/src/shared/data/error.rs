use sea_orm::DbErr;
use thiserror::Error;

/// Ошибки хранилища метаданных
///
/// Повторных попыток внутри нет: политика retry остаётся за вызывающим.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable for app '{app_name}': {reason}")]
    StoreUnavailable { app_name: String, reason: String },

    #[error("Database error: {0}")]
    Database(DbErr),
}

impl StoreError {
    pub fn unavailable(app_name: &str, reason: impl Into<String>) -> Self {
        StoreError::StoreUnavailable {
            app_name: app_name.to_string(),
            reason: reason.into(),
        }
    }

    /// Ошибка sea-orm в контексте приложения
    ///
    /// Потеря соединения или закрытый пул означают недоступное хранилище,
    /// остальное остаётся ошибкой конкретного запроса.
    pub fn from_db(app_name: &str, err: DbErr) -> Self {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                StoreError::unavailable(app_name, err.to_string())
            }
            other => StoreError::Database(other),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::StoreUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnAcquireErr, RuntimeErr};

    #[test]
    fn test_connection_errors_mean_unavailable() {
        let err = StoreError::from_db("default", DbErr::ConnectionAcquire(ConnAcquireErr::Timeout));
        assert!(matches!(
            err,
            StoreError::StoreUnavailable { ref app_name, .. } if app_name == "default"
        ));

        let err = StoreError::from_db("default", DbErr::Conn(RuntimeErr::Internal("gone".into())));
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_query_errors_stay_database_errors() {
        let err = StoreError::from_db("default", DbErr::Custom("bad query".to_string()));
        assert!(matches!(err, StoreError::Database(DbErr::Custom(_))));
        assert!(!err.is_unavailable());
    }
}
