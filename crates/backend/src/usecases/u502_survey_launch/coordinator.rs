use std::sync::{Arc, Mutex};

use chrono::Utc;
use contracts::usecases::u501_survey_address::RowAddress;
use contracts::usecases::u502_survey_launch::{DispatchResult, PendingAction};
use thiserror::Error;

/// Ошибки запуска внешнего приложения
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Failed to invoke '{target}': {reason}")]
    InvocationFailed { target: String, reason: String },
}

/// Запрос к системе: установлено ли приложение
pub trait InstalledApps: Send + Sync {
    fn is_installed(&self, package_name: &str) -> bool;
}

/// Передача адреса внешнему приложению (fire-and-forget)
pub trait AppInvoker: Send + Sync {
    fn invoke(&self, address: &str, request_code: i32) -> Result<(), LaunchError>;
}

/// Запуск Survey и учёт операции, ожидающей возврата
///
/// Таймаутов нет: возврат приходит вне этого слоя и сопоставляется через
/// [`LaunchCoordinator::complete`].
pub struct LaunchCoordinator {
    installed: Arc<dyn InstalledApps>,
    invoker: Arc<dyn AppInvoker>,
    pending: Mutex<Option<PendingAction>>,
}

impl LaunchCoordinator {
    pub fn new(installed: Arc<dyn InstalledApps>, invoker: Arc<dyn AppInvoker>) -> Self {
        Self {
            installed,
            invoker,
            pending: Mutex::new(None),
        }
    }

    /// Передать адрес приложению `target_package`
    ///
    /// Отсутствие приложения не ошибка, а ожидаемый исход `NotInstalled`.
    pub fn dispatch(
        &self,
        address: &RowAddress,
        target_package: &str,
    ) -> Result<DispatchResult, LaunchError> {
        if !self.installed.is_installed(target_package) {
            tracing::warn!(
                "{} is not installed, cannot {} row in table '{}'",
                target_package,
                address.operation,
                address.table_id
            );
            return Ok(DispatchResult::NotInstalled {
                package_name: target_package.to_string(),
            });
        }

        let action = PendingAction {
            table_id: address.table_id.clone(),
            operation: address.operation,
            row_id: address.row_id.clone(),
            request_code: address.operation.request_code(),
            started_at: Utc::now(),
        };
        // Связь с таблицей фиксируется до запуска: возврат может прийти сразу
        self.set_pending(Some(action.clone()));

        if let Err(e) = self.invoker.invoke(&address.uri, action.request_code) {
            self.set_pending(None);
            tracing::error!("Launching {} failed: {}", target_package, e);
            return Err(e);
        }

        tracing::info!(
            "Dispatched {} for table '{}' to {} (request code {})",
            action.operation,
            action.table_id,
            target_package,
            action.request_code
        );
        Ok(DispatchResult::Dispatched(action))
    }

    /// Текущая операция, ожидающая возврата
    pub fn pending(&self) -> Option<PendingAction> {
        self.lock_pending().clone()
    }

    /// Сопоставить возврат из внешнего приложения по коду результата
    ///
    /// Чужой код логируется и не трогает ожидающую операцию.
    pub fn complete(&self, request_code: i32) -> Option<PendingAction> {
        let mut pending = self.lock_pending();
        if pending
            .as_ref()
            .is_some_and(|action| action.request_code == request_code)
        {
            return pending.take();
        }
        match pending.as_ref() {
            Some(action) => tracing::warn!(
                "Return with request code {} does not match pending {} for table '{}'",
                request_code,
                action.operation,
                action.table_id
            ),
            None => tracing::warn!("Return with request code {} but nothing pending", request_code),
        }
        None
    }

    fn set_pending(&self, action: Option<PendingAction>) {
        *self.lock_pending() = action;
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<PendingAction>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
