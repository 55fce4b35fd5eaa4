use std::collections::BTreeMap;

use contracts::domain::a002_form_binding::FormBinding;
use contracts::shared::TypedValue;
use contracts::usecases::u502_survey_launch::{DispatchResult, PendingAction};
use thiserror::Error;

use crate::domain::a001_table_metadata::MetadataStoreClient;
use crate::domain::a002_form_binding::FormBindingResolver;
use crate::shared::data::StoreError;
use crate::usecases::u501_survey_address::{AddressError, RowAddressEncoder};
use crate::usecases::u502_survey_launch::{LaunchCoordinator, LaunchError};

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Launch(#[from] LaunchError),
}

/// Добавление и правка строк через Survey
///
/// Сессия хранилища закрывается до запуска Survey и не удерживается, пока
/// внешнее приложение работает.
pub struct SurveyBridge {
    resolver: FormBindingResolver,
    encoder: RowAddressEncoder,
    coordinator: LaunchCoordinator,
    target_package: String,
}

impl SurveyBridge {
    pub fn new(
        store: MetadataStoreClient,
        coordinator: LaunchCoordinator,
        target_package: impl Into<String>,
    ) -> Self {
        let encoder = RowAddressEncoder::new(store.app_name());
        Self {
            resolver: FormBindingResolver::new(store),
            encoder,
            coordinator,
            target_package: target_package.into(),
        }
    }

    pub async fn resolve_form_binding(&self, table_id: &str) -> Result<FormBinding, BridgeError> {
        Ok(self.resolver.resolve(table_id).await?)
    }

    pub async fn persist_form_binding(
        &self,
        table_id: &str,
        binding: &FormBinding,
    ) -> Result<(), BridgeError> {
        Ok(self.resolver.persist(table_id, binding).await?)
    }

    /// Открыть Survey для новой строки, при желании с предзаполненными значениями
    pub async fn begin_add_row(
        &self,
        table_id: &str,
        prepopulated: Option<BTreeMap<String, TypedValue>>,
    ) -> Result<DispatchResult, BridgeError> {
        let binding = self.resolver.resolve(table_id).await?;
        let address = self
            .encoder
            .build_add_address(table_id, &binding, prepopulated)?;
        Ok(self.coordinator.dispatch(&address, &self.target_package)?)
    }

    /// Открыть Survey для правки существующей строки
    pub async fn begin_edit_row(
        &self,
        table_id: &str,
        row_id: &str,
    ) -> Result<DispatchResult, BridgeError> {
        let binding = self.resolver.resolve(table_id).await?;
        let address = self
            .encoder
            .build_edit_address(table_id, &binding, row_id)?;
        Ok(self.coordinator.dispatch(&address, &self.target_package)?)
    }

    /// Возврат из Survey: какая таблица и операция завершились
    pub fn complete(&self, request_code: i32) -> Option<PendingAction> {
        self.coordinator.complete(request_code)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::domain::a001_table_metadata::service::tests::memory_store;
    use crate::shared::data::SqliteSessions;
    use crate::usecases::u501_survey_address::parse_address;
    use crate::usecases::u502_survey_launch::coordinator::tests::FakeHost;
    use crate::usecases::u502_survey_launch::{AppInvoker, InstalledApps};
    use contracts::usecases::u501_survey_address::RowOperation;
    use contracts::usecases::u502_survey_launch::request_codes;

    const SURVEY: &str = "org.opendatakit.survey";

    async fn bridge(host: &Arc<FakeHost>) -> (Arc<SqliteSessions>, SurveyBridge) {
        let (sessions, store) = memory_store().await;
        let coordinator = LaunchCoordinator::new(host.clone(), host.clone());
        (sessions, SurveyBridge::new(store, coordinator, SURVEY))
    }

    #[tokio::test]
    async fn test_add_row_uses_generated_form_by_default() {
        let host = FakeHost::new(true);
        let (_, bridge) = bridge(&host).await;

        let result = bridge.begin_add_row("people", None).await.unwrap();
        let pending = result.pending().unwrap().clone();
        assert_eq!(pending.operation, RowOperation::Add);
        assert_eq!(pending.request_code, request_codes::ADD_ROW_SURVEY);

        let sent = host.sent();
        assert_eq!(sent.len(), 1);
        let parsed = parse_address(&sent[0].0).unwrap();
        assert_eq!(parsed.form_id, "_generated_people");
        assert_eq!(parsed.row_id, pending.row_id);
    }

    #[tokio::test]
    async fn test_edit_row_uses_custom_form() {
        let host = FakeHost::new(true);
        let (_, bridge) = bridge(&host).await;
        bridge
            .persist_form_binding("people", &FormBinding::explicit("custom1"))
            .await
            .unwrap();

        bridge.begin_edit_row("people", "uuid:X").await.unwrap();

        let (uri, code) = host.sent().pop().unwrap();
        assert_eq!(code, request_codes::EDIT_ROW_SURVEY);
        assert_eq!(
            uri,
            "content://org.opendatakit.provider.forms/default/people/custom1/#instanceId=uuid%3AX"
        );
    }

    #[tokio::test]
    async fn test_prepopulated_values_reach_survey() {
        let host = FakeHost::new(true);
        let (_, bridge) = bridge(&host).await;
        let values = BTreeMap::from([
            ("age".to_string(), TypedValue::Integer(30)),
            ("name".to_string(), TypedValue::from("Ann")),
        ]);

        bridge.begin_add_row("people", Some(values)).await.unwrap();

        let parsed = parse_address(&host.sent()[0].0).unwrap();
        assert_eq!(parsed.params.get("age").map(String::as_str), Some("30"));
        assert_eq!(parsed.params.get("name").map(String::as_str), Some("Ann"));
    }

    #[tokio::test]
    async fn test_missing_survey_reports_not_installed() {
        let host = FakeHost::new(false);
        let (_, bridge) = bridge(&host).await;

        let result = bridge.begin_add_row("people", None).await.unwrap();
        assert_eq!(
            result,
            DispatchResult::NotInstalled {
                package_name: SURVEY.to_string()
            }
        );
        let result = bridge.begin_edit_row("people", "uuid:X").await.unwrap();
        assert!(!result.is_dispatched());
        assert!(host.sent().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_stops_before_dispatch() {
        let host = FakeHost::new(true);
        let (sessions, bridge) = bridge(&host).await;
        sessions.unregister("default");

        let err = bridge.begin_add_row("people", None).await.unwrap_err();
        assert!(matches!(err, BridgeError::Store(_)));
        assert!(host.sent().is_empty());
    }

    #[tokio::test]
    async fn test_return_is_matched_to_table() {
        let host = FakeHost::new(true);
        let (_, bridge) = bridge(&host).await;
        bridge.begin_edit_row("people", "uuid:X").await.unwrap();

        let done = bridge.complete(request_codes::EDIT_ROW_SURVEY).unwrap();
        assert_eq!(done.table_id, "people");
    }

    /// Invoker that records how many store sessions are open at launch time
    struct SessionCounter {
        sessions: Arc<SqliteSessions>,
        open_at_launch: Mutex<Vec<usize>>,
    }

    impl InstalledApps for SessionCounter {
        fn is_installed(&self, _package_name: &str) -> bool {
            true
        }
    }

    impl AppInvoker for SessionCounter {
        fn invoke(&self, _address: &str, _request_code: i32) -> Result<(), LaunchError> {
            self.open_at_launch
                .lock()
                .unwrap()
                .push(self.sessions.open_sessions());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_no_session_is_held_while_dispatching() {
        let (sessions, store) = memory_store().await;
        let counter = Arc::new(SessionCounter {
            sessions: sessions.clone(),
            open_at_launch: Mutex::new(Vec::new()),
        });
        let bridge = SurveyBridge::new(
            store,
            LaunchCoordinator::new(counter.clone(), counter.clone()),
            SURVEY,
        );

        bridge.begin_add_row("people", None).await.unwrap();
        bridge.begin_edit_row("people", "uuid:X").await.unwrap();

        assert_eq!(*counter.open_at_launch.lock().unwrap(), vec![0, 0]);
        assert_eq!(sessions.open_sessions(), 0);
    }
}
