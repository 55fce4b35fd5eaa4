//! Scoped sessions to the per-app metadata database
//!
//! A session is opened around every logical store operation and released on
//! every exit path by [`SessionGuard`]'s `Drop`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use super::error::StoreError;

/// Открытая сессия к базе приложения
#[derive(Debug, Clone)]
pub struct DbSession {
    id: u64,
    conn: DatabaseConnection,
}

impl DbSession {
    pub fn new(id: u64, conn: DatabaseConnection) -> Self {
        Self { id, conn }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

/// Поставщик сессий к хранилищу
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Открыть сессию для приложения
    async fn open(&self, app_name: &str) -> Result<DbSession, StoreError>;

    /// Вернуть сессию
    fn close(&self, app_name: &str, session: DbSession);
}

/// Сессии поверх уже открытых пулов sea-orm, по одному на приложение
#[derive(Debug, Default)]
pub struct SqliteSessions {
    connections: RwLock<HashMap<String, DatabaseConnection>>,
    next_id: AtomicU64,
    open_sessions: AtomicUsize,
}

impl SqliteSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, app_name: &str, conn: DatabaseConnection) {
        let mut connections = self
            .connections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        connections.insert(app_name.to_string(), conn);
        tracing::info!("Registered metadata database for app '{}'", app_name);
    }

    /// Убрать базу приложения; следующие `open` вернут `StoreUnavailable`
    pub fn unregister(&self, app_name: &str) -> Option<DatabaseConnection> {
        let mut connections = self
            .connections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        connections.remove(app_name)
    }

    /// Сколько сессий сейчас не возвращено
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for SqliteSessions {
    async fn open(&self, app_name: &str) -> Result<DbSession, StoreError> {
        let conn = {
            let connections = self
                .connections
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            connections.get(app_name).cloned()
        };
        let conn = conn.ok_or_else(|| {
            StoreError::unavailable(app_name, "no database registered for app")
        })?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        tracing::trace!("Opened session {} for app '{}'", id, app_name);
        Ok(DbSession::new(id, conn))
    }

    fn close(&self, app_name: &str, session: DbSession) {
        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!("Closed session {} for app '{}'", session.id(), app_name);
    }
}

/// Сессия, которая возвращается поставщику при выходе из области видимости
pub struct SessionGuard<'a> {
    provider: &'a dyn SessionProvider,
    app_name: &'a str,
    conn: DatabaseConnection,
    session: Option<DbSession>,
}

impl<'a> SessionGuard<'a> {
    pub async fn open(
        provider: &'a dyn SessionProvider,
        app_name: &'a str,
    ) -> Result<SessionGuard<'a>, StoreError> {
        let session = provider.open(app_name).await?;
        Ok(Self {
            provider,
            app_name,
            conn: session.conn().clone(),
            session: Some(session),
        })
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.provider.close(self.app_name, session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db;

    #[tokio::test]
    async fn test_guard_returns_session_on_drop() {
        let sessions = SqliteSessions::new();
        sessions.register("default", db::connect("sqlite::memory:").await.unwrap());

        {
            let _guard = SessionGuard::open(&sessions, "default").await.unwrap();
            assert_eq!(sessions.open_sessions(), 1);
        }
        assert_eq!(sessions.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_unknown_app_is_unavailable() {
        let sessions = SqliteSessions::new();
        let err = SessionGuard::open(&sessions, "missing").await.err().unwrap();
        assert!(err.is_unavailable());
        assert_eq!(sessions.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_unregister_makes_store_unavailable() {
        let sessions = SqliteSessions::new();
        sessions.register("default", db::connect("sqlite::memory:").await.unwrap());
        assert!(sessions.unregister("default").is_some());
        assert!(sessions.open("default").await.is_err());
    }
}
