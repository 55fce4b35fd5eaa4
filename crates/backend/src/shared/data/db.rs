use std::path::Path;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement,
};

/// Таблица хранилища метаданных
pub const KEY_VALUE_STORE_TABLE: &str = "_key_value_store_active";

/// Открыть (и при необходимости создать) файл базы по пути
pub async fn initialize_database(db_file: &Path) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    let conn = connect(&build_sqlite_url(&absolute_path)).await?;
    Ok(conn)
}

/// Подключение по URL и создание схемы
///
/// Для `sqlite::memory:` пул ограничен одним соединением, иначе каждое
/// соединение видело бы свою пустую базу.
pub async fn connect(db_url: &str) -> Result<DatabaseConnection, sea_orm::DbErr> {
    let mut options = ConnectOptions::new(db_url.to_string());
    options.sqlx_logging(false);
    if db_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }
    let conn = Database::connect(options).await?;
    ensure_schema(&conn).await?;
    Ok(conn)
}

// Normalize path separators and ensure proper URL form on Windows
fn build_sqlite_url(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

/// Минимальная схема: одна таблица и индекс поиска
///
/// Индекс намеренно не уникальный: единственность записи обеспечивает
/// транзакционный upsert, а дубликаты от сторонних писателей читаются как
/// неоднозначные метаданные.
pub async fn ensure_schema<C: ConnectionTrait>(conn: &C) -> Result<(), sea_orm::DbErr> {
    let existing = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!(
                "SELECT name FROM sqlite_master WHERE type='table' AND name='{}';",
                KEY_VALUE_STORE_TABLE
            ),
        ))
        .await?;
    if !existing.is_empty() {
        return Ok(());
    }

    tracing::info!("Creating {} table", KEY_VALUE_STORE_TABLE);
    let create_table_sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
            _table_id TEXT NOT NULL,
            _partition TEXT NOT NULL,
            _aspect TEXT NOT NULL,
            _key TEXT NOT NULL,
            _type TEXT NOT NULL,
            _value TEXT NOT NULL
        );
        "#,
        table = KEY_VALUE_STORE_TABLE
    );
    conn.execute(Statement::from_string(DatabaseBackend::Sqlite, create_table_sql))
        .await?;

    let create_index_sql = format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_lookup ON {table} (_table_id, _partition, _aspect, _key);",
        table = KEY_VALUE_STORE_TABLE
    );
    conn.execute(Statement::from_string(DatabaseBackend::Sqlite, create_index_sql))
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_sqlite_url() {
        assert_eq!(
            build_sqlite_url(Path::new("/var/lib/tables/app.db")),
            "sqlite:///var/lib/tables/app.db?mode=rwc"
        );
        assert_eq!(
            build_sqlite_url(Path::new("C:\\data\\app.db")),
            "sqlite:///C:/data/app.db?mode=rwc"
        );
    }

    #[tokio::test]
    async fn test_schema_bootstrap_is_idempotent() {
        let conn = connect("sqlite::memory:").await.unwrap();
        ensure_schema(&conn).await.unwrap();
        let rows = conn
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                format!(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name='{}';",
                    KEY_VALUE_STORE_TABLE
                ),
            ))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }
}
