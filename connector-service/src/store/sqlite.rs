//! SQLite-backed connector store.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{types::Type, Connection, ErrorCode, OptionalExtension, Row};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::{Connector, ConnectorStore, NewConnector, StoreError};

const SELECT_COLUMNS: &str = "SELECT id, user_id, bot_user_name, bot_token, bot_token_secret,
        created_at, updated_at, deleted_at
     FROM telegram_connectors";

/// Thread-safe SQLite connector store.
///
/// A single connection sits behind an async mutex; each operation holds the
/// guard for exactly one statement, which runs on the blocking thread pool.
#[derive(Clone)]
pub struct SqliteConnectorStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteConnectorStore {
    /// Open or create the SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;

        // journal_mode PRAGMA returns the resulting mode, so use query_row
        let _: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;

        Self::run_migrations(&conn)?;

        info!(path = %path.display(), "connector_store_opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `op` against the connection on the blocking thread pool.
    ///
    /// The async lock is awaited first, so waiting callers never occupy a
    /// blocking thread.
    async fn with_conn<F, T>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone().lock_owned().await;
        tokio::task::spawn_blocking(move || op(&conn))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS telegram_connectors (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                bot_user_name TEXT NOT NULL,
                bot_token TEXT NOT NULL,
                bot_token_secret TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_telegram_connectors_user
                ON telegram_connectors(user_id);

            CREATE UNIQUE INDEX IF NOT EXISTS idx_telegram_connectors_bot_name
                ON telegram_connectors(bot_user_name);
            ",
        )?;
        Ok(())
    }
}

fn connector_from_row(row: &Row<'_>) -> rusqlite::Result<Connector> {
    let raw_id: String = row.get(0)?;
    let id = Uuid::parse_str(&raw_id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

    Ok(Connector {
        id,
        user_id: row.get(1)?,
        bot_user_name: row.get(2)?,
        bot_token: row.get(3)?,
        bot_token_secret: row.get(4)?,
        created_at: row.get::<_, DateTime<Utc>>(5)?,
        updated_at: row.get::<_, DateTime<Utc>>(6)?,
        deleted_at: row.get::<_, Option<DateTime<Utc>>>(7)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

#[async_trait]
impl ConnectorStore for SqliteConnectorStore {
    async fn create(&self, new: NewConnector) -> Result<Connector, StoreError> {
        let now = Utc::now();
        let connector = Connector {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            bot_user_name: new.bot_user_name,
            bot_token: new.bot_token,
            bot_token_secret: new.bot_token_secret,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO telegram_connectors
                    (id, user_id, bot_user_name, bot_token, bot_token_secret, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    connector.id.to_string(),
                    &connector.user_id,
                    &connector.bot_user_name,
                    &connector.bot_token,
                    &connector.bot_token_secret,
                    connector.created_at,
                    connector.updated_at,
                ],
            );

            match inserted {
                Ok(_) => {
                    debug!(connector_id = %connector.id, "connector_store_created");
                    Ok(connector)
                }
                Err(e) if is_unique_violation(&e) => {
                    Err(StoreError::Duplicate(connector.bot_user_name))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Connector>, StoreError> {
        self.with_conn(move |conn| {
            let connector = conn
                .query_row(
                    &format!("{SELECT_COLUMNS} WHERE id = ?1 AND deleted_at IS NULL"),
                    [id.to_string()],
                    connector_from_row,
                )
                .optional()?;
            Ok(connector)
        })
        .await
    }

    async fn get_by_owner(&self, user_id: &str) -> Result<Vec<Connector>, StoreError> {
        let user_id = user_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE user_id = ?1 AND deleted_at IS NULL
                 ORDER BY created_at, id"
            ))?;
            let connectors = stmt
                .query_map([&user_id], connector_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(connectors)
        })
        .await
    }

    async fn get_all(&self) -> Result<Vec<Connector>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE deleted_at IS NULL ORDER BY created_at, id"
            ))?;
            let connectors = stmt
                .query_map([], connector_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(connectors)
        })
        .await
    }

    async fn delete_by_bot_name(&self, bot_user_name: &str) -> Result<bool, StoreError> {
        let bot_user_name = bot_user_name.to_string();
        self.with_conn(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM telegram_connectors WHERE bot_user_name = ?1",
                [&bot_user_name],
            )?;
            Ok(deleted > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_connector(user_id: &str, bot_user_name: &str) -> NewConnector {
        NewConnector {
            user_id: user_id.to_string(),
            bot_user_name: bot_user_name.to_string(),
            bot_token: "123456:ABC-DEF".to_string(),
            bot_token_secret: "a".repeat(64),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_by_id() {
        let store = SqliteConnectorStore::open_in_memory().unwrap();
        let created = store.create(new_connector("owner-1", "first_bot")).await.unwrap();

        let fetched = store.get_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.user_id, "owner-1");
        assert_eq!(fetched.bot_user_name, "first_bot");
        assert_eq!(fetched.bot_token_secret, "a".repeat(64));
        assert_eq!(fetched.created_at, created.created_at);
        assert!(fetched.deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_none() {
        let store = SqliteConnectorStore::open_in_memory().unwrap();
        assert!(store.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_id_is_idempotent() {
        let store = SqliteConnectorStore::open_in_memory().unwrap();
        let created = store.create(new_connector("owner-1", "first_bot")).await.unwrap();

        let first = store.get_by_id(created.id).await.unwrap();
        let second = store.get_by_id(created.id).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_get_by_owner_filters() {
        let store = SqliteConnectorStore::open_in_memory().unwrap();
        store.create(new_connector("owner-1", "first_bot")).await.unwrap();
        store.create(new_connector("owner-2", "second_bot")).await.unwrap();
        store.create(new_connector("owner-1", "third_bot")).await.unwrap();

        let owned = store.get_by_owner("owner-1").await.unwrap();
        let names: Vec<_> = owned.iter().map(|c| c.bot_user_name.as_str()).collect();

        assert_eq!(owned.len(), 2);
        assert!(names.contains(&"first_bot"));
        assert!(names.contains(&"third_bot"));
        assert!(store.get_by_owner("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_all() {
        let store = SqliteConnectorStore::open_in_memory().unwrap();
        assert!(store.get_all().await.unwrap().is_empty());

        store.create(new_connector("owner-1", "first_bot")).await.unwrap();
        store.create(new_connector("owner-2", "second_bot")).await.unwrap();

        assert_eq!(store.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_bot_name_rejected() {
        let store = SqliteConnectorStore::open_in_memory().unwrap();
        store.create(new_connector("owner-1", "first_bot")).await.unwrap();

        let err = store
            .create(new_connector("owner-2", "first_bot"))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Duplicate(ref name) if name == "first_bot"));
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_by_bot_name() {
        let store = SqliteConnectorStore::open_in_memory().unwrap();
        let created = store.create(new_connector("owner-1", "first_bot")).await.unwrap();

        assert!(store.delete_by_bot_name("first_bot").await.unwrap());
        assert!(store.get_by_id(created.id).await.unwrap().is_none());
        assert!(!store.delete_by_bot_name("first_bot").await.unwrap());
    }

    #[tokio::test]
    async fn test_open_file_database_persists() {
        let path = std::env::temp_dir().join(format!("connectors-{}.db", Uuid::new_v4()));
        let id = {
            let store = SqliteConnectorStore::open(&path).unwrap();
            store.create(new_connector("owner-1", "file_bot")).await.unwrap().id
        };

        let reopened = SqliteConnectorStore::open(&path).unwrap();
        let fetched = reopened.get_by_id(id).await.unwrap();
        assert_eq!(fetched.map(|c| c.bot_user_name), Some("file_bot".to_string()));

        drop(reopened);
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_operations_share_one_connection() {
        let store = SqliteConnectorStore::open_in_memory().unwrap();

        let tasks: Vec<_> = (0..16)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move {
                    let created = store
                        .create(new_connector("owner-1", &format!("bot_{n}")))
                        .await
                        .unwrap();
                    store.get_by_id(created.id).await.unwrap().unwrap()
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.get_by_owner("owner-1").await.unwrap().len(), 16);
    }
}
