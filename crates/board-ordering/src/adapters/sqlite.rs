use crate::config::OrderingConfig;
use crate::domain::errors::StoreError;
use crate::ports::outbound::{OrderingRepository, ScopeTransaction};
use board_types::{ContainerRef, ItemId, ItemRecord, OwnerId, ScopeKey};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const ITEM_COLUMNS: &str = "id, owner_id, kind, scope_key, ord, title, description, priority";

/// SQLite-backed ordering repository.
///
/// Every transaction starts with `BEGIN IMMEDIATE`, so the write lock is
/// taken before the first read and a concurrent mover re-validates against
/// the committed state.
pub struct SqliteOrderingRepository {
    conn: Mutex<Connection>,
}

impl SqliteOrderingRepository {
    pub fn open(path: impl AsRef<Path>, config: &OrderingConfig) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %path.as_ref().display(), journal_mode = %mode, "Opened ordering database");

        install_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        install_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl OrderingRepository for SqliteOrderingRepository {
    fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn ScopeTransaction) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| E::from(StoreError::from(e)))?;

        // Dropping `tx` without commit rolls back.
        let value = f(&mut SqliteTransaction { tx: &tx })?;
        tx.commit().map_err(|e| E::from(StoreError::from(e)))?;
        Ok(value)
    }
}

fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS items (
          id TEXT PRIMARY KEY,
          owner_id TEXT NOT NULL,
          kind TEXT NOT NULL,
          scope_key TEXT NOT NULL,
          container_key TEXT NOT NULL,
          ord INTEGER NOT NULL CHECK(ord >= 0),
          title TEXT NOT NULL,
          description TEXT,
          priority TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_items_scope_ord ON items(scope_key, ord);
        CREATE INDEX IF NOT EXISTS idx_items_container ON items(container_key);

        CREATE TABLE IF NOT EXISTS scope_versions (
          scope_key TEXT PRIMARY KEY,
          version INTEGER NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Text key shared by every column of a container.
fn container_key(container: &ContainerRef) -> String {
    ScopeKey::new(*container, None).to_string()
}

struct RawItem {
    id: String,
    owner: String,
    kind: String,
    scope: String,
    order: i64,
    title: String,
    description: Option<String>,
    priority: String,
}

impl RawItem {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner: row.get(1)?,
            kind: row.get(2)?,
            scope: row.get(3)?,
            order: row.get(4)?,
            title: row.get(5)?,
            description: row.get(6)?,
            priority: row.get(7)?,
        })
    }

    fn into_record(self) -> Result<ItemRecord, StoreError> {
        let corrupt = |what: &str| StoreError::CorruptRow(format!("{} in item {}", what, self.id));
        Ok(ItemRecord {
            id: self.id.parse().map_err(|_| corrupt("id"))?,
            owner: self.owner.parse().map_err(|_| corrupt("owner_id"))?,
            kind: self.kind.parse().map_err(|_| corrupt("kind"))?,
            scope: self.scope.parse().map_err(|_| corrupt("scope_key"))?,
            order: u32::try_from(self.order).map_err(|_| corrupt("ord"))?,
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority.parse().map_err(|_| corrupt("priority"))?,
        })
    }
}

struct SqliteTransaction<'a, 'conn> {
    tx: &'a Transaction<'conn>,
}

impl SqliteTransaction<'_, '_> {
    fn query_items(
        &self,
        sql: &str,
        key: &str,
        owner: OwnerId,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        let mut stmt = self.tx.prepare_cached(sql)?;
        let rows = stmt
            .query_map(params![key, owner.to_string()], RawItem::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(RawItem::into_record).collect()
    }
}

impl ScopeTransaction for SqliteTransaction<'_, '_> {
    fn load_item(&mut self, id: ItemId, owner: OwnerId) -> Result<Option<ItemRecord>, StoreError> {
        let raw = self
            .tx
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1 AND owner_id = ?2"),
                params![id.to_string(), owner.to_string()],
                RawItem::from_row,
            )
            .optional()?;
        raw.map(RawItem::into_record).transpose()
    }

    fn list_scope(
        &mut self,
        scope: &ScopeKey,
        owner: OwnerId,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        self.query_items(
            &format!(
                "SELECT {ITEM_COLUMNS} FROM items WHERE scope_key = ?1 AND owner_id = ?2 ORDER BY ord, id"
            ),
            &scope.to_string(),
            owner,
        )
    }

    fn list_contained(
        &mut self,
        container: &ContainerRef,
        owner: OwnerId,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        self.query_items(
            &format!(
                "SELECT {ITEM_COLUMNS} FROM items WHERE container_key = ?1 AND owner_id = ?2 ORDER BY scope_key, ord"
            ),
            &container_key(container),
            owner,
        )
    }

    fn insert_item(&mut self, record: &ItemRecord) -> Result<(), StoreError> {
        self.tx.execute(
            r#"
            INSERT INTO items(id, owner_id, kind, scope_key, container_key, ord, title, description, priority)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.id.to_string(),
                record.owner.to_string(),
                record.kind.as_str(),
                record.scope.to_string(),
                container_key(&record.scope.container),
                i64::from(record.order),
                record.title,
                record.description,
                record.priority.as_str(),
            ],
        )?;
        Ok(())
    }

    fn set_position(
        &mut self,
        id: ItemId,
        owner: OwnerId,
        scope: &ScopeKey,
        order: u32,
    ) -> Result<bool, StoreError> {
        let changed = self.tx.execute(
            "UPDATE items SET scope_key = ?1, container_key = ?2, ord = ?3 WHERE id = ?4 AND owner_id = ?5",
            params![
                scope.to_string(),
                container_key(&scope.container),
                i64::from(order),
                id.to_string(),
                owner.to_string(),
            ],
        )?;
        Ok(changed == 1)
    }

    fn update_fields(&mut self, record: &ItemRecord) -> Result<bool, StoreError> {
        let changed = self.tx.execute(
            "UPDATE items SET title = ?1, description = ?2, priority = ?3 WHERE id = ?4 AND owner_id = ?5",
            params![
                record.title,
                record.description,
                record.priority.as_str(),
                record.id.to_string(),
                record.owner.to_string(),
            ],
        )?;
        Ok(changed == 1)
    }

    fn delete_item(&mut self, id: ItemId, owner: OwnerId) -> Result<bool, StoreError> {
        let changed = self.tx.execute(
            "DELETE FROM items WHERE id = ?1 AND owner_id = ?2",
            params![id.to_string(), owner.to_string()],
        )?;
        Ok(changed == 1)
    }

    fn scope_version(&mut self, scope: &ScopeKey) -> Result<u64, StoreError> {
        let version: Option<i64> = self
            .tx
            .query_row(
                "SELECT version FROM scope_versions WHERE scope_key = ?1",
                params![scope.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version.map_or(0, |v| v.max(0) as u64))
    }

    fn bump_scope_version(&mut self, scope: &ScopeKey) -> Result<u64, StoreError> {
        let version: i64 = self.tx.query_row(
            r#"
            INSERT INTO scope_versions(scope_key, version) VALUES (?1, 1)
            ON CONFLICT(scope_key) DO UPDATE SET version = version + 1
            RETURNING version
            "#,
            params![scope.to_string()],
            |row| row.get(0),
        )?;
        Ok(version.max(0) as u64)
    }
}
