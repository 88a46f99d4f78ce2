//! SQLite store for schemaless entities
//!
//! Every committed entity becomes one row in `migrated_entities`, holding its
//! type name and its fields as JSON. The engine is synchronous, so the store
//! owns a current-thread runtime and blocks on each query.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::{Row, SqlitePool};
use tokio::runtime::Runtime;

use crate::migrate::{DynamicEntity, Entity, Store};

/// A row read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntity {
    pub id: i64,
    pub entity_type: String,
    pub fields: serde_json::Value,
    pub migrated_at: DateTime<Utc>,
}

pub struct SqliteStore {
    runtime: Runtime,
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) a database file
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create store directory: {}", parent.display())
                })?;
            }
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::connect(options)
            .with_context(|| format!("Failed to open store: {}", path.display()))
    }

    /// Private in-memory database, gone when the store is dropped
    pub fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("Invalid in-memory connection string")?;
        Self::connect(options)
    }

    fn connect(options: SqliteConnectOptions) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start store runtime")?;

        // One connection: keeps in-memory databases alive and inserts ordered
        let pool = runtime
            .block_on(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options),
            )
            .context("Failed to connect to SQLite")?;

        runtime.block_on(init_schema(&pool))?;
        Ok(SqliteStore { runtime, pool })
    }

    /// Number of stored entities of a type
    pub fn count(&self, entity_type: &str) -> Result<i64> {
        self.runtime.block_on(count_entities(&self.pool, entity_type))
    }

    /// All stored entities of a type in insertion order
    pub fn list(&self, entity_type: &str) -> Result<Vec<StoredEntity>> {
        self.runtime.block_on(list_entities(&self.pool, entity_type))
    }
}

impl Drop for SqliteStore {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

impl Store<DynamicEntity> for SqliteStore {
    fn save(&mut self, entity: &DynamicEntity) -> Result<()> {
        let id = self.runtime.block_on(insert_entity(&self.pool, entity))?;
        log::debug!("Stored {} as row {}", entity.type_name(), id);
        Ok(())
    }
}

async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS migrated_entities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity_type TEXT NOT NULL,
            fields_json TEXT NOT NULL,
            migrated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create migrated_entities table")?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_migrated_entities_type ON migrated_entities(entity_type)",
    )
    .execute(pool)
    .await
    .context("Failed to create migrated_entities index")?;

    Ok(())
}

async fn insert_entity(pool: &SqlitePool, entity: &DynamicEntity) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO migrated_entities (entity_type, fields_json, migrated_at) VALUES (?, ?, ?)",
    )
    .bind(entity.type_name())
    .bind(Json(entity.to_field_map().to_json()))
    .bind(Utc::now())
    .execute(pool)
    .await
    .with_context(|| format!("Failed to insert {}", entity.type_name()))?;

    Ok(result.last_insert_rowid())
}

async fn count_entities(pool: &SqlitePool, entity_type: &str) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM migrated_entities WHERE entity_type = ?")
        .bind(entity_type)
        .fetch_one(pool)
        .await
        .context("Failed to count stored entities")?;
    Ok(row.try_get::<i64, _>("n")?)
}

async fn list_entities(pool: &SqlitePool, entity_type: &str) -> Result<Vec<StoredEntity>> {
    let rows = sqlx::query(
        r#"
        SELECT id, entity_type, fields_json, migrated_at
        FROM migrated_entities
        WHERE entity_type = ?
        ORDER BY id
        "#,
    )
    .bind(entity_type)
    .fetch_all(pool)
    .await
    .context("Failed to list stored entities")?;

    let mut entities = Vec::with_capacity(rows.len());
    for row in rows {
        let Json(fields): Json<serde_json::Value> = row.try_get("fields_json")?;
        entities.push(StoredEntity {
            id: row.try_get("id")?,
            entity_type: row.try_get("entity_type")?,
            fields,
            migrated_at: row.try_get("migrated_at")?,
        });
    }
    Ok(entities)
}
