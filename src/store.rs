//! SQLite snapshot persistence.
//!
//! The whole editing state fits in two JSON documents keyed by fixed names:
//! `materials` (the catalog) and `product` (the product configuration).
//! Snapshots are loaded once at startup; a missing or unparsable value falls
//! back to defaults with a warning, never an error. Saves happen after every
//! mutation and their failures are logged and swallowed: losing a write must
//! not disturb the in-memory state.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};

use crate::models::{Material, ProductConfig};

pub const MATERIALS_KEY: &str = "materials";
pub const PRODUCT_KEY: &str = "product";

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if necessary) the snapshot database at the given path
    /// and run migrations.
    pub async fn open(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("Failed to open snapshot database at {}", path))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run snapshot database migrations")?;

        Ok(Self { pool })
    }

    /// In-memory database for tests.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePool::connect(":memory:").await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Load the material catalog snapshot, or an empty catalog.
    pub async fn load_materials(&self) -> Vec<Material> {
        self.load_value(MATERIALS_KEY).await.unwrap_or_default()
    }

    /// Load the product configuration snapshot, or the default configuration.
    pub async fn load_product(&self) -> ProductConfig {
        self.load_value(PRODUCT_KEY).await.unwrap_or_default()
    }

    /// Write one snapshot value under its fixed key.
    pub async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize '{}' snapshot", key))?;

        sqlx::query(
            r#"
            INSERT INTO snapshots (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to write '{}' snapshot", key))?;

        Ok(())
    }

    async fn load_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let row: Option<String> =
            match sqlx::query_scalar("SELECT value FROM snapshots WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
            {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(key = key, error = %e, "Failed to read snapshot, using defaults");
                    return None;
                }
            };

        let json = row?;
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = key, error = %e, "Snapshot is unparsable, using defaults");
                None
            }
        }
    }
}
