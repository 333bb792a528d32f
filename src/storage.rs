use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, RwLock};

/// Key-value persistence for JSON documents.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>>;
    async fn put(&self, key: &str, value: Value) -> anyhow::Result<()>;
    /// Writes every pair or none of them.
    async fn put_many(&self, entries: Vec<(String, Value)>) -> anyhow::Result<()>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
    /// Serializes read-modify-write cycles on `scope` within this process.
    /// Hold the guard from the first read until the last write.
    async fn lock_scope(&self, scope: &str) -> OwnedMutexGuard<()>;
}

/// One async mutex per scope name, created on first use.
#[derive(Default)]
pub struct ScopeLocks {
    scopes: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ScopeLocks {
    pub async fn lock(&self, scope: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut scopes = self.scopes.lock().unwrap_or_else(|p| p.into_inner());
            Arc::clone(scopes.entry(scope.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> anyhow::Result<Option<T>> {
    match store.get(key).await? {
        Some(v) => {
            let parsed = serde_json::from_value(v).with_context(|| format!("decode {}", key))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

pub async fn put_json<T: Serialize>(store: &dyn KvStore, key: &str, value: &T) -> anyhow::Result<()> {
    let v = serde_json::to_value(value).with_context(|| format!("encode {}", key))?;
    store.put(key, v).await
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, Value>>,
    locks: ScopeLocks,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.inner.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> anyhow::Result<()> {
        self.inner.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn put_many(&self, entries: Vec<(String, Value)>) -> anyhow::Result<()> {
        let mut map = self.inner.write().await;
        for (k, v) in entries {
            map.insert(k, v);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.inner.write().await.remove(key);
        Ok(())
    }

    async fn lock_scope(&self, scope: &str) -> OwnedMutexGuard<()> {
        self.locks.lock(scope).await
    }
}

/// Postgres-backed store over the `kv_entries` table.
pub struct PgStore {
    db: PgPool,
    locks: ScopeLocks,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            locks: ScopeLocks::default(),
        }
    }
}

#[async_trait]
impl KvStore for PgStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        let value = sqlx::query_scalar::<_, Value>(
            r#"
            SELECT value
            FROM kv_entries
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("kv get {}", key))?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: Value) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await
        .with_context(|| format!("kv put {}", key))?;
        Ok(())
    }

    async fn put_many(&self, entries: Vec<(String, Value)>) -> anyhow::Result<()> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        for (key, value) in entries {
            sqlx::query(
                r#"
                INSERT INTO kv_entries (key, value)
                VALUES ($1, $2)
                ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()
                "#,
            )
            .bind(&key)
            .bind(value)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("kv put {}", key))?;
        }
        tx.commit().await.context("commit tx")?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM kv_entries WHERE key = $1")
            .bind(key)
            .execute(&self.db)
            .await
            .with_context(|| format!("kv delete {}", key))?;
        Ok(())
    }

    async fn lock_scope(&self, scope: &str) -> OwnedMutexGuard<()> {
        self.locks.lock(scope).await
    }
}
