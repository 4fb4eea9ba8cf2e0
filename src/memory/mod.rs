//! Persistent reputation memory
//!
//! Per-source profile counters, trusted-source weights and the append-only
//! event history. Backed by SQLite; counter updates go through a single
//! atomic upsert per source so `total_scans` never regresses even when
//! concurrent requests race on the same key.


use crate::error::Result;
use crate::types::HardData;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Sources trusted out of the box, matched by substring
const TRUSTED_SEEDS: &[(&str, f64)] = &[
    ("reuters", 0.95),
    ("bloomberg", 0.95),
    ("ft", 0.95),
    ("financial times", 0.95),
    ("wsj", 0.95),
    ("wall street journal", 0.95),
];

/// Persistent per-source record. `consensus_hits <= total_scans` always.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SourceProfile {
    /// Primary key, lowercased
    pub source: String,
    pub total_scans: i64,
    pub consensus_hits: i64,
    /// Seconds since epoch
    pub updated_at: i64,
}

/// One row of the append-only analysis history
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub query: String,
    pub hard_data: String,
    pub verdict_summary: String,
    pub created_at: i64,
}

/// Reputation store over SQLite
pub struct ReputationStore {
    pool: SqlitePool,
}

impl ReputationStore {
    /// Connect to the database (created if missing) and run migrations.
    /// Accepts a plain path or a full sqlite: URL.
    pub async fn connect(path: &str) -> Result<Self> {
        let db_url = if path.starts_with("sqlite:") {
            path.to_string()
        } else {
            format!("sqlite:{}?mode=rwc", path)
        };

        // A pooled :memory: database would give every connection its own
        // empty database, so the in-memory variant pins a single connection.
        let max_connections = if db_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await?;

        let store = Self { pool };
        store.run_migrations().await?;
        store.seed_trusted_sources().await?;

        Ok(store)
    }

    /// In-memory database for tests
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS source_profiles (
                source TEXT PRIMARY KEY,
                total_scans INTEGER NOT NULL DEFAULT 0,
                consensus_hits INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trusted_sources (
                source TEXT PRIMARY KEY,
                weight REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS event_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                query TEXT NOT NULL,
                hard_data TEXT NOT NULL,
                verdict_summary TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Seed the trusted-source table once; reruns are no-ops
    async fn seed_trusted_sources(&self) -> Result<()> {
        for (source, weight) in TRUSTED_SEEDS {
            sqlx::query("INSERT OR IGNORE INTO trusted_sources (source, weight) VALUES (?, ?)")
                .bind(source)
                .bind(weight)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    /// Profile for a source, if one exists
    pub async fn get_profile(&self, source: &str) -> Result<Option<SourceProfile>> {
        let profile = sqlx::query_as::<_, SourceProfile>(
            "SELECT source, total_scans, consensus_hits, updated_at FROM source_profiles WHERE source = ?",
        )
        .bind(source.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Replace a profile wholesale; stamps `updated_at` with now
    pub async fn upsert_profile(&self, source: &str, profile: &SourceProfile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO source_profiles (source, total_scans, consensus_hits, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(source) DO UPDATE SET
                total_scans = excluded.total_scans,
                consensus_hits = excluded.consensus_hits,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(source.to_lowercase())
        .bind(profile.total_scans)
        .bind(profile.consensus_hits)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Record one scan of a source, atomically bumping its counters.
    /// `consensus` marks agreement with the winning narrative.
    pub async fn record_scan(&self, source: &str, consensus: bool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO source_profiles (source, total_scans, consensus_hits, updated_at)
            VALUES (?1, 1, ?2, ?3)
            ON CONFLICT(source) DO UPDATE SET
                total_scans = total_scans + 1,
                consensus_hits = consensus_hits + excluded.consensus_hits,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(source.to_lowercase())
        .bind(consensus as i64)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Weight of the first trusted row whose name is contained in
    /// `source_name` (both lowercased), or None
    pub async fn trusted_weight(&self, source_name: &str) -> Result<Option<f64>> {
        let weight = sqlx::query_scalar::<_, f64>(
            "SELECT weight FROM trusted_sources WHERE instr(?1, source) > 0 ORDER BY rowid LIMIT 1",
        )
        .bind(source_name.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(weight)
    }

    /// Append one analysis to the history
    pub async fn store_event(
        &self,
        query: &str,
        hard_data: &HardData,
        verdict_summary: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO event_history (query, hard_data, verdict_summary, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(query)
        .bind(serde_json::to_string(hard_data)?)
        .bind(verdict_summary)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Most recent past analyses whose query contains the argument
    /// (case-insensitive)
    pub async fn similar_events(&self, query: &str, limit: i64) -> Result<Vec<EventRecord>> {
        let events = sqlx::query_as::<_, EventRecord>(
            r#"
            SELECT query, hard_data, verdict_summary, created_at
            FROM event_history
            WHERE query LIKE '%' || ?1 || '%'
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )
        .bind(query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
