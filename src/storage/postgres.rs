//! Postgres backend (secondary)
//!
//! Lazy pool; the schema is created on first write so the server can start
//! without a reachable database.

use super::ClientStore;
use crate::error::AdvisoryError;
use crate::models::{ClientRecord, Report};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;

pub struct PostgresStore {
    pool: PgPool,
    schema_ready: OnceCell<()>,
}

impl PostgresStore {
    pub fn connect_lazy(database_url: &str) -> crate::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy(database_url)
            .map_err(|e| {
                AdvisoryError::StorageError(format!("Invalid database URL: {}", e))
            })?;

        Ok(Self {
            pool,
            schema_ready: OnceCell::new(),
        })
    }

    async fn ensure_schema(&self) -> crate::Result<()> {
        self.schema_ready
            .get_or_try_init(|| async {
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS client_records (
                      user_id TEXT PRIMARY KEY,
                      record JSONB NOT NULL,
                      report JSONB,
                      updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                    );
                    "#,
                )
                .execute(&self.pool)
                .await?;

                Ok::<(), sqlx::Error>(())
            })
            .await
            .map_err(|e| {
                AdvisoryError::StorageError(format!(
                    "Failed to initialize client_records schema: {}",
                    e
                ))
            })?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl ClientStore for PostgresStore {
    async fn upsert_client(
        &self,
        record: &ClientRecord,
        report: Option<&Report>,
    ) -> crate::Result<()> {
        self.ensure_schema().await?;

        let record_json = serde_json::to_value(record)?;
        let report_json = report.map(serde_json::to_value).transpose()?;

        sqlx::query(
            r#"
            INSERT INTO client_records (user_id, record, report, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id) DO UPDATE
              SET record = EXCLUDED.record,
                  report = EXCLUDED.report,
                  updated_at = NOW()
            "#,
        )
        .bind(&record.profile.user_id)
        .bind(record_json)
        .bind(report_json)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AdvisoryError::StorageError(format!("Failed to upsert client record: {}", e))
        })?;

        Ok(())
    }
}
