//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// PostgreSQL bind parameter limit is 65535; each click binds four.
const MAX_ROWS_PER_STATEMENT: usize = 65535 / 4;

/// PostgreSQL repository for batched click writes and click counts.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Builds one multi-row `INSERT` for `batch`.
fn build_insert(batch: &[ClickEvent]) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new("INSERT INTO clicks (link_id, ts, ip, user_agent) ");
    builder.push_values(batch, |mut row, event| {
        row.push_bind(event.link_id)
            .push_bind(event.timestamp)
            .push_bind(&event.client_ip)
            .push_bind(&event.user_agent);
    });
    builder
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn insert_clicks(&self, batch: &[ClickEvent]) -> Result<(), AppError> {
        if batch.is_empty() {
            return Ok(());
        }

        if batch.len() <= MAX_ROWS_PER_STATEMENT {
            build_insert(batch)
                .build()
                .execute(self.pool.as_ref())
                .await?;
            return Ok(());
        }

        // Oversized batches are split, but still committed together.
        let mut tx = self.pool.begin().await?;
        for chunk in batch.chunks(MAX_ROWS_PER_STATEMENT) {
            build_insert(chunk).build().execute(&mut *tx).await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn total_clicks(&self, code: &str) -> Result<Option<i64>, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(c.id)
            FROM links l
            LEFT JOIN clicks c ON c.link_id = l.id
            WHERE l.code = $1
            GROUP BY l.id
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(total)
    }
}
