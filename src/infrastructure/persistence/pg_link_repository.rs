//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Click, Link, NewClick, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const LINK_COLUMNS: &str =
    "id, code, target_url, owner, created_at, expires_at, click_count, last_accessed_at";

#[derive(Debug, FromRow)]
struct LinkRow {
    id: i64,
    code: Option<String>,
    target_url: String,
    owner: Option<String>,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    click_count: i64,
    last_accessed_at: Option<DateTime<Utc>>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link::new(
            r.id,
            r.code,
            r.target_url,
            r.owner,
            r.created_at,
            r.expires_at,
            r.click_count,
            r.last_accessed_at,
        )
    }
}

#[derive(Debug, FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    clicked_at: DateTime<Utc>,
    ip: Option<String>,
    user_agent: Option<String>,
    referrer: Option<String>,
}

impl From<ClickRow> for Click {
    fn from(r: ClickRow) -> Self {
        Click::new(r.id, r.link_id, r.clicked_at, r.ip, r.user_agent, r.referrer)
    }
}

/// PostgreSQL repository for links and click events.
///
/// Counter updates are expressed in SQL (`click_count = click_count + $n`) so
/// concurrent writers serialize on the row lock instead of racing in memory.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert_pending(&self, new_link: NewLink) -> Result<Link, AppError> {
        let sql = format!(
            "INSERT INTO links (target_url, owner, expires_at, click_count)
             VALUES ($1, $2, $3, 0)
             RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(new_link.target_url)
            .bind(new_link.owner)
            .bind(new_link.expires_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn assign_code(&self, id: i64, code: &str) -> Result<Link, AppError> {
        let sql = format!(
            "UPDATE links SET code = $2
             WHERE id = $1 AND code IS NULL
             RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Link::from).ok_or_else(|| {
            AppError::not_found("No pending link to assign a code to", json!({ "id": id }))
        })
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE code = $1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM links WHERE code = $1)",
        )
        .bind(code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let mut tx = self.pool.begin().await?;

        // Taking the row lock first makes a concurrent delete wait for us.
        let updated = sqlx::query(
            "UPDATE links
             SET click_count = click_count + 1, last_accessed_at = $2
             WHERE id = $1",
        )
        .bind(new_click.link_id)
        .bind(new_click.clicked_at)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Link not found",
                json!({ "link_id": new_click.link_id }),
            ));
        }

        let row = sqlx::query_as::<_, ClickRow>(
            "INSERT INTO link_clicks (link_id, clicked_at, ip, user_agent, referrer)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, link_id, clicked_at, ip, user_agent, referrer",
        )
        .bind(new_click.link_id)
        .bind(new_click.clicked_at)
        .bind(new_click.ip)
        .bind(new_click.user_agent)
        .bind(new_click.referrer)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn update_click_stats(
        &self,
        id: i64,
        delta: i64,
        now: DateTime<Utc>,
    ) -> Result<Link, AppError> {
        let sql = format!(
            "UPDATE links
             SET click_count = click_count + $2, last_accessed_at = $3
             WHERE id = $1
             RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .bind(delta)
            .bind(now)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Link::from)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_page(&self, after_id: i64, limit: i64) -> Result<Vec<Link>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links
             WHERE id > $1
             ORDER BY id
             LIMIT $2"
        );

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(after_id)
            .bind(limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn purge_orphans(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE code IS NULL AND created_at < $1")
            .bind(cutoff)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }

    async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM link_clicks WHERE link_id = $1")
                .bind(link_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
