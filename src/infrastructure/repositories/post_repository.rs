//! Post Repository Implementation
//!
//! PostgreSQL implementation of the PostRepository trait.
//! Handles posts, comments, likes and logical deletion.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Post, PostRepository, DELETED_MARKER};
use crate::infrastructure::metrics::DbTimer;
use crate::shared::error::AppError;

/// Database row representation matching the `post` table schema.
#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    post_id: i64,
    title: Option<String>,
    body: String,
    post_like: i32,
    creation_date: DateTime<Utc>,
    member_id: i64,
    parent_id: Option<i64>,
    is_comment: bool,
    is_flagged: bool,
}

impl PostRow {
    /// Convert database row to domain Post entity.
    /// The creator is attached later by the service layer.
    fn into_post(self) -> Post {
        Post {
            post_id: self.post_id,
            title: self.title,
            body: self.body,
            post_like: self.post_like,
            creation_date: self.creation_date,
            member_id: self.member_id,
            parent_id: self.parent_id,
            is_comment: self.is_comment,
            is_flagged: self.is_flagged,
            creator: None,
        }
    }
}

const POST_COLUMNS: &str = "post_id, title, body, post_like, creation_date, member_id, \
     parent_id, is_comment, is_flagged";

fn foreign_key_violation(e: sqlx::Error, what: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            AppError::NotFound(format!("{} not found", what))
        }
        _ => AppError::Database(e),
    }
}

/// PostgreSQL post repository implementation.
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    /// Create a new PgPostRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_many(&self, sql: &str, id: i64) -> Result<Vec<Post>, AppError> {
        let _timer = DbTimer::start("select", "post");
        let rows = sqlx::query_as::<_, PostRow>(sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(PostRow::into_post).collect())
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create_post(&self, title: &str, body: &str, member_id: i64) -> Result<Post, AppError> {
        let _timer = DbTimer::start("insert", "post");
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            INSERT INTO post (title, body, member_id)
            VALUES ($1, $2, $3)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(title)
        .bind(body)
        .bind(member_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| foreign_key_violation(e, "Member"))?;

        Ok(row.into_post())
    }

    async fn create_comment(&self, body: &str, member_id: i64, parent_id: i64) -> Result<Post, AppError> {
        let _timer = DbTimer::start("insert", "post");
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            INSERT INTO post (body, member_id, parent_id, is_comment)
            VALUES ($1, $2, $3, TRUE)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(body)
        .bind(member_id)
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| foreign_key_violation(e, "Parent post or member"))?;

        Ok(row.into_post())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        let _timer = DbTimer::start("select", "post");
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM post WHERE post_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PostRow::into_post))
    }

    async fn find_by_member(&self, member_id: i64) -> Result<Vec<Post>, AppError> {
        self.fetch_many(
            &format!(
                "SELECT {POST_COLUMNS} FROM post WHERE member_id = $1 ORDER BY post_like DESC, post_id"
            ),
            member_id,
        )
        .await
    }

    async fn find_top_level(&self, limit: i64) -> Result<Vec<Post>, AppError> {
        let _timer = DbTimer::start("select", "post");
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM post
            WHERE body <> $1 AND is_comment = FALSE
            ORDER BY post_like DESC, post_id
            LIMIT $2
            "#
        ))
        .bind(DELETED_MARKER)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostRow::into_post).collect())
    }

    async fn find_children(&self, parent_id: i64) -> Result<Vec<Post>, AppError> {
        self.fetch_many(
            &format!("SELECT {POST_COLUMNS} FROM post WHERE parent_id = $1 ORDER BY post_id"),
            parent_id,
        )
        .await
    }

    async fn update_content(&self, id: i64, title: &str, body: &str) -> Result<Post, AppError> {
        let _timer = DbTimer::start("update", "post");
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            UPDATE post
            SET title = CASE WHEN is_comment THEN NULL ELSE $2 END,
                body = $3
            WHERE post_id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(title)
        .bind(body)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with id {} not found", id)))?;

        Ok(row.into_post())
    }

    async fn soft_delete_owned(&self, post_id: i64, member_id: i64, is_comment: bool) -> Result<u64, AppError> {
        let _timer = DbTimer::start("update", "post");
        let sql = if is_comment {
            "UPDATE post SET body = $3 WHERE post_id = $1 AND member_id = $2"
        } else {
            "UPDATE post SET title = $3, body = $3 WHERE post_id = $1 AND member_id = $2"
        };
        let result = sqlx::query(sql)
            .bind(post_id)
            .bind(member_id)
            .bind(DELETED_MARKER)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn soft_delete(&self, post_id: i64, is_comment: bool) -> Result<u64, AppError> {
        let _timer = DbTimer::start("update", "post");
        let sql = if is_comment {
            "UPDATE post SET body = $2 WHERE post_id = $1"
        } else {
            "UPDATE post SET title = $2, body = $2, is_flagged = FALSE WHERE post_id = $1"
        };
        let result = sqlx::query(sql)
            .bind(post_id)
            .bind(DELETED_MARKER)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn like(&self, post_id: i64, member_id: i64) -> Result<bool, AppError> {
        let _timer = DbTimer::start("insert", "user_likes");
        let mut tx = self.pool.begin().await?;

        // The (member_id, post_id) primary key decides who wins a concurrent like
        let inserted = sqlx::query(
            r#"
            INSERT INTO user_likes (member_id, post_id)
            VALUES ($1, $2)
            ON CONFLICT (member_id, post_id) DO NOTHING
            "#,
        )
        .bind(member_id)
        .bind(post_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| foreign_key_violation(e, "Post or member"))?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("UPDATE post SET post_like = post_like + 1 WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn flag(&self, id: i64) -> Result<(), AppError> {
        let _timer = DbTimer::start("update", "post");
        let result = sqlx::query("UPDATE post SET is_flagged = TRUE WHERE post_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post with id {} not found", id)));
        }

        Ok(())
    }

    async fn find_flagged(&self) -> Result<Vec<Post>, AppError> {
        let _timer = DbTimer::start("select", "post");
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM post WHERE is_flagged = TRUE ORDER BY post_id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostRow::into_post).collect())
    }
}
