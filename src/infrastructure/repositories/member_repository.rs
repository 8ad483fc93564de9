//! Member Repository Implementation
//!
//! PostgreSQL implementation of the MemberRepository trait.
//! Maps between the `member` table and the domain Member entity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Member, MemberRepository, NewMember};
use crate::infrastructure::metrics::DbTimer;
use crate::shared::error::AppError;

/// Database row representation matching the `member` table schema.
#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    member_id: i64,
    username: String,
    email: String,
    password_hash: String,
    bio: Option<String>,
    banner_url: Option<String>,
    is_mod: bool,
    is_muted: bool,
    muted_until: Option<DateTime<Utc>>,
    is_flagged: bool,
}

impl MemberRow {
    /// Convert database row to domain Member entity.
    fn into_member(self) -> Member {
        Member {
            id: self.member_id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            bio: self.bio,
            banner_url: self.banner_url,
            is_mod: self.is_mod,
            is_muted: self.is_muted,
            muted_until: self.muted_until,
            is_flagged: self.is_flagged,
        }
    }
}

const MEMBER_COLUMNS: &str = "member_id, username, email, password_hash, bio, banner_url, \
     is_mod, is_muted, muted_until, is_flagged";

fn unique_violation(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Member with this username or email already exists".to_string())
        }
        _ => AppError::Database(e),
    }
}

fn not_found_by_username(username: &str) -> AppError {
    AppError::NotFound(format!("Member '{}' not found", username))
}

/// PostgreSQL member repository implementation.
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    /// Create a new PgMemberRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn create(&self, member: &NewMember) -> Result<Member, AppError> {
        let _timer = DbTimer::start("insert", "member");
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            r#"
            INSERT INTO member (username, email, password_hash, banner_url)
            VALUES ($1, $2, $3, $4)
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(&member.username)
        .bind(&member.email)
        .bind(&member.password_hash)
        .bind(&member.banner_url)
        .fetch_one(&self.pool)
        .await
        .map_err(unique_violation)?;

        Ok(row.into_member())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Member>, AppError> {
        let _timer = DbTimer::start("select", "member");
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM member WHERE member_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MemberRow::into_member))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Member>, AppError> {
        let _timer = DbTimer::start("select", "member");
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM member WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(MemberRow::into_member))
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Member>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let _timer = DbTimer::start("select", "member");
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM member WHERE member_id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MemberRow::into_member).collect())
    }

    async fn update_profile(
        &self,
        id: i64,
        username: &str,
        bio: Option<&str>,
        password_hash: &str,
    ) -> Result<Member, AppError> {
        let _timer = DbTimer::start("update", "member");
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            r#"
            UPDATE member
            SET username = $2,
                bio = $3,
                password_hash = $4
            WHERE member_id = $1
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(username)
        .bind(bio)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(unique_violation)?
        .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))?;

        Ok(row.into_member())
    }

    async fn update_email(&self, username: &str, email: &str) -> Result<(), AppError> {
        let _timer = DbTimer::start("update", "member");
        let result = sqlx::query("UPDATE member SET email = $1 WHERE username = $2")
            .bind(email)
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(not_found_by_username(username));
        }

        Ok(())
    }

    async fn update_password(&self, username: &str, password_hash: &str) -> Result<(), AppError> {
        let _timer = DbTimer::start("update", "member");
        let result = sqlx::query("UPDATE member SET password_hash = $1 WHERE username = $2")
            .bind(password_hash)
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_by_username(username));
        }

        Ok(())
    }

    async fn mute(&self, id: i64, until: DateTime<Utc>) -> Result<(), AppError> {
        let _timer = DbTimer::start("update", "member");
        let result = sqlx::query(
            "UPDATE member SET is_muted = TRUE, muted_until = $1 WHERE member_id = $2",
        )
        .bind(until)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member with id {} not found", id)));
        }

        Ok(())
    }

    async fn mute_for_days(&self, username: &str, days: i32) -> Result<(), AppError> {
        let _timer = DbTimer::start("update", "member");
        let result = sqlx::query(
            r#"
            UPDATE member
            SET is_muted = TRUE,
                muted_until = CURRENT_DATE + make_interval(days => $1)
            WHERE username = $2
            "#,
        )
        .bind(days)
        .bind(username)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_by_username(username));
        }

        Ok(())
    }

    async fn flag(&self, username: &str) -> Result<(), AppError> {
        let _timer = DbTimer::start("update", "member");
        let result = sqlx::query("UPDATE member SET is_flagged = TRUE WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_by_username(username));
        }

        Ok(())
    }

    async fn find_flagged(&self) -> Result<Vec<Member>, AppError> {
        let _timer = DbTimer::start("select", "member");
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM member WHERE is_flagged = TRUE ORDER BY member_id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MemberRow::into_member).collect())
    }
}
