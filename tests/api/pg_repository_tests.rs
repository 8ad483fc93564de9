//! Repository tests against a real PostgreSQL database
//!
//! Each test gets a fresh database with `migrations/` applied.
//! Run with `DATABASE_URL` pointing at a server and `cargo test -- --ignored`.

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use sqlx::PgPool;

use forum_server::domain::{Member, MemberRepository, NewMember, PostRepository, DELETED_MARKER};
use forum_server::infrastructure::repositories::{PgMemberRepository, PgPostRepository};
use forum_server::shared::error::AppError;

async fn member(repo: &PgMemberRepository, username: &str) -> Member {
    repo.create(&NewMember {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password_hash: "$argon2id$placeholder".to_string(),
        banner_url: None,
    })
    .await
    .unwrap()
}

async fn like_rows(pool: &PgPool, post_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM user_likes WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn set_likes(pool: &PgPool, post_id: i64, likes: i32) {
    sqlx::query("UPDATE post SET post_like = $2 WHERE post_id = $1")
        .bind(post_id)
        .bind(likes)
        .execute(pool)
        .await
        .unwrap();
}

#[sqlx::test]
#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
async fn test_like_is_recorded_once(pool: PgPool) {
    let members = PgMemberRepository::new(pool.clone());
    let posts = PgPostRepository::new(pool.clone());
    let alice = member(&members, "alice").await;
    let bob = member(&members, "bob").await;
    let post = posts.create_post("Hi", "Hello", alice.id).await.unwrap();

    assert!(posts.like(post.post_id, bob.id).await.unwrap());
    assert!(!posts.like(post.post_id, bob.id).await.unwrap());

    let stored = posts.find_by_id(post.post_id).await.unwrap().unwrap();
    assert_eq!(stored.post_like, 1);
    assert_eq!(like_rows(&pool, post.post_id).await, 1);

    assert!(matches!(
        posts.like(9999, bob.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[sqlx::test]
#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
async fn test_top_level_listing_filters_and_sorts(pool: PgPool) {
    let members = PgMemberRepository::new(pool.clone());
    let posts = PgPostRepository::new(pool.clone());
    let alice = member(&members, "alice").await;

    let low = posts.create_post("Low", "a", alice.id).await.unwrap();
    let high = posts.create_post("High", "b", alice.id).await.unwrap();
    let gone = posts.create_post("Gone", "c", alice.id).await.unwrap();
    let comment = posts.create_comment("reply", alice.id, low.post_id).await.unwrap();
    set_likes(&pool, low.post_id, 1).await;
    set_likes(&pool, high.post_id, 7).await;
    set_likes(&pool, gone.post_id, 50).await;
    set_likes(&pool, comment.post_id, 99).await;
    posts.soft_delete_owned(gone.post_id, alice.id, false).await.unwrap();

    let ids: Vec<i64> = posts
        .find_top_level(10)
        .await
        .unwrap()
        .iter()
        .map(|p| p.post_id)
        .collect();
    assert_eq!(ids, vec![high.post_id, low.post_id]);

    assert_eq!(posts.find_top_level(1).await.unwrap().len(), 1);
}

#[sqlx::test]
#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
async fn test_owner_scoped_delete(pool: PgPool) {
    let members = PgMemberRepository::new(pool.clone());
    let posts = PgPostRepository::new(pool.clone());
    let alice = member(&members, "alice").await;
    let bob = member(&members, "bob").await;
    let post = posts.create_post("Hi", "Hello", alice.id).await.unwrap();

    assert_eq!(posts.soft_delete_owned(post.post_id, bob.id, false).await.unwrap(), 0);
    let untouched = posts.find_by_id(post.post_id).await.unwrap().unwrap();
    assert_eq!(untouched.body, "Hello");

    assert_eq!(posts.soft_delete_owned(post.post_id, alice.id, false).await.unwrap(), 1);
    let deleted = posts.find_by_id(post.post_id).await.unwrap().unwrap();
    assert_eq!(deleted.body, DELETED_MARKER);
    assert_eq!(deleted.title.as_deref(), Some(DELETED_MARKER));
}

#[sqlx::test]
#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
async fn test_comment_edit_keeps_title_null(pool: PgPool) {
    let members = PgMemberRepository::new(pool.clone());
    let posts = PgPostRepository::new(pool.clone());
    let alice = member(&members, "alice").await;
    let post = posts.create_post("Hi", "Hello", alice.id).await.unwrap();
    let comment = posts.create_comment("Nice!", alice.id, post.post_id).await.unwrap();

    let edited = posts
        .update_content(comment.post_id, "secret text", "edited")
        .await
        .unwrap();
    assert_eq!(edited.title, None);
    assert_eq!(edited.body, "edited");

    let top = posts.update_content(post.post_id, "Hi again", "Hello again").await.unwrap();
    assert_eq!(top.title.as_deref(), Some("Hi again"));
}

#[sqlx::test]
#[ignore = "needs a PostgreSQL server in DATABASE_URL"]
async fn test_ban_and_batched_lookup(pool: PgPool) {
    let members = PgMemberRepository::new(pool.clone());
    let alice = member(&members, "alice").await;
    let bob = member(&members, "bob").await;

    members.mute_for_days("bob", 14).await.unwrap();
    let banned = members.find_by_id(bob.id).await.unwrap().unwrap();
    assert!(banned.is_muted);
    assert!(banned.muted_until.unwrap() > Utc::now() + Duration::days(12));

    let mut found: Vec<i64> = members
        .find_by_ids(&[alice.id, bob.id, 9999])
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    found.sort_unstable();
    assert_eq!(found, vec![alice.id, bob.id]);

    assert!(matches!(
        members.create(&NewMember {
            username: "alice".into(),
            email: "another@example.com".into(),
            password_hash: "$argon2id$placeholder".into(),
            banner_url: None,
        })
        .await,
        Err(AppError::Conflict(_))
    ));
}
