use blog_portal::{
    error::StoreError,
    models::{NewAccount, PostForm, ROLE_ADMIN, ROLE_MEMBER},
    password,
    repository::{PostgresRepository, Repository},
};
use chrono::Utc;
use serial_test::serial;
use sqlx::PgPool;
use std::time::{SystemTime, UNIX_EPOCH};

// --- Test Context and Setup ---
//
// These tests exercise the real PostgresRepository against the database named
// by DATABASE_URL. They are #[ignore]d by default; run them with
// `cargo test -- --ignored` against a disposable database.

/// A simple structure to hold the database pool for testing.
struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

/// Monotonic per-process marker so repeated runs never collide on the unique
/// email and title columns.
fn unique_marker() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
}

fn member_payload(marker: u128) -> NewAccount {
    NewAccount {
        username: "alice".to_string(),
        email: format!("alice+{marker}@test.com"),
        password_hash: password::hash_password("pw123").expect("hashing failed"),
        role: ROLE_MEMBER.to_string(),
    }
}

fn post_payload(marker: u128, suffix: &str) -> PostForm {
    PostForm {
        title: format!("Post {marker} {suffix}"),
        subtitle: "A subtitle".to_string(),
        body: "<p>Body text.</p>".to_string(),
        img_url: "https://example.com/cover.png".to_string(),
    }
}

// --- Credential Store ---

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn create_account_stores_digest_not_plaintext() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let marker = unique_marker();

    let created = repo
        .create_account(member_payload(marker))
        .await
        .expect("account creation failed");

    let fetched = repo
        .find_account_by_email(&created.email)
        .await
        .expect("lookup failed")
        .expect("account missing after creation");

    assert_ne!(fetched.password_hash, "pw123");
    assert!(password::verify_password("pw123", &fetched.password_hash));
    assert_eq!(fetched.role, ROLE_MEMBER);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn duplicate_email_is_rejected_by_the_constraint() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let marker = unique_marker();

    repo.create_account(member_payload(marker))
        .await
        .expect("first account creation failed");

    // Same email again; the unique constraint must answer, not the pre-read.
    let second = repo.create_account(member_payload(marker)).await;

    assert!(matches!(second, Err(StoreError::DuplicateEmail)));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn seed_admin_is_idempotent() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let hash = password::hash_password("admin-pw").expect("hashing failed");

    let first = repo
        .seed_admin("admin", "admin@test.com", &hash)
        .await
        .expect("first seeding failed");
    let second = repo
        .seed_admin("admin", "admin@test.com", &hash)
        .await
        .expect("second seeding failed");

    assert_eq!(first.id, second.id);
    assert_eq!(second.role, ROLE_ADMIN);
}

// --- Content Store ---

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn create_post_stamps_a_formatted_date() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let marker = unique_marker();

    let author = repo
        .create_account(member_payload(marker))
        .await
        .expect("account creation failed");

    let post = repo
        .create_post(&post_payload(marker, "dated"), author.id, &author.username)
        .await
        .expect("post creation failed");

    assert_eq!(post.date, Utc::now().format("%B %d, %Y").to_string());
    assert_eq!(post.author, author.username);
    assert_eq!(post.account_id, Some(author.id));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn duplicate_title_is_rejected() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let marker = unique_marker();

    let author = repo
        .create_account(member_payload(marker))
        .await
        .expect("account creation failed");

    let form = post_payload(marker, "unique");
    repo.create_post(&form, author.id, &author.username)
        .await
        .expect("first post creation failed");

    let second = repo.create_post(&form, author.id, &author.username).await;

    assert!(matches!(second, Err(StoreError::DuplicateTitle)));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn update_post_overwrites_fields_but_keeps_the_date() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let marker = unique_marker();

    let author = repo
        .create_account(member_payload(marker))
        .await
        .expect("account creation failed");

    let created = repo
        .create_post(&post_payload(marker, "before"), author.id, &author.username)
        .await
        .expect("post creation failed");

    let updated = repo
        .update_post(
            created.id,
            &post_payload(marker, "after"),
            author.id,
            &author.username,
        )
        .await
        .expect("update failed")
        .expect("post vanished during update");

    assert_eq!(updated.title, format!("Post {marker} after"));
    // Edits never refresh the publish date.
    assert_eq!(updated.date, created.date);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn update_missing_post_is_none() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let marker = unique_marker();

    let author = repo
        .create_account(member_payload(marker))
        .await
        .expect("account creation failed");

    let updated = repo
        .update_post(
            i32::MAX,
            &post_payload(marker, "nowhere"),
            author.id,
            &author.username,
        )
        .await
        .expect("update failed");

    assert!(updated.is_none());
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn list_posts_preserves_insertion_order() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let marker = unique_marker();

    let author = repo
        .create_account(member_payload(marker))
        .await
        .expect("account creation failed");

    let mut created_ids = Vec::new();
    for suffix in ["one", "two", "three"] {
        let post = repo
            .create_post(&post_payload(marker, suffix), author.id, &author.username)
            .await
            .expect("post creation failed");
        created_ids.push(post.id);
    }

    let listed: Vec<i32> = repo
        .list_posts()
        .await
        .expect("listing failed")
        .into_iter()
        .map(|p| p.id)
        .filter(|id| created_ids.contains(id))
        .collect();

    assert_eq!(listed, created_ids);
}

// --- Cascade Delete ---

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn delete_post_cascades_to_comments() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let marker = unique_marker();

    let author = repo
        .create_account(member_payload(marker))
        .await
        .expect("account creation failed");

    let post = repo
        .create_post(&post_payload(marker, "doomed"), author.id, &author.username)
        .await
        .expect("post creation failed");

    repo.add_comment(post.id, author.id, "first")
        .await
        .expect("comment failed");
    repo.add_comment(post.id, author.id, "second")
        .await
        .expect("comment failed");

    let deleted = repo.delete_post(post.id).await.expect("delete failed");
    assert!(deleted);

    // The post is gone...
    let fetched = repo.get_post(post.id).await.expect("lookup failed");
    assert!(fetched.is_none());

    // ...and no orphaned comment row references it.
    let orphans: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE blog_post_id = $1")
            .bind(post.id)
            .fetch_one(&ctx.pool)
            .await
            .expect("orphan count failed");
    assert_eq!(orphans, 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn delete_missing_post_is_false() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let deleted = repo.delete_post(i32::MAX).await.expect("delete failed");
    assert!(!deleted);
}

// --- Comments ---

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn add_comment_joins_the_author_name() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let marker = unique_marker();

    let author = repo
        .create_account(member_payload(marker))
        .await
        .expect("account creation failed");

    let post = repo
        .create_post(&post_payload(marker, "talked"), author.id, &author.username)
        .await
        .expect("post creation failed");

    let comment = repo
        .add_comment(post.id, author.id, "Nice!")
        .await
        .expect("comment failed");

    assert_eq!(comment.author_name.as_deref(), Some("alice"));
    assert_eq!(comment.blog_post_id, post.id);

    let listed = repo.get_comments(post.id).await.expect("listing failed");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].text, "Nice!");
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn add_comment_to_missing_post_is_not_found() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let marker = unique_marker();

    let author = repo
        .create_account(member_payload(marker))
        .await
        .expect("account creation failed");

    let result = repo.add_comment(i32::MAX, author.id, "into the void").await;

    assert!(matches!(result, Err(StoreError::NotFound)));
}
