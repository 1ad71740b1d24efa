use crate::error::StoreError;
use crate::models::{Account, BlogPost, Comment, NewAccount, PostForm, ROLE_ADMIN};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. This is the core
/// of the Repository Abstraction pattern, allowing the handlers to interact with
/// the data layer without knowing the specific implementation (Postgres, Mock, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object (`Arc<dyn Repository>`)
/// safely shareable and usable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Accounts (Credential Store) ---

    // Case-sensitive exact match; duplicate pre-check at registration and
    // lookup at login.
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    // Session re-resolution on every authenticated request.
    async fn get_account(&self, id: i32) -> Result<Option<Account>, StoreError>;
    // Fails with DuplicateEmail on the unique constraint, so a concurrent
    // registration cannot slip past the pre-insert lookup.
    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError>;
    // Idempotent startup seeding of the single admin account.
    async fn seed_admin(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Account, StoreError>;

    // --- Posts (Content Store) ---

    // Insertion order is the listing contract; no other sort is applied.
    async fn list_posts(&self) -> Result<Vec<BlogPost>, StoreError>;
    async fn get_post(&self, id: i32) -> Result<Option<BlogPost>, StoreError>;
    // Stamps the publish date with the current date ("Month DD, YYYY").
    async fn create_post(
        &self,
        form: &PostForm,
        author_id: i32,
        author_name: &str,
    ) -> Result<BlogPost, StoreError>;
    // Full overwrite of title/subtitle/body/img_url; reassigns the author to
    // the given account; the publish date is NOT refreshed.
    async fn update_post(
        &self,
        id: i32,
        form: &PostForm,
        author_id: i32,
        author_name: &str,
    ) -> Result<Option<BlogPost>, StoreError>;
    // Deletes the post's comments and the post itself in one transaction.
    // Ok(false) when the post does not exist.
    async fn delete_post(&self, id: i32) -> Result<bool, StoreError>;

    // --- Comments (Content Store) ---

    // Fails with NotFound when the referenced post or account is gone.
    async fn add_comment(
        &self,
        post_id: i32,
        account_id: i32,
        text: &str,
    ) -> Result<Comment, StoreError>;
    async fn get_comments(&self, post_id: i32) -> Result<Vec<Comment>, StoreError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, role";
const POST_COLUMNS: &str = "id, title, subtitle, date, body, img_url, author, account_id";

#[async_trait]
impl Repository for PostgresRepository {
    /// find_account_by_email
    ///
    /// Exact, case-sensitive email lookup.
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// get_account
    ///
    /// Retrieves an account by id. Used by the auth gate on every request, so
    /// a deleted account immediately invalidates its sessions.
    async fn get_account(&self, id: i32) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// create_account
    ///
    /// Inserts a new account inside a transaction. The unique constraint on
    /// `accounts.email` is the authoritative duplicate check; a violation maps
    /// to `StoreError::DuplicateEmail` and the transaction rolls back, leaving
    /// no partial account behind.
    async fn create_account(&self, new: NewAccount) -> Result<Account, StoreError> {
        let mut tx = self.pool.begin().await?;

        let account = sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO accounts (username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StoreError::on_unique(e, StoreError::DuplicateEmail))?;

        tx.commit().await?;
        Ok(account)
    }

    /// seed_admin
    ///
    /// Ensures the single administrator account exists. The partial unique
    /// index on `role = 'admin'` makes the insert a no-op when an admin is
    /// already present, so startup seeding is idempotent and race-safe.
    async fn seed_admin(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Account, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO accounts (username, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(ROLE_ADMIN)
        .execute(&mut *tx)
        .await?;

        let admin = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE role = $1"
        ))
        .bind(ROLE_ADMIN)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(admin)
    }

    /// list_posts
    ///
    /// All posts in insertion order. Serial ids are monotonic, so ordering by
    /// id is the stable insertion order the listing promises.
    async fn list_posts(&self) -> Result<Vec<BlogPost>, StoreError> {
        let posts = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// get_post
    async fn get_post(&self, id: i32) -> Result<Option<BlogPost>, StoreError> {
        let post = sqlx::query_as::<_, BlogPost>(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// create_post
    ///
    /// Inserts a new post, stamped with today's date in "Month DD, YYYY"
    /// form. A title collision maps to `StoreError::DuplicateTitle`.
    async fn create_post(
        &self,
        form: &PostForm,
        author_id: i32,
        author_name: &str,
    ) -> Result<BlogPost, StoreError> {
        let date = Utc::now().format("%B %d, %Y").to_string();

        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, BlogPost>(&format!(
            "INSERT INTO blog_posts (title, subtitle, date, body, img_url, author, account_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {POST_COLUMNS}"
        ))
        .bind(&form.title)
        .bind(&form.subtitle)
        .bind(&date)
        .bind(&form.body)
        .bind(&form.img_url)
        .bind(author_name)
        .bind(author_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StoreError::on_unique(e, StoreError::DuplicateTitle))?;

        tx.commit().await?;
        Ok(post)
    }

    /// update_post
    ///
    /// Full overwrite of the editable fields plus author reassignment. The
    /// `date` column is deliberately absent from the SET list: the publish
    /// date survives every edit.
    async fn update_post(
        &self,
        id: i32,
        form: &PostForm,
        author_id: i32,
        author_name: &str,
    ) -> Result<Option<BlogPost>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, BlogPost>(&format!(
            "UPDATE blog_posts \
             SET title = $2, subtitle = $3, body = $4, img_url = $5, author = $6, account_id = $7 \
             WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(&form.title)
        .bind(&form.subtitle)
        .bind(&form.body)
        .bind(&form.img_url)
        .bind(author_name)
        .bind(author_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| StoreError::on_unique(e, StoreError::DuplicateTitle))?;

        tx.commit().await?;
        Ok(post)
    }

    /// delete_post
    ///
    /// Cascade delete: the post's comments and the post row go in the same
    /// transaction, so a failure at either statement leaves both intact.
    async fn delete_post(&self, id: i32) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE blog_post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// add_comment
    ///
    /// Inserts a new comment and immediately joins with `accounts` to return
    /// the enriched `Comment` model, including the author's username. Uses a
    /// CTE so the insert and the join are one statement. A foreign-key
    /// violation (post deleted between render and submit) maps to NotFound.
    async fn add_comment(
        &self,
        post_id: i32,
        account_id: i32,
        text: &str,
    ) -> Result<Comment, StoreError> {
        let mut tx = self.pool.begin().await?;

        let comment = sqlx::query_as::<_, Comment>(
            "WITH inserted AS ( \
                 INSERT INTO comments (text, blog_post_id, account_id) VALUES ($1, $2, $3) \
                 RETURNING id, text, date, blog_post_id, account_id \
             ) \
             SELECT i.id, i.text, i.date, i.blog_post_id, i.account_id, \
                    a.username AS author_name \
             FROM inserted i JOIN accounts a ON a.id = i.account_id",
        )
        .bind(text)
        .bind(post_id)
        .bind(account_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(StoreError::on_foreign_key)?;

        tx.commit().await?;
        Ok(comment)
    }

    /// get_comments
    ///
    /// All comments on a post in insertion order, each joined with its
    /// author's username.
    async fn get_comments(&self, post_id: i32) -> Result<Vec<Comment>, StoreError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT c.id, c.text, c.date, c.blog_post_id, c.account_id, \
                    a.username AS author_name \
             FROM comments c \
             JOIN accounts a ON a.id = c.account_id \
             WHERE c.blog_post_id = $1 \
             ORDER BY c.id ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}
