use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// --- Roles ---

/// The role carried by every ordinary registered account.
pub const ROLE_MEMBER: &str = "member";
/// The role of the single seeded administrator account.
pub const ROLE_ADMIN: &str = "admin";

// --- Core Application Schemas (Mapped to Database) ---

/// Account
///
/// A registered user's canonical record in the `accounts` table. The password
/// digest is opaque (argon2id) and excluded from serialization so it can never
/// leak through a rendered view or a log of a serialized value.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Account {
    pub id: i32,
    // Display name shown next to posts and comments.
    pub username: String,
    // Login identifier; globally unique.
    pub email: String,
    // One-way argon2id digest. Never the raw password.
    #[serde(skip_serializing)]
    pub password_hash: String,
    // 'member' for everyone except the single seeded 'admin'.
    pub role: String,
}

/// NewAccount
///
/// Insertion payload for `create_account`. Built by the registration handler
/// after validation and hashing; the plaintext password never reaches this type.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// BlogPost
///
/// A post record from the `blog_posts` table.
///
/// `author` is the denormalized display name captured when the post was
/// created or last edited; `account_id` is the live reference to the owning
/// account and is nullable so a post can outlive its author.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct BlogPost {
    pub id: i32,
    pub title: String,
    pub subtitle: String,
    // Publish date, stored pre-formatted as "Month DD, YYYY". Stamped at
    // creation and deliberately untouched by edits.
    pub date: String,
    // Rich text; rendered unescaped by the detail view.
    pub body: String,
    pub img_url: String,
    pub author: String,
    pub account_id: Option<i32>,
}

/// Comment
///
/// A comment record from the `comments` table, augmented with the author's
/// username (a join operation).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Comment {
    // BigInt (i64) comment ids; comments accumulate much faster than posts.
    pub id: i64,
    pub text: String,
    pub date: NaiveDate,
    pub blog_post_id: i32,
    pub account_id: i32,
    // Loaded via a JOIN with `accounts` in the repository query.
    #[sqlx(default)]
    pub author_name: Option<String>,
}

// --- Form Payloads (Input Schemas) ---

/// RegisterForm
///
/// Input payload for POST /register. Every field is required and the
/// confirmation must match the password exactly.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("Username is required.");
        }
        if self.email.trim().is_empty() {
            return Err("Email is required.");
        }
        if self.password.is_empty() {
            return Err("Password is required.");
        }
        if self.confirm_password.is_empty() {
            return Err("Password confirmation is required.");
        }
        if self.password != self.confirm_password {
            return Err("Passwords must match.");
        }
        Ok(())
    }
}

/// LoginForm
///
/// Input payload for POST /login.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.email.trim().is_empty() {
            return Err("Email is required.");
        }
        if self.password.is_empty() {
            return Err("Password is required.");
        }
        Ok(())
    }
}

/// PostForm
///
/// Input payload for POST /new-post and POST /edit-post/{id}. Edits are a
/// full overwrite of these four fields; the publish date is not part of the
/// form and never changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PostForm {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: String,
}

impl PostForm {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("Title is required.");
        }
        if self.subtitle.trim().is_empty() {
            return Err("Subtitle is required.");
        }
        if self.body.trim().is_empty() {
            return Err("Post body is required.");
        }
        if self.img_url.trim().is_empty() {
            return Err("Image URL is required.");
        }
        Ok(())
    }
}

/// CommentForm
///
/// Input payload for POST /post/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommentForm {
    pub body: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.body.trim().is_empty() {
            return Err("Comment text is required.");
        }
        Ok(())
    }
}
