use thiserror::Error;

/// StoreError
///
/// The failure taxonomy of the persistence layer. Handlers branch on these
/// variants to decide between re-rendering a form, answering 404, or flashing
/// a generic retry message; the wrapped database error is logged but never
/// rendered to the user.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An account with this email already exists. Raised by the unique
    /// constraint on `accounts.email`, so concurrent registrations cannot
    /// slip past the pre-insert lookup.
    #[error("email is already registered")]
    DuplicateEmail,

    /// A post with this title already exists (`blog_posts.title` is unique).
    #[error("a post with this title already exists")]
    DuplicateTitle,

    /// A referenced row does not exist (missing post or account).
    #[error("record not found")]
    NotFound,

    /// Any other database failure. The enclosing transaction has been rolled
    /// back; no partial write is observable.
    #[error("database failure")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Maps a unique-constraint violation to the given duplicate variant,
    /// passing every other error through as `Database`.
    pub(crate) fn on_unique(err: sqlx::Error, duplicate: StoreError) -> StoreError {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => duplicate,
            _ => StoreError::Database(err),
        }
    }

    /// Maps a foreign-key violation to `NotFound`, passing every other error
    /// through as `Database`. Used where a dangling reference means the
    /// parent row vanished between lookup and insert.
    pub(crate) fn on_foreign_key(err: sqlx::Error) -> StoreError {
        match &err {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => StoreError::NotFound,
            _ => StoreError::Database(err),
        }
    }
}
