use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::{
    models::{Account, ROLE_ADMIN},
    repository::RepositoryState,
};

/// Session key under which the logged-in account id is stored. The cookie
/// itself carries only the opaque session id; the account id never leaves the
/// server-side session record.
pub const SESSION_ACCOUNT_KEY: &str = "account_id";

/// CurrentUser
///
/// The resolved identity of an authenticated request: the per-session state
/// machine's `Authenticated(account_id)` arm, re-validated against the
/// database on every request. Handlers use this struct to stamp authorship
/// and to apply the admin predicate.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    // 'member' or 'admin'; exactly one account ever carries 'admin'.
    pub role: String,
}

impl CurrentUser {
    /// The admin predicate. Policy lives in the seeded `role` column, not in
    /// a hardcoded account id.
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// LoginRedirect
///
/// Rejection type for `CurrentUser`: unauthenticated callers are redirected
/// to the login view, never shown a hard error page.
pub struct LoginRedirect;

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/login").into_response()
    }
}

/// Resolves the session carried in the request extensions to an account.
///
/// Fails soft: a missing cookie, an unknown session, or an account that was
/// deleted after the session was established all resolve to `None`
/// (anonymous), exactly like a fresh visitor.
async fn resolve_identity(parts: &Parts, repo: &RepositoryState) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;

    let account_id: i32 = session
        .get(SESSION_ACCOUNT_KEY)
        .await
        .ok()
        .flatten()?;

    let account = repo.get_account(account_id).await.ok().flatten()?;

    Some(CurrentUser {
        id: account.id,
        username: account.username,
        role: account.role,
    })
}

/// CurrentUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making CurrentUser usable as a
/// function argument in any authenticated handler, and as the gate inside the
/// auth middleware wrapping the protected route groups.
///
/// The process:
/// 1. Dependency Resolution: the Repository is pulled from the app state.
/// 2. Session Read: the SessionManagerLayer has placed the `Session` in the
///    request extensions; the stored account id is read from it.
/// 3. DB Lookup: the account's current record is fetched, so a deleted
///    account cannot keep an authenticated session alive.
///
/// Rejection: a redirect to the login view.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        resolve_identity(parts, &repo).await.ok_or(LoginRedirect)
    }
}

/// OptionalUser
///
/// Soft variant of `CurrentUser` for pages that render for both anonymous and
/// authenticated visitors (listing, post detail, the auth forms themselves).
/// Never rejects.
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        Ok(OptionalUser(resolve_identity(parts, &repo).await))
    }
}

/// Transitions the session to `Authenticated(account_id)`.
///
/// The session id is cycled first so a pre-login session cannot be fixated
/// onto the authenticated identity.
pub async fn establish_session(
    session: &Session,
    account: &Account,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(SESSION_ACCOUNT_KEY, account.id).await
}

/// Transitions the session back to `Anonymous`, deleting the server-side
/// record. Best effort; a store failure still leaves the user logged out
/// client-side once the record expires.
pub async fn clear_session(session: &Session) {
    if let Err(err) = session.flush().await {
        tracing::warn!("failed to clear session: {:?}", err);
    }
}
