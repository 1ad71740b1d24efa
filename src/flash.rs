//! One-shot flash messages carried in the session.
//!
//! A flash survives exactly one redirect: handlers push messages before
//! redirecting, and the next rendered view takes (and thereby clears) them.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

const FLASH_KEY: &str = "_flashes";

/// Flash
///
/// A single user-facing message plus its display level. The level maps
/// directly onto a CSS class in the base template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub level: String,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: "warning".to_string(),
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: "danger".to_string(),
            message: message.into(),
        }
    }
}

/// Appends a flash to the session's pending list.
///
/// Best effort: a session-store failure downgrades to a warning log rather
/// than failing the request that carries the real outcome.
pub async fn push(session: &Session, flash: Flash) {
    let mut pending: Vec<Flash> = session
        .get(FLASH_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    pending.push(flash);

    if let Err(err) = session.insert(FLASH_KEY, pending).await {
        tracing::warn!("failed to store flash message: {:?}", err);
    }
}

/// Takes all pending flashes, clearing them from the session.
pub async fn take(session: &Session) -> Vec<Flash> {
    session
        .remove::<Vec<Flash>>(FLASH_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn test_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn push_then_take_returns_messages_in_order() {
        let session = test_session();

        push(&session, Flash::success("first")).await;
        push(&session, Flash::danger("second")).await;

        let flashes = take(&session).await;
        assert_eq!(
            flashes,
            vec![Flash::success("first"), Flash::danger("second")]
        );
    }

    #[tokio::test]
    async fn take_clears_pending_flashes() {
        let session = test_session();

        push(&session, Flash::warning("once")).await;
        let _ = take(&session).await;

        assert!(take(&session).await.is_empty());
    }

    #[tokio::test]
    async fn take_on_fresh_session_is_empty() {
        let session = test_session();
        assert!(take(&session).await.is_empty());
    }
}
