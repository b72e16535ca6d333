//! Anonymous audit sessions.
//!
//! A browser without an API token is tracked through a session cookie. The
//! cookie value is the session key and the case id is derived from it, so a
//! retired session simply stops being recognised and the next request is
//! handed a fresh key.

use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, ()>,
}

/// The session a request was attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCase {
    pub key: String,
    /// Set when the key was minted for this request and must be sent back.
    pub is_new: bool,
}

impl SessionCase {
    pub fn case_id(&self) -> String {
        case_id_for(&self.key)
    }
}

pub fn case_id_for(key: &str) -> String {
    format!("session_{}", key)
}

impl SessionStore {
    pub fn new(idle: Duration) -> Self {
        Self {
            sessions: Cache::builder().time_to_idle(idle).build(),
        }
    }

    /// Reuses the presented key while it is live, otherwise mints a new one.
    pub async fn touch(&self, presented: Option<&str>) -> SessionCase {
        if let Some(key) = presented {
            if self.sessions.get(key).await.is_some() {
                return SessionCase {
                    key: key.to_string(),
                    is_new: false,
                };
            }
        }

        let key = Uuid::new_v4().simple().to_string();
        self.sessions.insert(key.clone(), ()).await;
        SessionCase { key, is_new: true }
    }

    /// Ends the case; the key will not be accepted again.
    pub async fn retire(&self, key: &str) {
        self.sessions.invalidate(key).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_first_touch_mints_key() {
        let sessions = store();
        let case = sessions.touch(None).await;
        assert!(case.is_new);
        assert_eq!(case.case_id(), format!("session_{}", case.key));
    }

    #[tokio::test]
    async fn test_live_key_is_reused() {
        let sessions = store();
        let first = sessions.touch(None).await;
        let second = sessions.touch(Some(&first.key)).await;
        assert!(!second.is_new);
        assert_eq!(first.case_id(), second.case_id());
    }

    #[tokio::test]
    async fn test_unknown_key_is_replaced() {
        let sessions = store();
        let case = sessions.touch(Some("forged")).await;
        assert!(case.is_new);
        assert_ne!(case.key, "forged");
    }

    #[tokio::test]
    async fn test_retired_key_starts_new_case() {
        let sessions = store();
        let first = sessions.touch(None).await;
        sessions.retire(&first.key).await;

        let next = sessions.touch(Some(&first.key)).await;
        assert!(next.is_new);
        assert_ne!(first.case_id(), next.case_id());
    }
}
