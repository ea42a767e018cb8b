//! Process-lifetime session store.
//!
//! Sessions exist from login until logout or process exit; there is
//! deliberately no persistence, so a restart signs everyone out. Clients
//! carry the opaque session id in the Authorization header.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Public,
    Hospital,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub session_id: String,
    pub user_type: UserType,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for the given identity and returns it.
    pub async fn login(&self, user_type: UserType, user_id: &str) -> Session {
        let session = Session {
            session_id: Uuid::new_v4().to_string(),
            user_type,
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        self.inner
            .write()
            .await
            .insert(session.session_id.clone(), session.clone());
        tracing::info!("Opened {:?} session for user {}", user_type, user_id);
        session
    }

    pub async fn get(&self, session_id: &str) -> Option<Session> {
        self.inner.read().await.get(session_id).cloned()
    }

    pub async fn logout(&self, session_id: &str) {
        if self.inner.write().await.remove(session_id).is_some() {
            tracing::info!("Closed session {}", session_id);
        }
    }
}
