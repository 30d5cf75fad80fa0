//! Admission token minting, gated on waiting-room promotion.

use std::sync::Arc;

use tracing::info;

use boxoffice_core::error::AppError;
use boxoffice_core::keys;
use boxoffice_core::result::AppResult;
use boxoffice_core::traits::CoordinationStore;

use super::encoder::AdmissionEncoder;

/// Issues admission tokens to users the promoter has moved into the
/// active set.
#[derive(Debug, Clone)]
pub struct AdmissionService {
    /// Coordination store holding the per-event active sets.
    store: Arc<dyn CoordinationStore>,
    /// Token encoder.
    encoder: AdmissionEncoder,
}

impl AdmissionService {
    /// Creates a new admission service.
    pub fn new(store: Arc<dyn CoordinationStore>, encoder: AdmissionEncoder) -> Self {
        Self { store, encoder }
    }

    /// Mints an admission token for a promoted user.
    ///
    /// Fails with an admission denial when the user is not in the event's
    /// active set, so tokens cannot be obtained by skipping the queue.
    pub async fn mint(&self, event_id: i64, user_id: &str) -> AppResult<String> {
        let active_key = keys::queue_active(event_id);
        if !self.store.set_contains(&active_key, user_id).await? {
            return Err(AppError::admission_denied(format!(
                "User '{user_id}' has not been admitted to event {event_id}"
            )));
        }

        let token = self.encoder.issue(user_id, event_id)?;
        info!(event_id, user_id, "Issued admission token");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use boxoffice_core::config::auth::AuthConfig;
    use boxoffice_store::MemoryStore;

    use super::*;
    use crate::admission::verifier::AdmissionVerifier;

    fn service(store: Arc<MemoryStore>) -> (AdmissionService, AdmissionVerifier) {
        let config = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            admission_ttl_minutes: 5,
        };
        (
            AdmissionService::new(store, AdmissionEncoder::new(&config)),
            AdmissionVerifier::new(&config),
        )
    }

    #[tokio::test]
    async fn promoted_user_gets_a_token() {
        let store = Arc::new(MemoryStore::new());
        store.set_add(&keys::queue_active(7), "u-1").await.unwrap();
        let (service, verifier) = service(store);

        let token = service.mint(7, "u-1").await.unwrap();
        let claims = verifier.verify(Some(&format!("Bearer {token}"))).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.event_id, "7");
    }

    #[tokio::test]
    async fn unpromoted_user_is_denied() {
        let store = Arc::new(MemoryStore::new());
        let (service, _) = service(store);

        let err = service.mint(7, "u-1").await.unwrap_err();
        assert_eq!(
            err.kind,
            boxoffice_core::error::ErrorKind::AdmissionDenied
        );
    }
}
