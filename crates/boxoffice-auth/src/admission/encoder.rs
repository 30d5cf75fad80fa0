//! Admission token creation.

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};

use boxoffice_core::config::auth::AuthConfig;
use boxoffice_core::error::AppError;
use boxoffice_core::result::AppResult;

use super::claims::AdmissionClaims;

/// Creates signed admission tokens.
#[derive(Clone)]
pub struct AdmissionEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token TTL in minutes.
    ttl_minutes: i64,
}

impl std::fmt::Debug for AdmissionEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionEncoder")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

impl AdmissionEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_minutes: config.admission_ttl_minutes as i64,
        }
    }

    /// Issues an admission token for a user admitted to an event.
    pub fn issue(&self, user_id: &str, event_id: i64) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + chrono::Duration::minutes(self.ttl_minutes);

        let claims = AdmissionClaims {
            sub: user_id.to_string(),
            event_id: event_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode admission token: {e}")))
    }
}
