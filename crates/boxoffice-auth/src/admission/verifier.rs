//! Admission token verification.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use boxoffice_core::config::auth::AuthConfig;

use super::claims::AdmissionClaims;

/// Validates admission tokens at the booking gate.
///
/// The gate is a yes/no decision: any failure (missing header, malformed
/// token, bad signature, expired, missing event scope) collapses to a
/// denial that sends the caller to the waiting room.
#[derive(Clone)]
pub struct AdmissionVerifier {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for AdmissionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AdmissionVerifier {
    /// Creates a new verifier from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Whether the given Authorization header value admits the caller.
    pub fn allows(&self, authorization: Option<&str>) -> bool {
        self.verify(authorization).is_some()
    }

    /// Decodes the Authorization header into claims, if valid.
    pub fn verify(&self, authorization: Option<&str>) -> Option<AdmissionClaims> {
        let header = authorization?;
        let token = header.strip_prefix("Bearer ").unwrap_or(header);
        if token.is_empty() {
            return None;
        }

        let claims = match decode::<AdmissionClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(error = %e, "Rejected admission token");
                return None;
            }
        };

        // A token without an event scope admits nowhere.
        if claims.event_id.is_empty() {
            return None;
        }

        Some(claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;
    use crate::admission::encoder::AdmissionEncoder;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            admission_ttl_minutes: 5,
        }
    }

    fn issue_with(claims: &AdmissionClaims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_is_admitted() {
        let config = config();
        let token = AdmissionEncoder::new(&config).issue("u-1", 42).unwrap();
        let verifier = AdmissionVerifier::new(&config);

        let claims = verifier
            .verify(Some(&format!("Bearer {token}")))
            .expect("fresh token admits");
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.event_id, "42");
        assert!(!claims.is_expired());
    }

    #[test]
    fn missing_header_is_denied() {
        let verifier = AdmissionVerifier::new(&config());
        assert!(!verifier.allows(None));
        assert!(!verifier.allows(Some("")));
        assert!(!verifier.allows(Some("Bearer ")));
    }

    #[test]
    fn garbage_token_is_denied() {
        let verifier = AdmissionVerifier::new(&config());
        assert!(!verifier.allows(Some("Bearer not.a.jwt")));
    }

    #[test]
    fn expired_token_is_denied() {
        let now = Utc::now().timestamp();
        let claims = AdmissionClaims {
            sub: "u-1".to_string(),
            event_id: "42".to_string(),
            iat: now - 600,
            exp: now - 300,
        };
        let token = issue_with(&claims, "test-secret");

        let verifier = AdmissionVerifier::new(&config());
        assert!(!verifier.allows(Some(&format!("Bearer {token}"))));
    }

    #[test]
    fn foreign_signature_is_denied() {
        let now = Utc::now().timestamp();
        let claims = AdmissionClaims {
            sub: "u-1".to_string(),
            event_id: "42".to_string(),
            iat: now,
            exp: now + 300,
        };
        let token = issue_with(&claims, "some-other-secret");

        let verifier = AdmissionVerifier::new(&config());
        assert!(!verifier.allows(Some(&format!("Bearer {token}"))));
    }

    #[test]
    fn empty_event_scope_is_denied() {
        let now = Utc::now().timestamp();
        let claims = AdmissionClaims {
            sub: "u-1".to_string(),
            event_id: String::new(),
            iat: now,
            exp: now + 300,
        };
        let token = issue_with(&claims, "test-secret");

        let verifier = AdmissionVerifier::new(&config());
        assert!(!verifier.allows(Some(&format!("Bearer {token}"))));
    }
}
