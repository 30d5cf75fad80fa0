//! Admission token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims payload embedded in every admission token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionClaims {
    /// Subject, the admitted user ID.
    pub sub: String,
    /// Event the admission is scoped to.
    #[serde(rename = "eventId")]
    pub event_id: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl AdmissionClaims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Checks whether this token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}
