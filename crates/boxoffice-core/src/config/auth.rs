//! Admission credential configuration.

use serde::{Deserialize, Serialize};

/// Settings for the short-lived admission JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign admission tokens.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Admission token lifetime in minutes.
    #[serde(default = "default_admission_ttl")]
    pub admission_ttl_minutes: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            admission_ttl_minutes: default_admission_ttl(),
        }
    }
}

fn default_jwt_secret() -> String {
    "change-me-before-deploying".to_string()
}

fn default_admission_ttl() -> u64 {
    5
}
