//! Application-wide result alias.

use crate::error::AppError;

/// Result alias used by every Boxoffice crate.
pub type AppResult<T> = Result<T, AppError>;
