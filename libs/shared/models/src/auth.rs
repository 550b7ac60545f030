use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims issued by the identity provider. Only `sub` is required.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

/// The authenticated caller, placed in request extensions by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
