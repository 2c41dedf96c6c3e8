use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Account record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,                    // assigned by the store
    pub full_name: String,
    pub email: String,               // unique, stored as given
    #[serde(skip_serializing)]
    pub password_hash: String,       // Argon2 PHC string, never exposed in JSON
    pub country: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Candidate account as submitted by a caller. Carries the plaintext password.
#[derive(Clone, Deserialize)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub country: Option<String>,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("country", &self.country)
            .finish_non_exhaustive()
    }
}

/// What the service hands to the repository: the password is already hashed.
#[derive(Debug, Clone)]
pub struct AccountDraft {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub country: Option<String>,
}
