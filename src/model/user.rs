use sha2::{Digest, Sha256};
use std::fmt::{Display, Write};

/// Caller-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user_{}", self.0)
    }
}

/// A registered user.
///
/// `password` holds the upper-case hex SHA-256 of the password the user was created with;
/// the plain text is never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Payload for creating a new user. `password` is plain text.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Payload for updating an existing user. `password`, when set, is plain text.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Every field must match the stored user for a delete to go through.
#[derive(Debug, Clone)]
pub struct UserDelete {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Upper-case hex SHA-256 digest of `password`.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{b:02X}");
        out
    })
}
