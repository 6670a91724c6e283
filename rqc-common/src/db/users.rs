//! User accounts
//!
//! Passwords are stored as `sha256$<iterations>$<salt hex>$<digest hex>`:
//! a random 16-byte salt and iterated SHA-256.

use chrono::Utc;
use rand::Rng;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::{Error, Result};

const HASH_SCHEME: &str = "sha256";
const HASH_ITERATIONS: u32 = 10_000;
const MAX_USERNAME_LEN: usize = 64;

/// Sign-up form fields
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Repeated password, must equal `password`
    pub password2: String,
}

impl Registration {
    fn validate(&self) -> Result<()> {
        let username = self.username.trim();
        if username.is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
            || self.password2.is_empty()
        {
            return Err(Error::InvalidInput("All fields are required".to_string()));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(Error::InvalidInput(format!(
                "Username must be at most {} characters",
                MAX_USERNAME_LEN
            )));
        }
        if !self.email.contains('@') {
            return Err(Error::InvalidInput("Email address is not valid".to_string()));
        }
        if self.password != self.password2 {
            return Err(Error::InvalidInput("Passwords do not match".to_string()));
        }
        Ok(())
    }
}

/// User account persistence
#[derive(Clone)]
pub struct UserStore {
    db: SqlitePool,
}

impl UserStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create an account; the username must be unused
    pub async fn register(&self, registration: &Registration) -> Result<()> {
        registration.validate()?;
        let username = registration.username.trim();

        let existing: Option<(String,)> =
            sqlx::query_as("SELECT username FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.db)
                .await?;
        if existing.is_some() {
            return Err(Error::Conflict("Username already taken".to_string()));
        }

        sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(registration.email.trim())
        .bind(hash_password(&registration.password))
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db)
        .await?;

        tracing::info!(username = %username, "User registered");
        Ok(())
    }

    /// Check a username/password pair
    pub async fn verify(&self, username: &str, password: &str) -> Result<bool> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM users WHERE username = ?")
                .bind(username.trim())
                .fetch_optional(&self.db)
                .await?;

        Ok(match row {
            Some((stored,)) => verify_password(password, &stored),
            None => false,
        })
    }
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> String {
    let salt: [u8; 16] = rand::thread_rng().gen();
    let digest = stretch(password, &salt, HASH_ITERATIONS);
    format!(
        "{}${}${}${}",
        HASH_SCHEME,
        HASH_ITERATIONS,
        to_hex(&salt),
        digest
    )
}

/// Check a password against a stored hash
pub fn verify_password(password: &str, stored: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    let [scheme, iterations, salt, expected] = parts.as_slice() else {
        return false;
    };
    if *scheme != HASH_SCHEME {
        return false;
    }
    let (Ok(iterations), Some(salt)) = (iterations.parse::<u32>(), from_hex(salt)) else {
        return false;
    };

    let actual = stretch(password, &salt, iterations);
    constant_time_eq(actual.as_bytes(), expected.as_bytes())
}

fn stretch(password: &str, salt: &[u8], iterations: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..iterations {
        let mut hasher = Sha256::new();
        hasher.update(digest);
        hasher.update(salt);
        digest = hasher.finalize();
    }

    format!("{:x}", digest)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn from_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| hex.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
        .collect()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
