use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use bazaar_store::{keys, Collections, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Only campus addresses may register.
pub const ALLOWED_EMAIL_DOMAINS: [&str; 2] = ["@binus.ac.id", "@binus.edu"];
pub const MIN_PASSWORD_LEN: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Both,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Student number
    pub nim: String,
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Copy without credentials, safe to hand to clients.
    pub fn public(&self) -> User {
        User {
            password_hash: String::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Please use a valid Binusian email address")]
    InvalidEmail,

    #[error("Password must be at least 5 characters")]
    WeakPassword,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub fn is_campus_email(email: &str) -> bool {
    ALLOWED_EMAIL_DOMAINS.iter().any(|d| email.ends_with(d))
}

#[derive(Clone)]
pub struct IdentityService {
    collections: Collections,
}

impl IdentityService {
    pub fn new(collections: Collections) -> Self {
        Self { collections }
    }

    pub fn sign_up(&self, name: &str, nim: &str, email: &str, password: &str) -> Result<User, IdentityError> {
        let email = email.trim().to_lowercase();
        let mut users: Vec<User> = self.collections.load(keys::USERS)?;

        if users.iter().any(|u| u.email == email) {
            return Err(IdentityError::EmailTaken);
        }
        if !is_campus_email(&email) {
            return Err(IdentityError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(IdentityError::WeakPassword);
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| IdentityError::Hashing(e.to_string()))?
            .to_string();

        let user = User {
            id: format!("user_{}", Uuid::new_v4().simple()),
            name: name.trim().to_string(),
            nim: nim.trim().to_string(),
            email,
            password_hash,
            // Everyone can both buy and sell
            role: Role::Both,
            created_at: Utc::now(),
        };

        users.push(user.clone());
        self.collections.save(keys::USERS, &users)?;
        info!("User {} registered", user.id);
        Ok(user)
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<User, IdentityError> {
        let email = email.trim().to_lowercase();
        let users: Vec<User> = self.collections.load(keys::USERS)?;
        let user = users
            .into_iter()
            .find(|u| u.email == email)
            .ok_or(IdentityError::InvalidCredentials)?;

        let parsed_hash =
            PasswordHash::new(&user.password_hash).map_err(|_| IdentityError::InvalidCredentials)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| IdentityError::InvalidCredentials)?;

        Ok(user)
    }

    pub fn get(&self, user_id: &str) -> Result<Option<User>, IdentityError> {
        let users: Vec<User> = self.collections.load(keys::USERS)?;
        Ok(users.into_iter().find(|u| u.id == user_id))
    }
}
