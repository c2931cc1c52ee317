//! Password hashing and bearer-token issuance/verification.
//!
//! Tokens are stateless HS256 JWTs. The claims layout uses camelCase field
//! names so clients that decode the payload directly see the same shape the
//! API serves elsewhere.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use hms_types::Role;

use crate::config::AppConfig;
use crate::HmsResult;

/// Claims carried by an issued bearer token.
///
/// `doctor_id`/`patient_id` are present once the account is linked to a staff
/// or patient profile. A patient who registered but has not completed their
/// profile carries no `patientId` until the profile endpoint re-issues the
/// token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<i64>,
    pub iat: i64,
    pub exp: i64,
}

/// Identity fields embedded in a token; the expiry fields are filled in at
/// signing time.
#[derive(Debug, Clone)]
pub struct TokenIdentity {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub name: Option<String>,
    pub doctor_id: Option<i64>,
    pub patient_id: Option<i64>,
}

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl TokenService {
    /// Create a token service from a signing secret and token lifetime.
    pub fn new(secret: &str, ttl: chrono::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Create a token service from resolved configuration.
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(cfg.jwt_secret(), cfg.token_ttl())
    }

    /// Sign a token for the given identity.
    ///
    /// # Errors
    ///
    /// Returns `HmsError::Token` if signing fails.
    pub fn issue(&self, identity: &TokenIdentity) -> HmsResult<String> {
        let now = Utc::now();
        let claims = Claims {
            user_id: identity.user_id,
            email: identity.email.clone(),
            role: identity.role,
            name: identity.name.clone(),
            doctor_id: identity.doctor_id,
            patient_id: identity.patient_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Decode and verify a bearer token.
    ///
    /// Any failure (malformed token, bad signature, expiry) yields `None`;
    /// callers treat that as unauthenticated rather than an internal error.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .ok()
            .map(|data| data.claims)
    }
}

/// Hash a plaintext password with the given bcrypt cost.
///
/// # Errors
///
/// Returns `HmsError::PasswordHash` if hashing fails.
pub fn hash_password(plain: &str, cost: u32) -> HmsResult<String> {
    Ok(bcrypt::hash(plain, cost)?)
}

/// Check a plaintext password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns `HmsError::PasswordHash` if the stored hash is malformed.
pub fn verify_password(plain: &str, hash: &str) -> HmsResult<bool> {
    Ok(bcrypt::verify(plain, hash)?)
}
