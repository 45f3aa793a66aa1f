use anyhow::{Result, anyhow};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub mod extract;

pub use extract::{AdminUser, AuthError, AuthUser};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: String,
    pub role: Role,
}

#[derive(Clone)]
pub struct JwtConfig {
    pub access_token_encoding_key: EncodingKey,
    pub access_token_decoding_key: DecodingKey,

    pub access_token_expiry_hours: i64,

    pub validation: Validation,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let access_private = std::env::var("JWT_ACCESS_PRIVATE_KEY")
            .expect("JWT_ACCESS_PRIVATE_KEY must be set (PEM-encoded EC private key)");
        let access_public = std::env::var("JWT_ACCESS_PUBLIC_KEY")
            .expect("JWT_ACCESS_PUBLIC_KEY must be set (PEM-encoded EC public key)");

        Self::from_pem(&access_private, &access_public)
            .expect("JWT access keys are not valid EC PEM keys")
    }
}

impl JwtConfig {
    pub fn from_pem(private_pem: &str, public_pem: &str) -> Result<Self> {
        Ok(Self {
            access_token_encoding_key: EncodingKey::from_ec_pem(private_pem.as_bytes())
                .map_err(|e| anyhow!("invalid EC private key: {}", e))?,
            access_token_decoding_key: DecodingKey::from_ec_pem(public_pem.as_bytes())
                .map_err(|e| anyhow!("invalid EC public key: {}", e))?,
            access_token_expiry_hours: 1,
            validation: Validation::new(Algorithm::ES256),
        })
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.access_token_decoding_key, &self.validation)
            .map_err(|e| anyhow!("Invalid token: {}", e))?;

        if token_data.claims.token_type != "access" {
            return Err(anyhow!("Invalid token type: expected access token"));
        }

        Ok(token_data.claims)
    }

    pub fn generate_access_token(
        &self,
        user_id: &str,
        username: &str,
        email: &str,
        role: Role,
    ) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            exp: (now + Duration::hours(self.access_token_expiry_hours)).timestamp(),
            iat: now.timestamp(),
            token_type: "access".to_string(),
            role,
        };

        encode(
            &Header::new(Algorithm::ES256),
            &claims,
            &self.access_token_encoding_key,
        )
        .map_err(|e| anyhow!("Failed to encode token: {}", e))
    }
}
