//! Shared-secret administrator login and bearer token checks.
//!
//! The panel has exactly one administrator credential, supplied through configuration. A
//! successful login yields a short-lived HS256 token that every `/api/v1` route other than the
//! login itself requires.

pub mod middleware;
pub mod password;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::config::AuthConfig;

pub use middleware::require_bearer;

/// Login form posted by the panel.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Claims carried inside every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Response body for a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid or expired bearer token")]
    InvalidToken,
    #[error("authentication unavailable: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AuthError::MissingToken | AuthError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "unauthorized")
            }
            AuthError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "auth_error"),
        };

        let body = Json(json!({ "error": code, "message": self.to_string() }));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

/// Verifies the administrator credential and signs/checks bearer tokens.
pub struct Authenticator {
    admin_username: String,
    admin_password_hash: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl Authenticator {
    pub fn from_config(config: &AuthConfig) -> Self {
        let secret = config.token_secret.as_bytes();
        Self {
            admin_username: config.admin_username.clone(),
            admin_password_hash: config.admin_password_hash.clone(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: Duration::minutes(config.token_ttl_minutes),
        }
    }

    /// Argon2 verification runs on the blocking pool.
    pub async fn login(&self, credentials: &Credentials) -> Result<IssuedToken, AuthError> {
        let plain = credentials.password.clone();
        let hash = self.admin_password_hash.clone();
        let password_matches =
            tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash))
                .await
                .map_err(|err| AuthError::Internal(format!("password verification task: {err}")))?
                .map_err(|err| AuthError::Internal(err.to_string()))?;

        if credentials.username != self.admin_username || !password_matches {
            warn!(username = %credentials.username, "rejected login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.issue_at(&credentials.username, Utc::now())?;
        info!(
            username = %credentials.username,
            expires_at = %issued.expires_at,
            "issued session token"
        );
        Ok(issued)
    }

    pub(crate) fn issue_at(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let expires_at = issued_at + self.ttl;
        let claims = SessionClaims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| AuthError::Internal(format!("sign token: {err}")))?;

        Ok(IssuedToken {
            token,
            token_type: "Bearer".to_string(),
            expires_at,
        })
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::InvalidKeyFormat | ErrorKind::Crypto(_) => {
                    AuthError::Internal(format!("verify token: {err}"))
                }
                _ => AuthError::InvalidToken,
            })
    }
}

pub async fn login_handler(
    State(auth): State<Arc<Authenticator>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<IssuedToken>, AuthError> {
    auth.login(&credentials).await.map(Json)
}
