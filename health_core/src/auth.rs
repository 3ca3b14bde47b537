//! Mock authentication service.
//!
//! Stands in for the login, register and token-validation endpoints. There
//! is one known account and a fixed set of accepted tokens; nothing is
//! checked against a real user database.

use crate::storage::{StoragePort, SESSION_TOKEN_KEY};
use crate::Result;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub const MOCK_TOKEN: &str = "mock-jwt-token";
pub const DEMO_TOKEN: &str = "demo-token-123";

const KNOWN_EMAIL: &str = "user@example.com";
const KNOWN_PASSWORD: &str = "password";

static KNOWN_USER: Lazy<User> = Lazy::new(|| User {
    id: 1,
    name: "John Doe".into(),
    email: KNOWN_EMAIL.into(),
});

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

/// Body of a successful login or registration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub success: bool,
    pub user: User,
    pub token: String,
}

/// Body of a successful token validation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidateResponse {
    pub valid: bool,
    pub user: User,
}

/// Rejections, each carrying the status code the endpoint would answer with
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("All fields are required")]
    MissingFields,

    #[error("Email already registered")]
    EmailTaken,

    #[error("No token provided")]
    NoToken,

    #[error("Invalid token")]
    InvalidToken,
}

impl AuthError {
    pub fn status(&self) -> u16 {
        match self {
            AuthError::MissingFields => 400,
            AuthError::InvalidCredentials | AuthError::NoToken | AuthError::InvalidToken => 401,
            AuthError::EmailTaken => 409,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MockAuth;

impl MockAuth {
    /// `POST /login`
    pub fn login(&self, email: &str, password: &str) -> std::result::Result<LoginResponse, AuthError> {
        if email == KNOWN_EMAIL && password == KNOWN_PASSWORD {
            tracing::info!("Login succeeded for {}", email);
            return Ok(LoginResponse {
                success: true,
                user: KNOWN_USER.clone(),
                token: MOCK_TOKEN.into(),
            });
        }

        tracing::info!("Login rejected for {}", email);
        Err(AuthError::InvalidCredentials)
    }

    /// `POST /register`; the new user's id is the registration time in ms
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<LoginResponse, AuthError> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        if email.trim().eq_ignore_ascii_case(KNOWN_EMAIL) {
            return Err(AuthError::EmailTaken);
        }

        Ok(LoginResponse {
            success: true,
            user: User {
                id: u64::try_from(now.timestamp_millis()).unwrap_or(0),
                name: name.trim().into(),
                email: email.trim().into(),
            },
            token: MOCK_TOKEN.into(),
        })
    }

    /// `GET /validate` with the raw `Authorization` header value
    pub fn validate(
        &self,
        authorization: Option<&str>,
    ) -> std::result::Result<ValidateResponse, AuthError> {
        let token = authorization
            .and_then(|header| header.strip_prefix("Bearer "))
            .ok_or(AuthError::NoToken)?;

        match token.trim() {
            MOCK_TOKEN | DEMO_TOKEN => Ok(ValidateResponse {
                valid: true,
                user: KNOWN_USER.clone(),
            }),
            _ => Err(AuthError::InvalidToken),
        }
    }

    /// Offline demo login that skips the endpoints entirely
    pub fn demo(&self) -> LoginResponse {
        LoginResponse {
            success: true,
            user: User {
                id: 0,
                name: "Demo User".into(),
                email: "demo@example.com".into(),
            },
            token: DEMO_TOKEN.into(),
        }
    }
}

/// Format a token as an `Authorization` header value
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Persisted login token
pub struct Session<S: StoragePort> {
    storage: S,
}

impl<S: StoragePort> Session<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn token(&self) -> Option<String> {
        match self.storage.read(SESSION_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                tracing::warn!("Unable to read session token: {}", e);
                None
            }
        }
    }

    pub fn save(&self, token: &str) -> Result<()> {
        self.storage.write(SESSION_TOKEN_KEY, token)
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.remove(SESSION_TOKEN_KEY)
    }

    /// Validate the stored token; an invalid one is cleared
    pub fn current_user(&self, auth: &MockAuth) -> Result<Option<User>> {
        let Some(token) = self.token() else {
            return Ok(None);
        };

        match auth.validate(Some(&bearer(&token))) {
            Ok(response) => Ok(Some(response.user)),
            Err(e) => {
                tracing::info!("Stored token rejected: {}", e);
                self.clear()?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::TimeZone;

    #[test]
    fn test_login_known_account() {
        let response = MockAuth.login("user@example.com", "password").unwrap();
        assert!(response.success);
        assert_eq!(response.token, MOCK_TOKEN);
        assert_eq!(response.user.name, "John Doe");
    }

    #[test]
    fn test_login_wrong_password_is_401() {
        let err = MockAuth.login("user@example.com", "hunter2").unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert_eq!(err.status(), 401);
    }

    #[test]
    fn test_register() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

        let response = MockAuth
            .register("Ada", "ada@example.com", "secret", now)
            .unwrap();
        assert_eq!(response.user.id, 1_700_000_000_000);
        assert_eq!(response.user.email, "ada@example.com");

        let err = MockAuth.register("", "ada@example.com", "secret", now).unwrap_err();
        assert_eq!(err.status(), 400);

        let err = MockAuth
            .register("John", "user@example.com", "secret", now)
            .unwrap_err();
        assert_eq!(err, AuthError::EmailTaken);
        assert_eq!(err.status(), 409);
    }

    #[test]
    fn test_validate_tokens() {
        assert!(MockAuth.validate(Some("Bearer mock-jwt-token")).unwrap().valid);
        assert!(MockAuth.validate(Some(&bearer(DEMO_TOKEN))).is_ok());
        assert_eq!(MockAuth.validate(None), Err(AuthError::NoToken));
        assert_eq!(
            MockAuth.validate(Some("mock-jwt-token")),
            Err(AuthError::NoToken)
        );
        assert_eq!(
            MockAuth.validate(Some("Bearer forged")),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_login_response_json_shape() {
        let response = MockAuth.login("user@example.com", "password").unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["user"]["id"], 1);
        assert_eq!(json["token"], "mock-jwt-token");
    }

    #[test]
    fn test_session_clears_rejected_token() {
        let storage = MemoryStorage::new();
        let session = Session::new(&storage);
        assert_eq!(session.current_user(&MockAuth).unwrap(), None);

        session.save(MOCK_TOKEN).unwrap();
        let user = session.current_user(&MockAuth).unwrap().unwrap();
        assert_eq!(user.email, "user@example.com");

        session.save("expired").unwrap();
        assert_eq!(session.current_user(&MockAuth).unwrap(), None);
        assert_eq!(session.token(), None);
    }
}
