use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::User;
use crate::error::AppError;

/// Access tokens open the data routes; refresh tokens only mint new pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    pub kind: TokenKind,
}

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Lower-cases and trims the e-mail. With `check_password` the password
    /// length policy is enforced too; login skips it.
    pub fn normalized(self, check_password: bool) -> Result<Self, AppError> {
        let email = self.email.trim().to_lowercase();
        if !super::services::is_valid_email(&email) {
            return Err(AppError::BadRequest("Invalid email".into()));
        }
        if check_password && self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(Self {
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let c = creds("  Lifter@Example.COM ", "squat-bench").normalized(true).unwrap();
        assert_eq!(c.email, "lifter@example.com");
    }

    #[test]
    fn short_password_only_matters_on_register() {
        assert!(matches!(
            creds("a@b.co", "short").normalized(true),
            Err(AppError::BadRequest(_))
        ));
        assert!(creds("a@b.co", "short").normalized(false).is_ok());
    }

    #[test]
    fn token_pair_flattens_into_response() {
        let res = AuthResponse {
            tokens: TokenPair {
                access_token: "a".into(),
                refresh_token: "r".into(),
            },
            user: PublicUser {
                id: Uuid::new_v4(),
                email: "a@b.co".into(),
            },
        };
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["access_token"], "a");
        assert_eq!(json["refresh_token"], "r");
        assert!(json["user"].get("password_hash").is_none());
    }
}
