use argon2::{
    password_hash::{self, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use super::dto::{Claims, TokenKind, TokenPair};
use crate::{config::JwtConfig, error::AppError, state::AppState};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| anyhow::anyhow!("hash password: {e}"))
}

/// `Ok(false)` for a wrong password; `Err` only when the stored hash is
/// unusable.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| anyhow::anyhow!("stored hash unreadable: {e}"))?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("verify password: {e}")),
    }
}

/// Signs and checks the HS256 tokens of one deployment. Built once from
/// [`JwtConfig`] and shared through [`AppState`].
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(cfg: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[cfg.issuer.as_str()]);
        validation.set_audience(&[cfg.audience.as_str()]);
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            validation,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::minutes(cfg.ttl_minutes),
            refresh_ttl: Duration::minutes(cfg.refresh_ttl_minutes),
        }
    }

    fn sign(&self, user_id: Uuid, kind: TokenKind) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp(),
            exp: (now + ttl).unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn issue_pair(&self, user_id: Uuid) -> anyhow::Result<TokenPair> {
        let pair = TokenPair {
            access_token: self.sign(user_id, TokenKind::Access)?,
            refresh_token: self.sign(user_id, TokenKind::Refresh)?,
        };
        debug!(%user_id, "token pair issued");
        Ok(pair)
    }

    /// User id carried by `token`, provided it is valid and of the
    /// `expected` kind.
    pub fn authenticate(&self, token: &str, expected: TokenKind) -> Result<Uuid, AppError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                warn!(error = %e, "token rejected");
                AppError::NotAuthenticated
            })?
            .claims;
        if claims.kind != expected {
            warn!(user_id = %claims.sub, kind = ?claims.kind, ?expected, "wrong token kind");
            return Err(AppError::NotAuthenticated);
        }
        Ok(claims.sub)
    }
}

fn bearer(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
}

/// The authenticated user id. Requests without a valid access token are
/// rejected as [`AppError::NotAuthenticated`].
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer(parts).ok_or(AppError::NotAuthenticated)?;
        state.tokens.authenticate(token, TokenKind::Access).map(AuthUser)
    }
}
