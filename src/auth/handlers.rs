use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, Credentials, PublicUser, RefreshRequest, TokenKind},
        repo::User,
        services::{hash_password, verify_password, AuthUser},
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn session(state: &AppState, user: User) -> Result<Json<AuthResponse>, AppError> {
    let tokens = state.tokens.issue_pair(user.id)?;
    Ok(Json(AuthResponse {
        tokens,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> Result<Json<AuthResponse>, AppError> {
    let creds = payload.normalized(true)?;
    if state.users.find_user_by_email(&creds.email).await?.is_some() {
        warn!(email = %creds.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&creds.password)?;
    let user = state.users.create_user(&creds.email, &hash).await?;
    info!(user_id = %user.id, "user registered");
    session(&state, user)
}

/// Unknown e-mail and wrong password answer the same way.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> Result<Json<AuthResponse>, AppError> {
    let creds = payload.normalized(false)?;
    let user = match state.users.find_user_by_email(&creds.email).await? {
        Some(user) if verify_password(&creds.password, &user.password_hash)? => user,
        _ => {
            warn!(email = %creds.email, "login rejected");
            return Err(AppError::NotAuthenticated);
        }
    };
    info!(user_id = %user.id, "user logged in");
    session(&state, user)
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user_id = state.tokens.authenticate(&payload.refresh_token, TokenKind::Refresh)?;
    let user = state
        .users
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::NotAuthenticated)?;
    session(&state, user)
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = state
        .users
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::NotAuthenticated)?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_then_login() {
        let state = AppState::fake();
        let creds = || Credentials {
            email: " Lifter@Example.com ".into(),
            password: "squat-bench-dead".into(),
        };
        let Json(reg) = register(State(state.clone()), Json(creds())).await.unwrap();
        assert_eq!(reg.user.email, "lifter@example.com");

        let dup = register(State(state.clone()), Json(creds())).await.unwrap_err();
        assert!(matches!(dup, AppError::Conflict(_)));

        let Json(logged) = login(State(state.clone()), Json(creds())).await.unwrap();
        assert_eq!(logged.user.id, reg.user.id);

        let bad = login(
            State(state.clone()),
            Json(Credentials {
                email: "lifter@example.com".into(),
                password: "wrong-password".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(bad, AppError::NotAuthenticated));

        let Json(again) = refresh(
            State(state.clone()),
            Json(RefreshRequest {
                refresh_token: logged.tokens.refresh_token,
            }),
        )
        .await
        .unwrap();
        assert_eq!(again.user.id, reg.user.id);
    }

    #[tokio::test]
    async fn register_validates_input() {
        let state = AppState::fake();
        let err = register(
            State(state.clone()),
            Json(Credentials {
                email: "not-an-email".into(),
                password: "long-enough".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = register(
            State(state),
            Json(Credentials {
                email: "a@b.co".into(),
                password: "short".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn refresh_refuses_access_tokens() {
        let state = AppState::fake();
        let Json(reg) = register(
            State(state.clone()),
            Json(Credentials {
                email: "cutter@example.com".into(),
                password: "long-enough".into(),
            }),
        )
        .await
        .unwrap();
        let err = refresh(
            State(state),
            Json(RefreshRequest {
                refresh_token: reg.tokens.access_token,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotAuthenticated));
    }
}
