use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use sqlx::PgPool;
use tracing::{error, warn};

use crate::auth::jwt::{Claims, JwtKeys};
use crate::auth::password::verify_password;
use crate::state::AppState;
use crate::users::repo::User;

/// Rejections produced by the per-request authentication chain.
///
/// Which verification stage failed (missing header, bad signature, expiry,
/// unknown subject) is deliberately not exposed to the caller.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("Could not validate credentials")]
    Unauthenticated,
    #[error("Inactive user")]
    InactiveAccount,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::InvalidCredentials | AuthError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                self.to_string(),
            )
                .into_response(),
            AuthError::InactiveAccount => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            AuthError::Internal(e) => {
                error!(error = %e, "auth chain internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        }
    }
}

/// Extract stage: pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| {
            auth.strip_prefix("Bearer ")
                .or_else(|| auth.strip_prefix("bearer "))
        })
}

/// Login path: unknown email and wrong password are indistinguishable.
pub async fn authenticate(
    db: &PgPool,
    email: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    let Some(user) = User::find_by_email(db, email).await? else {
        return Ok(None);
    };
    if !verify_password(password, &user.password_hash) {
        return Ok(None);
    }
    Ok(Some(user))
}

/// Resolve stage: maps verified claims back to an account. A token can
/// decode successfully yet reference a since-deleted account.
pub async fn resolve_claims(db: &PgPool, claims: &Claims) -> anyhow::Result<Option<User>> {
    User::find_by_email(db, &claims.sub).await
}

/// The account resolved from a verified bearer token, valid for one request.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AuthError::Unauthenticated)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.decode(token).ok_or_else(|| {
            warn!("invalid or expired token");
            AuthError::Unauthenticated
        })?;

        let user = resolve_claims(&state.db, &claims)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        Ok(CurrentUser(user))
    }
}

/// Second gate on top of [`CurrentUser`]: deactivated accounts are rejected
/// with a distinct signal instead of the generic 401.
pub struct ActiveUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for ActiveUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_active {
            warn!(user_id = %user.id, "inactive account rejected");
            return Err(AuthError::InactiveAccount);
        }
        Ok(ActiveUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_extracts_token() {
        let headers = headers_with_auth("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_token_accepts_lowercase_scheme() {
        let headers = headers_with_auth("bearer abc");
        assert_eq!(bearer_token(&headers), Some("abc"));
    }

    #[test]
    fn bearer_token_rejects_other_schemes_and_absence() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with_auth("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers_with_auth("Bearer")), None);
    }

    #[test]
    fn unauthenticated_carries_challenge() {
        let resp = AuthError::Unauthenticated.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn invalid_credentials_carries_challenge() {
        let resp = AuthError::InvalidCredentials.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[test]
    fn inactive_account_is_bad_request_without_challenge() {
        let resp = AuthError::InactiveAccount.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(!resp.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}
