use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;
use uuid::Uuid;

use super::{cookie::SESSION_COOKIE, repo_types::User};
use crate::{error::ApiError, state::AppState};

/// First gate: a verified session cookie, resolved against the user store.
///
/// `user` is `None` when the token is valid but its user no longer exists;
/// handlers decide how to report that.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub user: Option<User>,
}

impl AuthUser {
    pub fn require(self) -> Result<User, ApiError> {
        self.user.ok_or(ApiError::UserNotFound)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_owned())
            .filter(|v| !v.is_empty())
            .ok_or(ApiError::LoginFirst)?;

        let state = AppState::from_ref(state);
        let claims = state.jwt.verify(&token).map_err(|e| {
            warn!(error = %e, "invalid session token");
            ApiError::InvalidToken
        })?;

        let user = state.users.find_by_id(claims.sub).await?;
        if user.is_none() {
            warn!(user_id = %claims.sub, "session refers to missing user");
        }

        Ok(AuthUser {
            user_id: claims.sub,
            user,
        })
    }
}

/// Second gate: runs [`AuthUser`] first, then requires the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?.require()?;
        if !user.is_admin() {
            warn!(user_id = %user.id, "admin route denied");
            return Err(ApiError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
