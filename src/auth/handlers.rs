use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        cookie::{expired_session_cookie, session_cookie},
        dto::{
            ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
            UpdateProfileRequest,
        },
        extractors::AuthUser,
        password::{hash_password, verify_password},
        repo_types::{NewUser, Role},
        reset::hash_reset_token,
    },
    email::{reset_password_message, RESET_SUBJECT},
    error::ApiError,
    response::Envelope,
    state::AppState,
    storage::{decode_image, DecodedImage, HostedImage},
};

const AVATAR_FOLDER: &str = "users";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/password/forgot", post(forgot_password))
        .route("/password/reset/:token", put(reset_password))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/logout", get(logout))
        .route("/update/profile", put(update_profile))
        .route("/delete/profile", delete(delete_profile))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }
    Ok(email)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_image(raw: &str) -> Result<DecodedImage, ApiError> {
    decode_image(raw).map_err(|e| {
        warn!(error = %e, "invalid image payload");
        ApiError::validation("Invalid image")
    })
}

async fn upload_avatar(state: &AppState, image: DecodedImage) -> Result<HostedImage, ApiError> {
    state
        .storage
        .upload(AVATAR_FOLDER, image.body, &image.content_type)
        .await
        .map_err(|e| {
            error!(error = %e, "avatar upload failed");
            ApiError::Internal(e)
        })
}

fn start_session(state: &AppState, jar: CookieJar, user_id: Uuid) -> Result<CookieJar, ApiError> {
    let token = state.jwt.sign(user_id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal(e)
    })?;
    Ok(jar.add(session_cookie(token, state.jwt.ttl())))
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<Envelope>), ApiError> {
    let email = normalize_email(&payload.email)?;
    if payload.password.is_empty() {
        warn!("empty password");
        return Err(ApiError::validation("Password is required"));
    }

    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::AlreadyRegistered);
    }

    let image = match non_empty(payload.image) {
        Some(raw) => Some(parse_image(&raw)?),
        None => None,
    };
    let avatar = match image {
        Some(image) => Some(upload_avatar(&state, image).await?),
        None => None,
    };

    let password_hash = hash_password(&payload.password).await?;

    let new_user = NewUser {
        name: non_empty(payload.name),
        email,
        password_hash,
        role: Role::User,
        avatar: avatar.clone(),
    };
    let user = match state.users.create(new_user).await {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "create user failed");
            if let Some(avatar) = avatar {
                if let Err(cleanup) = state.storage.destroy(&avatar.public_id).await {
                    error!(error = %cleanup, "orphaned avatar cleanup failed");
                }
            }
            return Err(ApiError::Internal(e));
        }
    };

    let jar = start_session(&state, jar, user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        jar,
        Json(Envelope::message("User Registered Successfully").with_user(&user)),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, CookieJar, Json<Envelope>), ApiError> {
    let email = normalize_email(&payload.email)?;

    let user = match state.users.find_by_email(&email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::UserNotFound);
        }
    };

    if !verify_password(&payload.password, &user.password_hash).await? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let jar = start_session(&state, jar, user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((
        StatusCode::OK,
        jar,
        Json(Envelope::message("Logged In Successfully").with_user(&user)),
    ))
}

#[instrument(skip(auth), fields(user_id = %auth.user_id))]
pub async fn get_me(auth: AuthUser) -> Result<Json<Envelope>, ApiError> {
    let user = auth.require()?;
    Ok(Json(Envelope::ok().with_user(user)))
}

#[instrument(skip(auth, jar), fields(user_id = %auth.user_id))]
pub async fn logout(auth: AuthUser, jar: CookieJar) -> Result<(CookieJar, Json<Envelope>), ApiError> {
    let user = auth.require()?;
    info!(user_id = %user.id, "user logged out");
    Ok((
        jar.add(expired_session_cookie()),
        Json(Envelope::message("Logged Out Successfully")),
    ))
}

#[instrument(skip(state, auth, jar, payload), fields(user_id = %auth.user_id))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<(CookieJar, Json<Envelope>), ApiError> {
    let mut user = auth.require()?;

    // Validate everything before touching the image host or the store.
    let email = match non_empty(payload.email) {
        Some(raw) => Some(normalize_email(&raw)?),
        None => None,
    };
    if let Some(email) = email.as_deref().filter(|e| *e != user.email) {
        if let Some(other) = state.users.find_by_email(email).await? {
            if other.id != user.id {
                warn!(email = %email, "email already in use");
                return Err(ApiError::validation("Email Already In Use"));
            }
        }
    }
    let image = match non_empty(payload.image) {
        Some(raw) => Some(parse_image(&raw)?),
        None => None,
    };

    // Stored passwords always go through the hasher.
    if let Some(password) = payload.password.filter(|p| !p.is_empty()) {
        user.password_hash = hash_password(&password).await?;
    }

    // The old avatar stays referenced until the new one is stored.
    let mut uploaded = None;
    let mut replaced = None;
    if let Some(image) = image {
        let avatar = upload_avatar(&state, image).await?;
        uploaded = Some(avatar.public_id.clone());
        replaced = user.avatar.replace(avatar);
    }
    if let Some(name) = non_empty(payload.name) {
        user.name = Some(name);
    }
    if let Some(email) = email {
        user.email = email;
    }
    if let Err(e) = state.users.save(&user).await {
        error!(error = %e, "profile update failed");
        if let Some(public_id) = uploaded {
            if let Err(cleanup) = state.storage.destroy(&public_id).await {
                error!(error = %cleanup, "orphaned avatar cleanup failed");
            }
        }
        return Err(ApiError::Internal(e));
    }

    if let Some(old) = replaced {
        if let Err(e) = state.storage.destroy(&old.public_id).await {
            warn!(error = %e, public_id = %old.public_id, "old avatar destroy failed");
        }
    }
    let jar = start_session(&state, jar, user.id)?;

    info!(user_id = %user.id, "profile updated");
    Ok((
        jar,
        Json(Envelope::message("Profile Updated Successfully").with_user(&user)),
    ))
}

#[instrument(skip(state, auth, jar), fields(user_id = %auth.user_id))]
pub async fn delete_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Envelope>), ApiError> {
    let user = auth.require()?;

    if let Some(avatar) = &user.avatar {
        state.storage.destroy(&avatar.public_id).await.map_err(|e| {
            error!(error = %e, "avatar destroy failed");
            ApiError::Internal(e)
        })?;
    }
    state.users.delete(user.id).await?;

    info!(user_id = %user.id, "user deleted");
    Ok((
        jar.add(expired_session_cookie()),
        Json(Envelope::message("User Deleted Successfully")),
    ))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<Envelope>, ApiError> {
    let email = normalize_email(&payload.email)?;
    let mut user = match state.users.find_by_email(&email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "reset requested for unknown email");
            return Err(ApiError::UserNotFound);
        }
    };

    let issued = state.reset_tokens.issue();
    user.reset_token_hash = Some(issued.hash);
    user.reset_token_expires_at = Some(issued.expires_at);
    state.users.save(&user).await?;

    let reset_url = format!(
        "{}/password/reset/{}",
        state.config.frontend_url.trim_end_matches('/'),
        issued.plaintext
    );
    let message = reset_password_message(&reset_url);

    if let Err(e) = state.mailer.send(&user.email, RESET_SUBJECT, &message).await {
        error!(error = %e, user_id = %user.id, "reset email failed");
        user.clear_reset_token();
        if let Err(save_err) = state.users.save(&user).await {
            error!(error = %save_err, user_id = %user.id, "clearing reset token failed");
        }
        return Err(ApiError::Internal(e));
    }

    info!(user_id = %user.id, "password reset requested");
    Ok(Json(Envelope::message(format!("Email Sent to {}", user.email))))
}

#[instrument(skip(state, token, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<Envelope>, ApiError> {
    let token_hash = hash_reset_token(&token);
    let mut user = match state
        .users
        .find_by_reset_token(&token_hash, OffsetDateTime::now_utc())
        .await?
    {
        Some(u) => u,
        None => {
            warn!("invalid or expired reset token");
            return Err(ApiError::InvalidOrExpiredResetToken);
        }
    };

    if payload.new_password.is_empty() {
        return Err(ApiError::validation("New password is required"));
    }
    if payload.new_password != payload.confirm_new_password {
        warn!(user_id = %user.id, "reset passwords do not match");
        return Err(ApiError::validation("Password Doesn't Match!"));
    }

    user.password_hash = hash_password(&payload.new_password).await?;
    // One use per token.
    user.clear_reset_token();
    state.users.save(&user).await?;

    info!(user_id = %user.id, "password reset");
    Ok(Json(Envelope::message("Password Reset Successfully")))
}
