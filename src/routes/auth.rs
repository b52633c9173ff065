use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{encode_token, Claims};
use crate::auth::password;
use crate::db;
use crate::db::logs::NewLogEntry;
use crate::db::users::UserPatch;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::LogAction;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub role: Option<String>,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
}

fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    if req.username.len() < 3 || req.username.len() > 50 {
        return Err(AppError::BadRequest(
            "Username must be between 3 and 50 characters".to_string(),
        ));
    }
    if !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.full_name.is_empty() || req.full_name.len() > 100 {
        return Err(AppError::BadRequest(
            "Full name must be between 1 and 100 characters".to_string(),
        ));
    }
    if req.password.len() < 6 || req.password.len() > 100 {
        return Err(AppError::BadRequest(
            "Password must be between 6 and 100 characters".to_string(),
        ));
    }
    Ok(())
}

pub async fn register(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    validate_registration(&req)?;

    // Pre-checks give precise messages; the unique indexes close the race.
    if db::users::find_by_username(&state.pool, &req.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Username already registered".to_string()));
    }
    if db::users::find_by_email(&state.pool, &req.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;
    let role = req.role.as_deref().unwrap_or("user");

    let user = db::users::create(
        &state.pool,
        &req.username,
        &req.email,
        &req.full_name,
        role,
        &pw_hash,
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Username or email already registered".to_string())
        }
        _ => AppError::Database(e),
    })?;

    let claims = Claims::new(user.id, state.config.token_ttl_days);
    let token = encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    let warning = audit::record(
        &state.pool,
        NewLogEntry {
            action: LogAction::Create,
            entity_type: "user",
            entity_id: user.id,
            user_id: user.id,
            user_name: &user.full_name,
            details: json!({ "event": "user registered" }),
            ip_address: audit::client_ip(&headers, Some(addr.ip()), &state.config.trusted_proxies),
        },
    )
    .await;

    let mut body = json!({ "user": user, "token": token });
    if let Some(warning) = warning {
        body["warning"] = json!(warning);
    }
    Ok(Json(body))
}

pub async fn login(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if state.login_limiter.check(&req.username).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    // A missing user and a wrong password are indistinguishable to the caller.
    let user = db::users::find_by_username(&state.pool, &req.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !password::verify(&req.password, &user.password_hash) {
        state.login_limiter.record_failure(&req.username);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let claims = Claims::new(user.id, state.config.token_ttl_days);
    let token = encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    let warning = audit::record(
        &state.pool,
        NewLogEntry {
            action: LogAction::View,
            entity_type: "user",
            entity_id: user.id,
            user_id: user.id,
            user_name: &user.full_name,
            details: json!({ "event": "user logged in" }),
            ip_address: audit::client_ip(&headers, Some(addr.ip()), &state.config.trusted_proxies),
        },
    )
    .await;

    let mut body = json!({ "user": user, "token": token });
    if let Some(warning) = warning {
        body["warning"] = json!(warning);
    }
    Ok(Json(body))
}

pub async fn me(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(json!({ "user": user })))
}

pub async fn update_me(
    auth: AuthUser,
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if let Some(username) = &req.username {
        if username.len() < 3 || username.len() > 50 {
            return Err(AppError::BadRequest(
                "Username must be between 3 and 50 characters".to_string(),
            ));
        }
        if username != &auth.username
            && db::users::find_by_username(&state.pool, username)
                .await?
                .is_some()
        {
            return Err(AppError::Conflict("Username already registered".to_string()));
        }
    }
    if let Some(email) = &req.email {
        if !email.contains('@') {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
        if let Some(existing) = db::users::find_by_email(&state.pool, email).await? {
            if existing.id != auth.user_id {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
        }
    }
    if let Some(full_name) = &req.full_name {
        if full_name.is_empty() || full_name.len() > 100 {
            return Err(AppError::BadRequest(
                "Full name must be between 1 and 100 characters".to_string(),
            ));
        }
    }

    let patch = UserPatch {
        username: req.username,
        email: req.email,
        full_name: req.full_name,
        role: req.role,
    };

    let user = db::users::update(&state.pool, auth.user_id, &patch)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Username or email already registered".to_string())
            }
            _ => AppError::Database(e),
        })?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let warning = audit::record(
        &state.pool,
        NewLogEntry {
            action: LogAction::Update,
            entity_type: "user",
            entity_id: user.id,
            user_id: user.id,
            user_name: &user.full_name,
            details: json!({ "event": "profile updated" }),
            ip_address: audit::client_ip(&headers, Some(addr.ip()), &state.config.trusted_proxies),
        },
    )
    .await;

    let mut body = json!({ "user": user });
    if let Some(warning) = warning {
        body["warning"] = json!(warning);
    }
    Ok(Json(body))
}

pub async fn deactivate_me(
    auth: AuthUser,
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    // The extractor guarantees the account is still active here, so a false
    // return means a concurrent deactivation won; either way it is done.
    db::users::deactivate(&state.pool, auth.user_id).await?;

    let warning = audit::record(
        &state.pool,
        NewLogEntry {
            action: LogAction::Delete,
            entity_type: "user",
            entity_id: auth.user_id,
            user_id: auth.user_id,
            user_name: &auth.full_name,
            details: json!({ "event": "account deactivated" }),
            ip_address: audit::client_ip(&headers, Some(addr.ip()), &state.config.trusted_proxies),
        },
    )
    .await;

    let mut body = json!({ "message": "Account deactivated" });
    if let Some(warning) = warning {
        body["warning"] = json!(warning);
    }
    Ok(Json(body))
}
