// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase sign-in and session routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, removal_cookie, session_cookie};
use crate::models::user::default_display_name;
use crate::models::User;
use crate::services::{FirebaseAuthError, FirebaseIdentity};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/google", post(google_sign_in))
        .route("/api/auth/logout", post(logout))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    id_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SignInResponse {
    pub success: bool,
    pub user_id: String,
    pub user_name: String,
    pub email: String,
    /// Session token, for clients that cannot use the cookie
    pub token: String,
}

impl From<FirebaseAuthError> for AppError {
    fn from(e: FirebaseAuthError) -> Self {
        match e {
            FirebaseAuthError::Invalid(reason) => {
                tracing::info!(reason = %reason, "Firebase ID token rejected");
                AppError::InvalidToken
            }
            FirebaseAuthError::Transient(reason) => AppError::Upstream(reason),
        }
    }
}

/// Exchange a Firebase ID token for a session.
///
/// First sign-in creates the user; later sign-ins leave the stored profile
/// as it is.
async fn google_sign_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: std::result::Result<Json<SignInRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<SignInResponse>)> {
    let Json(request) = body.map_err(|e| AppError::validation("body", e.body_text()))?;
    let id_token = request
        .id_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::validation("idToken", "ID token is required"))?;

    let identity = state.firebase_verifier.verify_id_token(&id_token).await?;
    let user = find_or_create_user(&state, identity).await?;

    let token = create_jwt(&user.user_id, &state.config.jwt_signing_key)?;
    let jar = jar.add(session_cookie(
        token.clone(),
        state.config.is_secure_frontend(),
    ));

    Ok((
        jar,
        Json(SignInResponse {
            success: true,
            user_id: user.user_id,
            user_name: user.name,
            email: user.email,
            token,
        }),
    ))
}

async fn find_or_create_user(state: &AppState, identity: FirebaseIdentity) -> Result<User> {
    if let Some(existing) = state.db.get_user(&identity.user_id).await? {
        tracing::debug!(user_id = %existing.user_id, "Existing user signed in");
        return Ok(existing);
    }

    let name = identity
        .display_name
        .unwrap_or_else(|| default_display_name(&identity.email));
    let user = User::new(
        identity.user_id,
        identity.email,
        name,
        identity.provider,
        Utc::now(),
    );
    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.user_id, provider = ?user.auth_provider, "User created");
    Ok(user)
}

/// Clear the session cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.add(removal_cookie(state.config.is_secure_frontend()));
    (jar, StatusCode::NO_CONTENT)
}
