// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use chrono::Utc;
use ecofootprint::config::Config;
use ecofootprint::db::{Db, FirestoreDb};
use ecofootprint::middleware::auth::create_jwt;
use ecofootprint::models::{AuthProvider, User};
use ecofootprint::routes::create_router;
use ecofootprint::services::{AirQualityClient, FirebaseAuthVerifier};
use ecofootprint::AppState;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Key ID the test Firebase verifier trusts.
#[allow(dead_code)]
pub const TEST_KID: &str = "test-firebase-kid";

const PRIVATE_KEY_PEM: &[u8] = include_bytes!("../fixtures/firebase_test_private_key.pem");
const PUBLIC_KEY_PEM: &[u8] = include_bytes!("../fixtures/firebase_test_public_key.pem");

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Firebase verifier backed by the fixture key pair.
#[allow(dead_code)]
pub fn test_verifier(config: &Config) -> FirebaseAuthVerifier {
    let key = DecodingKey::from_rsa_pem(PUBLIC_KEY_PEM).expect("fixture public key");
    FirebaseAuthVerifier::new_with_static_key(config, TEST_KID, key).expect("static verifier")
}

/// Create a test app over the given database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app_with(config: Config, db: Db) -> (axum::Router, Arc<AppState>) {
    let firebase_verifier = Arc::new(test_verifier(&config));
    let air_quality = AirQualityClient::new(&config);

    let state = Arc::new(AppState {
        config,
        db,
        firebase_verifier,
        air_quality,
    });

    (create_router(state.clone()), state)
}

/// Create a test app backed by the in-memory store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::test_default(), Db::memory())
}

/// Create a test app whose database is offline (every operation fails).
#[allow(dead_code)]
pub fn create_offline_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::test_default(), Db::from(FirestoreDb::new_mock()))
}

/// Insert a user directly into the store.
#[allow(dead_code)]
pub async fn seed_user(state: &AppState, user_id: &str, name: &str) -> User {
    let user = User::new(
        user_id,
        format!("{user_id}@example.com"),
        name,
        AuthProvider::Google,
        Utc::now(),
    );
    state.db.upsert_user(&user).await.expect("seed user");
    user
}

/// Session token for `user_id`, signed with the app's key.
#[allow(dead_code)]
pub fn session_token(state: &AppState, user_id: &str) -> String {
    create_jwt(user_id, &state.config.jwt_signing_key).expect("session token")
}

#[derive(Serialize)]
struct FirebaseSignInClaim {
    sign_in_provider: String,
}

#[derive(Serialize)]
struct FirebaseClaims {
    iss: String,
    aud: String,
    sub: String,
    iat: u64,
    exp: u64,
    auth_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    firebase: FirebaseSignInClaim,
}

/// Options for a minted Firebase ID token.
#[allow(dead_code)]
pub struct IdTokenOptions<'a> {
    pub uid: &'a str,
    pub email: Option<&'a str>,
    pub name: Option<&'a str>,
    pub provider: &'a str,
    pub project: &'a str,
    pub kid: &'a str,
    /// Seconds added to "now" for `iat`
    pub iat_offset: i64,
}

impl Default for IdTokenOptions<'_> {
    fn default() -> Self {
        Self {
            uid: "firebase-uid-1",
            email: Some("jane@example.com"),
            name: Some("Jane Doe"),
            provider: "google.com",
            project: "test-project",
            kid: TEST_KID,
            iat_offset: 0,
        }
    }
}

/// Mint a Firebase-style ID token signed with the fixture private key.
#[allow(dead_code)]
pub fn firebase_id_token(opts: IdTokenOptions<'_>) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let iat = now.saturating_add_signed(opts.iat_offset);

    let claims = FirebaseClaims {
        iss: format!("https://securetoken.google.com/{}", opts.project),
        aud: opts.project.to_string(),
        sub: opts.uid.to_string(),
        iat,
        exp: now + 3600,
        auth_time: iat,
        email: opts.email.map(str::to_string),
        name: opts.name.map(str::to_string),
        firebase: FirebaseSignInClaim {
            sign_in_provider: opts.provider.to_string(),
        },
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(opts.kid.to_string());

    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY_PEM).expect("fixture private key");
    encode(&header, &claims, &key).expect("sign ID token")
}

/// Authenticated JSON POST.
#[allow(dead_code)]
pub fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Authenticated GET.
#[allow(dead_code)]
pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
