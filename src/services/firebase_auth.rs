// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase ID token verification for sign-in.

use crate::config::Config;
use crate::models::AuthProvider;
use anyhow::Context;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};

const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;

/// Identity extracted from a valid Firebase ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseIdentity {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub provider: AuthProvider,
}

/// Firebase verification error categories.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FirebaseAuthError {
    /// The token is malformed, expired, or its claims do not match.
    #[error("invalid ID token: {0}")]
    Invalid(String),
    /// The signing keys could not be fetched.
    #[error("key fetch failed: {0}")]
    Transient(String),
}

#[derive(Clone)]
enum VerifierMode {
    Google,
    StaticKey {
        kid: String,
        decoding_key: Arc<DecodingKey>,
    },
}

#[derive(Clone)]
struct JwksCacheEntry {
    keys_by_kid: HashMap<String, Arc<DecodingKey>>,
    expires_at: Instant,
}

/// Verifier for Firebase Authentication ID tokens.
pub struct FirebaseAuthVerifier {
    http_client: reqwest::Client,
    project_id: String,
    mode: VerifierMode,
    jwks_cache: RwLock<Option<JwksCacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl FirebaseAuthVerifier {
    /// Create a production verifier that fetches and caches Google's
    /// securetoken signing keys.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building Firebase JWKS HTTP client")?;

        tracing::info!(
            project_id = %config.firebase_project_id,
            "Initialized Firebase ID token verifier"
        );

        Ok(Self {
            http_client,
            project_id: config.firebase_project_id.clone(),
            mode: VerifierMode::Google,
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Create a verifier with a static RSA public key.
    ///
    /// This is intended for deterministic local/integration tests.
    pub fn new_with_static_key(
        config: &Config,
        kid: impl Into<String>,
        decoding_key: DecodingKey,
    ) -> anyhow::Result<Self> {
        let kid = kid.into();
        if kid.trim().is_empty() {
            anyhow::bail!("static Firebase kid must not be empty");
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building Firebase JWKS HTTP client")?;

        Ok(Self {
            http_client,
            project_id: config.firebase_project_id.clone(),
            mode: VerifierMode::StaticKey {
                kid,
                decoding_key: Arc::new(decoding_key),
            },
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Issuer Firebase puts in tokens for this project.
    pub fn expected_issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    /// Verify a Firebase ID token and return the signed-in identity.
    pub async fn verify_id_token(&self, token: &str) -> Result<FirebaseIdentity, FirebaseAuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(FirebaseAuthError::Invalid("ID token is empty".to_string()));
        }

        let header = decode_header(token)
            .map_err(|e| FirebaseAuthError::Invalid(format!("invalid JWT header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(FirebaseAuthError::Invalid(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| FirebaseAuthError::Invalid("missing JWT kid".to_string()))?;

        let decoding_key = self.decoding_key_for_kid(&kid).await?;

        let issuer = self.expected_issuer();
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.leeway = CLOCK_SKEW_SECS;

        let claims = decode::<FirebaseIdTokenClaims>(token, decoding_key.as_ref(), &validation)
            .map_err(|e| FirebaseAuthError::Invalid(format!("JWT validation failed: {e}")))?
            .claims;

        if claims.sub.trim().is_empty() {
            return Err(FirebaseAuthError::Invalid("empty sub claim".to_string()));
        }

        validate_not_in_future("iat", claims.iat)?;
        validate_not_in_future("auth_time", claims.auth_time)?;

        let email = claims
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| FirebaseAuthError::Invalid("missing email claim".to_string()))?;

        let provider = AuthProvider::from_firebase(
            claims
                .firebase
                .as_ref()
                .and_then(|f| f.sign_in_provider.as_deref()),
        );

        tracing::debug!(
            user_id = %claims.sub,
            provider = ?provider,
            "Firebase ID token verified"
        );

        Ok(FirebaseIdentity {
            user_id: claims.sub,
            email,
            display_name: claims.name.filter(|n| !n.trim().is_empty()),
            provider,
        })
    }

    async fn decoding_key_for_kid(&self, kid: &str) -> Result<Arc<DecodingKey>, FirebaseAuthError> {
        if let VerifierMode::StaticKey {
            kid: static_kid,
            decoding_key,
        } = &self.mode
        {
            if kid == static_kid {
                return Ok(decoding_key.clone());
            }
            return Err(FirebaseAuthError::Invalid(format!(
                "unknown JWT kid for static verifier: {kid}"
            )));
        }

        if let Some(key) = self.lookup_cached_key(kid).await {
            return Ok(key);
        }

        // Unknown kid may mean Google rotated keys before our cache expired.
        for force_refresh in [false, true] {
            self.refresh_jwks(force_refresh).await?;
            if let Some(key) = self.lookup_cached_key(kid).await {
                return Ok(key);
            }
        }

        Err(FirebaseAuthError::Invalid(format!(
            "JWT kid not found in JWKS after refresh: {kid}"
        )))
    }

    async fn lookup_cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.jwks_cache.read().await;
        let now = Instant::now();
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.keys_by_kid.get(kid))
            .cloned()
    }

    async fn refresh_jwks(&self, force_refresh: bool) -> Result<(), FirebaseAuthError> {
        let _guard = self.refresh_lock.lock().await;

        if !force_refresh {
            let cache = self.jwks_cache.read().await;
            if cache
                .as_ref()
                .is_some_and(|entry| entry.expires_at > Instant::now())
            {
                return Ok(());
            }
        }

        tracing::debug!(jwks_uri = FIREBASE_JWKS_URL, "Refreshing Firebase JWKS cache");

        let response = self
            .http_client
            .get(FIREBASE_JWKS_URL)
            .send()
            .await
            .map_err(|e| FirebaseAuthError::Transient(format!("JWKS request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(FirebaseAuthError::Transient(format!(
                "JWKS request returned status {}",
                response.status()
            )));
        }

        let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| FirebaseAuthError::Transient(format!("invalid JWKS JSON: {e}")))?;

        let keys_by_kid = usable_keys(jwks);
        if keys_by_kid.is_empty() {
            return Err(FirebaseAuthError::Transient(
                "JWKS response did not include any usable RSA keys".to_string(),
            ));
        }

        *self.jwks_cache.write().await = Some(JwksCacheEntry {
            keys_by_kid,
            expires_at: Instant::now() + ttl,
        });

        tracing::debug!(ttl_secs = ttl.as_secs(), "Firebase JWKS cache refreshed");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
    #[serde(rename = "use")]
    use_: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirebaseClaim {
    sign_in_provider: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirebaseIdTokenClaims {
    sub: String,
    iat: Option<u64>,
    auth_time: Option<u64>,
    email: Option<String>,
    name: Option<String>,
    firebase: Option<FirebaseClaim>,
}

/// RS256 signing keys from a JWKS document, by kid.
fn usable_keys(jwks: Jwks) -> HashMap<String, Arc<DecodingKey>> {
    let mut keys_by_kid = HashMap::new();

    for jwk in jwks.keys {
        if jwk.kty != "RSA" || jwk.kid.trim().is_empty() {
            continue;
        }
        if jwk.alg.as_deref().is_some_and(|alg| alg != "RS256") {
            continue;
        }
        if jwk.use_.as_deref().is_some_and(|u| u != "sig") {
            continue;
        }

        match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
            Ok(key) => {
                keys_by_kid.insert(jwk.kid, Arc::new(key));
            }
            Err(e) => {
                tracing::warn!(error = %e, kid = %jwk.kid, "Skipping invalid RSA JWKS key");
            }
        }
    }

    keys_by_kid
}

fn validate_not_in_future(claim: &str, value: Option<u64>) -> Result<(), FirebaseAuthError> {
    let Some(value) = value else {
        return Err(FirebaseAuthError::Invalid(format!("missing {claim} claim")));
    };

    if value > now_unix_secs() + CLOCK_SKEW_SECS {
        return Err(FirebaseAuthError::Invalid(format!(
            "{claim} claim is in the future"
        )));
    }

    Ok(())
}

fn cache_ttl_from_headers(headers: &reqwest::header::HeaderMap, fallback: Duration) -> Duration {
    headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cache_control_max_age)
        .map(Duration::from_secs)
        .unwrap_or(fallback)
}

fn parse_cache_control_max_age(value: &str) -> Option<u64> {
    value.split(',').find_map(|directive| {
        directive
            .trim()
            .strip_prefix("max-age=")
            .and_then(|raw| raw.trim_matches('"').parse::<u64>().ok())
    })
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
