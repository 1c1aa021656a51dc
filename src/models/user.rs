//! User model for storage and API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identity provider a user signed in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Google,
    Email,
}

impl AuthProvider {
    /// Map a Firebase `sign_in_provider` claim to a provider tag.
    pub fn from_firebase(sign_in_provider: Option<&str>) -> Self {
        match sign_in_provider {
            Some("password") | Some("emailLink") => AuthProvider::Email,
            _ => AuthProvider::Google,
        }
    }
}

/// User profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// External (Firebase) user ID, also used as document ID
    pub user_id: String,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    pub auth_provider: AuthProvider,
    /// Earned badge identifiers
    #[serde(default)]
    pub badges: Vec<String>,
    /// Lifetime emission total (kg CO2). A cache over the user's daily logs,
    /// refreshed by the totals recalculator.
    #[serde(default)]
    pub total_emission_kg: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a freshly signed-in user with no badges and a zero total.
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        auth_provider: AuthProvider,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            name: name.into(),
            auth_provider,
            badges: Vec::new(),
            total_emission_kg: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Fallback display name: the local part of an email address.
pub fn default_display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
