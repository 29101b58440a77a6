// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Normalized identity record produced by validating an SSO session.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity asserted by the external SSO provider.
///
/// Produced per validation by the session validator; `email` is the only
/// field participants key on and is guaranteed non-empty by construction
/// (extraction yields no identity at all when the email is missing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SsoIdentity {
    /// Email address, unique key into the local user store.
    pub email: String,

    /// Combined display name (e.g. "Jane Doe"), only extracted when the
    /// provider maps a dedicated name field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,

    /// Whether the provider reports the email as verified.
    /// String payloads "true"/"false" are coerced case-insensitively.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,

    /// Last login timestamp as an ISO-8601 string. Numeric epoch-seconds
    /// payloads are converted during extraction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

impl SsoIdentity {
    /// Bare identity carrying only an email.
    pub fn from_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
            first_name: None,
            last_name: None,
            profile_picture_url: None,
            email_verified: None,
            last_login_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_email_has_no_profile_fields() {
        let identity = SsoIdentity::from_email("a@x.com");
        assert_eq!(identity.email, "a@x.com");
        assert!(identity.name.is_none());
        assert!(identity.first_name.is_none());
        assert!(identity.last_name.is_none());
        assert!(identity.profile_picture_url.is_none());
        assert!(identity.email_verified.is_none());
        assert!(identity.last_login_at.is_none());
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let identity = SsoIdentity::from_email("a@x.com");
        let json = serde_json::to_string(&identity).unwrap();
        assert_eq!(json, r#"{"email":"a@x.com"}"#);
    }
}
