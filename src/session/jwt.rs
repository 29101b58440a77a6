// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared-secret JWT verification for the SSO cookie.
//!
//! Every failure kind (bad signature, expiry, wrong issuer/audience, garbage
//! token) collapses to `None`: callers never learn why a token was rejected,
//! so error content cannot be used as an oracle.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde_json::Value;

use crate::config::{FieldMapping, JwtConfig};
use crate::identity::SsoIdentity;
use crate::session::fields::extract_identity;

/// Verify the cookie value as a JWT and return its claim set.
///
/// The signature is checked against the configured symmetric secret and
/// algorithm; `iss`/`aud` must match exactly when configured.
pub fn verify_claims(token: &str, jwt: &JwtConfig) -> Option<Value> {
    let key = DecodingKey::from_secret(jwt.secret.as_bytes());

    let mut validation = Validation::new(jwt.algorithm.as_algorithm());
    // `exp` is validated when present but not required, matching the
    // provider contract (some providers issue non-expiring session JWTs).
    validation.required_spec_claims.clear();
    if let Some(issuer) = &jwt.issuer {
        validation.set_issuer(&[issuer]);
    }
    if let Some(audience) = &jwt.audience {
        validation.set_audience(&[audience]);
    } else {
        validation.validate_aud = false;
    }

    match decode::<Value>(token, &key, &validation) {
        Ok(data) => Some(data.claims),
        Err(err) => {
            tracing::debug!(error = %err, "JWT verification failed");
            None
        }
    }
}

/// Verify the cookie value and extract the identity it asserts.
///
/// The claim set runs through the shared field-mapping pipeline, so a token
/// whose mapped email is missing or empty is just as invalid as a forged one.
pub fn verify(token: &str, jwt: &JwtConfig, mapping: &FieldMapping) -> Option<SsoIdentity> {
    verify_claims(token, jwt).and_then(|claims| extract_identity(&claims, mapping))
}
