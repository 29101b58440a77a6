// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session validation dispatch.

use serde_json::Value;

use crate::config::{SsoProviderConfig, ValidationMode};
use crate::identity::SsoIdentity;
use crate::session::fields::extract_identity;
use crate::session::{jwt, remote::RemoteSessionFetcher};

/// Validates the SSO cookie against the configured provider.
///
/// Pure dispatch on the validation mode: a JWT-configured provider never
/// touches the network, a remote-configured provider never verifies
/// signatures. Exactly one path runs per call.
#[derive(Clone, Default)]
pub struct SessionValidator {
    fetcher: RemoteSessionFetcher,
}

impl SessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a cookie value, yielding the raw session record or nothing.
    ///
    /// Callers that need to tell "no session" apart from "session without a
    /// usable identity" use this and run field extraction themselves.
    pub async fn validate_record(
        &self,
        config: &SsoProviderConfig,
        cookie_value: &str,
    ) -> Option<Value> {
        match &config.mode {
            ValidationMode::Jwt(jwt) => jwt::verify_claims(cookie_value, jwt),
            ValidationMode::Remote { session_url } => {
                self.fetcher
                    .fetch_record(config, session_url, cookie_value)
                    .await
            }
        }
    }

    /// Validate a cookie value, yielding the asserted identity or nothing.
    pub async fn validate(
        &self,
        config: &SsoProviderConfig,
        cookie_value: &str,
    ) -> Option<SsoIdentity> {
        let record = self.validate_record(config, cookie_value).await?;
        extract_identity(&record, &config.field_mapping)
    }
}
