// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote session validation.
//!
//! For providers that issue an opaque cookie, the configured session
//! endpoint is asked who the session belongs to. Fetch failures are not
//! distinguished from "provider said no": a timeout, network error, non-2xx
//! status or unparsable body all deny the request.

use axum::http::header;
use serde_json::Value;
use url::Url;

use crate::config::SsoProviderConfig;
use crate::identity::SsoIdentity;
use crate::session::fields::extract_identity;

/// Fetches session data from the provider's session endpoint.
///
/// Holds a shared HTTP connection pool; the per-call deadline comes from the
/// provider configuration. Cancelling the request future (e.g. on client
/// disconnect) aborts the pending call.
#[derive(Clone, Default)]
pub struct RemoteSessionFetcher {
    client: reqwest::Client,
}

impl RemoteSessionFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// GET the session endpoint with the SSO cookie attached and return the
    /// raw session record.
    ///
    /// The response envelope is unwrapped in order: a `user` object field if
    /// present, otherwise the body itself.
    pub async fn fetch_record(
        &self,
        config: &SsoProviderConfig,
        session_url: &Url,
        cookie_value: &str,
    ) -> Option<Value> {
        let response = self
            .client
            .get(session_url.clone())
            .header(
                header::COOKIE,
                format!("{}={}", config.cookie_name, cookie_value),
            )
            .header(header::ACCEPT, "application/json")
            .timeout(config.timeout)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(error = %err, "session endpoint request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "session endpoint rejected the cookie");
            return None;
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!(error = %err, "session endpoint returned a non-JSON body");
                return None;
            }
        };

        match body.get("user") {
            Some(user) if user.is_object() => Some(user.clone()),
            _ => Some(body),
        }
    }

    /// Fetch the session record and extract the identity it asserts.
    pub async fn fetch(
        &self,
        config: &SsoProviderConfig,
        session_url: &Url,
        cookie_value: &str,
    ) -> Option<SsoIdentity> {
        let record = self.fetch_record(config, session_url, cookie_value).await?;
        extract_identity(&record, &config.field_mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JwtConfig, ValidationMode};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn remote_config(session_url: &str) -> (SsoProviderConfig, Url) {
        let url = Url::parse(session_url).unwrap();
        let config = SsoProviderConfig::new(
            "sso_session",
            "https://sso.example.com/login",
            "https://sso.example.com/logout",
            ValidationMode::Remote {
                session_url: url.clone(),
            },
        )
        .unwrap();
        (config, url)
    }

    #[tokio::test]
    async fn unwraps_bare_identity_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/session"))
            .and(header("cookie", "sso_session=tok"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "email": "jane@example.com",
                "firstName": "Jane",
            })))
            .mount(&server)
            .await;

        let (config, url) = remote_config(&format!("{}/session", server.uri()));
        let identity = RemoteSessionFetcher::new()
            .fetch(&config, &url, "tok")
            .await
            .unwrap();
        assert_eq!(identity.email, "jane@example.com");
        assert_eq!(identity.first_name.as_deref(), Some("Jane"));
    }

    #[tokio::test]
    async fn unwraps_user_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "authenticated": true,
                "user": { "email": "jane@example.com" },
            })))
            .mount(&server)
            .await;

        let (config, url) = remote_config(&format!("{}/session", server.uri()));
        let identity = RemoteSessionFetcher::new()
            .fetch(&config, &url, "tok")
            .await
            .unwrap();
        assert_eq!(identity.email, "jane@example.com");
    }

    #[tokio::test]
    async fn non_object_user_field_falls_back_to_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": "not-an-object",
                "email": "jane@example.com",
            })))
            .mount(&server)
            .await;

        let (config, url) = remote_config(&format!("{}/session", server.uri()));
        let identity = RemoteSessionFetcher::new()
            .fetch(&config, &url, "tok")
            .await
            .unwrap();
        assert_eq!(identity.email, "jane@example.com");
    }

    #[tokio::test]
    async fn non_2xx_yields_no_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let (config, url) = remote_config(&format!("{}/session", server.uri()));
        assert!(RemoteSessionFetcher::new()
            .fetch(&config, &url, "tok")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn non_json_body_yields_no_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let (config, url) = remote_config(&format!("{}/session", server.uri()));
        assert!(RemoteSessionFetcher::new()
            .fetch(&config, &url, "tok")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn slow_endpoint_hits_deadline_and_yields_no_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "email": "jane@example.com" }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let (config, url) = remote_config(&format!("{}/session", server.uri()));
        let config = config.with_timeout(Duration::from_millis(50));

        let started = std::time::Instant::now();
        assert!(RemoteSessionFetcher::new()
            .fetch(&config, &url, "tok")
            .await
            .is_none());
        // The pending call is aborted at the deadline, not awaited to completion.
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn unreachable_endpoint_yields_no_identity() {
        let (config, url) = remote_config("http://127.0.0.1:1/session");
        let config = config.with_timeout(Duration::from_millis(200));
        assert!(RemoteSessionFetcher::new()
            .fetch(&config, &url, "tok")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn missing_email_in_payload_yields_no_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": { "firstName": "Jane" },
            })))
            .mount(&server)
            .await;

        let (config, url) = remote_config(&format!("{}/session", server.uri()));
        assert!(RemoteSessionFetcher::new()
            .fetch(&config, &url, "tok")
            .await
            .is_none());
    }
}
