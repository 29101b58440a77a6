// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! All configuration is constructed once at startup and shared read-only
//! across requests. Construction validates the provider contract up front:
//! a bad configuration is fatal at startup, never at request time.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `AUTH_NAMESPACE` | Namespace scoping the auth endpoints | `app` |
//! | `USERS_COLLECTION_SLUG` | Target collection in the user store | `users` |
//! | `ALLOW_SIGN_UP` | Create unknown users on first login | `false` |
//! | `USE_ADMIN` | Serve the admin-bar compat endpoint | `false` |
//! | `SUCCESS_REDIRECT_PATH` | Path after successful login | `/` |
//! | `ERROR_REDIRECT_PATH` | Path after failed login | `/auth/error` |
//! | `ALLOWED_ORIGINS` | Comma-separated CSRF origin allow-list | empty |
//! | `SSO_COOKIE_NAME` | Name of the provider's session cookie | Required |
//! | `SSO_LOGIN_URL` | Provider login URL | Required |
//! | `SSO_LOGOUT_URL` | Provider logout URL | Required |
//! | `SSO_SESSION_URL` | Remote session validation endpoint | One of |
//! | `SSO_JWT_SECRET` | Shared secret for JWT validation | One of |
//! | `SSO_JWT_ALGORITHM` | `HS256`, `HS384` or `HS512` | `HS256` |
//! | `SSO_JWT_ISSUER` | Expected `iss` claim | Optional |
//! | `SSO_JWT_AUDIENCE` | Expected `aud` claim | Optional |
//! | `SSO_TIMEOUT_MS` | Session endpoint deadline | `5000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;
use url::Url;

use crate::error::AuthFlowError;
use crate::identity::SsoIdentity;
use crate::store::UserRecord;

/// Default deadline for the remote session endpoint call.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_millis(5000);

/// Configuration validation error. The only fatal error in the taxonomy:
/// everything past startup resolves to a deny or a redirect.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SSO cookieName is required")]
    MissingCookieName,
    #[error("SSO loginUrl is required")]
    MissingLoginUrl,
    #[error("SSO logoutUrl is required")]
    MissingLogoutUrl,
    #[error("either jwt or sessionUrl is required")]
    MissingValidationMode,
    #[error("SSO jwt.secret is required when jwt verification is configured")]
    MissingJwtSecret,
    #[error("invalid {name} URL: {source}")]
    InvalidUrl {
        name: &'static str,
        source: url::ParseError,
    },
    #[error("unsupported JWT algorithm {0:?} (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),
    #[error("invalid value for {0}")]
    InvalidEnvValue(&'static str),
}

/// Symmetric JWT algorithms accepted for cookie verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JwtAlgorithm {
    #[default]
    Hs256,
    Hs384,
    Hs512,
}

impl JwtAlgorithm {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "HS256" => Ok(JwtAlgorithm::Hs256),
            "HS384" => Ok(JwtAlgorithm::Hs384),
            "HS512" => Ok(JwtAlgorithm::Hs512),
            other => Err(ConfigError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    pub fn as_algorithm(self) -> Algorithm {
        match self {
            JwtAlgorithm::Hs256 => Algorithm::HS256,
            JwtAlgorithm::Hs384 => Algorithm::HS384,
            JwtAlgorithm::Hs512 => Algorithm::HS512,
        }
    }
}

/// Shared-secret JWT verification settings.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret for the HS-family signature.
    pub secret: String,
    /// Signing algorithm, HS256 by default.
    pub algorithm: JwtAlgorithm,
    /// Expected issuer; validated exactly when present.
    pub issuer: Option<String>,
    /// Expected audience; validated exactly when present.
    pub audience: Option<String>,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: JwtAlgorithm::default(),
            issuer: None,
            audience: None,
        }
    }

    pub fn with_algorithm(mut self, algorithm: JwtAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }
}

/// How the session cookie is validated. Exactly one mode is configured; the
/// choice is a static property of the provider configuration, never a
/// per-request decision.
#[derive(Debug, Clone)]
pub enum ValidationMode {
    /// The cookie value is a JWT verified locally against a shared secret.
    Jwt(JwtConfig),
    /// The cookie value is opaque; an external endpoint is asked who the
    /// session belongs to.
    Remote { session_url: Url },
}

/// Translation from provider-specific field paths to the canonical identity
/// fields. Paths are dot-separated for nested lookup.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    pub email: String,
    /// Combined display name. No default: only extracted when mapped.
    pub name: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture_url: String,
    pub email_verified: String,
    pub last_login_at: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            email: "email".to_string(),
            name: None,
            first_name: "firstName".to_string(),
            last_name: "lastName".to_string(),
            profile_picture_url: "profilePictureUrl".to_string(),
            email_verified: "emailVerified".to_string(),
            last_login_at: "lastLoginAt".to_string(),
        }
    }
}

/// External SSO provider contract: the session cookie, the login/logout
/// redirect targets and the validation mode.
#[derive(Debug, Clone)]
pub struct SsoProviderConfig {
    pub cookie_name: String,
    pub login_url: Url,
    pub logout_url: Url,
    pub mode: ValidationMode,
    /// Deadline for the remote session endpoint call.
    pub timeout: Duration,
    pub field_mapping: FieldMapping,
}

impl SsoProviderConfig {
    /// Build and validate a provider configuration.
    pub fn new(
        cookie_name: impl Into<String>,
        login_url: &str,
        logout_url: &str,
        mode: ValidationMode,
    ) -> Result<Self, ConfigError> {
        let cookie_name = cookie_name.into();
        if cookie_name.trim().is_empty() {
            return Err(ConfigError::MissingCookieName);
        }
        if login_url.trim().is_empty() {
            return Err(ConfigError::MissingLoginUrl);
        }
        if logout_url.trim().is_empty() {
            return Err(ConfigError::MissingLogoutUrl);
        }

        let login_url = Url::parse(login_url).map_err(|source| ConfigError::InvalidUrl {
            name: "login",
            source,
        })?;
        let logout_url = Url::parse(logout_url).map_err(|source| ConfigError::InvalidUrl {
            name: "logout",
            source,
        })?;

        if let ValidationMode::Jwt(jwt) = &mode {
            if jwt.secret.trim().is_empty() {
                return Err(ConfigError::MissingJwtSecret);
            }
        }

        Ok(Self {
            cookie_name,
            login_url,
            logout_url,
            mode,
            timeout: DEFAULT_SESSION_TIMEOUT,
            field_mapping: FieldMapping::default(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_field_mapping(mut self, field_mapping: FieldMapping) -> Self {
        self.field_mapping = field_mapping;
        self
    }
}

/// Observability hook invoked after a successful login provisioning.
pub type SuccessHook = Arc<dyn Fn(&UserRecord, &SsoIdentity) + Send + Sync>;

/// Observability hook invoked when the login flow fails.
pub type ErrorHook = Arc<dyn Fn(&AuthFlowError) + Send + Sync>;

/// One auth namespace (e.g. `admin`, `app`): scopes its own endpoints, user
/// collection and sign-up policy. Constructed once at startup; one instance
/// drives many concurrent requests.
#[derive(Clone)]
pub struct AuthNamespaceConfig {
    /// Namespace, used to scope endpoint paths (`/{name}/auth/...`).
    pub name: String,
    /// Target collection in the user store.
    pub users_collection_slug: String,
    /// Whether this namespace authenticates the admin panel.
    pub use_admin: bool,
    /// Create unknown users on first login. Defaults to false.
    pub allow_sign_up: bool,
    pub success_redirect_path: String,
    pub error_redirect_path: String,
    /// CSRF allow-list: when non-empty and an `Origin` header is present,
    /// the origin must be listed.
    pub allowed_origins: Vec<String>,
    pub sso: SsoProviderConfig,
    pub on_success: Option<SuccessHook>,
    pub on_error: Option<ErrorHook>,
}

impl AuthNamespaceConfig {
    pub fn new(
        name: impl Into<String>,
        users_collection_slug: impl Into<String>,
        sso: SsoProviderConfig,
    ) -> Self {
        Self {
            name: name.into(),
            users_collection_slug: users_collection_slug.into(),
            use_admin: false,
            allow_sign_up: false,
            success_redirect_path: "/".to_string(),
            error_redirect_path: "/auth/error".to_string(),
            allowed_origins: Vec::new(),
            sso,
            on_success: None,
            on_error: None,
        }
    }

    pub fn with_use_admin(mut self, use_admin: bool) -> Self {
        self.use_admin = use_admin;
        self
    }

    pub fn with_allow_sign_up(mut self, allow_sign_up: bool) -> Self {
        self.allow_sign_up = allow_sign_up;
        self
    }

    pub fn with_success_redirect_path(mut self, path: impl Into<String>) -> Self {
        self.success_redirect_path = path.into();
        self
    }

    pub fn with_error_redirect_path(mut self, path: impl Into<String>) -> Self {
        self.error_redirect_path = path.into();
        self
    }

    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    pub fn with_on_success(mut self, hook: SuccessHook) -> Self {
        self.on_success = Some(hook);
        self
    }

    pub fn with_on_error(mut self, hook: ErrorHook) -> Self {
        self.on_error = Some(hook);
        self
    }
}

/// Load the namespace configuration from the environment.
pub fn from_env() -> Result<AuthNamespaceConfig, ConfigError> {
    let cookie_name = env::var("SSO_COOKIE_NAME").unwrap_or_default();
    let login_url = env::var("SSO_LOGIN_URL").unwrap_or_default();
    let logout_url = env::var("SSO_LOGOUT_URL").unwrap_or_default();

    let mode = match env::var("SSO_JWT_SECRET") {
        Ok(secret) => {
            let mut jwt = JwtConfig::new(secret);
            if let Ok(algorithm) = env::var("SSO_JWT_ALGORITHM") {
                jwt = jwt.with_algorithm(JwtAlgorithm::parse(&algorithm)?);
            }
            if let Ok(issuer) = env::var("SSO_JWT_ISSUER") {
                jwt = jwt.with_issuer(issuer);
            }
            if let Ok(audience) = env::var("SSO_JWT_AUDIENCE") {
                jwt = jwt.with_audience(audience);
            }
            ValidationMode::Jwt(jwt)
        }
        Err(_) => {
            let session_url = env::var("SSO_SESSION_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .ok_or(ConfigError::MissingValidationMode)?;
            let session_url =
                Url::parse(&session_url).map_err(|source| ConfigError::InvalidUrl {
                    name: "session",
                    source,
                })?;
            ValidationMode::Remote { session_url }
        }
    };

    let mut sso = SsoProviderConfig::new(cookie_name, &login_url, &logout_url, mode)?;
    if let Ok(timeout_ms) = env::var("SSO_TIMEOUT_MS") {
        let timeout_ms: u64 = timeout_ms
            .parse()
            .map_err(|_| ConfigError::InvalidEnvValue("SSO_TIMEOUT_MS"))?;
        sso = sso.with_timeout(Duration::from_millis(timeout_ms));
    }

    let namespace = env::var("AUTH_NAMESPACE").unwrap_or_else(|_| "app".to_string());
    let collection = env::var("USERS_COLLECTION_SLUG").unwrap_or_else(|_| "users".to_string());

    let allowed_origins = env::var("ALLOWED_ORIGINS")
        .map(|origins| {
            origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(AuthNamespaceConfig::new(namespace, collection, sso)
        .with_allow_sign_up(env_flag("ALLOW_SIGN_UP"))
        .with_use_admin(env_flag("USE_ADMIN"))
        .with_success_redirect_path(
            env::var("SUCCESS_REDIRECT_PATH").unwrap_or_else(|_| "/".to_string()),
        )
        .with_error_redirect_path(
            env::var("ERROR_REDIRECT_PATH").unwrap_or_else(|_| "/auth/error".to_string()),
        )
        .with_allowed_origins(allowed_origins))
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|value| value.eq_ignore_ascii_case("true") || value == "1")
        .unwrap_or(false)
}
