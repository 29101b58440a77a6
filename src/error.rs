// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login-flow error taxonomy.
//!
//! Authentication failures are uniform "no user" outcomes to callers;
//! detailed reasons stay in internal logs. The only place a failure becomes
//! user-visible is the login redirect, which carries one of three error
//! codes in its query string.

use thiserror::Error;

use crate::provision::ProvisionError;
use crate::store::StoreError;

/// Failure on the login/session-establishment path.
///
/// The Display strings are part of the redirect contract: they surface as
/// the `message` query parameter, so they carry no backend detail.
#[derive(Debug, Error)]
pub enum AuthFlowError {
    /// The validated session lacked a usable email.
    #[error("SSO session missing email")]
    MissingEmail,
    /// The user is unknown and the namespace does not allow sign-up.
    #[error("Sign-up is not allowed")]
    SignUpDenied,
    /// The user store failed; the underlying error is logged, not shown.
    #[error("Authentication failed")]
    Store(#[source] StoreError),
}

impl AuthFlowError {
    /// Error code placed in the redirect query string.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthFlowError::MissingEmail => "invalid_session",
            AuthFlowError::SignUpDenied => "signup_disabled",
            AuthFlowError::Store(_) => "login_failed",
        }
    }
}

impl From<ProvisionError> for AuthFlowError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::SignUpDenied => AuthFlowError::SignUpDenied,
            ProvisionError::Store(err) => AuthFlowError::Store(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_match_the_redirect_contract() {
        assert_eq!(AuthFlowError::MissingEmail.error_code(), "invalid_session");
        assert_eq!(AuthFlowError::SignUpDenied.error_code(), "signup_disabled");
        assert_eq!(
            AuthFlowError::Store(StoreError::NotFound).error_code(),
            "login_failed"
        );
    }

    #[test]
    fn messages_carry_no_backend_detail() {
        let err = AuthFlowError::Store(StoreError::Backend("password in DSN".to_string()));
        assert_eq!(err.to_string(), "Authentication failed");
    }

    #[test]
    fn provision_errors_convert() {
        assert!(matches!(
            AuthFlowError::from(ProvisionError::SignUpDenied),
            AuthFlowError::SignUpDenied
        ));
        assert!(matches!(
            AuthFlowError::from(ProvisionError::Store(StoreError::NotFound)),
            AuthFlowError::Store(_)
        ));
    }
}
