// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login/logout redirect construction.
//!
//! Pure string transforms over the provider URLs validated at startup. The
//! provider contract is a single `returnUrl` query parameter telling it
//! where to send the browser afterwards.

use url::Url;

use crate::error::AuthFlowError;

/// Append or replace the `returnUrl` query parameter on a provider URL.
///
/// Idempotent: applying the same return URL twice yields the same result.
pub fn with_return_url(target: &Url, return_url: &str) -> Url {
    let mut url = target.clone();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "returnUrl")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        pairs.extend_pairs(kept);
        pairs.append_pair("returnUrl", return_url);
    }

    url
}

/// Build the provider login redirect with return-URL propagation.
pub fn login_redirect(login_url: &Url, return_url: &str) -> Url {
    with_return_url(login_url, return_url)
}

/// Build the provider logout redirect, symmetric to login but targeting the
/// app's own post-logout path.
pub fn logout_redirect(logout_url: &Url, return_url: &str) -> Url {
    with_return_url(logout_url, return_url)
}

/// Build the app-side error redirect for a failed login:
/// `{base}{error_path}?error={code}&message={...}&returnUrl={...}`.
///
/// Falls back to the bare error path if the request's base URL does not
/// parse; the caller still gets a redirect, never an error page with detail.
pub fn error_redirect(
    base_url: &str,
    error_path: &str,
    err: &AuthFlowError,
    return_url: &str,
) -> String {
    let target = format!("{base_url}{error_path}");
    match Url::parse(&target) {
        Ok(mut url) => {
            url.query_pairs_mut()
                .append_pair("error", err.error_code())
                .append_pair("message", &err.to_string())
                .append_pair("returnUrl", return_url);
            url.to_string()
        }
        Err(_) => target,
    }
}
