// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cookie header parsing.
//!
//! The SSO cookie is opaque to this service: either a signed JWT or a token
//! meaningful only to the remote session endpoint. Parsing never fails; a
//! missing or malformed header simply yields an empty map.

use std::collections::HashMap;

use axum::http::{header::COOKIE, HeaderMap};

/// Parse a raw `cookie` header value into name/value pairs.
///
/// Pairs are split on `;`, trimmed, and split on the *first* `=`; any
/// further `=` characters are preserved verbatim in the value.
pub fn parse_cookies(raw: &str) -> HashMap<String, String> {
    let mut cookies = HashMap::new();

    for part in raw.split(';') {
        let part = part.trim();
        let (name, value) = match part.split_once('=') {
            Some((name, value)) => (name, value),
            None => (part, ""),
        };
        if !name.is_empty() {
            cookies.insert(name.to_string(), value.to_string());
        }
    }

    cookies
}

/// Extract a single named cookie from request headers.
///
/// Returns `None` when the `cookie` header is absent, not valid UTF-8, or
/// does not carry the named cookie.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(COOKIE)?.to_str().ok()?;
    parse_cookies(raw).remove(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_pairs() {
        let cookies = parse_cookies("session=abc; theme=dark");
        assert_eq!(cookies.get("session").map(String::as_str), Some("abc"));
        assert_eq!(cookies.get("theme").map(String::as_str), Some("dark"));
    }

    #[test]
    fn preserves_equals_in_value() {
        let cookies = parse_cookies("a=1; b=x=y");
        assert_eq!(cookies.get("a").map(String::as_str), Some("1"));
        assert_eq!(cookies.get("b").map(String::as_str), Some("x=y"));
    }

    #[test]
    fn round_trips_through_join_and_reparse() {
        let cookies = parse_cookies("a=1; b=x=y; c=");
        let joined = {
            let mut pairs: Vec<String> = cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            pairs.sort();
            pairs.join("; ")
        };
        assert_eq!(parse_cookies(&joined), cookies);
    }

    #[test]
    fn empty_header_yields_empty_map() {
        assert!(parse_cookies("").is_empty());
        assert!(parse_cookies("   ;  ; ").is_empty());
    }

    #[test]
    fn value_less_cookie_maps_to_empty_string() {
        let cookies = parse_cookies("flag");
        assert_eq!(cookies.get("flag").map(String::as_str), Some(""));
    }

    #[test]
    fn cookie_value_reads_named_cookie_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "sso_session=tok123; other=x".parse().unwrap());

        assert_eq!(
            cookie_value(&headers, "sso_session"),
            Some("tok123".to_string())
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn cookie_value_without_header_is_none() {
        let headers = HeaderMap::new();
        assert_eq!(cookie_value(&headers, "sso_session"), None);
    }
}
