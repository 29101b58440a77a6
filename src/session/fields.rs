// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Field extraction from provider payloads.
//!
//! JWT claim sets and remote session responses are both arbitrary keyed
//! records; this module resolves the configured field paths against them and
//! coerces the results into a normalized [`SsoIdentity`]. Both validation
//! modes share this one mapping/coercion policy.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::config::FieldMapping;
use crate::identity::SsoIdentity;

/// Resolve a dot-separated path against a JSON record.
///
/// Returns `None` if any segment is missing or the current value is not an
/// object. `get_path(v, "user.email")` walks `v["user"]["email"]`.
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| current.as_object()?.get(key))
}

/// Extract a normalized identity from a raw provider record.
///
/// Yields `None` when the mapped email field is not a non-empty string; an
/// identity without an email is never produced. All other fields are
/// optional and only taken when they have the expected shape.
pub fn extract_identity(data: &Value, mapping: &FieldMapping) -> Option<SsoIdentity> {
    let email = get_path(data, &mapping.email)
        .and_then(Value::as_str)
        .filter(|email| !email.is_empty())?;

    let name = mapping
        .name
        .as_deref()
        .and_then(|path| get_string(data, path));

    Some(SsoIdentity {
        email: email.to_string(),
        name,
        first_name: get_string(data, &mapping.first_name),
        last_name: get_string(data, &mapping.last_name),
        profile_picture_url: get_string(data, &mapping.profile_picture_url),
        email_verified: get_path(data, &mapping.email_verified).and_then(coerce_bool),
        last_login_at: get_path(data, &mapping.last_login_at).and_then(coerce_timestamp),
    })
}

fn get_string(data: &Value, path: &str) -> Option<String> {
    get_path(data, path)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Coerce a boolean-ish value: native booleans pass through, strings compare
/// case-insensitively against `"true"` (anything else is `false`). Other
/// types carry no signal and map to `None`.
fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => Some(s.eq_ignore_ascii_case("true")),
        _ => None,
    }
}

/// Coerce a timestamp: non-empty strings are taken verbatim (assumed
/// ISO-8601), numbers are interpreted as epoch seconds and rendered as
/// ISO-8601 with millisecond precision.
fn coerce_timestamp(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => {
            let millis = (n.as_f64()? * 1000.0) as i64;
            let timestamp = DateTime::<Utc>::from_timestamp_millis(millis)?;
            Some(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_path_walks_nested_objects() {
        let data = json!({ "user": { "email": "test@example.com" } });
        assert_eq!(
            get_path(&data, "user.email"),
            Some(&json!("test@example.com"))
        );
    }

    #[test]
    fn get_path_absent_on_missing_segment() {
        let data = json!({ "user": { "email": "test@example.com" } });
        assert_eq!(get_path(&data, "user.name"), None);
        assert_eq!(get_path(&data, "account.email"), None);
    }

    #[test]
    fn get_path_absent_on_non_object() {
        let data = json!({ "user": "not-an-object" });
        assert_eq!(get_path(&data, "user.email"), None);
    }

    #[test]
    fn extracts_all_mapped_fields() {
        let data = json!({
            "email": "jane@example.com",
            "firstName": "Jane",
            "lastName": "Doe",
            "profilePictureUrl": "https://cdn.example.com/jane.png",
            "emailVerified": true,
            "lastLoginAt": "2026-01-01T00:00:00Z",
        });

        let identity = extract_identity(&data, &FieldMapping::default()).unwrap();
        assert_eq!(identity.email, "jane@example.com");
        assert_eq!(identity.first_name.as_deref(), Some("Jane"));
        assert_eq!(identity.last_name.as_deref(), Some("Doe"));
        assert_eq!(
            identity.profile_picture_url.as_deref(),
            Some("https://cdn.example.com/jane.png")
        );
        assert_eq!(identity.email_verified, Some(true));
        assert_eq!(identity.last_login_at.as_deref(), Some("2026-01-01T00:00:00Z"));
        // Name has no default mapping.
        assert_eq!(identity.name, None);
    }

    #[test]
    fn missing_or_empty_email_yields_no_identity() {
        let mapping = FieldMapping::default();
        assert!(extract_identity(&json!({ "firstName": "Jane" }), &mapping).is_none());
        assert!(extract_identity(&json!({ "email": "" }), &mapping).is_none());
        assert!(extract_identity(&json!({ "email": 42 }), &mapping).is_none());
    }

    #[test]
    fn custom_mapping_resolves_nested_paths() {
        let mapping = FieldMapping {
            email: "user.mail".to_string(),
            name: Some("user.displayName".to_string()),
            ..FieldMapping::default()
        };
        let data = json!({
            "user": { "mail": "jane@example.com", "displayName": "Jane Doe" }
        });

        let identity = extract_identity(&data, &mapping).unwrap();
        assert_eq!(identity.email, "jane@example.com");
        assert_eq!(identity.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn coerces_string_email_verified() {
        let mapping = FieldMapping::default();
        let verified = |v: Value| {
            extract_identity(&json!({ "email": "a@x.com", "emailVerified": v }), &mapping)
                .unwrap()
                .email_verified
        };

        assert_eq!(verified(json!("true")), Some(true));
        assert_eq!(verified(json!("TRUE")), Some(true));
        assert_eq!(verified(json!("false")), Some(false));
        assert_eq!(verified(json!("anything")), Some(false));
        assert_eq!(verified(json!(false)), Some(false));
        assert_eq!(verified(json!(1)), None);
    }

    #[test]
    fn converts_epoch_seconds_to_iso8601() {
        let mapping = FieldMapping::default();
        let data = json!({ "email": "a@x.com", "lastLoginAt": 1_700_000_000 });

        let identity = extract_identity(&data, &mapping).unwrap();
        assert_eq!(
            identity.last_login_at.as_deref(),
            Some("2023-11-14T22:13:20.000Z")
        );
    }

    #[test]
    fn keeps_string_timestamp_verbatim_and_drops_empty() {
        let mapping = FieldMapping::default();
        let data = json!({ "email": "a@x.com", "lastLoginAt": "2026-05-01T12:00:00+02:00" });
        let identity = extract_identity(&data, &mapping).unwrap();
        assert_eq!(
            identity.last_login_at.as_deref(),
            Some("2026-05-01T12:00:00+02:00")
        );

        let data = json!({ "email": "a@x.com", "lastLoginAt": "" });
        let identity = extract_identity(&data, &mapping).unwrap();
        assert_eq!(identity.last_login_at, None);
    }

    #[test]
    fn non_string_profile_fields_are_ignored() {
        let mapping = FieldMapping::default();
        let data = json!({ "email": "a@x.com", "firstName": 7, "lastName": null });
        let identity = extract_identity(&data, &mapping).unwrap();
        assert_eq!(identity.first_name, None);
        assert_eq!(identity.last_name, None);
    }
}
