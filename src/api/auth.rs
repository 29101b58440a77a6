// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication endpoints, scoped per namespace.

use axum::{
    extract::{Path, State},
    http::{header::LOCATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AuthFlowError;
use crate::middleware::Principal;
use crate::provision::{self, ProvisionError};
use crate::redirect;
use crate::session::{cookie_value, fields};
use crate::state::AppState;
use crate::store::UserRecord;

/// Response for `GET /{namespace}/auth/session`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

/// User payload in session responses, tagged with its collection so
/// multi-namespace clients can tell which collection authenticated them.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionUser {
    #[serde(flatten)]
    pub record: UserRecord,
    pub collection: String,
}

/// Response for the admin-bar compat endpoint `GET /users/me`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminMeResponse {
    pub user: Option<UserRecord>,
    pub collection: String,
    pub token: Option<String>,
    pub exp: Option<i64>,
}

#[derive(Serialize)]
struct SessionErrorBody {
    error: String,
}

/// Resolve the app's externally visible base URL from forwarding headers.
fn base_url(headers: &HeaderMap) -> String {
    let protocol = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("http");

    match headers.get("host").and_then(|value| value.to_str().ok()) {
        Some(host) => format!("{protocol}://{host}"),
        None => "http://127.0.0.1:3000".to_string(),
    }
}

/// 302 redirect; axum's `Redirect` only offers 303/307/308.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

fn unauthenticated() -> Response {
    Json(SessionResponse {
        authenticated: false,
        user: None,
    })
    .into_response()
}

/// Establish a session via the external SSO provider.
///
/// Without a valid SSO cookie the browser is bounced to the provider login
/// with a `returnUrl` pointing back here, closing the loop once the
/// provider has set its cookie. With a valid session the user is
/// provisioned and sent to the success path; failures redirect to the error
/// path with a coarse error code.
#[utoipa::path(
    get,
    path = "/{namespace}/auth/login",
    tag = "Auth",
    params(("namespace" = String, Path, description = "Auth namespace")),
    responses(
        (status = 302, description = "Redirect to provider login, success path or error path"),
        (status = 404, description = "Unknown namespace"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(ns) = state.namespace(&namespace) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let base = base_url(&headers);
    let login_return_url = format!("{base}/{}/auth/login", ns.name);

    let Some(cookie) = cookie_value(&headers, &ns.sso.cookie_name) else {
        return found(redirect::login_redirect(&ns.sso.login_url, &login_return_url).as_str());
    };

    let Some(record) = state.validator.validate_record(&ns.sso, &cookie).await else {
        // Invalid or expired session: send the browser back through the
        // provider rather than to the error page.
        return found(redirect::login_redirect(&ns.sso.login_url, &login_return_url).as_str());
    };

    // A validated session without a usable email is an error, not a retry.
    let Some(identity) = fields::extract_identity(&record, &ns.sso.field_mapping) else {
        let err = AuthFlowError::MissingEmail;
        if let Some(hook) = &ns.on_error {
            hook(&err);
        }
        tracing::debug!(namespace = %ns.name, code = err.error_code(), "login failed");
        return found(&redirect::error_redirect(
            &base,
            &ns.error_redirect_path,
            &err,
            &format!("/{}/auth/login", ns.name),
        ));
    };

    match provision::resolve(
        &identity,
        state.store.as_ref(),
        &ns.users_collection_slug,
        ns.allow_sign_up,
    )
    .await
    {
        Ok(user) => {
            if let Some(hook) = &ns.on_success {
                hook(&user, &identity);
            }
            tracing::info!(namespace = %ns.name, user = %user.id, "login succeeded");
            found(&format!("{base}{}", ns.success_redirect_path))
        }
        Err(err) => {
            let err = AuthFlowError::from(err);
            if let Some(hook) = &ns.on_error {
                hook(&err);
            }
            tracing::debug!(namespace = %ns.name, code = err.error_code(), "login failed");
            found(&redirect::error_redirect(
                &base,
                &ns.error_redirect_path,
                &err,
                &format!("/{}/auth/login", ns.name),
            ))
        }
    }
}

/// Sign out via the external SSO provider.
///
/// Redirects to the provider logout with a `returnUrl` back into the app:
/// the admin login page for admin namespaces, the root otherwise.
#[utoipa::path(
    get,
    path = "/{namespace}/auth/logout",
    tag = "Auth",
    params(("namespace" = String, Path, description = "Auth namespace")),
    responses(
        (status = 302, description = "Redirect to provider logout"),
        (status = 404, description = "Unknown namespace"),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(ns) = state.namespace(&namespace) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let base = base_url(&headers);
    let return_url = if ns.use_admin {
        format!("{base}/admin/login")
    } else {
        format!("{base}/")
    };

    found(redirect::logout_redirect(&ns.sso.logout_url, &return_url).as_str())
}

/// Check the current session against this namespace's collection.
///
/// Always answers `{authenticated: false}` on any denial; never creates a
/// user (sign-up only happens on the login endpoint), but syncs the profile
/// of an existing user so field mappings apply even when another namespace
/// authenticated the request first.
#[utoipa::path(
    get,
    path = "/{namespace}/auth/session",
    tag = "Auth",
    params(("namespace" = String, Path, description = "Auth namespace")),
    responses(
        (status = 200, description = "Session status", body = SessionResponse),
        (status = 404, description = "Unknown namespace"),
        (status = 500, description = "Internal failure while checking the session"),
    )
)]
pub async fn session(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(ns) = state.namespace(&namespace) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let Some(cookie) = cookie_value(&headers, &ns.sso.cookie_name) else {
        return unauthenticated();
    };

    let Some(identity) = state.validator.validate(&ns.sso, &cookie).await else {
        return unauthenticated();
    };

    // Sign-up disabled here regardless of namespace policy: an unknown user
    // is simply not authenticated against this collection.
    match provision::resolve(&identity, state.store.as_ref(), &ns.users_collection_slug, false)
        .await
    {
        Ok(user) => Json(SessionResponse {
            authenticated: true,
            user: Some(SessionUser {
                record: user,
                collection: ns.users_collection_slug.clone(),
            }),
        })
        .into_response(),
        Err(ProvisionError::SignUpDenied) => unauthenticated(),
        Err(ProvisionError::Store(err)) => {
            tracing::error!(namespace = %ns.name, error = %err, "session check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SessionErrorBody {
                    error: "Failed to check session".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Admin-bar compat endpoint.
///
/// The admin UI calls `/users/me` unconditionally on every page load; this
/// answers with the admin namespace's user when the request authenticated
/// against it, and a null user otherwise.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Auth",
    responses((status = 200, description = "Current admin user, if any", body = AdminMeResponse))
)]
pub async fn admin_me(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
) -> Response {
    let Some(ns) = state.admin_namespace() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let user = principal
        .map(|Extension(principal)| principal)
        .filter(|principal| principal.collection == ns.users_collection_slug)
        .map(|principal| principal.user);

    Json(AdminMeResponse {
        user,
        collection: ns.users_collection_slug.clone(),
        token: None,
        exp: None,
    })
    .into_response()
}
