// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request authentication.
//!
//! `authenticate` runs the full state machine for one namespace:
//!
//! ```text
//! cookie present? -> origin allowed? -> validate session -> provision user
//! ```
//!
//! Every non-terminal failure maps to a [`Denial`]; the variant is for
//! internal logging and tests only. Callers of the middleware observe a
//! single uniform outcome: a request either carries a [`Principal`] or it
//! does not.

use axum::{
    extract::{Request, State},
    http::{header::ORIGIN, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::config::AuthNamespaceConfig;
use crate::provision::{self, ProvisionError};
use crate::session::{cookie_value, SessionValidator};
use crate::state::AppState;
use crate::store::{UserRecord, UserStore};

/// Authenticated caller, tagged with the namespace that authenticated it so
/// multi-namespace deployments can tell which collection the user came from.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: UserRecord,
    pub namespace: String,
    pub collection: String,
}

/// Why a request was not authenticated. Never serialized to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    NoCookie,
    OriginRejected,
    InvalidSession,
    SignUpDenied,
    StoreError,
}

/// Authenticate one request against one namespace.
pub async fn authenticate(
    headers: &HeaderMap,
    namespace: &AuthNamespaceConfig,
    validator: &SessionValidator,
    store: &dyn UserStore,
) -> Result<Principal, Denial> {
    let cookie = cookie_value(headers, &namespace.sso.cookie_name).ok_or(Denial::NoCookie)?;

    if let Some(origin) = headers.get(ORIGIN).and_then(|value| value.to_str().ok()) {
        if !namespace.allowed_origins.is_empty()
            && !namespace.allowed_origins.iter().any(|allowed| allowed == origin)
        {
            tracing::debug!(namespace = %namespace.name, %origin, "origin not in allow-list");
            return Err(Denial::OriginRejected);
        }
    }

    let identity = validator
        .validate(&namespace.sso, &cookie)
        .await
        .ok_or(Denial::InvalidSession)?;

    match provision::resolve(
        &identity,
        store,
        &namespace.users_collection_slug,
        namespace.allow_sign_up,
    )
    .await
    {
        Ok(user) => Ok(Principal {
            user,
            namespace: namespace.name.clone(),
            collection: namespace.users_collection_slug.clone(),
        }),
        Err(ProvisionError::SignUpDenied) => {
            tracing::debug!(namespace = %namespace.name, "sign-up denied for unknown user");
            Err(Denial::SignUpDenied)
        }
        Err(ProvisionError::Store(err)) => {
            tracing::warn!(namespace = %namespace.name, error = %err, "user store failure during authentication");
            Err(Denial::StoreError)
        }
    }
}

/// Axum middleware attaching a [`Principal`] to the request extensions.
///
/// Tries each configured namespace in order and keeps the first success.
/// Never rejects: handlers decide what an unauthenticated request means.
pub async fn attach_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    for namespace in state.namespaces.iter() {
        match authenticate(
            request.headers(),
            namespace,
            &state.validator,
            state.store.as_ref(),
        )
        .await
        {
            Ok(principal) => {
                request.extensions_mut().insert(principal);
                break;
            }
            Err(denial) => {
                tracing::debug!(namespace = %namespace.name, ?denial, "request not authenticated");
            }
        }
    }

    next.run(request).await
}
