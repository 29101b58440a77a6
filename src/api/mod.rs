// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    identity::SsoIdentity,
    middleware,
    state::AppState,
    store::UserRecord,
};

pub mod auth;
pub mod health;

pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/{namespace}/auth/login", get(auth::login))
        .route("/{namespace}/auth/logout", get(auth::logout))
        .route("/{namespace}/auth/session", get(auth::session))
        .with_state(state.clone());

    // Admin-bar compat route: only mounted when an admin namespace exists,
    // and the only route that needs the principal middleware.
    let admin_routes = if state.admin_namespace().is_some() {
        Router::new()
            .route("/users/me", get(auth::admin_me))
            .layer(from_fn_with_state(
                state.clone(),
                middleware::attach_principal,
            ))
            .with_state(state.clone())
    } else {
        Router::new()
    };

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state);

    Router::new()
        .merge(auth_routes)
        .merge(admin_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::logout,
        auth::session,
        auth::admin_me,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            SsoIdentity,
            UserRecord,
            auth::SessionResponse,
            auth::SessionUser,
            auth::AdminMeResponse,
            health::HealthResponse,
            health::LivenessResponse
        )
    ),
    tags(
        (name = "Auth", description = "SSO login, logout and session checks"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;
