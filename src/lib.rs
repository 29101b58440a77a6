// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SSO Cookie Auth - External Session Validation & User Provisioning
//!
//! This crate authenticates requests with a session cookie minted by an
//! external SSO provider, validates the session (shared-secret JWT or a
//! remote session endpoint) and provisions a matching user record in the
//! local user store.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `session` - Cookie parsing and session validation (JWT / remote)
//! - `provision` - Find-or-create user provisioning
//! - `middleware` - Per-request principal attachment
//! - `store` - User store abstraction and in-memory backing

pub mod api;
pub mod config;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod provision;
pub mod redirect;
pub mod session;
pub mod state;
pub mod store;
