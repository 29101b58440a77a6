// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # SSO Session Validation
//!
//! Takes a raw cookie value and a provider configuration and produces a
//! normalized [`SsoIdentity`](crate::identity::SsoIdentity), or nothing.
//!
//! ## Flow
//!
//! 1. `cookie` extracts the named session cookie from the request headers
//! 2. `validate` dispatches on the configured mode:
//!    - `jwt` verifies the cookie as a shared-secret JWT
//!    - `remote` asks the provider's session endpoint, under a deadline
//! 3. `fields` resolves the configured field paths against the claim set or
//!    response payload and coerces the results
//!
//! All failures along the way collapse to "no identity"; the reasons are
//! logged internally and never surfaced to the caller.

pub mod cookie;
pub mod fields;
pub mod jwt;
pub mod remote;
pub mod validate;

pub use cookie::{cookie_value, parse_cookies};
pub use validate::SessionValidator;
