// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User provisioning.
//!
//! Reconciles a validated identity against the local user store exactly once
//! per request: find by email, sync the profile with a sparse update, or
//! create the record when sign-up is allowed. At most one write is issued
//! per call.

use thiserror::Error;

use crate::identity::SsoIdentity;
use crate::store::{StoreError, UserPatch, UserRecord, UserStore};

/// Provisioning failure. `SignUpDenied` is a policy decision visible to the
/// caller, never a silent drop; store failures propagate without retry.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Sign-up is not allowed")]
    SignUpDenied,
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),
}

/// Find-or-create-or-update the user record for a validated identity.
///
/// - Existing user: apply a sparse update of the profile fields present on
///   the identity, skipping the write entirely when nothing changed.
/// - Unknown user: create it when `allow_sign_up` is set, otherwise fail
///   with [`ProvisionError::SignUpDenied`] and issue zero writes.
///
/// Concurrent first logins for the same email can race to create; the
/// store's unique index on email is the arbiter (see [`UserStore`]).
pub async fn resolve(
    identity: &SsoIdentity,
    store: &dyn UserStore,
    collection: &str,
    allow_sign_up: bool,
) -> Result<UserRecord, ProvisionError> {
    let patch = patch_from_identity(identity);

    match store.find_by_email(collection, &identity.email).await? {
        Some(existing) => {
            if patch.is_empty() {
                return Ok(existing);
            }
            Ok(store.update(collection, &existing.id, patch).await?)
        }
        None => {
            if !allow_sign_up {
                return Err(ProvisionError::SignUpDenied);
            }
            Ok(store.create(collection, &identity.email, patch).await?)
        }
    }
}

/// Sparse patch carrying only the profile fields present on the identity.
fn patch_from_identity(identity: &SsoIdentity) -> UserPatch {
    UserPatch {
        name: identity.name.clone(),
        first_name: identity.first_name.clone(),
        last_name: identity.last_name.clone(),
        profile_picture_url: identity.profile_picture_url.clone(),
        email_verified: identity.email_verified,
        last_login_at: identity.last_login_at.clone(),
    }
}
