// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User store collaborator.
//!
//! The engine reads and writes user records only through this trait's
//! find/create/update contract; storage, schema and uniqueness enforcement
//! belong to the implementation. In particular, protection against duplicate
//! creates under concurrent first logins relies on the store's unique index
//! on email.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

/// Generic persistence failure. Deliberately coarse: callers deny the
/// request and log, they never branch on the backend detail.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Local user record, keyed by unique email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

impl UserRecord {
    /// Fresh record carrying only an email, as created on first sign-up.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            name: None,
            first_name: None,
            last_name: None,
            profile_picture_url: None,
            email_verified: None,
            last_login_at: None,
        }
    }

    /// Apply a sparse patch, overwriting only the fields it carries.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = Some(name.clone());
        }
        if let Some(first_name) = &patch.first_name {
            self.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name = Some(last_name.clone());
        }
        if let Some(url) = &patch.profile_picture_url {
            self.profile_picture_url = Some(url.clone());
        }
        if let Some(verified) = patch.email_verified {
            self.email_verified = Some(verified);
        }
        if let Some(last_login_at) = &patch.last_login_at {
            self.last_login_at = Some(last_login_at.clone());
        }
    }
}

/// Sparse profile update: only fields present on the incoming identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_picture_url: Option<String>,
    pub email_verified: Option<bool>,
    pub last_login_at: Option<String>,
}

impl UserPatch {
    /// An empty patch is never written to the store.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.profile_picture_url.is_none()
            && self.email_verified.is_none()
            && self.last_login_at.is_none()
    }
}

/// Find/create/update contract against a collection of user records.
///
/// `find_by_email` is an exact, case-sensitive match returning at most the
/// first hit; duplicate emails are a store-level invariant violation and are
/// not handled here.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(
        &self,
        collection: &str,
        email: &str,
    ) -> Result<Option<UserRecord>, StoreError>;

    async fn create(
        &self,
        collection: &str,
        email: &str,
        patch: UserPatch,
    ) -> Result<UserRecord, StoreError>;

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: UserPatch,
    ) -> Result<UserRecord, StoreError>;
}

/// In-memory user store, collections keyed by slug.
#[derive(Default)]
pub struct InMemoryUserStore {
    collections: RwLock<HashMap<String, HashMap<String, UserRecord>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pre-built record, e.g. to seed known users at startup.
    pub async fn insert(&self, collection: &str, record: UserRecord) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(record.id.clone(), record);
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(
        &self,
        collection: &str,
        email: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|records| records.values().find(|record| record.email == email))
            .cloned())
    }

    async fn create(
        &self,
        collection: &str,
        email: &str,
        patch: UserPatch,
    ) -> Result<UserRecord, StoreError> {
        let mut record = UserRecord::new(email);
        record.apply(&patch);

        let mut collections = self.collections.write().await;
        let records = collections.entry(collection.to_string()).or_default();
        if records.values().any(|existing| existing.email == email) {
            // Unique index on email.
            return Err(StoreError::Backend(format!(
                "duplicate email in collection {collection}"
            )));
        }
        records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: UserPatch,
    ) -> Result<UserRecord, StoreError> {
        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(collection)
            .and_then(|records| records.get_mut(id))
            .ok_or(StoreError::NotFound)?;
        record.apply(&patch);
        Ok(record.clone())
    }
}
