// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::config::AuthNamespaceConfig;
use crate::session::SessionValidator;
use crate::store::UserStore;

/// Shared application state: immutable namespace configs, the user store
/// collaborator and the session validator. Built once at startup; holds no
/// cross-request mutable state of its own.
#[derive(Clone)]
pub struct AppState {
    pub namespaces: Arc<Vec<AuthNamespaceConfig>>,
    pub store: Arc<dyn UserStore>,
    pub validator: Arc<SessionValidator>,
}

impl AppState {
    pub fn new(namespaces: Vec<AuthNamespaceConfig>, store: Arc<dyn UserStore>) -> Self {
        Self {
            namespaces: Arc::new(namespaces),
            store,
            validator: Arc::new(SessionValidator::new()),
        }
    }

    /// Look up a namespace by name.
    pub fn namespace(&self, name: &str) -> Option<&AuthNamespaceConfig> {
        self.namespaces.iter().find(|ns| ns.name == name)
    }

    /// The namespace driving admin panel authentication, if any.
    pub fn admin_namespace(&self) -> Option<&AuthNamespaceConfig> {
        self.namespaces.iter().find(|ns| ns.use_admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JwtConfig, SsoProviderConfig, ValidationMode};
    use crate::store::InMemoryUserStore;

    fn sso() -> SsoProviderConfig {
        SsoProviderConfig::new(
            "sso_session",
            "https://sso.example.com/login",
            "https://sso.example.com/logout",
            ValidationMode::Jwt(JwtConfig::new("secret")),
        )
        .unwrap()
    }

    #[test]
    fn namespace_lookup_by_name() {
        let state = AppState::new(
            vec![
                AuthNamespaceConfig::new("admin", "admin-users", sso()).with_use_admin(true),
                AuthNamespaceConfig::new("app", "users", sso()),
            ],
            Arc::new(InMemoryUserStore::new()),
        );

        assert_eq!(state.namespace("app").unwrap().users_collection_slug, "users");
        assert!(state.namespace("missing").is_none());
        assert_eq!(state.admin_namespace().unwrap().name, "admin");
    }
}
