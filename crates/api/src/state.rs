//! Shared application state

use std::sync::Arc;

use crate::{
    auth::{AuthState, JwtManager, TokenIssuer},
    directory::{OrganizationDirectory, UserDirectory},
    email::EmailSender,
};

/// Collaborators handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserDirectory>,
    pub organizations: Arc<dyn OrganizationDirectory>,
    pub jwt: Arc<JwtManager>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub email: EmailSender,
}

impl AppState {
    /// Build state where the JWT manager also issues impersonation tokens
    pub fn new(
        users: Arc<dyn UserDirectory>,
        organizations: Arc<dyn OrganizationDirectory>,
        jwt: JwtManager,
        email: EmailSender,
    ) -> Self {
        let jwt = Arc::new(jwt);
        Self {
            users,
            organizations,
            tokens: jwt.clone(),
            jwt,
            email,
        }
    }

    /// Replace the token issuer used by the administration endpoints
    pub fn with_token_issuer(mut self, tokens: Arc<dyn TokenIssuer>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn auth_state(&self) -> AuthState {
        AuthState {
            jwt: self.jwt.clone(),
            users: self.users.clone(),
        }
    }
}
