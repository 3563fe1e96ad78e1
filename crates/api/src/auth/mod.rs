//! Authentication module for Glossa

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, JwtError, JwtManager, TokenIssuer};
pub use middleware::{require_auth, require_super_admin, AuthState, AuthUser};
