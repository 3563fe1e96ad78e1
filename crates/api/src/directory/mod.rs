//! User and organization directories
//!
//! Handlers talk to persisted records only through these traits. The
//! Postgres adapters back the running server; the in-memory adapters back
//! tests and local experiments.

mod memory;
mod postgres;

use async_trait::async_trait;
use glossa_shared::{DirectoryError, OrganizationView, Page, PageRequest, UserAccount, UserId};

pub use memory::{InMemoryOrganizationDirectory, InMemoryUserDirectory};
pub use postgres::{PgOrganizationDirectory, PgUserDirectory};

/// Fields a user listing may be sorted by
pub const USER_SORT_FIELDS: &[&str] = &["id", "name", "username"];
/// Fields an organization listing may be sorted by
pub const ORGANIZATION_SORT_FIELDS: &[&str] = &["id", "name", "slug"];

pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Page through all users, disabled ones included. `search` matches
    /// name or username, case-insensitively.
    async fn find_all_paged(&self, request: &PageRequest) -> DirectoryResult<Page<UserAccount>>;

    async fn get(&self, id: UserId) -> DirectoryResult<UserAccount>;

    /// Persist the mutable fields of `user` and return the stored record
    async fn save(&self, user: &UserAccount) -> DirectoryResult<UserAccount>;

    async fn delete(&self, id: UserId) -> DirectoryResult<()>;

    /// Mark the user disabled. Already disabled users keep their original
    /// timestamp.
    async fn disable(&self, id: UserId) -> DirectoryResult<()>;

    async fn enable(&self, id: UserId) -> DirectoryResult<()>;

    /// Connectivity check for readiness probes
    async fn ping(&self) -> DirectoryResult<()> {
        Ok(())
    }
}

#[async_trait]
pub trait OrganizationDirectory: Send + Sync {
    /// Page through all organizations. Each row carries the role `viewer`
    /// holds in it, if any.
    async fn find_all_paged(
        &self,
        request: &PageRequest,
        viewer: UserId,
    ) -> DirectoryResult<Page<OrganizationView>>;
}

/// Build an ILIKE pattern matching `search` anywhere, with wildcards escaped
pub(crate) fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
