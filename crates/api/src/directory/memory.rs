//! In-memory directories

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use glossa_shared::{
    DirectoryError, OrgId, Organization, OrganizationRole, OrganizationView, Page, PageRequest,
    SortDirection, UserAccount, UserId,
};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{DirectoryResult, OrganizationDirectory, UserDirectory};

fn matches_search(search: Option<&str>, candidates: &[&str]) -> bool {
    match search {
        None => true,
        Some(needle) => {
            let needle = needle.to_lowercase();
            candidates
                .iter()
                .any(|candidate| candidate.to_lowercase().contains(&needle))
        }
    }
}

/// Text ordering used by every directory: case-insensitive, ties left to the caller
fn cmp_case_insensitive(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Slice one page out of already filtered items. `cmp` orders by the sort
/// field in the requested direction; ties always fall back to ascending id.
fn paginate<T: Clone>(
    mut items: Vec<T>,
    request: &PageRequest,
    cmp: impl Fn(&T, &T) -> Ordering,
    id: impl Fn(&T) -> i64,
) -> Page<T> {
    items.sort_by(|a, b| {
        let primary = match request.sort.direction() {
            SortDirection::Asc => cmp(a, b),
            SortDirection::Desc => cmp(b, a),
        };
        primary.then_with(|| id(a).cmp(&id(b)))
    });

    let total = items.len() as u64;
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);
    let page_items = items.into_iter().skip(offset).take(limit).collect();

    Page::new(page_items, request, total)
}

/// User directory held in process memory
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<BTreeMap<UserId, UserAccount>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = UserAccount>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }

    pub async fn insert(&self, user: UserAccount) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_all_paged(&self, request: &PageRequest) -> DirectoryResult<Page<UserAccount>> {
        let users = self.users.read().await;
        let filtered: Vec<UserAccount> = users
            .values()
            .filter(|u| matches_search(request.search.as_deref(), &[&u.name, &u.username]))
            .cloned()
            .collect();

        let field = request.sort.field();
        Ok(paginate(
            filtered,
            request,
            |a, b| match field {
                "name" => cmp_case_insensitive(&a.name, &b.name),
                "username" => cmp_case_insensitive(&a.username, &b.username),
                _ => a.id.cmp(&b.id),
            },
            |u| u.id.0,
        ))
    }

    async fn get(&self, id: UserId) -> DirectoryResult<UserAccount> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DirectoryError::user_not_found(id))
    }

    async fn save(&self, user: &UserAccount) -> DirectoryResult<UserAccount> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| DirectoryError::user_not_found(user.id))?;

        stored.username = user.username.clone();
        stored.name = user.name.clone();
        stored.role = user.role;
        stored.disabled_at = user.disabled_at;
        Ok(stored.clone())
    }

    async fn delete(&self, id: UserId) -> DirectoryResult<()> {
        self.users
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DirectoryError::user_not_found(id))
    }

    async fn disable(&self, id: UserId) -> DirectoryResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| DirectoryError::user_not_found(id))?;
        user.disabled_at.get_or_insert_with(OffsetDateTime::now_utc);
        Ok(())
    }

    async fn enable(&self, id: UserId) -> DirectoryResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| DirectoryError::user_not_found(id))?;
        user.disabled_at = None;
        Ok(())
    }
}

/// Organization directory held in process memory
#[derive(Default)]
pub struct InMemoryOrganizationDirectory {
    organizations: RwLock<BTreeMap<OrgId, Organization>>,
    memberships: RwLock<HashMap<(OrgId, UserId), OrganizationRole>>,
}

impl InMemoryOrganizationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, organization: Organization) {
        self.organizations
            .write()
            .await
            .insert(organization.id, organization);
    }

    pub async fn add_member(&self, org_id: OrgId, user_id: UserId, role: OrganizationRole) {
        self.memberships
            .write()
            .await
            .insert((org_id, user_id), role);
    }
}

#[async_trait]
impl OrganizationDirectory for InMemoryOrganizationDirectory {
    async fn find_all_paged(
        &self,
        request: &PageRequest,
        viewer: UserId,
    ) -> DirectoryResult<Page<OrganizationView>> {
        let organizations = self.organizations.read().await;
        let memberships = self.memberships.read().await;

        let filtered: Vec<OrganizationView> = organizations
            .values()
            .filter(|o| matches_search(request.search.as_deref(), &[&o.name, &o.slug]))
            .map(|o| OrganizationView {
                organization: o.clone(),
                current_user_role: memberships.get(&(o.id, viewer)).copied(),
            })
            .collect();

        let field = request.sort.field();
        Ok(paginate(
            filtered,
            request,
            |a, b| {
                let (a, b) = (&a.organization, &b.organization);
                match field {
                    "name" => cmp_case_insensitive(&a.name, &b.name),
                    "slug" => cmp_case_insensitive(&a.slug, &b.slug),
                    _ => a.id.cmp(&b.id),
                }
            },
            |o| o.organization.id.0,
        ))
    }
}
