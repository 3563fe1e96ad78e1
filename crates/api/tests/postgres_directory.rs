//! Postgres directory tests
//!
//! These need a live database: `DATABASE_URL=... cargo test -- --ignored`.
//! Every test seeds rows under its own random tag and scopes its queries
//! with that tag, so runs do not interfere with each other.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use glossa_api::directory::{
    OrganizationDirectory, PgOrganizationDirectory, PgUserDirectory, UserDirectory,
};
use glossa_shared::{
    create_pool, run_migrations, DirectoryError, OrganizationRole, PageRequest, Role, Sort,
    UserId,
};
use sqlx::PgPool;

// ============================================================================
// Test Utilities
// ============================================================================

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = create_pool(&url, 2).await.expect("Failed to create pool");
    run_migrations(&pool).await.expect("Failed to run migrations");
    pool
}

fn tag() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..12].to_string()
}

async fn seed_user(pool: &PgPool, tag: &str, n: usize, name: &str, role: Role) -> UserId {
    sqlx::query_scalar(
        "INSERT INTO user_account (username, name, role) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(format!("{tag}-{n}@example.com"))
    .bind(format!("{tag} {name}"))
    .bind(role)
    .fetch_one(pool)
    .await
    .expect("Failed to seed user")
}

async fn seed_organization(pool: &PgPool, tag: &str, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO organization (name, slug) VALUES ($1, $2) RETURNING id")
        .bind(format!("{tag} {name}"))
        .bind(format!("{tag}-{}", name.to_lowercase().replace(' ', "-")))
        .fetch_one(pool)
        .await
        .expect("Failed to seed organization")
}

async fn cleanup(pool: &PgPool, tag: &str) {
    let pattern = format!("{tag}%");
    sqlx::query("DELETE FROM organization WHERE slug LIKE $1")
        .bind(&pattern)
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("DELETE FROM user_account WHERE username LIKE $1")
        .bind(&pattern)
        .execute(pool)
        .await
        .unwrap();
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
#[ignore] // Requires database
async fn test_users_search_and_sort_with_id_tie_break() {
    let pool = pool().await;
    let dir = PgUserDirectory::new(pool.clone());
    let tag = tag();

    let charlie = seed_user(&pool, &tag, 1, "Charlie", Role::User).await;
    let bob_lower = seed_user(&pool, &tag, 2, "bob", Role::User).await;
    let alice = seed_user(&pool, &tag, 3, "alice", Role::Admin).await;
    let bob_upper = seed_user(&pool, &tag, 4, "Bob", Role::User).await;

    let request = PageRequest::new(0, 10, Sort::asc("name")).with_search(tag.clone());
    let page = dir.find_all_paged(&request).await.unwrap();
    let ids: Vec<UserId> = page.items.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![alice, bob_lower, bob_upper, charlie]);
    assert_eq!(page.page.total_elements, 4);

    let sort = Sort::parse("name,desc", &["name"]).unwrap();
    let request = PageRequest::new(0, 10, sort).with_search(tag.clone());
    let page = dir.find_all_paged(&request).await.unwrap();
    let ids: Vec<UserId> = page.items.iter().map(|u| u.id).collect();
    // Equal names still tie-break by ascending id
    assert_eq!(ids, vec![charlie, bob_lower, bob_upper, alice]);

    // Second page of two
    let request = PageRequest::new(1, 2, Sort::asc("name")).with_search(tag.clone());
    let page = dir.find_all_paged(&request).await.unwrap();
    let ids: Vec<UserId> = page.items.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![bob_upper, charlie]);
    assert_eq!(page.page.total_pages, 2);

    // Username search is case-insensitive
    let request =
        PageRequest::new(0, 10, Sort::asc("id")).with_search(format!("{}-3@", tag.to_uppercase()));
    let page = dir.find_all_paged(&request).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, alice);
    assert_eq!(page.items[0].role, Role::Admin);

    cleanup(&pool, &tag).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_users_search_treats_wildcards_literally() {
    let pool = pool().await;
    let dir = PgUserDirectory::new(pool.clone());
    let tag = tag();

    let literal = seed_user(&pool, &tag, 1, "50%_off", Role::User).await;
    seed_user(&pool, &tag, 2, "50 xoff", Role::User).await;

    let request = PageRequest::new(0, 10, Sort::asc("id")).with_search(format!("{tag} 50%_"));
    let page = dir.find_all_paged(&request).await.unwrap();
    let ids: Vec<UserId> = page.items.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![literal]);
    assert_eq!(page.page.total_elements, 1);

    cleanup(&pool, &tag).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_disable_keeps_first_timestamp_and_enable_clears_it() {
    let pool = pool().await;
    let dir = PgUserDirectory::new(pool.clone());
    let tag = tag();
    let id = seed_user(&pool, &tag, 1, "Dora", Role::User).await;

    dir.disable(id).await.unwrap();
    let first = dir.get(id).await.unwrap().disabled_at;
    assert!(first.is_some());

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    dir.disable(id).await.unwrap();
    assert_eq!(dir.get(id).await.unwrap().disabled_at, first);

    dir.enable(id).await.unwrap();
    let user = dir.get(id).await.unwrap();
    assert!(user.disabled_at.is_none());
    assert!(user.is_enabled());

    // Enabling an enabled user is a no-op
    dir.enable(id).await.unwrap();

    cleanup(&pool, &tag).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_role_round_trips_through_save() {
    let pool = pool().await;
    let dir = PgUserDirectory::new(pool.clone());
    let tag = tag();
    let id = seed_user(&pool, &tag, 1, "Eve", Role::User).await;

    let mut user = dir.get(id).await.unwrap();
    assert_eq!(user.role, Role::User);

    user.role = Role::Admin;
    let saved = dir.save(&user).await.unwrap();
    assert_eq!(saved.role, Role::Admin);
    assert_eq!(dir.get(id).await.unwrap().role, Role::Admin);

    let stored: String = sqlx::query_scalar("SELECT role FROM user_account WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, "ADMIN");

    cleanup(&pool, &tag).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_unknown_user_is_not_found() {
    let pool = pool().await;
    let dir = PgUserDirectory::new(pool.clone());
    let missing = UserId(i64::MAX);

    assert!(matches!(dir.get(missing).await, Err(DirectoryError::NotFound(_))));
    assert!(matches!(dir.delete(missing).await, Err(DirectoryError::NotFound(_))));
    assert!(matches!(dir.disable(missing).await, Err(DirectoryError::NotFound(_))));
    assert!(matches!(dir.enable(missing).await, Err(DirectoryError::NotFound(_))));

    let tag = tag();
    let id = seed_user(&pool, &tag, 1, "Frank", Role::User).await;
    let mut user = dir.get(id).await.unwrap();
    dir.delete(id).await.unwrap();

    user.role = Role::Admin;
    assert!(matches!(dir.save(&user).await, Err(DirectoryError::NotFound(_))));
    assert!(matches!(dir.delete(id).await, Err(DirectoryError::NotFound(_))));

    cleanup(&pool, &tag).await;
}

#[tokio::test]
#[ignore] // Requires database
async fn test_ping() {
    let dir = PgUserDirectory::new(pool().await);
    dir.ping().await.unwrap();
}

// ============================================================================
// Organizations
// ============================================================================

#[tokio::test]
#[ignore] // Requires database
async fn test_organizations_carry_viewer_role() {
    let pool = pool().await;
    let dir = PgOrganizationDirectory::new(pool.clone());
    let tag = tag();

    let owner = seed_user(&pool, &tag, 1, "Owner", Role::Admin).await;
    let outsider = seed_user(&pool, &tag, 2, "Outsider", Role::User).await;
    let zeta = seed_organization(&pool, &tag, "Zeta Translations").await;
    let acme = seed_organization(&pool, &tag, "acme Localization").await;

    sqlx::query("INSERT INTO organization_role (organization_id, user_id, role) VALUES ($1, $2, $3)")
        .bind(zeta)
        .bind(owner)
        .bind(OrganizationRole::Owner)
        .execute(&pool)
        .await
        .unwrap();

    let request = PageRequest::new(0, 10, Sort::asc("name")).with_search(tag.clone());
    let page = dir.find_all_paged(&request, owner).await.unwrap();
    let ids: Vec<i64> = page.items.iter().map(|o| o.organization.id.0).collect();
    assert_eq!(ids, vec![acme, zeta]);
    assert_eq!(page.items[0].current_user_role, None);
    assert_eq!(page.items[1].current_user_role, Some(OrganizationRole::Owner));
    assert_eq!(page.page.total_elements, 2);

    let page = dir.find_all_paged(&request, outsider).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(page.items.iter().all(|o| o.current_user_role.is_none()));

    let request = PageRequest::new(0, 10, Sort::asc("slug")).with_search(format!("{tag}-zeta"));
    let page = dir.find_all_paged(&request, owner).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].organization.id.0, zeta);

    cleanup(&pool, &tag).await;
}
