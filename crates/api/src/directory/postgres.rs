//! Postgres-backed directories

use async_trait::async_trait;
use glossa_shared::{
    DirectoryError, OrganizationView, Page, PageRequest, UserAccount, UserId,
};
use sqlx::PgPool;

use super::{like_pattern, DirectoryResult, OrganizationDirectory, UserDirectory};

const USER_COLUMNS: &str = "id, username, name, role, disabled_at, created_at";

/// Log database error details before they are flattened into a [`DirectoryError`]
fn log_db_err(step: &'static str, e: &sqlx::Error) {
    if let Some(db) = e.as_database_error() {
        tracing::error!(
            step,
            code = ?db.code(),
            message = db.message(),
            table = ?db.table(),
            constraint = ?db.constraint(),
            "Database query failed"
        );
    } else if !matches!(e, sqlx::Error::RowNotFound) {
        tracing::error!(step, error = ?e, "Non-database SQLx error");
    }
}

fn db_err(step: &'static str) -> impl Fn(sqlx::Error) -> DirectoryError {
    move |e| {
        log_db_err(step, &e);
        DirectoryError::from(e)
    }
}

/// Text columns sort case-insensitively, matching the in-memory directories
fn sort_expression(prefix: &str, field: &'static str) -> String {
    if field == "id" {
        format!("{prefix}id")
    } else {
        format!("LOWER({prefix}{field})")
    }
}

fn total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_all_paged(&self, request: &PageRequest) -> DirectoryResult<Page<UserAccount>> {
        let pattern = request.search.as_deref().map(like_pattern);

        // Sort field comes from the whitelist in PageQuery::into_request
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM user_account
            WHERE ($1::text IS NULL OR name ILIKE $1 OR username ILIKE $1)
            ORDER BY {order} {direction}, id ASC
            LIMIT $2 OFFSET $3
            "#,
            order = sort_expression("", request.sort.field()),
            direction = request.sort.direction().as_sql(),
        );

        let users: Vec<UserAccount> = sqlx::query_as(&sql)
            .bind(&pattern)
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list_users"))?;

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM user_account
            WHERE ($1::text IS NULL OR name ILIKE $1 OR username ILIKE $1)
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("count_users"))?;

        Ok(Page::new(users, request, total(count)))
    }

    async fn get(&self, id: UserId) -> DirectoryResult<UserAccount> {
        let sql = format!("SELECT {USER_COLUMNS} FROM user_account WHERE id = $1");
        sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("get_user"))?
            .ok_or_else(|| DirectoryError::user_not_found(id))
    }

    async fn save(&self, user: &UserAccount) -> DirectoryResult<UserAccount> {
        let sql = format!(
            r#"
            UPDATE user_account
            SET username = $2, name = $3, role = $4, disabled_at = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as(&sql)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.name)
            .bind(user.role)
            .bind(user.disabled_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("save_user"))?
            .ok_or_else(|| DirectoryError::user_not_found(user.id))
    }

    async fn delete(&self, id: UserId) -> DirectoryResult<()> {
        let result = sqlx::query("DELETE FROM user_account WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err("delete_user"))?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::user_not_found(id));
        }
        Ok(())
    }

    async fn disable(&self, id: UserId) -> DirectoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE user_account
            SET disabled_at = COALESCE(disabled_at, NOW()), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err("disable_user"))?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::user_not_found(id));
        }
        Ok(())
    }

    async fn enable(&self, id: UserId) -> DirectoryResult<()> {
        let result = sqlx::query(
            "UPDATE user_account SET disabled_at = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err("enable_user"))?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::user_not_found(id));
        }
        Ok(())
    }

    async fn ping(&self) -> DirectoryResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_err("ping"))?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgOrganizationDirectory {
    pool: PgPool,
}

impl PgOrganizationDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationDirectory for PgOrganizationDirectory {
    async fn find_all_paged(
        &self,
        request: &PageRequest,
        viewer: UserId,
    ) -> DirectoryResult<Page<OrganizationView>> {
        let pattern = request.search.as_deref().map(like_pattern);

        let sql = format!(
            r#"
            SELECT o.id, o.name, o.slug, o.description, r.role AS current_user_role
            FROM organization o
            LEFT JOIN organization_role r ON r.organization_id = o.id AND r.user_id = $1
            WHERE ($2::text IS NULL OR o.name ILIKE $2 OR o.slug ILIKE $2)
            ORDER BY {order} {direction}, o.id ASC
            LIMIT $3 OFFSET $4
            "#,
            order = sort_expression("o.", request.sort.field()),
            direction = request.sort.direction().as_sql(),
        );

        let organizations: Vec<OrganizationView> = sqlx::query_as(&sql)
            .bind(viewer)
            .bind(&pattern)
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list_organizations"))?;

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM organization o
            WHERE ($1::text IS NULL OR o.name ILIKE $1 OR o.slug ILIKE $1)
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("count_organizations"))?;

        Ok(Page::new(organizations, request, total(count)))
    }
}
