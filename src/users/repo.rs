use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::principal::Credentials,
    store::{CredentialStore, StoreError},
    users::repo_types::{NewUser, User, UserRow, UserUpdate},
};

const COLUMNS: &str = "id, name, email, password_hash, phone, date_of_birth, gender, address, \
                       role, password_changed_at, created_at, updated_at";

/// Users persisted in Postgres. Inactive rows are filtered in every query.
#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_credentials(row: UserRow) -> Result<Credentials<User>, StoreError> {
    Credentials::try_from(row).map_err(|e| StoreError::Database(sqlx::Error::Decode(e.into())))
}

#[async_trait]
impl CredentialStore<User> for PgUserStore {
    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        profile: NewUser,
    ) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, phone, date_of_birth, gender, address, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&profile.name)
        .bind(email)
        .bind(password_hash)
        .bind(&profile.phone)
        .bind(profile.date_of_birth)
        .bind(profile.gender.map(|g| g.as_str()))
        .bind(&profile.address)
        .bind(profile.role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(into_credentials(row)?.principal)
    }

    async fn find_by_email_with_secret(
        &self,
        email: &str,
    ) -> Result<Option<Credentials<User>>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {COLUMNS} FROM users WHERE email = $1 AND active"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        row.map(into_credentials).transpose()
    }

    async fn find_by_id_with_secret(
        &self,
        id: Uuid,
    ) -> Result<Option<Credentials<User>>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {COLUMNS} FROM users WHERE id = $1 AND active"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(into_credentials).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.find_by_id_with_secret(id).await?.map(|c| c.principal))
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {COLUMNS} FROM users WHERE active ORDER BY created_at ASC"
        ))
        .fetch_all(&self.db)
        .await?;
        rows.into_iter()
            .map(|r| into_credentials(r).map(|c| c.principal))
            .collect()
    }

    async fn update_fields(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
               SET name = COALESCE($2, name),
                   email = COALESCE($3, email),
                   phone = COALESCE($4, phone),
                   address = COALESCE($5, address),
                   date_of_birth = COALESCE($6, date_of_birth),
                   gender = COALESCE($7, gender),
                   role = COALESCE($8, role),
                   updated_at = now()
             WHERE id = $1 AND active
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.email)
        .bind(update.phone)
        .bind(update.address)
        .bind(update.date_of_birth)
        .bind(update.gender.map(|g| g.as_str()))
        .bind(update.role.map(|r| r.as_str()))
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(row.map(into_credentials).transpose()?.map(|c| c.principal))
    }

    async fn set_password(
        &self,
        id: Uuid,
        password_hash: &str,
        changed_at: OffsetDateTime,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
               SET password_hash = $2, password_changed_at = $3, updated_at = now()
             WHERE id = $1 AND active
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(changed_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn deactivate(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query(
            "UPDATE users SET active = FALSE, updated_at = now() WHERE id = $1 AND active",
        )
        .bind(id)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
