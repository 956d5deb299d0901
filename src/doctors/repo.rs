use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::principal::Credentials,
    doctors::repo_types::{Doctor, DoctorRow, DoctorUpdate, NewDoctor},
    store::{CredentialStore, StoreError},
};

const COLUMNS: &str = "id, name, email, password_hash, specialization, qualifications, experience, \
                       license_number, phone, hospital_id, available_slots, consultation_fee, \
                       rating, about, photo, password_changed_at, created_at, updated_at";

#[derive(Clone)]
pub struct PgDoctorStore {
    db: PgPool,
}

impl PgDoctorStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore<Doctor> for PgDoctorStore {
    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        profile: NewDoctor,
    ) -> Result<Doctor, StoreError> {
        let row = sqlx::query_as::<_, DoctorRow>(&format!(
            r#"
            INSERT INTO doctors (name, email, password_hash, specialization, qualifications,
                                 experience, license_number, phone, hospital_id,
                                 available_slots, consultation_fee, about)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&profile.name)
        .bind(email)
        .bind(password_hash)
        .bind(&profile.specialization)
        .bind(Json(&profile.qualifications))
        .bind(profile.experience)
        .bind(&profile.license_number)
        .bind(&profile.phone)
        .bind(profile.hospital_id)
        .bind(Json(&profile.available_slots))
        .bind(profile.consultation_fee)
        .bind(&profile.about)
        .fetch_one(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(Credentials::from(row).principal)
    }

    async fn find_by_email_with_secret(
        &self,
        email: &str,
    ) -> Result<Option<Credentials<Doctor>>, StoreError> {
        let row = sqlx::query_as::<_, DoctorRow>(&format!(
            "SELECT {COLUMNS} FROM doctors WHERE email = $1 AND active"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Credentials::from))
    }

    async fn find_by_id_with_secret(
        &self,
        id: Uuid,
    ) -> Result<Option<Credentials<Doctor>>, StoreError> {
        let row = sqlx::query_as::<_, DoctorRow>(&format!(
            "SELECT {COLUMNS} FROM doctors WHERE id = $1 AND active"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Credentials::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Doctor>, StoreError> {
        Ok(self.find_by_id_with_secret(id).await?.map(|c| c.principal))
    }

    async fn list(&self) -> Result<Vec<Doctor>, StoreError> {
        let rows = sqlx::query_as::<_, DoctorRow>(&format!(
            "SELECT {COLUMNS} FROM doctors WHERE active ORDER BY created_at ASC"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| Credentials::from(r).principal)
            .collect())
    }

    async fn update_fields(
        &self,
        id: Uuid,
        update: DoctorUpdate,
    ) -> Result<Option<Doctor>, StoreError> {
        let row = sqlx::query_as::<_, DoctorRow>(&format!(
            r#"
            UPDATE doctors
               SET name = COALESCE($2, name),
                   email = COALESCE($3, email),
                   phone = COALESCE($4, phone),
                   about = COALESCE($5, about),
                   photo = COALESCE($6, photo),
                   consultation_fee = COALESCE($7, consultation_fee),
                   specialization = COALESCE($8, specialization),
                   experience = COALESCE($9, experience),
                   hospital_id = COALESCE($10, hospital_id),
                   available_slots = COALESCE($11, available_slots),
                   updated_at = now()
             WHERE id = $1 AND active
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.email)
        .bind(update.phone)
        .bind(update.about)
        .bind(update.photo)
        .bind(update.consultation_fee)
        .bind(update.specialization)
        .bind(update.experience)
        .bind(update.hospital_id)
        .bind(update.available_slots.map(Json))
        .fetch_optional(&self.db)
        .await
        .map_err(StoreError::from_sqlx)?;
        Ok(row.map(|r| Credentials::from(r).principal))
    }

    async fn set_password(
        &self,
        id: Uuid,
        password_hash: &str,
        changed_at: OffsetDateTime,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE doctors
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
            "UPDATE doctors SET active = FALSE, updated_at = now() WHERE id = $1 AND active",
        )
        .bind(id)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM doctors WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
