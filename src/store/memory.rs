use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CredentialStore, StoreError};
use crate::{
    auth::principal::{Credentials, Principal},
    doctors::repo_types::{Doctor, DoctorUpdate, NewDoctor},
    users::repo_types::{NewUser, Role, User, UserUpdate},
};

/// What the in-memory store needs to know about a principal type to stand in
/// for its Postgres table.
pub trait MemoryRecord: Principal {
    fn build(id: Uuid, email: &str, profile: Self::Profile, now: OffsetDateTime) -> Self;
    fn apply(&mut self, update: Self::Update, now: OffsetDateTime);
    fn set_password_changed_at(&mut self, at: OffsetDateTime);
    /// Values covered by a unique constraint, named like the constraint.
    fn unique_keys(&self) -> Vec<(&'static str, String)>;
}

struct Entry<P> {
    principal: P,
    password_hash: String,
    active: bool,
}

pub struct MemoryStore<P> {
    rows: RwLock<HashMap<Uuid, Entry<P>>>,
    lookups: AtomicUsize,
}

impl<P> Default for MemoryStore<P> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            lookups: AtomicUsize::new(0),
        }
    }
}

impl<P: MemoryRecord> MemoryStore<P> {
    /// Number of reads served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn count_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::SeqCst);
    }

    fn check_unique(rows: &HashMap<Uuid, Entry<P>>, candidate: &P) -> Result<(), StoreError> {
        let keys = candidate.unique_keys();
        for entry in rows.values() {
            if entry.principal.id() == candidate.id() {
                continue;
            }
            for (field, value) in entry.principal.unique_keys() {
                if keys.iter().any(|(f, v)| *f == field && *v == value) {
                    return Err(StoreError::Duplicate(field));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<P: MemoryRecord> CredentialStore<P> for MemoryStore<P> {
    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        profile: P::Profile,
    ) -> Result<P, StoreError> {
        let principal = P::build(Uuid::new_v4(), email, profile, OffsetDateTime::now_utc());
        let mut rows = self.rows.write().await;
        Self::check_unique(&rows, &principal)?;
        rows.insert(
            principal.id(),
            Entry {
                principal: principal.clone(),
                password_hash: password_hash.to_owned(),
                active: true,
            },
        );
        Ok(principal)
    }

    async fn find_by_email_with_secret(
        &self,
        email: &str,
    ) -> Result<Option<Credentials<P>>, StoreError> {
        self.count_lookup();
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .find(|e| e.active && e.principal.email() == email)
            .map(|e| Credentials {
                principal: e.principal.clone(),
                password_hash: e.password_hash.clone(),
            }))
    }

    async fn find_by_id_with_secret(
        &self,
        id: Uuid,
    ) -> Result<Option<Credentials<P>>, StoreError> {
        self.count_lookup();
        let rows = self.rows.read().await;
        Ok(rows.get(&id).filter(|e| e.active).map(|e| Credentials {
            principal: e.principal.clone(),
            password_hash: e.password_hash.clone(),
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<P>, StoreError> {
        Ok(self.find_by_id_with_secret(id).await?.map(|c| c.principal))
    }

    async fn list(&self) -> Result<Vec<P>, StoreError> {
        self.count_lookup();
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|e| e.active)
            .map(|e| e.principal.clone())
            .collect())
    }

    async fn update_fields(&self, id: Uuid, update: P::Update) -> Result<Option<P>, StoreError> {
        let mut rows = self.rows.write().await;
        let Some(mut updated) = rows.get(&id).filter(|e| e.active).map(|e| e.principal.clone())
        else {
            return Ok(None);
        };
        updated.apply(update, OffsetDateTime::now_utc());
        Self::check_unique(&rows, &updated)?;
        if let Some(entry) = rows.get_mut(&id) {
            entry.principal = updated.clone();
        }
        Ok(Some(updated))
    }

    async fn set_password(
        &self,
        id: Uuid,
        password_hash: &str,
        changed_at: OffsetDateTime,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        if let Some(entry) = rows.get_mut(&id).filter(|e| e.active) {
            entry.password_hash = password_hash.to_owned();
            entry.principal.set_password_changed_at(changed_at);
        }
        Ok(())
    }

    async fn deactivate(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id).filter(|e| e.active) {
            Some(entry) => {
                entry.active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}

impl MemoryRecord for User {
    fn build(id: Uuid, email: &str, profile: NewUser, now: OffsetDateTime) -> Self {
        User {
            id,
            name: profile.name,
            email: email.to_owned(),
            phone: profile.phone,
            date_of_birth: profile.date_of_birth,
            gender: profile.gender,
            address: profile.address,
            role: profile.role,
            password_changed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, update: UserUpdate, now: OffsetDateTime) {
        if let Some(v) = update.name {
            self.name = v;
        }
        if let Some(v) = update.email {
            self.email = v;
        }
        if update.phone.is_some() {
            self.phone = update.phone;
        }
        if update.address.is_some() {
            self.address = update.address;
        }
        if update.date_of_birth.is_some() {
            self.date_of_birth = update.date_of_birth;
        }
        if update.gender.is_some() {
            self.gender = update.gender;
        }
        if let Some(v) = update.role {
            self.role = v;
        }
        self.updated_at = now;
    }

    fn set_password_changed_at(&mut self, at: OffsetDateTime) {
        self.password_changed_at = Some(at);
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("email", self.email.clone())]
    }
}

impl MemoryRecord for Doctor {
    fn build(id: Uuid, email: &str, profile: NewDoctor, now: OffsetDateTime) -> Self {
        Doctor {
            id,
            name: profile.name,
            email: email.to_owned(),
            specialization: profile.specialization,
            qualifications: profile.qualifications,
            experience: profile.experience,
            license_number: profile.license_number,
            phone: profile.phone,
            hospital_id: profile.hospital_id,
            available_slots: profile.available_slots,
            consultation_fee: profile.consultation_fee,
            rating: 0.0,
            about: profile.about,
            photo: "default.jpg".into(),
            password_changed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, update: DoctorUpdate, now: OffsetDateTime) {
        if let Some(v) = update.name {
            self.name = v;
        }
        if let Some(v) = update.email {
            self.email = v;
        }
        if let Some(v) = update.phone {
            self.phone = v;
        }
        if update.about.is_some() {
            self.about = update.about;
        }
        if let Some(v) = update.photo {
            self.photo = v;
        }
        if let Some(v) = update.consultation_fee {
            self.consultation_fee = v;
        }
        if let Some(v) = update.specialization {
            self.specialization = v;
        }
        if let Some(v) = update.experience {
            self.experience = v;
        }
        if update.hospital_id.is_some() {
            self.hospital_id = update.hospital_id;
        }
        if let Some(v) = update.available_slots {
            self.available_slots = v;
        }
        self.updated_at = now;
    }

    fn set_password_changed_at(&mut self, at: OffsetDateTime) {
        self.password_changed_at = Some(at);
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![
            ("email", self.email.clone()),
            ("license number", self.license_number.clone()),
        ]
    }
}

impl MemoryStore<User> {
    pub async fn insert_user(&self, email: &str, role: Role) -> User {
        let profile = NewUser {
            name: "Test Patient".into(),
            phone: None,
            date_of_birth: None,
            gender: None,
            address: None,
            role,
        };
        self.create(email, "", profile).await.expect("seed user")
    }
}

impl MemoryStore<Doctor> {
    pub async fn insert_doctor(&self, email: &str) -> Doctor {
        let profile = NewDoctor {
            name: "Dr. Test".into(),
            specialization: "Cardiology".into(),
            qualifications: Vec::new(),
            experience: 10,
            license_number: format!("LIC-{email}"),
            phone: "+15550100".into(),
            hospital_id: None,
            available_slots: Vec::new(),
            consultation_fee: 50.0,
            about: None,
        };
        self.create(email, "", profile).await.expect("seed doctor")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inactive_records_are_invisible() {
        let store = MemoryStore::<User>::default();
        let user = store.insert_user("a@b.com", Role::Patient).await;
        assert!(store.deactivate(user.id).await.unwrap());
        assert!(store.find_by_id(user.id).await.unwrap().is_none());
        assert!(store.find_by_email_with_secret("a@b.com").await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.deactivate(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_rejected_even_if_inactive() {
        let store = MemoryStore::<User>::default();
        let user = store.insert_user("a@b.com", Role::Patient).await;
        store.deactivate(user.id).await.unwrap();
        let profile = NewUser {
            name: "Other".into(),
            phone: None,
            date_of_birth: None,
            gender: None,
            address: None,
            role: Role::Patient,
        };
        let err = store.create("a@b.com", "", profile).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("email")));
    }
}
