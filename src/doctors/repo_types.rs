use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::principal::{Credentials, Principal, PrincipalKind};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub day: Weekday,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Qualification {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub year: Option<i32>,
}

/// Doctor-track principal as returned to callers. Doctors carry no role.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub specialization: String,
    pub qualifications: Vec<Qualification>,
    pub experience: i32,
    pub license_number: String,
    pub phone: String,
    pub hospital_id: Option<Uuid>,
    pub available_slots: Vec<Slot>,
    pub consultation_fee: f64,
    pub rating: f64,
    pub about: Option<String>,
    pub photo: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub password_changed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Principal for Doctor {
    type Profile = NewDoctor;
    type Update = DoctorUpdate;

    const KIND: PrincipalKind = PrincipalKind::Doctor;

    fn id(&self) -> Uuid {
        self.id
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn password_changed_at(&self) -> Option<OffsetDateTime> {
        self.password_changed_at
    }
}

#[derive(Debug, Clone)]
pub struct NewDoctor {
    pub name: String,
    pub specialization: String,
    pub qualifications: Vec<Qualification>,
    pub experience: i32,
    pub license_number: String,
    pub phone: String,
    pub hospital_id: Option<Uuid>,
    pub available_slots: Vec<Slot>,
    pub consultation_fee: f64,
    pub about: Option<String>,
}

/// Fields a doctor row may change. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct DoctorUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub about: Option<String>,
    pub photo: Option<String>,
    pub consultation_fee: Option<f64>,
    pub specialization: Option<String>,
    pub experience: Option<i32>,
    pub hospital_id: Option<Uuid>,
    pub available_slots: Option<Vec<Slot>>,
}

/// Doctor record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct DoctorRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub specialization: String,
    pub qualifications: Json<Vec<Qualification>>,
    pub experience: i32,
    pub license_number: String,
    pub phone: String,
    pub hospital_id: Option<Uuid>,
    pub available_slots: Json<Vec<Slot>>,
    pub consultation_fee: f64,
    pub rating: f64,
    pub about: Option<String>,
    pub photo: String,
    pub password_changed_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<DoctorRow> for Credentials<Doctor> {
    fn from(row: DoctorRow) -> Self {
        Credentials {
            principal: Doctor {
                id: row.id,
                name: row.name,
                email: row.email,
                specialization: row.specialization,
                qualifications: row.qualifications.0,
                experience: row.experience,
                license_number: row.license_number,
                phone: row.phone,
                hospital_id: row.hospital_id,
                available_slots: row.available_slots.0,
                consultation_fee: row.consultation_fee,
                rating: row.rating,
                about: row.about,
                photo: row.photo,
                password_changed_at: row.password_changed_at,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            password_hash: row.password_hash,
        }
    }
}
