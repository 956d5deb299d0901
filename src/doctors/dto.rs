use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::dto::NewCredentials,
    doctors::repo_types::{Doctor, DoctorUpdate, NewDoctor, Qualification, Slot},
    error::AppError,
    users::dto::NOT_FOR_PASSWORDS,
    validation,
};

/// Request body for doctor signup, also used by admins to create doctors.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
    pub specialization: Option<String>,
    #[serde(default)]
    pub qualifications: Vec<Qualification>,
    pub experience: Option<i32>,
    pub license_number: Option<String>,
    pub phone: Option<String>,
    pub hospital: Option<Uuid>,
    #[serde(default)]
    pub available_slots: Vec<Slot>,
    pub consultation_fee: Option<f64>,
    pub about: Option<String>,
}

impl SignupRequest {
    pub fn into_parts(self) -> Result<(NewCredentials, NewDoctor), AppError> {
        let experience = self
            .experience
            .ok_or_else(|| AppError::validation("Please provide your years of experience"))?;
        if experience < 0 {
            return Err(AppError::validation("Experience must not be negative"));
        }
        let fee = self
            .consultation_fee
            .ok_or_else(|| AppError::validation("Please provide your consultation fee"))?;
        let phone = validation::required(self.phone, "phone number")?;

        let profile = NewDoctor {
            name: validation::required(self.name, "name")?,
            specialization: validation::required(self.specialization, "specialization")?,
            qualifications: self.qualifications,
            experience,
            license_number: validation::required(self.license_number, "license number")?,
            phone: validation::phone(&phone)?,
            hospital_id: self.hospital,
            available_slots: self.available_slots,
            consultation_fee: validation::non_negative(fee, "Consultation fee")?,
            about: validation::optional(self.about),
        };
        let creds = NewCredentials {
            email: self.email,
            password: self.password,
            password_confirm: self.password_confirm,
        };
        Ok((creds, profile))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub about: Option<String>,
    pub photo: Option<String>,
    pub consultation_fee: Option<f64>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

impl UpdateMeRequest {
    pub fn into_update(self) -> Result<DoctorUpdate, AppError> {
        if self.password.is_some() || self.password_confirm.is_some() {
            return Err(AppError::validation(NOT_FOR_PASSWORDS));
        }
        Ok(DoctorUpdate {
            name: self
                .name
                .map(|n| validation::required(Some(n), "name"))
                .transpose()?,
            email: self
                .email
                .map(|e| validation::normalize_email(&e))
                .transpose()?,
            phone: self.phone.map(|p| validation::phone(&p)).transpose()?,
            about: validation::optional(self.about),
            photo: validation::optional(self.photo),
            consultation_fee: self
                .consultation_fee
                .map(|f| validation::non_negative(f, "Consultation fee"))
                .transpose()?,
            ..DoctorUpdate::default()
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub available_slots: Option<Vec<Slot>>,
}

/// Admin update of a doctor record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub about: Option<String>,
    pub photo: Option<String>,
    pub consultation_fee: Option<f64>,
    pub specialization: Option<String>,
    pub experience: Option<i32>,
    pub hospital: Option<Uuid>,
    pub available_slots: Option<Vec<Slot>>,
}

impl AdminUpdateRequest {
    pub fn into_update(self) -> Result<DoctorUpdate, AppError> {
        if matches!(self.experience, Some(e) if e < 0) {
            return Err(AppError::validation("Experience must not be negative"));
        }
        let base = UpdateMeRequest {
            name: self.name,
            email: self.email,
            phone: self.phone,
            about: self.about,
            photo: self.photo,
            consultation_fee: self.consultation_fee,
            password: None,
            password_confirm: None,
        }
        .into_update()?;
        Ok(DoctorUpdate {
            specialization: self
                .specialization
                .map(|s| validation::required(Some(s), "specialization"))
                .transpose()?,
            experience: self.experience,
            hospital_id: self.hospital,
            available_slots: self.available_slots,
            ..base
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorResponse {
    pub status: &'static str,
    pub data: DoctorData,
}

#[derive(Debug, Serialize)]
pub struct DoctorData {
    pub doctor: Doctor,
}

impl DoctorResponse {
    pub fn new(doctor: Doctor) -> Self {
        Self {
            status: "success",
            data: DoctorData { doctor },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorListResponse {
    pub status: &'static str,
    pub results: usize,
    pub data: DoctorListData,
}

#[derive(Debug, Serialize)]
pub struct DoctorListData {
    pub doctors: Vec<Doctor>,
}

impl DoctorListResponse {
    pub fn new(doctors: Vec<Doctor>) -> Self {
        Self {
            status: "success",
            results: doctors.len(),
            data: DoctorListData { doctors },
        }
    }
}
