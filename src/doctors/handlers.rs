use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{LoginRequest, SessionResponse, UpdatePasswordRequest},
        guard::Authenticated,
        roles::AdminUser,
        services,
    },
    doctors::{
        dto::{
            AdminUpdateRequest, AvailabilityRequest, DoctorListResponse, DoctorResponse,
            SignupRequest, UpdateMeRequest,
        },
        repo_types::{Doctor, DoctorUpdate},
    },
    error::AppError,
    extract::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/updateMe", patch(update_me))
        .route("/updateMyPassword", patch(update_my_password))
        .route("/updateAvailability", patch(update_availability))
}

/// Doctor management is an admin-user capability; the doctor guard is not
/// involved.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_doctors).post(create_doctor))
        .route(
            "/:id",
            get(get_doctor).patch(update_doctor).delete(delete_doctor),
        )
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<SessionResponse<Doctor>>), AppError> {
    let (creds, profile) = payload.into_parts()?;
    let session =
        services::signup(state.doctors.as_ref(), &state.hasher, &state.keys, creds, profile)
            .await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new(session.token, session.principal)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<SessionResponse<Doctor>>, AppError> {
    let session = services::login(
        state.doctors.as_ref(),
        &state.hasher,
        &state.keys,
        &payload.email,
        &payload.password,
    )
    .await?;
    Ok(Json(SessionResponse::new(session.token, session.principal)))
}

#[instrument(skip_all, fields(doctor_id = %doctor.id))]
pub async fn get_me(Authenticated(doctor): Authenticated<Doctor>) -> Json<DoctorResponse> {
    Json(DoctorResponse::new(doctor))
}

#[instrument(skip_all, fields(doctor_id = %doctor.id))]
pub async fn update_me(
    State(state): State<AppState>,
    Authenticated(doctor): Authenticated<Doctor>,
    AppJson(payload): AppJson<UpdateMeRequest>,
) -> Result<Json<DoctorResponse>, AppError> {
    let update = payload.into_update()?;
    let updated = state
        .doctors
        .update_fields(doctor.id, update)
        .await?
        .ok_or_else(|| AppError::not_found("No doctor found with that ID"))?;
    Ok(Json(DoctorResponse::new(updated)))
}

#[instrument(skip_all, fields(doctor_id = %doctor.id))]
pub async fn update_my_password(
    State(state): State<AppState>,
    Authenticated(doctor): Authenticated<Doctor>,
    AppJson(payload): AppJson<UpdatePasswordRequest>,
) -> Result<Json<SessionResponse<Doctor>>, AppError> {
    let session = services::change_password(
        state.doctors.as_ref(),
        &state.hasher,
        &state.keys,
        doctor.id,
        payload,
    )
    .await?;
    Ok(Json(SessionResponse::new(session.token, session.principal)))
}

#[instrument(skip_all, fields(doctor_id = %doctor.id))]
pub async fn update_availability(
    State(state): State<AppState>,
    Authenticated(doctor): Authenticated<Doctor>,
    AppJson(payload): AppJson<AvailabilityRequest>,
) -> Result<Json<DoctorResponse>, AppError> {
    let slots = payload
        .available_slots
        .ok_or_else(|| AppError::validation("Please provide valid availability slots"))?;
    let update = DoctorUpdate {
        available_slots: Some(slots),
        ..DoctorUpdate::default()
    };
    let updated = state
        .doctors
        .update_fields(doctor.id, update)
        .await?
        .ok_or_else(|| AppError::not_found("No doctor found with that ID"))?;
    info!(doctor_id = %doctor.id, slots = updated.available_slots.len(), "availability updated");
    Ok(Json(DoctorResponse::new(updated)))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn list_doctors(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<DoctorListResponse>, AppError> {
    let doctors = state.doctors.list().await?;
    Ok(Json(DoctorListResponse::new(doctors)))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create_doctor(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppJson(payload): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<DoctorResponse>), AppError> {
    let (creds, profile) = payload.into_parts()?;
    let doctor =
        services::create_account(state.doctors.as_ref(), &state.hasher, creds, profile).await?;
    Ok((StatusCode::CREATED, Json(DoctorResponse::new(doctor))))
}

#[instrument(skip_all, fields(admin_id = %admin.id, %id))]
pub async fn get_doctor(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DoctorResponse>, AppError> {
    let doctor = state
        .doctors
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("No doctor found with that ID"))?;
    Ok(Json(DoctorResponse::new(doctor)))
}

#[instrument(skip_all, fields(admin_id = %admin.id, %id))]
pub async fn update_doctor(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<AdminUpdateRequest>,
) -> Result<Json<DoctorResponse>, AppError> {
    let update = payload.into_update()?;
    let doctor = state
        .doctors
        .update_fields(id, update)
        .await?
        .ok_or_else(|| AppError::not_found("No doctor found with that ID"))?;
    Ok(Json(DoctorResponse::new(doctor)))
}

#[instrument(skip_all, fields(admin_id = %admin.id, %id))]
pub async fn delete_doctor(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.doctors.delete(id).await? {
        return Err(AppError::not_found("No doctor found with that ID"));
    }
    info!(admin_id = %admin.id, doctor_id = %id, "doctor deleted");
    Ok(StatusCode::NO_CONTENT)
}
