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
    error::AppError,
    extract::AppJson,
    state::AppState,
    users::{
        dto::{AdminUpdateRequest, SignupRequest, UpdateMeRequest, UserListResponse, UserResponse},
        repo_types::User,
    },
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
        .route("/deleteMe", axum::routing::delete(delete_me))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<SessionResponse<User>>), AppError> {
    let (creds, profile) = payload.into_parts(false)?;
    let session =
        services::signup(state.users.as_ref(), &state.hasher, &state.keys, creds, profile).await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new(session.token, session.principal)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<SessionResponse<User>>, AppError> {
    let session = services::login(
        state.users.as_ref(),
        &state.hasher,
        &state.keys,
        &payload.email,
        &payload.password,
    )
    .await?;
    Ok(Json(SessionResponse::new(session.token, session.principal)))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_me(Authenticated(user): Authenticated<User>) -> Json<UserResponse> {
    Json(UserResponse::new(user))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    Authenticated(user): Authenticated<User>,
    AppJson(payload): AppJson<UpdateMeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let update = payload.into_update()?;
    let updated = state
        .users
        .update_fields(user.id, update)
        .await?
        .ok_or_else(|| AppError::not_found("No user found with that ID"))?;
    Ok(Json(UserResponse::new(updated)))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_my_password(
    State(state): State<AppState>,
    Authenticated(user): Authenticated<User>,
    AppJson(payload): AppJson<UpdatePasswordRequest>,
) -> Result<Json<SessionResponse<User>>, AppError> {
    let session = services::change_password(
        state.users.as_ref(),
        &state.hasher,
        &state.keys,
        user.id,
        payload,
    )
    .await?;
    Ok(Json(SessionResponse::new(session.token, session.principal)))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn delete_me(
    State(state): State<AppState>,
    Authenticated(user): Authenticated<User>,
) -> Result<StatusCode, AppError> {
    state.users.deactivate(user.id).await?;
    info!(user_id = %user.id, "user deactivated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<UserListResponse>, AppError> {
    let users = state.users.list().await?;
    Ok(Json(UserListResponse::new(users)))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppJson(payload): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let (creds, profile) = payload.into_parts(true)?;
    let user = services::create_account(state.users.as_ref(), &state.hasher, creds, profile).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::new(user))))
}

#[instrument(skip_all, fields(admin_id = %admin.id, %id))]
pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("No user found with that ID"))?;
    Ok(Json(UserResponse::new(user)))
}

#[instrument(skip_all, fields(admin_id = %admin.id, %id))]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<AdminUpdateRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let update = payload.into_update()?;
    let user = state
        .users
        .update_fields(id, update)
        .await?
        .ok_or_else(|| AppError::not_found("No user found with that ID"))?;
    Ok(Json(UserResponse::new(user)))
}

#[instrument(skip_all, fields(admin_id = %admin.id, %id))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.users.delete(id).await? {
        return Err(AppError::not_found("No user found with that ID"));
    }
    info!(admin_id = %admin.id, user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
