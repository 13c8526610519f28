use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use service::staff_service::{NewStaffMember, StaffMember, UpdateMember};

use crate::{
    errors::JsonApiError,
    extract::{ApiJson, ApiPath, Tenant},
    state::ServerState,
};

#[derive(Deserialize)]
pub struct ResetPasswordInput {
    pub password: String,
}

#[utoipa::path(get, path = "/api/v1/users", tag = "users", responses((status = 200, description = "Members of the organization"), (status = 403, description = "Forbidden")))]
pub async fn list(State(state): State<ServerState>, Tenant(ctx): Tenant) -> Result<Json<Vec<StaffMember>>, JsonApiError> {
    Ok(Json(state.staff.list_users(&ctx).await?))
}

#[utoipa::path(post, path = "/api/v1/users", tag = "users", request_body = crate::openapi::CreateUserRequest,
    responses((status = 201, description = "Created"), (status = 403, description = "Forbidden"), (status = 409, description = "Login taken")))]
pub async fn create(
    State(state): State<ServerState>,
    Tenant(ctx): Tenant,
    ApiJson(input): ApiJson<NewStaffMember>,
) -> Result<(StatusCode, Json<StaffMember>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(state.staff.create_user(&ctx, input).await?)))
}

#[utoipa::path(put, path = "/api/v1/users/{id}", tag = "users", request_body = crate::openapi::UpdateUserRequest,
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, description = "Updated"), (status = 404, description = "Not a member")))]
pub async fn update(
    State(state): State<ServerState>,
    Tenant(ctx): Tenant,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(changes): ApiJson<UpdateMember>,
) -> Result<Json<StaffMember>, JsonApiError> {
    Ok(Json(state.staff.update_member(&ctx, id, changes).await?))
}

#[utoipa::path(post, path = "/api/v1/users/{id}/reset-password", tag = "users", request_body = crate::openapi::ResetPasswordRequest,
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 204, description = "Password replaced"), (status = 404, description = "Not a member")))]
pub async fn reset_password(
    State(state): State<ServerState>,
    Tenant(ctx): Tenant,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ResetPasswordInput>,
) -> Result<StatusCode, JsonApiError> {
    state.auth.reset_password(&ctx, id, &input.password).await?;
    Ok(StatusCode::NO_CONTENT)
}
