use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use service::{
    auth::domain::{AuthSession, LoginInput, RegisterInput},
    authz::TenantContext,
    staff_service::Profile,
};

use crate::{
    errors::JsonApiError,
    extract::{ApiJson, CurrentUser, Tenant, AUTH_COOKIE},
    state::ServerState,
};

#[derive(Serialize)]
pub struct RegisterOutput {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub login: String,
}

#[derive(Deserialize)]
pub struct SelectOrganizationInput {
    pub organization_id: Uuid,
}

#[utoipa::path(post, path = "/api/v1/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest,
    responses((status = 201, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Login taken")))]
pub async fn register(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> Result<(StatusCode, Json<RegisterOutput>), JsonApiError> {
    let owner = state.auth.register(input).await?;
    let out = RegisterOutput {
        user_id: owner.user.id,
        organization_id: owner.organization_id,
        name: owner.user.name,
        login: owner.user.login,
    };
    Ok((StatusCode::CREATED, Json(out)))
}

#[utoipa::path(post, path = "/api/v1/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest,
    responses((status = 200, description = "Logged in; also sets the auth_token cookie"), (status = 401, description = "Invalid credentials")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<(CookieJar, Json<AuthSession>), JsonApiError> {
    let session = state.auth.login(input).await?;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(state.secure_cookie);
    cookie.set_same_site(SameSite::Lax);
    Ok((jar.add(cookie), Json(session)))
}

#[utoipa::path(post, path = "/api/v1/auth/logout", tag = "auth", responses((status = 204, description = "Cookie cleared")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/v1/auth/me", tag = "auth",
    responses((status = 200, description = "Profile with resolved organization and role"), (status = 403, description = "No or ambiguous organization")))]
pub async fn me(State(state): State<ServerState>, Tenant(ctx): Tenant) -> Result<Json<Profile>, JsonApiError> {
    Ok(Json(state.staff.me(&ctx).await?))
}

/// Does not need a resolved tenant: this is how ambiguity gets resolved.
#[utoipa::path(put, path = "/api/v1/auth/organization", tag = "auth", request_body = crate::openapi::SelectOrganizationRequest,
    responses((status = 200, description = "Selection stored"), (status = 403, description = "Not a member")))]
pub async fn select_organization(
    State(state): State<ServerState>,
    user: CurrentUser,
    ApiJson(input): ApiJson<SelectOrganizationInput>,
) -> Result<Json<TenantContext>, JsonApiError> {
    Ok(Json(state.resolver.select_organization(user.id, input.organization_id).await?))
}
