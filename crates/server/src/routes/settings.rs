use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use service::settings_service;

use crate::{
    errors::JsonApiError,
    extract::{ApiJson, ApiPath, Tenant},
    state::ServerState,
};

#[derive(Serialize)]
pub struct SettingValue {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Deserialize)]
pub struct PutSettingInput {
    pub value: String,
}

#[utoipa::path(get, path = "/api/v1/settings/{key}", tag = "settings", params(("key" = String, Path, description = "Setting key")),
    responses((status = 200, description = "Value, or null when unset")))]
pub async fn get(
    State(state): State<ServerState>,
    Tenant(ctx): Tenant,
    ApiPath(key): ApiPath<String>,
) -> Result<Json<SettingValue>, JsonApiError> {
    let value = settings_service::get(&state.db, &ctx, &key).await?;
    Ok(Json(SettingValue { key, value }))
}

#[utoipa::path(put, path = "/api/v1/settings/{key}", tag = "settings", request_body = crate::openapi::PutSettingRequest,
    params(("key" = String, Path, description = "Setting key")),
    responses((status = 200, description = "Stored")))]
pub async fn put(
    State(state): State<ServerState>,
    Tenant(ctx): Tenant,
    ApiPath(key): ApiPath<String>,
    ApiJson(input): ApiJson<PutSettingInput>,
) -> Result<Json<SettingValue>, JsonApiError> {
    let saved = settings_service::put(&state.db, &ctx, &key, &input.value).await?;
    Ok(Json(SettingValue { key: saved.key, value: Some(saved.value) }))
}
