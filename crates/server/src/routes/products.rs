use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use models::product;
use service::catalog::ProductInput;

use crate::{
    errors::JsonApiError,
    extract::{ApiJson, ApiPath, ApiQuery, Tenant},
    state::ServerState,
};

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[utoipa::path(get, path = "/api/v1/products", tag = "products", responses((status = 200, description = "Products ordered by name")))]
pub async fn list(State(state): State<ServerState>, Tenant(ctx): Tenant) -> Result<Json<Vec<product::Model>>, JsonApiError> {
    Ok(Json(state.catalog.list(&ctx).await?))
}

#[utoipa::path(get, path = "/api/v1/products/search", tag = "products",
    params(("q" = String, Query, description = "Substring of name or SKU")),
    responses((status = 200, description = "Matching products")))]
pub async fn search(
    State(state): State<ServerState>,
    Tenant(ctx): Tenant,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<product::Model>>, JsonApiError> {
    Ok(Json(state.catalog.search(&ctx, &query.q).await?))
}

#[utoipa::path(get, path = "/api/v1/products/{id}", tag = "products", params(("id" = Uuid, Path, description = "Product id")),
    responses((status = 200, description = "Product"), (status = 404, description = "Not found")))]
pub async fn get(
    State(state): State<ServerState>,
    Tenant(ctx): Tenant,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<product::Model>, JsonApiError> {
    Ok(Json(state.catalog.get(&ctx, id).await?))
}

#[utoipa::path(post, path = "/api/v1/products", tag = "products", request_body = crate::openapi::ProductRequest,
    responses((status = 201, description = "Created"), (status = 400, description = "Invalid"), (status = 409, description = "Duplicate SKU")))]
pub async fn create(
    State(state): State<ServerState>,
    Tenant(ctx): Tenant,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<(StatusCode, Json<product::Model>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(state.catalog.create(&ctx, input).await?)))
}

#[utoipa::path(put, path = "/api/v1/products/{id}", tag = "products", request_body = crate::openapi::ProductRequest,
    params(("id" = Uuid, Path, description = "Product id")),
    responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update(
    State(state): State<ServerState>,
    Tenant(ctx): Tenant,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<Json<product::Model>, JsonApiError> {
    Ok(Json(state.catalog.update(&ctx, id, input).await?))
}

#[utoipa::path(delete, path = "/api/v1/products/{id}", tag = "products", params(("id" = Uuid, Path, description = "Product id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete(
    State(state): State<ServerState>,
    Tenant(ctx): Tenant,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    state.catalog.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
