use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::transaction;
use service::{
    pagination::Pagination,
    sales::{SaleHeader, SaleLine, TransactionItemView},
};

use crate::{
    errors::JsonApiError,
    extract::{ApiJson, ApiPath, ApiQuery, Tenant},
    state::ServerState,
};

#[derive(Deserialize)]
pub struct RecordSaleInput {
    pub transaction: SaleHeader,
    pub items: Vec<SaleLine>,
}

#[derive(Serialize)]
pub struct CreatedTransaction {
    pub id: Uuid,
}

/// Without `page` every transaction is returned.
#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListQuery {
    fn pagination(&self) -> Option<Pagination> {
        self.page.map(|page| Pagination { page, per_page: self.per_page.unwrap_or(Pagination::default().per_page) })
    }
}

#[utoipa::path(get, path = "/api/v1/transactions", tag = "transactions",
    params(("page" = Option<u32>, Query, description = "1-based page"), ("per_page" = Option<u32>, Query, description = "Page size, at most 100")),
    responses((status = 200, description = "Newest first")))]
pub async fn list(
    State(state): State<ServerState>,
    Tenant(ctx): Tenant,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<transaction::Model>>, JsonApiError> {
    Ok(Json(state.sales.list_transactions(&ctx, query.pagination()).await?))
}

#[utoipa::path(post, path = "/api/v1/transactions", tag = "transactions", request_body = crate::openapi::RecordSaleRequest,
    responses((status = 201, description = "Sale recorded"), (status = 400, description = "Rejected; nothing written")))]
pub async fn create(
    State(state): State<ServerState>,
    Tenant(ctx): Tenant,
    ApiJson(input): ApiJson<RecordSaleInput>,
) -> Result<(StatusCode, Json<CreatedTransaction>), JsonApiError> {
    let id = state.sales.record_sale(&ctx, input.transaction, input.items).await?;
    Ok((StatusCode::CREATED, Json(CreatedTransaction { id })))
}

#[utoipa::path(get, path = "/api/v1/transactions/{id}", tag = "transactions", params(("id" = Uuid, Path, description = "Transaction id")),
    responses((status = 200, description = "Transaction header"), (status = 404, description = "Not found")))]
pub async fn get(
    State(state): State<ServerState>,
    Tenant(ctx): Tenant,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<transaction::Model>, JsonApiError> {
    Ok(Json(state.sales.get_transaction(&ctx, id).await?))
}

#[utoipa::path(get, path = "/api/v1/transactions/{id}/items", tag = "transactions", params(("id" = Uuid, Path, description = "Transaction id")),
    responses((status = 200, description = "Line items in cart order"), (status = 404, description = "Not found")))]
pub async fn items(
    State(state): State<ServerState>,
    Tenant(ctx): Tenant,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<TransactionItemView>>, JsonApiError> {
    Ok(Json(state.sales.get_transaction_items(&ctx, id).await?))
}

#[utoipa::path(delete, path = "/api/v1/transactions/{id}", tag = "transactions", params(("id" = Uuid, Path, description = "Transaction id")),
    responses((status = 204, description = "Deleted, stock restored"), (status = 404, description = "Not found")))]
pub async fn delete(
    State(state): State<ServerState>,
    Tenant(ctx): Tenant,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    state.sales.delete_transaction(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
