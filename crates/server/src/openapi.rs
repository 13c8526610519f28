use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub name: String, pub login: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub login: String, pub password: String }

#[derive(ToSchema)]
pub struct SelectOrganizationRequest { pub organization_id: Uuid }

#[derive(ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub login: String,
    pub password: String,
    /// owner, manager or cashier
    pub role: String,
}

#[derive(ToSchema)]
pub struct UpdateUserRequest { pub role: Option<String>, pub is_active: Option<bool> }

#[derive(ToSchema)]
pub struct ResetPasswordRequest { pub password: String }

#[derive(ToSchema)]
pub struct ProductRequest {
    pub name: String,
    /// Decimal amount with at most two fractional digits.
    pub price: f64,
    pub sku: Option<String>,
    pub stock_quantity: i32,
}

#[derive(ToSchema)]
pub struct SaleHeaderDoc {
    pub amount_received: f64,
    pub transaction_date: Option<chrono::DateTime<chrono::Utc>>,
    pub total_amount: Option<f64>,
}

#[derive(ToSchema)]
pub struct SaleLineDoc {
    pub product_id: Uuid,
    pub quantity: i64,
    /// Overrides the catalog price when present.
    pub price_at_transaction: Option<f64>,
}

#[derive(ToSchema)]
pub struct RecordSaleRequest {
    pub transaction: SaleHeaderDoc,
    pub items: Vec<SaleLineDoc>,
}

#[derive(ToSchema)]
pub struct PutSettingRequest { pub value: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::auth::select_organization,
        crate::routes::users::list,
        crate::routes::users::create,
        crate::routes::users::update,
        crate::routes::users::reset_password,
        crate::routes::products::list,
        crate::routes::products::search,
        crate::routes::products::get,
        crate::routes::products::create,
        crate::routes::products::update,
        crate::routes::products::delete,
        crate::routes::transactions::list,
        crate::routes::transactions::create,
        crate::routes::transactions::get,
        crate::routes::transactions::items,
        crate::routes::transactions::delete,
        crate::routes::settings::get,
        crate::routes::settings::put,
        crate::routes::analytics::today_summary,
        crate::routes::analytics::top_selling,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            SelectOrganizationRequest,
            CreateUserRequest,
            UpdateUserRequest,
            ResetPasswordRequest,
            ProductRequest,
            SaleHeaderDoc,
            SaleLineDoc,
            RecordSaleRequest,
            PutSettingRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "users"),
        (name = "products"),
        (name = "transactions"),
        (name = "settings"),
        (name = "analytics")
    )
)]
pub struct ApiDoc;
