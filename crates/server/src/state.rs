use std::sync::Arc;

use sea_orm::DatabaseConnection;

use configs::AppConfig;
use service::{
    auth::{errors::AuthError, repo::seaorm::SeaOrmAuthRepository, AuthConfig, AuthService},
    authz::TenantResolver,
    catalog::Catalog,
    sales::{SaleRecorder, SalesPolicy},
    staff_service::StaffService,
};

/// Everything a handler needs; cloned per request.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub resolver: TenantResolver,
    pub catalog: Catalog,
    pub sales: SaleRecorder,
    pub staff: StaffService,
    pub secure_cookie: bool,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, cfg: &AppConfig) -> Result<Self, AuthError> {
        let auth = AuthService::new(Arc::new(SeaOrmAuthRepository::new(db.clone())), AuthConfig::from_app(&cfg.auth))?;
        let staff = StaffService::new(db.clone(), auth.hasher().clone());
        Ok(Self {
            resolver: TenantResolver::new(db.clone()),
            catalog: Catalog::new(db.clone()),
            sales: SaleRecorder::new(db.clone(), SalesPolicy::from(&cfg.sales)),
            staff,
            auth: Arc::new(auth),
            secure_cookie: cfg.auth.secure_cookie,
            db,
        })
    }
}
