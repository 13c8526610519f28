use sea_orm::{entity::prelude::*, sea_query::Expr, ConnectionTrait, QueryFilter, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::organization;

pub const MAX_LOGIN_LEN: usize = 64;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub login: String,
    pub current_organization_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    CurrentOrganization,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::CurrentOrganization => Entity::belongs_to(organization::Entity)
                .from(Column::CurrentOrganizationId)
                .to(organization::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    Ok(())
}

pub fn validate_login(login: &str) -> Result<(), errors::ModelError> {
    let login = login.trim();
    if login.is_empty() { return Err(errors::ModelError::Validation("login required".into())); }
    if login.chars().count() > MAX_LOGIN_LEN {
        return Err(errors::ModelError::Validation(format!("login longer than {MAX_LOGIN_LEN} characters")));
    }
    if login.chars().any(char::is_whitespace) {
        return Err(errors::ModelError::Validation("login must not contain whitespace".into()));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    name: &str,
    login: &str,
    current_organization_id: Option<Uuid>,
) -> Result<Model, errors::ModelError> {
    validate_name(name)?;
    validate_login(login)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.trim().to_string()),
        login: Set(login.trim().to_string()),
        current_organization_id: Set(current_organization_id),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_login<C: ConnectionTrait>(db: &C, login: &str) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find().filter(Column::Login.eq(login.trim())).one(db).await?)
}

pub async fn set_current_organization<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    organization_id: Option<Uuid>,
) -> Result<(), errors::ModelError> {
    let res = Entity::update_many()
        .col_expr(Column::CurrentOrganizationId, Expr::value(organization_id))
        .col_expr(Column::UpdatedAt, Expr::value(DateTimeWithTimeZone::from(Utc::now())))
        .filter(Column::Id.eq(user_id))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(errors::ModelError::Validation("user not found".into()));
    }
    Ok(())
}
