use crate::errors::ModelError;
use crate::{membership, organization, product, setting, user, user_credentials, Money, Role};
use super::setup_test_db;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

#[tokio::test]
async fn test_organization_and_user_crud() -> Result<()> {
    let db = setup_test_db().await?;

    let org = organization::create(&db, &organization::store_name_for("Alice")).await?;
    assert_eq!(org.name, "Alice's Store");

    let u = user::create(&db, "Alice", "alice", Some(org.id)).await?;
    assert_eq!(u.current_organization_id, Some(org.id));

    let found = user::find_by_login(&db, "alice").await?.expect("user by login");
    assert_eq!(found.id, u.id);

    user::set_current_organization(&db, u.id, None).await?;
    let reloaded = user::Entity::find_by_id(u.id).one(&db).await?.expect("user");
    assert_eq!(reloaded.current_organization_id, None);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_login_is_conflict() -> Result<()> {
    let db = setup_test_db().await?;
    user::create(&db, "Bob", "bob", None).await?;
    let err = user::create(&db, "Bobby", "bob", None).await.unwrap_err();
    assert!(matches!(err, ModelError::Conflict(_)), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn test_user_validation() {
    assert!(user::validate_login("").is_err());
    assert!(user::validate_login("has space").is_err());
    assert!(user::validate_login(&"x".repeat(65)).is_err());
    assert!(user::validate_login("cashier1").is_ok());
    assert!(user::validate_name("   ").is_err());
}

#[tokio::test]
async fn test_credentials_upsert_replaces_hash() -> Result<()> {
    let db = setup_test_db().await?;
    let u = user::create(&db, "Carol", "carol", None).await?;

    let first = user_credentials::upsert_password(&db, u.id, "hash-1".into(), "argon2id").await?;
    let second = user_credentials::upsert_password(&db, u.id, "hash-2".into(), "argon2id").await?;
    assert_eq!(first.id, second.id);

    let stored = user_credentials::find_for_user(&db, u.id).await?.expect("credentials");
    assert_eq!(stored.password_hash, "hash-2");
    Ok(())
}

#[tokio::test]
async fn test_membership_roles_roundtrip() -> Result<()> {
    let db = setup_test_db().await?;
    let org = organization::create(&db, "Shop").await?;
    let u = user::create(&db, "Dan", "dan", None).await?;

    membership::create(&db, org.id, u.id, Role::Manager).await?;
    let m = membership::find(&db, org.id, u.id).await?.expect("membership");
    assert_eq!(m.role, Role::Manager);
    assert!(m.is_active);

    let mut am: membership::ActiveModel = m.into();
    am.is_active = Set(false);
    am.update(&db).await?;
    assert!(membership::active_for_user(&db, u.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_product_sku_unique_per_organization() -> Result<()> {
    let db = setup_test_db().await?;
    let org_a = organization::create(&db, "A").await?;
    let org_b = organization::create(&db, "B").await?;
    let u = user::create(&db, "Eve", "eve", Some(org_a.id)).await?;

    let insert = |org: Uuid, sku: Option<&str>| {
        let now = Utc::now().into();
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(org),
            user_id: Set(u.id),
            name: Set("Coffee Beans 1kg".into()),
            price: Set(Money::from_cents(1550)),
            sku: Set(sku.map(str::to_string)),
            stock_quantity: Set(100),
            created_at: Set(now),
            updated_at: Set(now),
        }
    };

    insert(org_a.id, Some("SKU-1001")).insert(&db).await?;
    // same SKU in another organization is fine
    insert(org_b.id, Some("SKU-1001")).insert(&db).await?;
    // NULL SKUs never collide
    insert(org_a.id, None).insert(&db).await?;
    insert(org_a.id, None).insert(&db).await?;

    let dup = insert(org_a.id, Some("SKU-1001")).insert(&db).await.unwrap_err();
    assert!(crate::errors::is_unique_violation(&dup));

    let in_a = product::Entity::find().filter(product::Column::OrganizationId.eq(org_a.id)).all(&db).await?;
    assert_eq!(in_a.len(), 3);
    assert!(in_a.iter().all(|p| p.price == Money::from_cents(1550)));
    Ok(())
}

#[tokio::test]
async fn test_setting_composite_key() -> Result<()> {
    let db = setup_test_db().await?;
    let org = organization::create(&db, "Shop").await?;
    let u = user::create(&db, "Finn", "finn", Some(org.id)).await?;

    setting::ActiveModel {
        organization_id: Set(org.id),
        user_id: Set(u.id),
        key: Set("printer_type".into()),
        value: Set("Bluetooth".into()),
        updated_at: Set(Utc::now().into()),
    }
    .insert(&db)
    .await?;

    let found = setting::Entity::find_by_id((org.id, u.id, "printer_type".to_string())).one(&db).await?;
    assert_eq!(found.map(|s| s.value).as_deref(), Some("Bluetooth"));
    assert!(setting::validate_key("").is_err());
    Ok(())
}
