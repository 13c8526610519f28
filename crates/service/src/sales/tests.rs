use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use uuid::Uuid;

use configs::StockPolicy;
use models::{product, transaction, transaction_item, Money};

use super::*;
use crate::{
    authz::TenantContext,
    catalog::{Catalog, ProductInput},
    test_support::{add_product, get_db, get_pooled_db, register_owner},
};

fn line(product_id: Uuid, quantity: i64, price_cents: Option<i64>) -> SaleLine {
    SaleLine { product_id, quantity, price_at_transaction: price_cents.map(Money::from_cents) }
}

fn paid(cents: i64) -> SaleHeader {
    SaleHeader { amount_received: Money::from_cents(cents), transaction_date: None, total_amount: None }
}

async fn stock_of(db: &DatabaseConnection, id: Uuid) -> anyhow::Result<i32> {
    Ok(product::Entity::find_by_id(id).one(db).await?.map(|p| p.stock_quantity).unwrap_or(i32::MIN))
}

async fn row_counts(db: &DatabaseConnection) -> anyhow::Result<(u64, u64)> {
    Ok((transaction::Entity::find().count(db).await?, transaction_item::Entity::find().count(db).await?))
}

#[tokio::test]
async fn records_sale_and_decrements_stock() -> anyhow::Result<()> {
    let db = get_db().await?;
    let ctx = register_owner(&db, "Alice", "alice").await?;
    let p1 = add_product(&db, &ctx, "Coffee Beans 1kg", 1550, Some("SKU-1001"), 100).await?;
    let p2 = add_product(&db, &ctx, "Milk 1L", 120, Some("SKU-1002"), 200).await?;
    let recorder = SaleRecorder::new(db.clone(), SalesPolicy::default());

    let id = recorder
        .record_sale(&ctx, paid(2000), vec![line(p1.id, 1, Some(1550)), line(p2.id, 2, Some(120))])
        .await?;

    let header = recorder.get_transaction(&ctx, id).await?;
    assert_eq!(header.total_amount, Money::from_cents(1790));
    assert_eq!(header.change, Money::from_cents(210));
    assert_eq!(header.user_id, ctx.user_id);
    assert_eq!(stock_of(&db, p1.id).await?, 99);
    assert_eq!(stock_of(&db, p2.id).await?, 198);

    let items = recorder.get_transaction_items(&ctx, id).await?;
    let summary: Vec<_> = items.iter().map(|i| (i.line_no, i.product_name.as_str(), i.quantity)).collect();
    assert_eq!(summary, vec![(1, "Coffee Beans 1kg", 1), (2, "Milk 1L", 2)]);
    Ok(())
}

#[tokio::test]
async fn catalog_price_applies_and_is_captured() -> anyhow::Result<()> {
    let db = get_db().await?;
    let ctx = register_owner(&db, "Alice", "alice").await?;
    let sugar = add_product(&db, &ctx, "Sugar 500g", 80, None, 10).await?;
    let recorder = SaleRecorder::new(db.clone(), SalesPolicy::default());

    let id = recorder.record_sale(&ctx, paid(500), vec![line(sugar.id, 3, None)]).await?;
    Catalog::new(db.clone())
        .update(&ctx, sugar.id, ProductInput { name: "Sugar 500g".into(), price: Money::from_cents(95), sku: None, stock_quantity: 7 })
        .await?;

    let items = recorder.get_transaction_items(&ctx, id).await?;
    assert_eq!(items[0].price_at_transaction, Money::from_cents(80));
    assert_eq!(recorder.get_transaction(&ctx, id).await?.total_amount, Money::from_cents(240));
    Ok(())
}

#[tokio::test]
async fn repeated_product_lines_are_summed() -> anyhow::Result<()> {
    let db = get_db().await?;
    let ctx = register_owner(&db, "Alice", "alice").await?;
    let milk = add_product(&db, &ctx, "Milk 1L", 120, None, 3).await?;
    let recorder = SaleRecorder::new(db.clone(), SalesPolicy::default());

    let err = recorder
        .record_sale(&ctx, paid(1000), vec![line(milk.id, 2, None), line(milk.id, 2, None)])
        .await
        .unwrap_err();
    assert!(matches!(err, SaleError::InsufficientStock { requested: 4, .. }));

    recorder.record_sale(&ctx, paid(1000), vec![line(milk.id, 1, None), line(milk.id, 2, None)]).await?;
    assert_eq!(stock_of(&db, milk.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn foreign_product_is_unknown_and_nothing_is_written() -> anyhow::Result<()> {
    let db = get_db().await?;
    let a = register_owner(&db, "Alice", "alice").await?;
    let b = register_owner(&db, "Bob", "bob").await?;
    let mine = add_product(&db, &a, "Milk 1L", 120, None, 10).await?;
    let theirs = add_product(&db, &b, "Sugar 500g", 80, None, 10).await?;
    let recorder = SaleRecorder::new(db.clone(), SalesPolicy::default());

    let err = recorder
        .record_sale(&a, paid(1000), vec![line(mine.id, 1, None), line(theirs.id, 1, None)])
        .await
        .unwrap_err();
    assert!(matches!(err, SaleError::UnknownProduct { product_id } if product_id == theirs.id));
    assert!(err.is_validation());
    assert_eq!(row_counts(&db).await?, (0, 0));
    assert_eq!(stock_of(&db, mine.id).await?, 10);
    assert_eq!(stock_of(&db, theirs.id).await?, 10);
    Ok(())
}

#[tokio::test]
async fn stock_failure_on_last_line_rolls_back_everything() -> anyhow::Result<()> {
    let db = get_db().await?;
    let ctx = register_owner(&db, "Alice", "alice").await?;
    let plenty = add_product(&db, &ctx, "Coffee Beans 1kg", 1550, None, 100).await?;
    let scarce = add_product(&db, &ctx, "Milk 1L", 120, None, 1).await?;
    let recorder = SaleRecorder::new(db.clone(), SalesPolicy::default());

    let err = recorder
        .record_sale(&ctx, paid(10_000), vec![line(plenty.id, 5, None), line(scarce.id, 2, None)])
        .await
        .unwrap_err();
    assert!(matches!(err, SaleError::InsufficientStock { product_id, requested: 2 } if product_id == scarce.id));
    assert_eq!(row_counts(&db).await?, (0, 0));
    assert_eq!(stock_of(&db, plenty.id).await?, 100);
    assert_eq!(stock_of(&db, scarce.id).await?, 1);
    Ok(())
}

#[tokio::test]
async fn backorder_policy_allows_negative_stock() -> anyhow::Result<()> {
    let db = get_db().await?;
    let ctx = register_owner(&db, "Alice", "alice").await?;
    let milk = add_product(&db, &ctx, "Milk 1L", 120, None, 1).await?;
    let policy = SalesPolicy { stock_policy: StockPolicy::Backorder, ..SalesPolicy::default() };
    let recorder = SaleRecorder::new(db.clone(), policy);

    recorder.record_sale(&ctx, paid(1000), vec![line(milk.id, 3, None)]).await?;
    assert_eq!(stock_of(&db, milk.id).await?, -2);
    Ok(())
}

#[tokio::test]
async fn submitted_total_is_cross_checked() -> anyhow::Result<()> {
    let db = get_db().await?;
    let ctx = register_owner(&db, "Alice", "alice").await?;
    let milk = add_product(&db, &ctx, "Milk 1L", 120, None, 10).await?;
    let recorder = SaleRecorder::new(db.clone(), SalesPolicy::default());

    let header = |total| SaleHeader {
        amount_received: Money::from_cents(500),
        transaction_date: None,
        total_amount: Some(Money::from_cents(total)),
    };
    let err = recorder.record_sale(&ctx, header(250), vec![line(milk.id, 2, None)]).await.unwrap_err();
    assert!(matches!(
        err,
        SaleError::TotalMismatch { submitted, computed }
            if submitted == Money::from_cents(250) && computed == Money::from_cents(240)
    ));

    // one cent of rounding slack
    let id = recorder.record_sale(&ctx, header(241), vec![line(milk.id, 2, None)]).await?;
    assert_eq!(recorder.get_transaction(&ctx, id).await?.total_amount, Money::from_cents(240));
    Ok(())
}

#[tokio::test]
async fn underpayment_is_rejected() -> anyhow::Result<()> {
    let db = get_db().await?;
    let ctx = register_owner(&db, "Alice", "alice").await?;
    let coffee = add_product(&db, &ctx, "Coffee Beans 1kg", 1550, None, 10).await?;
    let recorder = SaleRecorder::new(db.clone(), SalesPolicy::default());

    let err = recorder.record_sale(&ctx, paid(1000), vec![line(coffee.id, 1, None)]).await.unwrap_err();
    assert!(matches!(err, SaleError::InsufficientPayment { .. }));
    assert_eq!(stock_of(&db, coffee.id).await?, 10);

    // exact payment leaves zero change
    let id = recorder.record_sale(&ctx, paid(1550), vec![line(coffee.id, 1, None)]).await?;
    assert_eq!(recorder.get_transaction(&ctx, id).await?.change, Money::ZERO);
    Ok(())
}

#[tokio::test]
async fn cart_shape_is_validated() -> anyhow::Result<()> {
    let db = get_db().await?;
    let ctx = register_owner(&db, "Alice", "alice").await?;
    let milk = add_product(&db, &ctx, "Milk 1L", 120, None, 10).await?;
    let recorder = SaleRecorder::new(db.clone(), SalesPolicy::default());

    assert!(matches!(recorder.record_sale(&ctx, paid(100), vec![]).await, Err(SaleError::EmptyCart)));
    for bad in [0, -1, i64::from(i32::MAX) + 1] {
        let err = recorder.record_sale(&ctx, paid(100), vec![line(milk.id, 1, None), line(milk.id, bad, None)]).await.unwrap_err();
        assert!(matches!(err, SaleError::InvalidQuantity { line_no: 2, quantity } if quantity == bad));
    }
    let err = recorder.record_sale(&ctx, paid(100), vec![line(milk.id, 1, Some(-5))]).await.unwrap_err();
    assert!(matches!(err, SaleError::InvalidPrice { line_no: 1 }));
    let oversized = vec![line(milk.id, 1, None); MAX_CART_LINES + 1];
    let err = recorder.record_sale(&ctx, paid(1_000_000), oversized).await.unwrap_err();
    assert!(matches!(err, SaleError::CartTooLarge { lines, max: MAX_CART_LINES } if lines == MAX_CART_LINES + 1));
    assert_eq!(row_counts(&db).await?, (0, 0));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sales_never_oversell() -> anyhow::Result<()> {
    let db = get_db().await?;
    let ctx = register_owner(&db, "Alice", "alice").await?;
    let milk = add_product(&db, &ctx, "Milk 1L", 120, None, 5).await?;
    let recorder = Arc::new(SaleRecorder::new(db.clone(), SalesPolicy::default()));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let recorder = recorder.clone();
            tokio::spawn(async move { recorder.record_sale(&ctx, paid(200), vec![line(milk.id, 1, None)]).await })
        })
        .collect();
    let mut ok = 0;
    for h in handles {
        match h.await? {
            Ok(_) => ok += 1,
            Err(SaleError::InsufficientStock { .. }) => {}
            Err(e) => anyhow::bail!("unexpected error: {e}"),
        }
    }
    assert_eq!(ok, 5);
    assert_eq!(stock_of(&db, milk.id).await?, 0);
    assert_eq!(transaction::Entity::find().count(&db).await?, 5);
    Ok(())
}

/// Fire `n` single-unit sales at once and sort the outcomes into
/// (committed, refused for stock, storage conflicts).
async fn race_sales(recorder: Arc<SaleRecorder>, ctx: TenantContext, product_id: Uuid, n: usize) -> anyhow::Result<(i32, i32, i32)> {
    let handles: Vec<_> = (0..n)
        .map(|_| {
            let recorder = recorder.clone();
            tokio::spawn(async move { recorder.record_sale(&ctx, paid(200), vec![line(product_id, 1, None)]).await })
        })
        .collect();
    let (mut ok, mut no_stock, mut busy) = (0, 0, 0);
    for h in handles {
        match h.await? {
            Ok(_) => ok += 1,
            Err(SaleError::InsufficientStock { .. }) => no_stock += 1,
            // SQLite refuses one side of a write-lock upgrade race; the sale rolls back
            Err(SaleError::Storage { .. }) => busy += 1,
            Err(e) => anyhow::bail!("unexpected error: {e}"),
        }
    }
    Ok((ok, no_stock, busy))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pooled_sales_interleave_without_overselling() -> anyhow::Result<()> {
    let (_dir, db) = get_pooled_db(4).await?;
    let ctx = register_owner(&db, "Alice", "alice").await?;
    let milk = add_product(&db, &ctx, "Milk 1L", 120, None, 5).await?;
    let recorder = Arc::new(SaleRecorder::new(db.clone(), SalesPolicy::default()));

    let (ok, no_stock, busy) = race_sales(recorder, ctx, milk.id, 12).await?;
    assert_eq!(ok + no_stock + busy, 12);
    assert!(ok >= 1 && ok <= 5, "committed {ok}");
    assert_eq!(stock_of(&db, milk.id).await?, 5 - ok);
    assert_eq!(transaction::Entity::find().count(&db).await?, ok as u64);
    assert_eq!(transaction_item::Entity::find().count(&db).await?, ok as u64);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pooled_backorder_sales_sum_their_decrements() -> anyhow::Result<()> {
    let (_dir, db) = get_pooled_db(4).await?;
    let ctx = register_owner(&db, "Alice", "alice").await?;
    let milk = add_product(&db, &ctx, "Milk 1L", 120, None, 3).await?;
    let policy = SalesPolicy { stock_policy: StockPolicy::Backorder, ..SalesPolicy::default() };
    let recorder = Arc::new(SaleRecorder::new(db.clone(), policy));

    let (ok, no_stock, _busy) = race_sales(recorder, ctx, milk.id, 10).await?;
    assert_eq!(no_stock, 0);
    assert!(ok >= 1);
    // every committed sale took exactly one unit, none were lost or doubled
    assert_eq!(stock_of(&db, milk.id).await?, 3 - ok);
    assert_eq!(transaction::Entity::find().count(&db).await?, ok as u64);
    Ok(())
}

#[tokio::test]
async fn delete_restores_stock() -> anyhow::Result<()> {
    let db = get_db().await?;
    let ctx = register_owner(&db, "Alice", "alice").await?;
    let other = register_owner(&db, "Bob", "bob").await?;
    let coffee = add_product(&db, &ctx, "Coffee Beans 1kg", 1550, None, 100).await?;
    let milk = add_product(&db, &ctx, "Milk 1L", 120, None, 200).await?;
    let recorder = SaleRecorder::new(db.clone(), SalesPolicy::default());
    let id = recorder
        .record_sale(&ctx, paid(2000), vec![line(coffee.id, 1, None), line(milk.id, 2, None)])
        .await?;

    assert!(matches!(recorder.delete_transaction(&other, id).await, Err(SaleError::NotFound)));
    assert_eq!(row_counts(&db).await?, (1, 2));

    recorder.delete_transaction(&ctx, id).await?;
    assert_eq!(row_counts(&db).await?, (0, 0));
    assert_eq!(stock_of(&db, coffee.id).await?, 100);
    assert_eq!(stock_of(&db, milk.id).await?, 200);
    assert!(matches!(recorder.delete_transaction(&ctx, id).await, Err(SaleError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn listing_is_scoped_and_newest_first() -> anyhow::Result<()> {
    let db = get_db().await?;
    let ctx = register_owner(&db, "Alice", "alice").await?;
    let other = register_owner(&db, "Bob", "bob").await?;
    let milk = add_product(&db, &ctx, "Milk 1L", 120, None, 100).await?;
    let recorder = SaleRecorder::new(db.clone(), SalesPolicy::default());

    let mut ids = Vec::new();
    for days_ago in [3, 1, 2] {
        let header = SaleHeader {
            amount_received: Money::from_cents(120),
            transaction_date: Some(Utc::now() - Duration::days(days_ago)),
            total_amount: None,
        };
        ids.push(recorder.record_sale(&ctx, header, vec![line(milk.id, 1, None)]).await?);
    }

    let listed: Vec<Uuid> = recorder.list_transactions(&ctx, None).await?.into_iter().map(|t| t.id).collect();
    assert_eq!(listed, vec![ids[1], ids[2], ids[0]]);
    let page = recorder.list_transactions(&ctx, Some(Pagination { page: 2, per_page: 2 })).await?;
    assert_eq!(page.len(), 1);
    assert!(recorder.list_transactions(&other, None).await?.is_empty());
    assert!(matches!(recorder.get_transaction(&other, ids[0]).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(recorder.get_transaction_items(&other, ids[0]).await, Err(ServiceError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn items_survive_product_deletion() -> anyhow::Result<()> {
    let db = get_db().await?;
    let ctx = register_owner(&db, "Alice", "alice").await?;
    let milk = add_product(&db, &ctx, "Milk 1L", 120, None, 10).await?;
    let recorder = SaleRecorder::new(db.clone(), SalesPolicy::default());
    let id = recorder.record_sale(&ctx, paid(120), vec![line(milk.id, 1, None)]).await?;

    Catalog::new(db.clone()).delete(&ctx, milk.id).await?;
    let items = recorder.get_transaction_items(&ctx, id).await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id, milk.id);
    assert_eq!(items[0].product_name, "");

    // deleting the sale still works with the product gone
    recorder.delete_transaction(&ctx, id).await?;
    Ok(())
}
