use bigdecimal::BigDecimal;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::models::{StoreItem, StoreModel, StoreRecord};
use crate::service::catalog::PriceCatalog;

/// 建表 (幂等)
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS store_models (
            id          BIGSERIAL PRIMARY KEY,
            filename    VARCHAR NOT NULL,
            data        BYTEA NOT NULL,
            uploaded_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS stores (
            name     VARCHAR PRIMARY KEY,
            address  VARCHAR NOT NULL,
            model_id BIGINT REFERENCES store_models(id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS store_items (
            store_name VARCHAR NOT NULL REFERENCES stores(name) ON DELETE CASCADE,
            item_name  VARCHAR NOT NULL,
            price      NUMERIC(12, 2) NOT NULL CHECK (price >= 0),
            PRIMARY KEY (store_name, item_name)
        )
        "#,
    ];

    for sql in statements {
        sqlx::query(sql).execute(pool).await?;
    }
    Ok(())
}

/// 查询门店
pub async fn get_store(pool: &PgPool, name: &str) -> Result<Option<StoreRecord>, sqlx::Error> {
    sqlx::query_as::<_, StoreRecord>(
        r#"
        SELECT name, address, model_id
        FROM stores
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await
}

/// 查询门店价目行
pub async fn list_store_items(pool: &PgPool, store_name: &str) -> Result<Vec<StoreItem>, sqlx::Error> {
    sqlx::query_as::<_, StoreItem>(
        r#"
        SELECT store_name, item_name, price
        FROM store_items
        WHERE store_name = $1
        ORDER BY item_name
        "#,
    )
    .bind(store_name)
    .fetch_all(pool)
    .await
}

/// 一次性加载所有门店价目表，按门店分组
pub async fn load_all_catalogs(pool: &PgPool) -> Result<HashMap<String, PriceCatalog>, sqlx::Error> {
    let rows = sqlx::query_as::<_, StoreItem>(
        r#"
        SELECT store_name, item_name, price
        FROM store_items
        ORDER BY store_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<String, Vec<StoreItem>> = HashMap::new();
    for row in rows {
        grouped.entry(row.store_name.clone()).or_default().push(row);
    }

    Ok(grouped
        .into_iter()
        .map(|(store, items)| (store, PriceCatalog::from_store_items(&items)))
        .collect())
}

/// 上传模型文件，返回模型 ID
pub async fn insert_model(pool: &PgPool, filename: &str, data: &[u8]) -> Result<StoreModel, sqlx::Error> {
    sqlx::query_as::<_, StoreModel>(
        r#"
        INSERT INTO store_models (filename, data)
        VALUES ($1, $2)
        RETURNING id, filename, uploaded_at
        "#,
    )
    .bind(filename)
    .bind(data)
    .fetch_one(pool)
    .await
}

/// 更新或插入门店及其价目表 (整表替换)
pub async fn upsert_store(
    pool: &PgPool,
    store: &StoreRecord,
    items: &[(String, BigDecimal)],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO stores (name, address, model_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO UPDATE
        SET address = EXCLUDED.address,
            model_id = EXCLUDED.model_id
        "#,
    )
    .bind(&store.name)
    .bind(&store.address)
    .bind(store.model_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM store_items WHERE store_name = $1")
        .bind(&store.name)
        .execute(&mut *tx)
        .await?;

    if !items.is_empty() {
        let mut query_builder =
            sqlx::QueryBuilder::new("INSERT INTO store_items (store_name, item_name, price) ");
        query_builder.push_values(items, |mut b, (item_name, price)| {
            b.push_bind(&store.name)
                .push_bind(item_name)
                .push_bind(price.clone());
        });
        let result = query_builder.build().execute(&mut *tx).await?;
        tracing::info!("✓ {} price rows written for {}", result.rows_affected(), store.name);
    }

    tx.commit().await
}
