//! 上传门店模型文件并写入门店价目表
//!
//! 用法: `load-db <门店名> <模型文件> [<价目表.json>]`

use bigdecimal::BigDecimal;
use billsmart::{create_pool, db, models::StoreRecord, AppConfig, PriceCatalog};
use std::path::Path;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

/// 未提供价目表时写入的示例价格
const SAMPLE_ITEMS: [(&str, i64); 3] = [("Apple", 50), ("Banana", 20), ("Milk", 60)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (store_name, model_path, catalog_path) = match args.as_slice() {
        [store, model] => (store.clone(), model.clone(), None),
        [store, model, catalog] => (store.clone(), model.clone(), Some(catalog.clone())),
        _ => {
            return Err("usage: load-db <store-name> <model-path> [<catalog.json>]".into());
        }
    };

    let config = AppConfig::load()?;
    let url = config
        .database
        .url
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .ok_or("database url not configured (BILLSMART_DATABASE__URL or DATABASE_URL)")?;

    let pool = create_pool(&url, &config.database).await?;
    db::ensure_schema(&pool).await?;
    info!("✅ Connected to database");

    // 模型文件
    let data = tokio::fs::read(&model_path).await?;
    let filename = format!("{}_model.pt", store_name);
    let model = db::insert_model(&pool, &filename, &data).await?;
    info!("model {} uploaded ({} bytes), id {}", model.filename, data.len(), model.id);

    // 价目表
    let mut items: Vec<(String, BigDecimal)> = match catalog_path {
        Some(path) => PriceCatalog::from_json_file(Path::new(&path))?
            .iter()
            .map(|(name, price)| (name.clone(), price.clone()))
            .collect(),
        None => SAMPLE_ITEMS
            .iter()
            .map(|(name, price)| (name.to_string(), BigDecimal::from(*price)))
            .collect(),
    };
    items.sort_by(|a, b| a.0.cmp(&b.0));

    let store = StoreRecord {
        name: store_name.clone(),
        address: config.store.address.clone(),
        model_id: Some(model.id),
    };
    db::upsert_store(&pool, &store, &items).await?;

    info!("✅ Model stored for {} with ID: {}", store_name, model.id);
    Ok(())
}
