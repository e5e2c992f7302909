use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 门店主表 (stores)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StoreRecord {
    pub name: String,
    pub address: String,
    pub model_id: Option<i64>,
}

/// 门店价目表 (store_items)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StoreItem {
    pub store_name: String,
    pub item_name: String,
    pub price: BigDecimal,
}

/// 模型文件元信息 (store_models，不含二进制内容)
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StoreModel {
    pub id: i64,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
}
