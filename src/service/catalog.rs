use bigdecimal::{BigDecimal, Zero};
use dashmap::DashMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::amount::AsNumber;
use crate::models::StoreItem;

/// 默认门店价目表 (注意 " Mixed Fruit" 带前导空格，是独立的商品键)
pub const DEFAULT_PRICE_LIST: [(&str, i64); 20] = [
    ("Bingo Mad Angles", 20),
    ("Bottle", 10),
    ("Cinthol", 30),
    ("Coconut water", 20),
    ("Colin", 115),
    ("Dark Fantasy", 50),
    ("Exo Soap", 20),
    ("Fanta", 45),
    ("Harpic", 95),
    ("India Gate - Feast Rozzana", 100),
    ("Lays", 20),
    ("Lotte Chocopie", 50),
    (" Mixed Fruit", 90),
    ("Moms magic", 10),
    ("Odonil", 20),
    ("Parle-G", 30),
    ("Quaker Oats", 135),
    ("Savlon Herbal", 165),
    ("Sprit", 45),
    ("Thums-up", 45),
];

/// 价目表：商品名 -> 单价，构造后只读
///
/// 键区分大小写和空白，未知商品单价为 0。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceCatalog {
    prices: HashMap<String, BigDecimal>,
}

impl PriceCatalog {
    pub fn new(prices: HashMap<String, BigDecimal>) -> Self {
        Self { prices }
    }

    pub fn builtin() -> Self {
        DEFAULT_PRICE_LIST
            .iter()
            .map(|(name, price)| (name.to_string(), BigDecimal::from(*price)))
            .collect()
    }

    /// 从数据库价目行构建
    pub fn from_store_items(items: &[StoreItem]) -> Self {
        items
            .iter()
            .map(|item| (item.item_name.clone(), item.price.clone()))
            .collect()
    }

    /// 从 JSON 文件 `{"商品名": 单价}` 加载，商品名原样保留
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let prices: HashMap<String, BigDecimal> = serde_json::from_str(&content)?;
        if let Some((name, price)) = prices.iter().find(|(_, p)| **p < BigDecimal::zero()) {
            return Err(AppError::BadRequest(format!("negative price {} for {:?}", price, name)));
        }
        Ok(Self::new(prices))
    }

    pub fn price_of(&self, name: &str) -> BigDecimal {
        self.prices.get(name).cloned().unwrap_or_else(BigDecimal::zero)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BigDecimal)> {
        self.prices.iter()
    }
}

/// `{"商品名": 单价}`，单价为 JSON 数字
impl Serialize for PriceCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.prices.iter().map(|(name, price)| (name, AsNumber(price))))
    }
}

impl FromIterator<(String, BigDecimal)> for PriceCatalog {
    fn from_iter<T: IntoIterator<Item = (String, BigDecimal)>>(iter: T) -> Self {
        Self {
            prices: iter.into_iter().collect(),
        }
    }
}

/// 门店价目表注册表
///
/// 每个门店保存一个 `Arc<PriceCatalog>` 快照，替换时整体换掉 `Arc`，
/// 正在处理的请求继续使用它拿到的旧快照，不会在一张账单里混用两个版本的价格。
#[derive(Debug)]
pub struct CatalogRegistry {
    default_store: String,
    catalogs: DashMap<String, Arc<PriceCatalog>>,
}

impl CatalogRegistry {
    pub fn new(default_store: impl Into<String>, catalog: PriceCatalog) -> Self {
        let default_store = default_store.into();
        let catalogs = DashMap::new();
        catalogs.insert(default_store.clone(), Arc::new(catalog));
        Self {
            default_store,
            catalogs,
        }
    }

    pub fn default_store(&self) -> &str {
        &self.default_store
    }

    /// 默认门店价目表快照
    pub fn snapshot(&self) -> Arc<PriceCatalog> {
        self.store(&self.default_store).unwrap_or_default()
    }

    pub fn store(&self, name: &str) -> Option<Arc<PriceCatalog>> {
        self.catalogs.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// 替换 (或新增) 门店价目表
    pub fn replace(&self, name: impl Into<String>, catalog: PriceCatalog) {
        self.catalogs.insert(name.into(), Arc::new(catalog));
    }

    pub fn store_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.catalogs.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_prices() {
        let catalog = PriceCatalog::builtin();
        assert_eq!(catalog.len(), 20);
        assert_eq!(catalog.price_of("Fanta"), BigDecimal::from(45));
        assert_eq!(catalog.price_of("Savlon Herbal"), BigDecimal::from(165));
    }

    #[test]
    fn unknown_name_prices_at_zero() {
        let catalog = PriceCatalog::builtin();
        assert_eq!(catalog.price_of("Caviar"), BigDecimal::zero());
        assert_eq!(catalog.price_of(""), BigDecimal::zero());
    }

    #[test]
    fn keys_are_whitespace_and_case_sensitive() {
        let catalog = PriceCatalog::builtin();
        assert_eq!(catalog.price_of(" Mixed Fruit"), BigDecimal::from(90));
        assert_eq!(catalog.price_of("Mixed Fruit"), BigDecimal::zero());
        assert_eq!(catalog.price_of("fanta"), BigDecimal::zero());
        assert_eq!(catalog.price_of("Fanta "), BigDecimal::zero());
    }

    #[test]
    fn loads_json_catalog_verbatim() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{" Mixed Fruit": 90, "Apple": "49.50"}"#).unwrap();

        let catalog = PriceCatalog::from_json_file(file.path()).unwrap();
        assert_eq!(catalog.price_of(" Mixed Fruit"), BigDecimal::from(90));
        assert_eq!(catalog.price_of("Mixed Fruit"), BigDecimal::zero());
        assert_eq!(catalog.price_of("Apple").to_string(), "49.50");
    }

    #[test]
    fn serializes_prices_as_numbers() {
        let catalog = PriceCatalog::from_iter([
            (" Mixed Fruit".to_string(), BigDecimal::from(90)),
            ("Apple".to_string(), "49.50".parse::<BigDecimal>().unwrap()),
        ]);
        let value = serde_json::to_value(&catalog).unwrap();
        assert_eq!(value[" Mixed Fruit"], serde_json::json!(90));
        assert_eq!(value["Apple"], serde_json::json!(49.5));
    }

    #[test]
    fn snapshot_survives_replacement() {
        let registry = CatalogRegistry::new(
            "XYZ Supermarket",
            PriceCatalog::from_iter([("Apple".to_string(), BigDecimal::from(50))]),
        );
        let before = registry.snapshot();

        registry.replace(
            "XYZ Supermarket",
            PriceCatalog::from_iter([("Apple".to_string(), BigDecimal::from(70))]),
        );

        assert_eq!(before.price_of("Apple"), BigDecimal::from(50));
        assert_eq!(registry.snapshot().price_of("Apple"), BigDecimal::from(70));
    }

    #[test]
    fn registry_lookup_by_store() {
        let registry = CatalogRegistry::new("XYZ Supermarket", PriceCatalog::builtin());
        registry.replace(
            "ABC Mart",
            PriceCatalog::from_iter([("Milk".to_string(), BigDecimal::from(60))]),
        );

        assert!(registry.store("Nowhere").is_none());
        let abc = registry.store("ABC Mart").unwrap();
        assert_eq!(abc.price_of("Milk"), BigDecimal::from(60));
        assert_eq!(registry.store_names(), vec!["ABC Mart", "XYZ Supermarket"]);
    }
}
