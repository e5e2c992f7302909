use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::AgeRestriction;
use crate::service::catalog::DEFAULT_PRICE_LIST;
use crate::service::normalizer::DEFAULT_CONFIDENCE_THRESHOLD;

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "BILLSMART_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "billsmart.toml";

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub billing: BillingConfig,
    pub storage: StorageConfig,
    pub detector: DetectorConfig,
    pub classifier: ClassifierConfig,
    pub database: DatabaseConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 单次上传上限 (MB)
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_mb: 100,
        }
    }
}

/// 小票抬头
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "XYZ Supermarket".to_string(),
            address: "123, Market Street, City".to_string(),
            phone: "9876543210".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    pub confidence_threshold: f32,
    /// 同名检测合并为一行
    pub merge_duplicates: bool,
    /// 没有识别到商品时返回演示数据
    pub placeholder_on_empty: bool,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            merge_duplicates: false,
            placeholder_on_empty: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub upload_dir: String,
    pub bill_dir: String,
    pub video_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: "uploads".to_string(),
            bill_dir: "bills".to_string(),
            video_dir: "video_storage".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// 推理 sidecar 地址；为空时不做识别
    pub url: Option<String>,
    /// 类别 id -> 商品名
    pub labels: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            url: None,
            labels: DEFAULT_PRICE_LIST.iter().map(|(name, _)| name.to_string()).collect(),
            timeout_secs: 30,
        }
    }
}

impl DetectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    Random,
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub mode: ClassifierMode,
    pub fixed_label: AgeRestriction,
    pub delay_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mode: ClassifierMode::Random,
            fixed_label: AgeRestriction::UR,
            delay_ms: 500,
        }
    }
}

impl ClassifierConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 设置后启动时从 Postgres 加载各门店价目表
    pub url: Option<String>,
    /// 只在启动加载和未缓存门店的查询时用到，连接数很小即可
    pub max_connections: u32,
    pub slow_statement_ms: u64,
    /// 空闲连接回收时间，请求路径上基本不访问数据库
    pub idle_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            slow_statement_ms: 500,
            idle_timeout_secs: 60,
        }
    }
}

impl DatabaseConfig {
    pub fn slow_statement(&self) -> Duration {
        Duration::from_millis(self.slow_statement_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON 价目表 `{"商品名": 单价}`，覆盖内置价目表
    ///
    /// 商品名原样保留 (含空白)，所以不放进 TOML / 环境变量。
    pub path: Option<String>,
}

impl AppConfig {
    /// 加载配置：默认值 < 配置文件 < 环境变量 (`BILLSMART_SERVER__PORT=9000`)
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("BILLSMART")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
