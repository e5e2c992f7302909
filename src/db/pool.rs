use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;

/// 创建门店数据库连接池
///
/// 价目表在启动时整体加载，请求路径上只有未缓存门店的查询会用到连接。
pub async fn create_pool(url: &str, database: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    // 价目查询都是主键 / 单表扫描，超过阈值即视为异常
    let connect_options = PgConnectOptions::from_str(url)?
        .log_slow_statements(tracing::log::LevelFilter::Warn, database.slow_statement());

    PgPoolOptions::new()
        .max_connections(database.max_connections)
        .min_connections(0)
        .idle_timeout(database.idle_timeout())
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(connect_options)
        .await
}
