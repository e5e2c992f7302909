use billsmart::{
    api, create_pool, db,
    service::{
        BillingService, CatalogRegistry, Classifier, Detector, FileStore, FixedClassifier,
        HttpDetector, PriceCatalog, RandomClassifier, StaticDetector,
    },
    AppConfig, AppState,
};
use billsmart::config::ClassifierMode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 价目表：内置 / JSON 文件，可选再从数据库覆盖
    let catalog = match &config.catalog.path {
        Some(path) => PriceCatalog::from_json_file(path)?,
        None => PriceCatalog::builtin(),
    };
    info!("Catalog for {} loaded: {} items", config.store.name, catalog.len());
    let catalogs = Arc::new(CatalogRegistry::new(config.store.name.clone(), catalog));

    let pool = match &config.database.url {
        Some(url) => {
            let pool = create_pool(url, &config.database).await?;
            info!("Database pool created");
            db::ensure_schema(&pool).await?;
            for (store, catalog) in db::load_all_catalogs(&pool).await? {
                info!("Catalog for {} loaded from database: {} items", store, catalog.len());
                catalogs.replace(store, catalog);
            }
            Some(pool)
        }
        None => None,
    };

    // 检测器
    let detector: Arc<dyn Detector> = match &config.detector.url {
        Some(url) => {
            info!("Using detector sidecar at {}", url);
            Arc::new(HttpDetector::new(
                url.clone(),
                config.detector.labels.clone(),
                config.detector.timeout(),
            )?)
        }
        None => {
            warn!("No detector configured, every image yields no detections");
            Arc::new(StaticDetector::default())
        }
    };

    // 视频分级
    let classifier: Arc<dyn Classifier> = match config.classifier.mode {
        ClassifierMode::Fixed => Arc::new(FixedClassifier::new(config.classifier.fixed_label)),
        ClassifierMode::Random => Arc::new(RandomClassifier::new(config.classifier.delay())),
    };

    let files = FileStore::open(&config.storage).await?;
    let billing = Arc::new(BillingService::new(
        catalogs,
        detector,
        &config.billing,
        config.store.clone(),
    ));

    let state = AppState {
        billing,
        classifier,
        files,
        db: pool,
    };
    let app = api::router(state, config.server.max_upload_mb * 1024 * 1024);

    // 启动服务器
    let addr = config.server_addr();
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST   /process_image/        - recognize items in an image");
    info!("  POST   /generate_bill/        - PDF bill");
    info!("  POST   /generate_bill/csv     - CSV bill");
    info!("  GET    /download_bill/:id     - saved PDF bill");
    info!("  GET    /stores, /stores/:name/catalog - store catalogs");
    info!("  POST   /upload/               - upload + classify video");
    info!("  GET    /videos/, /video/:name - list / fetch videos");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
