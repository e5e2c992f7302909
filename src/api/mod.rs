pub mod handlers;

pub use handlers::*;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    middleware,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;

use crate::service::{BillingService, Classifier, FileStore};

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub billing: Arc<BillingService>,
    pub classifier: Arc<dyn Classifier>,
    pub files: FileStore,
    /// 未缓存门店的价目表按需从数据库读取
    pub db: Option<PgPool>,
}

/// 构建路由
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    // 账单相关
    let billing_routes = Router::new()
        .route("/process_image/", post(process_image))
        .route("/generate_bill/", post(generate_bill))
        .route("/generate_bill/csv", post(generate_bill_csv))
        .route("/download_bill/:bill_id", get(download_bill))
        .route("/catalog", get(get_catalog))
        .route("/stores", get(list_stores))
        .route("/stores/:store/catalog", get(get_store_catalog));

    // 视频相关
    let video_routes = Router::new()
        .route("/upload/", post(upload_video))
        .route("/videos/", get(list_videos))
        .route("/video/:filename", get(get_video).delete(delete_video));

    Router::new()
        .route("/", get(read_root))
        .route("/health", get(health_check))
        .merge(billing_routes)
        .merge(video_routes)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(max_upload_bytes))
                .layer(middleware::map_response(allow_any_origin)),
        )
}

/// 前端跨域访问
async fn allow_any_origin(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}
