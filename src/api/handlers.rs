use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::AppState;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{LineItem, VideoList, VideoUpload};
use crate::service::{CsvReceipt, PdfReceipt, PriceCatalog, RenderedReceipt};

/// 识别结果响应体
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemsResponse {
    pub items: Vec<LineItem>,
}

/// 根路径
pub async fn read_root() -> Json<serde_json::Value> {
    Json(json!({ "BillSmart": "Welcome to BillSmart API" }))
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 上传商品图片，识别并返回明细
pub async fn process_image(State(state): State<AppState>, multipart: Multipart) -> AppResult<Json<ItemsResponse>> {
    let (filename, bytes) = read_file_field(multipart).await?;

    // 临时落盘，识别完成后删除
    let path = state.files.save_upload(filename.as_deref(), &bytes).await?;
    let result = state.billing.recognize(&bytes).await;
    state.files.remove_upload(&path).await;

    Ok(Json(ItemsResponse { items: result? }))
}

/// 根据明细生成 PDF 账单
pub async fn generate_bill(
    State(state): State<AppState>,
    payload: Result<Json<Vec<LineItem>>, JsonRejection>,
) -> AppResult<Response> {
    let Json(items) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let receipt = state.billing.render_bill(items, &PdfReceipt::new())?;
    let bill_id = state.files.save_bill(receipt.extension, &receipt.bytes).await?;
    Ok(receipt_response(receipt, "bill.pdf", Some(&bill_id)))
}

/// 根据明细生成 CSV 账单 (不落盘)
pub async fn generate_bill_csv(
    State(state): State<AppState>,
    payload: Result<Json<Vec<LineItem>>, JsonRejection>,
) -> AppResult<Response> {
    let Json(items) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let receipt = state.billing.render_bill(items, &CsvReceipt::new())?;
    Ok(receipt_response(receipt, "bill.csv", None))
}

/// 下载已生成的账单
pub async fn download_bill(State(state): State<AppState>, Path(bill_id): Path<String>) -> AppResult<Response> {
    let bytes = state.files.read_bill(&bill_id).await?;
    Ok(file_response(bytes, "application/pdf", &format!("Bill_{}.pdf", bill_id)))
}

/// 当前默认门店价目表
pub async fn get_catalog(State(state): State<AppState>) -> Json<PriceCatalog> {
    Json(state.billing.catalogs().snapshot().as_ref().clone())
}

/// 门店列表响应体
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreList {
    pub stores: Vec<String>,
}

/// 已加载价目表的门店
pub async fn list_stores(State(state): State<AppState>) -> Json<StoreList> {
    Json(StoreList {
        stores: state.billing.catalogs().store_names(),
    })
}

/// 指定门店价目表；注册表中没有时查数据库并缓存
pub async fn get_store_catalog(
    State(state): State<AppState>,
    Path(store): Path<String>,
) -> AppResult<Json<PriceCatalog>> {
    let catalogs = state.billing.catalogs();
    if let Some(catalog) = catalogs.store(&store) {
        return Ok(Json(catalog.as_ref().clone()));
    }

    let not_found = || AppError::NotFound(format!("Store {}", store));
    let pool = state.db.as_ref().ok_or_else(not_found)?;
    let record = db::get_store(pool, &store).await?.ok_or_else(not_found)?;

    let items = db::list_store_items(pool, &record.name).await?;
    let catalog = PriceCatalog::from_store_items(&items);
    tracing::info!("Catalog for {} loaded from database: {} items", record.name, catalog.len());
    catalogs.replace(record.name, catalog.clone());
    Ok(Json(catalog))
}

/// 上传视频并分级
pub async fn upload_video(State(state): State<AppState>, multipart: Multipart) -> AppResult<(StatusCode, Json<VideoUpload>)> {
    let (filename, bytes) = read_file_field(multipart).await?;
    let (name, path) = state.files.save_video(filename.as_deref(), &bytes).await?;
    let age_restriction = state.classifier.classify(&path).await;

    tracing::info!("video {} uploaded ({} bytes), classified {}", name, bytes.len(), age_restriction);

    Ok((
        StatusCode::CREATED,
        Json(VideoUpload {
            filename: name,
            age_restriction,
            message: "Video uploaded and classified successfully".to_string(),
        }),
    ))
}

pub async fn get_video(State(state): State<AppState>, Path(filename): Path<String>) -> AppResult<Response> {
    let bytes = state.files.read_video(&filename).await?;
    Ok(([(header::CONTENT_TYPE, "video/mp4")], bytes).into_response())
}

pub async fn list_videos(State(state): State<AppState>) -> AppResult<Json<VideoList>> {
    let videos = state.files.list_videos().await?;
    Ok(Json(VideoList { videos }))
}

pub async fn delete_video(State(state): State<AppState>, Path(filename): Path<String>) -> AppResult<StatusCode> {
    state.files.delete_video(&filename).await?;
    tracing::info!("video {} deleted", filename);
    Ok(StatusCode::NO_CONTENT)
}

/// 读取 multipart 中名为 `file` 的字段
async fn read_file_field(mut multipart: Multipart) -> AppResult<(Option<String>, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        return Ok((filename, bytes.to_vec()));
    }
    Err(AppError::BadRequest("missing multipart field `file`".to_string()))
}

fn receipt_response(receipt: RenderedReceipt, filename: &str, bill_id: Option<&str>) -> Response {
    let mut response = file_response(receipt.bytes, receipt.content_type, filename);
    if let Some(id) = bill_id.and_then(|id| HeaderValue::from_str(id).ok()) {
        response.headers_mut().insert("x-bill-id", id);
    }
    response
}

fn file_response(bytes: Vec<u8>, content_type: &'static str, filename: &str) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", filename);
    let mut response = (StatusCode::OK, bytes).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}
