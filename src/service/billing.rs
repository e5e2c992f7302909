use bigdecimal::BigDecimal;
use std::sync::Arc;

use crate::config::{BillingConfig, StoreConfig};
use crate::error::{AppResult, BillingError};
use crate::models::{Bill, LineItem};
use crate::service::catalog::CatalogRegistry;
use crate::service::detector::Detector;
use crate::service::normalizer::{self, NormalizeOptions};
use crate::service::receipt::ReceiptFormatter;

/// 检测为空时返回的演示数据 (商品名, 数量, 单价)
const PLACEHOLDER_ITEMS: [(&str, u32, i64); 3] = [("Apple", 3, 50), ("Banana", 2, 20), ("Milk", 1, 60)];

pub fn placeholder_items() -> Result<Vec<LineItem>, BillingError> {
    PLACEHOLDER_ITEMS
        .iter()
        .map(|(name, count, price)| LineItem::new(*name, *count, BigDecimal::from(*price)))
        .collect()
}

/// 已渲染的小票
#[derive(Debug, Clone)]
pub struct RenderedReceipt {
    pub bill: Bill,
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub extension: &'static str,
}

/// 计费服务：识别 -> 归一化 -> 合计 -> 小票
pub struct BillingService {
    catalogs: Arc<CatalogRegistry>,
    detector: Arc<dyn Detector>,
    options: NormalizeOptions,
    placeholder_on_empty: bool,
    store: StoreConfig,
}

impl BillingService {
    pub fn new(
        catalogs: Arc<CatalogRegistry>,
        detector: Arc<dyn Detector>,
        billing: &BillingConfig,
        store: StoreConfig,
    ) -> Self {
        Self {
            catalogs,
            detector,
            options: NormalizeOptions {
                threshold: billing.confidence_threshold,
                merge_duplicates: billing.merge_duplicates,
            },
            placeholder_on_empty: billing.placeholder_on_empty,
            store,
        }
    }

    pub fn catalogs(&self) -> &CatalogRegistry {
        &self.catalogs
    }

    pub fn store(&self) -> &StoreConfig {
        &self.store
    }

    /// 识别图片中的商品并生成明细
    pub async fn recognize(&self, image: &[u8]) -> AppResult<Vec<LineItem>> {
        let detections = self.detector.detect(image).await?;
        // 整个请求使用同一个价目表快照
        let catalog = self.catalogs.snapshot();
        let items = normalizer::normalize_with(&detections, self.options, &catalog);

        tracing::info!(
            "recognized {} items from {} detections (threshold {})",
            items.len(),
            detections.len(),
            self.options.threshold
        );

        if items.is_empty() && self.placeholder_on_empty {
            tracing::info!("no items detected, returning placeholder items");
            return Ok(placeholder_items()?);
        }
        Ok(items)
    }

    /// 合计并渲染小票；空明细在渲染前即返回错误
    pub fn render_bill(
        &self,
        items: Vec<LineItem>,
        formatter: &dyn ReceiptFormatter,
    ) -> AppResult<RenderedReceipt> {
        let bill = Bill::new(items)?;
        let bytes = formatter.render(&bill, &self.store)?;
        tracing::info!(
            "rendered {} receipt: {} lines, total {}",
            formatter.extension(),
            bill.lines().len(),
            bill.total()
        );
        Ok(RenderedReceipt {
            bill,
            bytes,
            content_type: formatter.content_type(),
            extension: formatter.extension(),
        })
    }
}
