use indexmap::IndexMap;

use crate::models::{Detection, LineItem};
use crate::service::catalog::PriceCatalog;

/// 默认置信度阈值 (严格大于才接受)
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// 检测结果归一化参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeOptions {
    pub threshold: f32,
    /// 同名商品合并为一行 (count += 1)；默认每次检测一行
    pub merge_duplicates: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            merge_duplicates: false,
        }
    }
}

/// 检测结果 -> 账单明细
///
/// 按检测器给出的顺序遍历，`confidence > threshold` 的检测各生成一行
/// `count = 1`、单价取自 `catalog` 的明细。输出顺序与输入顺序一致。
pub fn normalize(detections: &[Detection], threshold: f32, catalog: &PriceCatalog) -> Vec<LineItem> {
    accepted(detections, threshold)
        .map(|d| LineItem::single(d.class_name.clone(), catalog.price_of(&d.class_name)))
        .collect()
}

/// 同 [`normalize`]，但同名检测合并到首次出现的那一行
pub fn normalize_merged(
    detections: &[Detection],
    threshold: f32,
    catalog: &PriceCatalog,
) -> Vec<LineItem> {
    let mut merged: IndexMap<&str, LineItem> = IndexMap::new();
    for d in accepted(detections, threshold) {
        merged
            .entry(d.class_name.as_str())
            .and_modify(|line| line.increment())
            .or_insert_with(|| LineItem::single(d.class_name.clone(), catalog.price_of(&d.class_name)));
    }
    merged.into_values().collect()
}

pub fn normalize_with(
    detections: &[Detection],
    options: NormalizeOptions,
    catalog: &PriceCatalog,
) -> Vec<LineItem> {
    if options.merge_duplicates {
        normalize_merged(detections, options.threshold, catalog)
    } else {
        normalize(detections, options.threshold, catalog)
    }
}

fn accepted(detections: &[Detection], threshold: f32) -> impl Iterator<Item = &Detection> {
    detections.iter().filter(move |d| d.confidence > threshold)
}
