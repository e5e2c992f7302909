use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::error::BillingError;
use crate::models::{amount, LineItem};
use crate::service::aggregator;

/// 账单：明细行 + 派生出的合计
///
/// `total` 只在构造时由明细计算，不单独存储或修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bill {
    lines: Vec<LineItem>,
    #[serde(serialize_with = "amount::serialize")]
    total: BigDecimal,
}

impl Bill {
    /// 从明细构建账单；空明细返回 [`BillingError::EmptyInput`]
    pub fn new(lines: Vec<LineItem>) -> Result<Self, BillingError> {
        let total = aggregator::compute_total(&lines)?;
        Ok(Self { lines, total })
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn total(&self) -> &BigDecimal {
        &self.total
    }
}
