use bigdecimal::{BigDecimal, Zero};

use crate::error::BillingError;
use crate::models::LineItem;

/// 合计 = Σ count × unit_price
///
/// 空明细是调用方错误 ([`BillingError::EmptyInput`])，与合计为 0 的合法账单区分开。
pub fn compute_total(lines: &[LineItem]) -> Result<BigDecimal, BillingError> {
    if lines.is_empty() {
        return Err(BillingError::EmptyInput);
    }

    let mut total = BigDecimal::zero();
    for line in lines {
        total += line.extended();
    }
    Ok(total)
}

/// 金额展示格式：四舍五入到两位小数
pub fn format_amount(amount: &BigDecimal) -> String {
    amount.round(2).with_scale(2).to_string()
}
