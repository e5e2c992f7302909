use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

use crate::error::BillingError;
use crate::models::amount;

/// 账单明细行 (商品名, 数量, 单价)
///
/// 字段私有，只能通过 [`LineItem::new`] 构造，保证 `count >= 1` 且单价非负。
/// JSON 形态沿用前端的 `{name, count, price}`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LineItemWire", into = "LineItemWire")]
pub struct LineItem {
    name: String,
    count: u32,
    unit_price: BigDecimal,
}

impl LineItem {
    pub fn new(
        name: impl Into<String>,
        count: u32,
        unit_price: BigDecimal,
    ) -> Result<Self, BillingError> {
        let name = name.into();
        if count == 0 {
            return Err(BillingError::InvalidLineItem {
                name,
                reason: "count must be at least 1".to_string(),
            });
        }
        if unit_price < BigDecimal::zero() {
            return Err(BillingError::InvalidLineItem {
                name,
                reason: format!("negative unit price {}", unit_price),
            });
        }
        Ok(Self {
            name,
            count,
            unit_price,
        })
    }

    /// 检测结果生成的明细：数量固定为 1
    pub(crate) fn single(name: impl Into<String>, unit_price: BigDecimal) -> Self {
        Self {
            name: name.into(),
            count: 1,
            unit_price,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn unit_price(&self) -> &BigDecimal {
        &self.unit_price
    }

    /// 小计 = 数量 × 单价
    pub fn extended(&self) -> BigDecimal {
        BigDecimal::from(self.count) * &self.unit_price
    }

    pub(crate) fn increment(&mut self) {
        self.count += 1;
    }
}

/// 线上格式：数量允许为 0 / 负数以便给出明确的校验错误，而不是反序列化失败
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LineItemWire {
    name: String,
    count: i64,
    #[serde(serialize_with = "amount::serialize")]
    price: BigDecimal,
}

impl TryFrom<LineItemWire> for LineItem {
    type Error = BillingError;

    fn try_from(wire: LineItemWire) -> Result<Self, Self::Error> {
        let count = u32::try_from(wire.count).map_err(|_| BillingError::InvalidLineItem {
            name: wire.name.clone(),
            reason: format!("invalid count {}", wire.count),
        })?;
        LineItem::new(wire.name, count, wire.price)
    }
}

impl From<LineItem> for LineItemWire {
    fn from(item: LineItem) -> Self {
        Self {
            name: item.name,
            count: i64::from(item.count),
            price: item.unit_price,
        }
    }
}

/// 检测器输出的单条结果 (类别名 + 置信度)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_name: String,
    pub confidence: f32,
}

impl Detection {
    pub fn new(class_name: impl Into<String>, confidence: f32) -> Self {
        Self {
            class_name: class_name.into(),
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_count() {
        let err = LineItem::new("Lays", 0, BigDecimal::from(20)).unwrap_err();
        assert!(matches!(err, BillingError::InvalidLineItem { .. }));
    }

    #[test]
    fn rejects_negative_price() {
        assert!(LineItem::new("Lays", 1, BigDecimal::from(-1)).is_err());
    }

    #[test]
    fn zero_price_is_valid() {
        let item = LineItem::new("Unknown", 3, BigDecimal::zero()).unwrap();
        assert_eq!(item.extended(), BigDecimal::zero());
    }

    #[test]
    fn deserializes_client_shape() {
        let item: LineItem =
            serde_json::from_str(r#"{"name":"Bottle","count":2,"price":10}"#).unwrap();
        assert_eq!(item.name(), "Bottle");
        assert_eq!(item.count(), 2);
        assert_eq!(item.extended(), BigDecimal::from(20));
    }

    #[test]
    fn price_goes_out_as_json_number() {
        let item = LineItem::new("Fanta", 1, BigDecimal::from(45)).unwrap();
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value, serde_json::json!({"name": "Fanta", "count": 1, "price": 45}));
        assert!(value["price"].is_number());
    }

    #[test]
    fn fractional_price_stays_exact() {
        let item: LineItem =
            serde_json::from_str(r#"{"name":"Cheese","count":3,"price":19.99}"#).unwrap();
        assert_eq!(item.extended().to_string(), "59.97");
        assert_eq!(serde_json::to_value(&item).unwrap()["price"], serde_json::json!(19.99));
    }

    #[test]
    fn deserialize_rejects_negative_count() {
        let res = serde_json::from_str::<LineItem>(r#"{"name":"Bottle","count":-2,"price":10}"#);
        assert!(res.is_err());
    }
}
