use bigdecimal::BigDecimal;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use std::str::FromStr;

/// 金额以 JSON 数字输出 (前端按 `number` 读取)，内部计算仍使用 `BigDecimal`
pub fn serialize<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    let number = serde_json::Number::from_str(&value.to_string()).map_err(S::Error::custom)?;
    number.serialize(serializer)
}

/// 用于 map / 序列中的金额
pub struct AsNumber<'a>(pub &'a BigDecimal);

impl Serialize for AsNumber<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize(self.0, serializer)
    }
}
