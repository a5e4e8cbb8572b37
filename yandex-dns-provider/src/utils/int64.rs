//! int64 字段序列化/反序列化工具
//!
//! Yandex Cloud 的 REST 网关按 proto3 JSON 规则把 int64 编码为字符串：
//! - 序列化: `u64` -> `"300"`
//! - 反序列化: `"300"` 或 `300` -> `u64`

use serde::{Deserialize, Deserializer, Serializer};

/// 序列化为十进制字符串
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

/// 反序列化：支持字符串或数字，缺省为 0
pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::String(s)) => s
            .trim()
            .parse()
            .map_err(|e| Error::custom(format!("Invalid int64 string '{s}': {e}"))),
        Some(StringOrNumber::Number(n)) => Ok(n),
        None => Ok(0),
    }
}
