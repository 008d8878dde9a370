use serde::{Deserialize, Deserializer};

/// 区分“字段缺省”和“显式置空”
///
/// 配合 `#[serde(default, deserialize_with = "double_option")]` 使用：
/// - 字段缺省 -> `None`（保持原值）
/// - 字段为 null -> `Some(None)`（清空）
/// - 字段有值 -> `Some(Some(v))`
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
