use serde::{Deserialize, Serialize};

// 实体状态（教师、学生、班级、优惠码、选课记录共用）
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    #[default]
    Active, // 启用
    Inactive, // 停用
}

impl EntityStatus {
    pub const ACTIVE: &'static str = "active";
    pub const INACTIVE: &'static str = "inactive";

    pub fn is_active(&self) -> bool {
        matches!(self, EntityStatus::Active)
    }
}

impl<'de> Deserialize<'de> for EntityStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<EntityStatus>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的状态: '{s}'. 支持的状态: active, inactive"
            ))
        })
    }
}

impl std::fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityStatus::Active => write!(f, "{}", EntityStatus::ACTIVE),
            EntityStatus::Inactive => write!(f, "{}", EntityStatus::INACTIVE),
        }
    }
}

impl std::str::FromStr for EntityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            EntityStatus::ACTIVE => Ok(EntityStatus::Active),
            EntityStatus::INACTIVE => Ok(EntityStatus::Inactive),
            _ => Err(format!("Invalid status: {s}")),
        }
    }
}
