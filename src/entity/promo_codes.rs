//! 优惠码实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "promo_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub code: String,
    #[sea_orm(unique)]
    pub code_key: String, // 小写规范化后的 code
    pub description: Option<String>,
    pub discount_type: String,
    pub discount_value: f64,
    pub usage_limit: Option<i64>,
    pub usage_count: i64,
    pub start_date: Option<i64>,
    pub expiry_date: Option<i64>,
    pub applies_to_all_classes: bool,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::promo_code_classes::Entity")]
    PromoCodeClasses,
}

impl Related<super::promo_code_classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PromoCodeClasses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_promo_code(self) -> crate::models::promo_codes::entities::PromoCode {
        use crate::models::EntityStatus;
        use crate::models::promo_codes::entities::{DiscountType, PromoCode};
        use chrono::{DateTime, Utc};

        PromoCode {
            id: self.id,
            code: self.code,
            description: self.description,
            discount_type: self
                .discount_type
                .parse::<DiscountType>()
                .unwrap_or(DiscountType::Fixed),
            discount_value: self.discount_value,
            usage_limit: self.usage_limit,
            usage_count: self.usage_count,
            start_date: self
                .start_date
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            expiry_date: self
                .expiry_date
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            applies_to_all_classes: self.applies_to_all_classes,
            status: self
                .status
                .parse::<EntityStatus>()
                .unwrap_or(EntityStatus::Inactive),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
