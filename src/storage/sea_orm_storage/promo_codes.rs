//! 优惠码仓储

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use tracing::{debug, info};

use super::query::{
    CREATED_FROM, CREATED_TO, apply_search, created_range, fetch_page, parse_filter,
    resolve_sort, unsupported_filter,
};
use super::relationships::RelationshipManager;
use super::{ensure_unique, write_error};
use crate::entity::promo_code_classes::{Column as PromoClassColumn, Entity as PromoCodeClasses};
use crate::entity::promo_codes::{ActiveModel, Column, Entity as PromoCodes, Model};
use crate::errors::{Result, SchoolError};
use crate::models::{
    EntityStatus, ListQuery, PageResult,
    promo_codes::{
        entities::{DiscountType, PromoCode},
        requests::{CreatePromoCodeRequest, UpdatePromoCodeRequest},
    },
};
use crate::utils::validate::{optional_text, required_text};

const SEARCH_COLUMNS: &[Column] = &[Column::Code, Column::Description];

const SORTABLE: &[(&str, Column)] = &[
    ("id", Column::Id),
    ("code", Column::Code),
    ("amount", Column::DiscountValue),
    ("usage_count", Column::UsageCount),
    ("expiry_date", Column::ExpiryDate),
    ("status", Column::Status),
    ("created_at", Column::CreatedAt),
];

const FILTERS: &[&str] = &["status", "discount_type", CREATED_FROM, CREATED_TO];

#[derive(Clone)]
pub struct PromoCodeRepository {
    db: DatabaseConnection,
}

/// 唯一性比较使用的规范化 code
fn code_key(code: &str) -> String {
    code.to_lowercase()
}

fn validate_discount(discount_type: DiscountType, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SchoolError::validation(
            "discount_value",
            "must be a number >= 0",
        ));
    }
    if discount_type == DiscountType::Percent && value > 100.0 {
        return Err(SchoolError::validation(
            "discount_value",
            "percent discount must be <= 100",
        ));
    }
    Ok(())
}

fn validate_usage_limit(limit: Option<i64>) -> Result<()> {
    match limit {
        Some(limit) if limit < 0 => Err(SchoolError::validation("usage_limit", "must be >= 0")),
        _ => Ok(()),
    }
}

fn validate_window(start: Option<DateTime<Utc>>, expiry: Option<DateTime<Utc>>) -> Result<()> {
    if let (Some(start), Some(expiry)) = (start, expiry)
        && start > expiry
    {
        return Err(SchoolError::validation(
            "expiry_date",
            "must not be earlier than start_date",
        ));
    }
    Ok(())
}

fn usage_increment() -> Expr {
    use sea_orm::sea_query::ExprTrait;
    Expr::col(Column::UsageCount).add(1)
}

/// usage_limit 为空或 usage_count < usage_limit
fn under_usage_limit() -> Condition {
    use sea_orm::sea_query::ExprTrait;
    Condition::any()
        .add(Expr::col(Column::UsageLimit).is_null())
        .add(Expr::col(Column::UsageCount).lt(Expr::col(Column::UsageLimit)))
}

const CODE_KEY: &str = "code_key";

/// code_key 是 code 的规范化列，冲突统一报告为 code 及原始输入
fn code_conflict(err: SchoolError, code: &str) -> SchoolError {
    match err {
        SchoolError::Conflict { field, .. } if field == "code" || field == CODE_KEY => {
            SchoolError::conflict("code", code)
        }
        other => other,
    }
}

impl PromoCodeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 创建优惠码，默认适用于全部班级
    pub async fn create(&self, req: CreatePromoCodeRequest) -> Result<PromoCode> {
        let code = required_text("code", &req.code)?;
        validate_discount(req.discount_type, req.discount_value)?;
        validate_usage_limit(req.usage_limit)?;
        validate_window(req.start_date, req.expiry_date)?;

        let key = code_key(&code);
        ensure_unique::<PromoCodes, _>(&self.db, Column::CodeKey, Column::Id, "code", &key, None)
            .await
            .map_err(|e| code_conflict(e, &code))?;
        let unique = [(CODE_KEY, key.clone())];
        let code_for_error = code.clone();

        let now = Utc::now().timestamp();
        let model = ActiveModel {
            code: Set(code),
            code_key: Set(key),
            description: Set(optional_text(req.description)),
            discount_type: Set(req.discount_type.to_string()),
            discount_value: Set(req.discount_value),
            usage_limit: Set(req.usage_limit),
            usage_count: Set(0),
            start_date: Set(req.start_date.map(|d| d.timestamp())),
            expiry_date: Set(req.expiry_date.map(|d| d.timestamp())),
            applies_to_all_classes: Set(true),
            status: Set(req.status.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| {
                code_conflict(write_error("创建优惠码失败", e, &unique), &code_for_error)
            })?;

        info!("Promo code {} ({}) created", result.id, result.code);
        Ok(result.into_promo_code())
    }

    /// 通过 ID 获取优惠码
    pub async fn get(&self, id: i64) -> Result<PromoCode> {
        Ok(self.find_model(id).await?.into_promo_code())
    }

    /// 按 code 查找（不区分大小写）
    pub async fn find_by_code(&self, code: &str) -> Result<Option<PromoCode>> {
        Ok(self
            .find_model_by_code(code)
            .await?
            .map(Model::into_promo_code))
    }

    /// 更新优惠码，合并后整体重新校验
    pub async fn update(&self, id: i64, update: UpdatePromoCodeRequest) -> Result<PromoCode> {
        let existing = self.find_model(id).await?.into_promo_code();

        let code = match update.code {
            Some(code) => required_text("code", &code)?,
            None => existing.code,
        };
        let discount_type = update.discount_type.unwrap_or(existing.discount_type);
        let discount_value = update.discount_value.unwrap_or(existing.discount_value);
        let usage_limit = update.usage_limit.unwrap_or(existing.usage_limit);
        let start_date = update.start_date.unwrap_or(existing.start_date);
        let expiry_date = update.expiry_date.unwrap_or(existing.expiry_date);

        validate_discount(discount_type, discount_value)?;
        validate_usage_limit(usage_limit)?;
        validate_window(start_date, expiry_date)?;

        let key = code_key(&code);
        ensure_unique::<PromoCodes, _>(
            &self.db,
            Column::CodeKey,
            Column::Id,
            "code",
            &key,
            Some(id),
        )
        .await
        .map_err(|e| code_conflict(e, &code))?;
        let unique = [(CODE_KEY, key.clone())];
        let code_for_error = code.clone();

        let mut model = ActiveModel {
            id: Set(id),
            code: Set(code),
            code_key: Set(key),
            discount_type: Set(discount_type.to_string()),
            discount_value: Set(discount_value),
            usage_limit: Set(usage_limit),
            start_date: Set(start_date.map(|d| d.timestamp())),
            expiry_date: Set(expiry_date.map(|d| d.timestamp())),
            updated_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(description) = update.description {
            model.description = Set(optional_text(description));
        }

        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| {
                code_conflict(write_error("更新优惠码失败", e, &unique), &code_for_error)
            })?;

        Ok(result.into_promo_code())
    }

    /// 删除优惠码及其适用班级
    pub async fn delete(&self, id: i64) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::persistence(format!("开启事务失败: {e}")))?;

        let exists = PromoCodes::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询优惠码失败: {e}")))?;
        if exists.is_none() {
            return Err(SchoolError::not_found("promo_code", id));
        }

        PromoCodeClasses::delete_many()
            .filter(PromoClassColumn::PromoCodeId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("删除优惠码适用班级失败: {e}")))?;

        PromoCodes::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("删除优惠码失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| SchoolError::persistence(format!("提交事务失败: {e}")))?;

        info!("Promo code {} deleted", id);
        Ok(())
    }

    /// 分页列出优惠码
    pub async fn list(&self, query: &ListQuery) -> Result<PageResult<PromoCode>> {
        let mut select = apply_search(PromoCodes::find(), SEARCH_COLUMNS, query.search.as_deref());

        for (key, value) in &query.filters {
            select = match key.as_str() {
                "status" => select.filter(
                    Column::Status.eq(parse_filter::<EntityStatus>(key, value)?.to_string()),
                ),
                "discount_type" => select.filter(
                    Column::DiscountType
                        .eq(parse_filter::<DiscountType>(key, value)?.to_string()),
                ),
                CREATED_FROM | CREATED_TO => {
                    created_range(select, Column::CreatedAt, key, value)?
                }
                _ => return Err(unsupported_filter(key, FILTERS)),
            };
        }

        let sort = resolve_sort(query.sort_field.as_deref(), SORTABLE, Column::Id)?;
        let page = fetch_page(&self.db, select, sort, Column::Id, query).await?;

        Ok(page.map(Model::into_promo_code))
    }

    /// 批量更新状态，返回实际更新的行数
    pub async fn set_status(&self, ids: &[i64], status: EntityStatus) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = PromoCodes::update_many()
            .col_expr(Column::Status, Expr::value(status.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now().timestamp()))
            .filter(Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("批量更新优惠码状态失败: {e}")))?;

        Ok(result.rows_affected)
    }

    /// 使用一次优惠码
    ///
    /// 校验状态、有效期和适用班级后，以条件 UPDATE 原子地递增 usage_count，
    /// 并发使用时不会超出 usage_limit。
    pub async fn redeem(
        &self,
        code: &str,
        class_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<PromoCode> {
        let model = self
            .find_model_by_code(code)
            .await?
            .ok_or_else(|| SchoolError::validation("code", "unknown promo code"))?;
        let id = model.id;
        let promo = model.into_promo_code();

        if promo.status != EntityStatus::Active {
            return Err(SchoolError::validation("code", "promo code is inactive"));
        }
        if !promo.is_within_window(now) {
            return Err(SchoolError::validation(
                "code",
                "promo code is outside its validity window",
            ));
        }

        let restriction = RelationshipManager::new(self.db.clone())
            .promo_code_classes(id)
            .await?;
        if !restriction.allows(class_id) {
            let reason = match class_id {
                None => "promo code is restricted to specific classes",
                Some(_) => "promo code does not apply to this class",
            };
            return Err(SchoolError::validation("class_id", reason));
        }

        // 计数以下面的条件更新为准，这里只提前拒绝已用完的码
        if promo.remaining_uses() == Some(0) {
            return Err(SchoolError::validation("code", "usage limit reached"));
        }

        let result = PromoCodes::update_many()
            .col_expr(Column::UsageCount, usage_increment())
            .col_expr(Column::UpdatedAt, Expr::value(now.timestamp()))
            .filter(Column::Id.eq(id))
            .filter(under_usage_limit())
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("更新优惠码使用次数失败: {e}")))?;

        if result.rows_affected == 0 {
            return Err(SchoolError::validation("code", "usage limit reached"));
        }

        debug!("Promo code {} redeemed", id);
        self.get(id).await
    }

    /// 统计优惠码数量
    pub async fn count(&self) -> Result<u64> {
        PromoCodes::find()
            .count(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("统计优惠码数量失败: {e}")))
    }

    async fn find_model_by_code(&self, code: &str) -> Result<Option<Model>> {
        PromoCodes::find()
            .filter(Column::CodeKey.eq(code_key(code.trim())))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询优惠码失败: {e}")))
    }

    async fn find_model(&self, id: i64) -> Result<Model> {
        PromoCodes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询优惠码失败: {e}")))?
            .ok_or_else(|| SchoolError::not_found("promo_code", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(DiscountType::Percent, 100.0).is_ok());
        assert!(validate_discount(DiscountType::Percent, 150.0).is_err());
        assert!(validate_discount(DiscountType::Fixed, 150.0).is_ok());
        assert!(validate_discount(DiscountType::Fixed, -1.0).is_err());
        assert!(validate_discount(DiscountType::Fixed, f64::NAN).is_err());
    }

    #[test]
    fn test_validate_window() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        assert!(validate_window(Some(start), Some(end)).is_ok());
        assert!(validate_window(Some(end), Some(start)).is_err());
        assert!(validate_window(None, Some(start)).is_ok());
    }

    #[test]
    fn test_code_key_is_case_insensitive() {
        assert_eq!(code_key("SPRING10"), code_key("spring10"));
    }
}
