//! 教师仓储

use super::query::{
    CREATED_FROM, CREATED_TO, apply_search, created_range, fetch_page, parse_filter,
    resolve_sort, unsupported_filter,
};
use super::{ensure_unique, write_error};
use crate::config::Argon2Config;
use crate::entity::class_teachers::{Column as ClassTeacherColumn, Entity as ClassTeachers};
use crate::entity::classes::{Column as ClassColumn, Entity as Classes};
use crate::entity::teachers::{ActiveModel, Column, Entity as Teachers, Model};
use crate::errors::{Result, SchoolError};
use crate::models::{
    EntityStatus, ListQuery, PageResult,
    teachers::{
        entities::Teacher,
        requests::{CreateTeacherRequest, UpdateTeacherRequest},
    },
};
use crate::utils::next_expiry;
use crate::utils::password::hash_or_generate;
use crate::utils::validate::{checked_email, checked_mobile, optional_text};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use tracing::info;

const SEARCH_COLUMNS: &[Column] = &[
    Column::FirstName,
    Column::LastName,
    Column::Email,
    Column::Mobile,
];

const SORTABLE: &[(&str, Column)] = &[
    ("id", Column::Id),
    ("first_name", Column::FirstName),
    ("last_name", Column::LastName),
    ("email", Column::Email),
    ("mobile", Column::Mobile),
    ("status", Column::Status),
    ("created_at", Column::CreatedAt),
];

const FILTERS: &[&str] = &["status", CREATED_FROM, CREATED_TO];

#[derive(Clone)]
pub struct TeacherRepository {
    db: DatabaseConnection,
    argon2: Argon2Config,
}

impl TeacherRepository {
    pub fn new(db: DatabaseConnection, argon2: Argon2Config) -> Self {
        Self { db, argon2 }
    }

    /// 创建教师
    pub async fn create(&self, req: CreateTeacherRequest) -> Result<Teacher> {
        let email = checked_email(&req.email)?;
        let mobile = checked_mobile(&req.mobile)?;

        ensure_unique::<Teachers, _>(&self.db, Column::Email, Column::Id, "email", &email, None)
            .await?;
        ensure_unique::<Teachers, _>(&self.db, Column::Mobile, Column::Id, "mobile", &mobile, None)
            .await?;

        let password_hash = hash_or_generate(req.password, self.argon2).await?;
        let now = chrono::Utc::now();
        let unique = [("email", email.clone()), ("mobile", mobile.clone())];

        let model = ActiveModel {
            first_name: Set(optional_text(req.first_name)),
            last_name: Set(optional_text(req.last_name)),
            email: Set(email),
            mobile: Set(mobile),
            password_hash: Set(password_hash),
            status: Set(req.status.to_string()),
            expiry_date: Set(Some(next_expiry(now).timestamp())),
            created_at: Set(now.timestamp()),
            updated_at: Set(now.timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| write_error("创建教师失败", e, &unique))?;

        info!("Teacher {} created", result.id);
        Ok(result.into_teacher())
    }

    /// 通过 ID 获取教师
    pub async fn get(&self, id: i64) -> Result<Teacher> {
        Ok(self.find_model(id).await?.into_teacher())
    }

    /// 通过手机号获取教师
    pub async fn find_by_mobile(&self, mobile: &str) -> Result<Option<Teacher>> {
        let result = Teachers::find()
            .filter(Column::Mobile.eq(mobile.trim()))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询教师失败: {e}")))?;

        Ok(result.map(|m| m.into_teacher()))
    }

    /// 更新教师信息
    pub async fn update(&self, id: i64, update: UpdateTeacherRequest) -> Result<Teacher> {
        // 先检查教师是否存在
        let existing = self.find_model(id).await?;

        let email = match update.email {
            Some(email) => checked_email(&email)?,
            None => existing.email,
        };
        let mobile = match update.mobile {
            Some(mobile) => checked_mobile(&mobile)?,
            None => existing.mobile,
        };

        ensure_unique::<Teachers, _>(
            &self.db,
            Column::Email,
            Column::Id,
            "email",
            &email,
            Some(id),
        )
        .await?;
        ensure_unique::<Teachers, _>(
            &self.db,
            Column::Mobile,
            Column::Id,
            "mobile",
            &mobile,
            Some(id),
        )
        .await?;

        let unique = [("email", email.clone()), ("mobile", mobile.clone())];
        let mut model = ActiveModel {
            id: Set(id),
            email: Set(email),
            mobile: Set(mobile),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(first_name) = update.first_name {
            model.first_name = Set(optional_text(first_name));
        }

        if let Some(last_name) = update.last_name {
            model.last_name = Set(optional_text(last_name));
        }

        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        if let Some(password) = update.password.filter(|p| !p.trim().is_empty()) {
            model.password_hash = Set(hash_or_generate(Some(password), self.argon2).await?);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| write_error("更新教师失败", e, &unique))?;

        Ok(result.into_teacher())
    }

    /// 删除教师
    ///
    /// 所负责班级的 teacher_id 置空，协同教师分配一并删除，班级本身保留。
    pub async fn delete(&self, id: i64) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::persistence(format!("开启事务失败: {e}")))?;

        let exists = Teachers::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询教师失败: {e}")))?;
        if exists.is_none() {
            return Err(SchoolError::not_found("teacher", id));
        }

        Classes::update_many()
            .col_expr(ClassColumn::TeacherId, Expr::value(Option::<i64>::None))
            .col_expr(
                ClassColumn::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(ClassColumn::TeacherId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("解除班级教师关联失败: {e}")))?;

        ClassTeachers::delete_many()
            .filter(ClassTeacherColumn::TeacherId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("删除教师分配失败: {e}")))?;

        Teachers::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("删除教师失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| SchoolError::persistence(format!("提交事务失败: {e}")))?;

        info!("Teacher {} deleted", id);
        Ok(())
    }

    /// 分页列出教师
    pub async fn list(&self, query: &ListQuery) -> Result<PageResult<Teacher>> {
        let mut select = apply_search(Teachers::find(), SEARCH_COLUMNS, query.search.as_deref());

        for (key, value) in &query.filters {
            select = match key.as_str() {
                "status" => select.filter(
                    Column::Status.eq(parse_filter::<EntityStatus>(key, value)?.to_string()),
                ),
                CREATED_FROM | CREATED_TO => {
                    created_range(select, Column::CreatedAt, key, value)?
                }
                _ => return Err(unsupported_filter(key, FILTERS)),
            };
        }

        let sort = resolve_sort(query.sort_field.as_deref(), SORTABLE, Column::Id)?;
        let page = fetch_page(&self.db, select, sort, Column::Id, query).await?;

        Ok(page.map(Model::into_teacher))
    }

    /// 批量更新状态，返回实际更新的行数
    pub async fn set_status(&self, ids: &[i64], status: EntityStatus) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Teachers::update_many()
            .col_expr(Column::Status, Expr::value(status.to_string()))
            .col_expr(
                Column::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("批量更新教师状态失败: {e}")))?;

        Ok(result.rows_affected)
    }

    /// 统计教师数量
    pub async fn count(&self) -> Result<u64> {
        Teachers::find()
            .count(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("统计教师数量失败: {e}")))
    }

    async fn find_model(&self, id: i64) -> Result<Model> {
        Teachers::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询教师失败: {e}")))?
            .ok_or_else(|| SchoolError::not_found("teacher", id))
    }
}
