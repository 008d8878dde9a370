//! 学生仓储

use super::query::{
    CREATED_FROM, CREATED_TO, apply_search, created_range, fetch_page, parse_filter,
    resolve_sort, unsupported_filter,
};
use super::{ensure_unique, write_error};
use crate::config::Argon2Config;
use crate::entity::class_students::{Column as EnrollmentColumn, Entity as ClassStudents};
use crate::entity::students::{ActiveModel, Column, Entity as Students, Model};
use crate::errors::{Result, SchoolError};
use crate::models::{
    EntityStatus, ListQuery, PageResult,
    students::{
        entities::Student,
        requests::{CreateStudentRequest, UpdateStudentRequest},
    },
};
use crate::utils::next_expiry;
use crate::utils::password::hash_or_generate;
use crate::utils::validate::{checked_mobile, optional_text, required_text, validate_email};
use sea_orm::sea_query::{Expr, Query};
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
    Column::PromoCode,
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

const FILTERS: &[&str] = &["status", "promo_code", "class_id", CREATED_FROM, CREATED_TO];

#[derive(Clone)]
pub struct StudentRepository {
    db: DatabaseConnection,
    argon2: Argon2Config,
}

/// 可选邮箱：空白视为未填写，非空时校验格式
fn checked_optional_email(email: Option<String>) -> Result<Option<String>> {
    match optional_text(email) {
        Some(email) => {
            validate_email(&email).map_err(|msg| SchoolError::validation("email", msg))?;
            Ok(Some(email))
        }
        None => Ok(None),
    }
}

impl StudentRepository {
    pub fn new(db: DatabaseConnection, argon2: Argon2Config) -> Self {
        Self { db, argon2 }
    }

    /// 创建学生
    pub async fn create(&self, req: CreateStudentRequest) -> Result<Student> {
        let first_name = required_text("first_name", &req.first_name)?;
        let last_name = required_text("last_name", &req.last_name)?;
        let mobile = checked_mobile(&req.mobile)?;
        let email = checked_optional_email(req.email)?;

        ensure_unique::<Students, _>(&self.db, Column::Mobile, Column::Id, "mobile", &mobile, None)
            .await?;
        if let Some(ref email) = email {
            ensure_unique::<Students, _>(&self.db, Column::Email, Column::Id, "email", email, None)
                .await?;
        }

        let password_hash = hash_or_generate(req.password, self.argon2).await?;
        let now = chrono::Utc::now();
        let unique = [
            ("mobile", mobile.clone()),
            ("email", email.clone().unwrap_or_default()),
        ];

        let model = ActiveModel {
            first_name: Set(first_name),
            last_name: Set(last_name),
            email: Set(email),
            mobile: Set(mobile),
            password_hash: Set(password_hash),
            promo_code: Set(optional_text(req.promo_code)),
            status: Set(req.status.to_string()),
            expiry_date: Set(Some(next_expiry(now).timestamp())),
            created_at: Set(now.timestamp()),
            updated_at: Set(now.timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| write_error("创建学生失败", e, &unique))?;

        info!("Student {} created", result.id);
        Ok(result.into_student())
    }

    /// 通过 ID 获取学生
    pub async fn get(&self, id: i64) -> Result<Student> {
        Ok(self.find_model(id).await?.into_student())
    }

    /// 通过手机号获取学生
    pub async fn find_by_mobile(&self, mobile: &str) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(Column::Mobile.eq(mobile.trim()))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询学生失败: {e}")))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 更新学生信息
    pub async fn update(&self, id: i64, update: UpdateStudentRequest) -> Result<Student> {
        // 先检查学生是否存在
        let existing = self.find_model(id).await?;

        let mobile = match update.mobile {
            Some(mobile) => checked_mobile(&mobile)?,
            None => existing.mobile,
        };
        let email = match update.email {
            Some(email) => checked_optional_email(email)?,
            None => existing.email,
        };

        ensure_unique::<Students, _>(
            &self.db,
            Column::Mobile,
            Column::Id,
            "mobile",
            &mobile,
            Some(id),
        )
        .await?;
        if let Some(ref email) = email {
            ensure_unique::<Students, _>(
                &self.db,
                Column::Email,
                Column::Id,
                "email",
                email,
                Some(id),
            )
            .await?;
        }

        let unique = [
            ("mobile", mobile.clone()),
            ("email", email.clone().unwrap_or_default()),
        ];
        let mut model = ActiveModel {
            id: Set(id),
            mobile: Set(mobile),
            email: Set(email),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(first_name) = update.first_name {
            model.first_name = Set(required_text("first_name", &first_name)?);
        }

        if let Some(last_name) = update.last_name {
            model.last_name = Set(required_text("last_name", &last_name)?);
        }

        if let Some(promo_code) = update.promo_code {
            model.promo_code = Set(optional_text(promo_code));
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
            .map_err(|e| write_error("更新学生失败", e, &unique))?;

        Ok(result.into_student())
    }

    /// 删除学生，同时删除其全部选课记录
    pub async fn delete(&self, id: i64) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::persistence(format!("开启事务失败: {e}")))?;

        let exists = Students::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询学生失败: {e}")))?;
        if exists.is_none() {
            return Err(SchoolError::not_found("student", id));
        }

        ClassStudents::delete_many()
            .filter(EnrollmentColumn::StudentId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("删除选课记录失败: {e}")))?;

        Students::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("删除学生失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| SchoolError::persistence(format!("提交事务失败: {e}")))?;

        info!("Student {} deleted", id);
        Ok(())
    }

    /// 分页列出学生
    pub async fn list(&self, query: &ListQuery) -> Result<PageResult<Student>> {
        let mut select = apply_search(Students::find(), SEARCH_COLUMNS, query.search.as_deref());

        for (key, value) in &query.filters {
            select = match key.as_str() {
                "status" => select.filter(
                    Column::Status.eq(parse_filter::<EntityStatus>(key, value)?.to_string()),
                ),
                "promo_code" => select.filter(Column::PromoCode.eq(value.trim())),
                // 按所在班级筛选
                "class_id" => {
                    let class_id = parse_filter::<i64>(key, value)?;
                    select.filter(
                        Column::Id.in_subquery(
                            Query::select()
                                .column(EnrollmentColumn::StudentId)
                                .from(ClassStudents)
                                .and_where(EnrollmentColumn::ClassId.eq(class_id))
                                .to_owned(),
                        ),
                    )
                }
                CREATED_FROM | CREATED_TO => {
                    created_range(select, Column::CreatedAt, key, value)?
                }
                _ => return Err(unsupported_filter(key, FILTERS)),
            };
        }

        let sort = resolve_sort(query.sort_field.as_deref(), SORTABLE, Column::Id)?;
        let page = fetch_page(&self.db, select, sort, Column::Id, query).await?;

        Ok(page.map(Model::into_student))
    }

    /// 批量更新状态，返回实际更新的行数
    pub async fn set_status(&self, ids: &[i64], status: EntityStatus) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Students::update_many()
            .col_expr(Column::Status, Expr::value(status.to_string()))
            .col_expr(
                Column::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("批量更新学生状态失败: {e}")))?;

        Ok(result.rows_affected)
    }

    /// 统计学生数量
    pub async fn count(&self) -> Result<u64> {
        Students::find()
            .count(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("统计学生数量失败: {e}")))
    }

    async fn find_model(&self, id: i64) -> Result<Model> {
        Students::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询学生失败: {e}")))?
            .ok_or_else(|| SchoolError::not_found("student", id))
    }
}
