//! 班级仓储

use super::query::{
    CREATED_FROM, CREATED_TO, apply_search, created_range, fetch_page, parse_filter,
    resolve_sort, unsupported_filter,
};
use super::write_error;
use crate::entity::class_students::{Column as EnrollmentColumn, Entity as ClassStudents};
use crate::entity::class_teachers::{Column as ClassTeacherColumn, Entity as ClassTeachers};
use crate::entity::classes::{ActiveModel, Column, Entity as Classes, Model};
use crate::entity::promo_code_classes::{Column as PromoClassColumn, Entity as PromoCodeClasses};
use crate::entity::teachers::Entity as Teachers;
use crate::errors::{Result, SchoolError};
use crate::models::{
    EntityStatus, ListQuery, PageResult,
    classes::{
        entities::{Class, DEFAULT_CLASS_CAPACITY},
        requests::{CreateClassRequest, UpdateClassRequest},
    },
};
use crate::utils::next_expiry;
use crate::utils::validate::{optional_text, required_text};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use tracing::info;

const SEARCH_COLUMNS: &[Column] = &[Column::Name, Column::Description];

const SORTABLE: &[(&str, Column)] = &[
    ("id", Column::Id),
    ("name", Column::Name),
    ("capacity", Column::Capacity),
    ("status", Column::Status),
    ("created_at", Column::CreatedAt),
];

const FILTERS: &[&str] = &["status", "teacher_id", CREATED_FROM, CREATED_TO];

#[derive(Clone)]
pub struct ClassRepository {
    db: DatabaseConnection,
}

fn checked_capacity(capacity: i32) -> Result<i32> {
    if capacity < 1 {
        return Err(SchoolError::validation("capacity", "must be at least 1"));
    }
    Ok(capacity)
}

impl ClassRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 创建班级
    pub async fn create(&self, req: CreateClassRequest) -> Result<Class> {
        let name = required_text("name", &req.name)?;
        let capacity = checked_capacity(req.capacity.unwrap_or(DEFAULT_CLASS_CAPACITY))?;
        if let Some(teacher_id) = req.teacher_id {
            self.ensure_teacher(teacher_id).await?;
        }

        let now = chrono::Utc::now();
        let model = ActiveModel {
            name: Set(name),
            description: Set(optional_text(req.description)),
            teacher_id: Set(req.teacher_id),
            capacity: Set(capacity),
            status: Set(req.status.to_string()),
            expiry_date: Set(Some(next_expiry(now).timestamp())),
            created_at: Set(now.timestamp()),
            updated_at: Set(now.timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| write_error("创建班级失败", e, &[]))?;

        info!("Class {} created", result.id);
        Ok(result.into_class())
    }

    /// 通过 ID 获取班级
    pub async fn get(&self, id: i64) -> Result<Class> {
        Ok(self.find_model(id).await?.into_class())
    }

    /// 更新班级信息
    pub async fn update(&self, id: i64, update: UpdateClassRequest) -> Result<Class> {
        self.find_model(id).await?;

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(required_text("name", &name)?);
        }

        if let Some(description) = update.description {
            model.description = Set(optional_text(description));
        }

        if let Some(teacher_id) = update.teacher_id {
            if let Some(teacher_id) = teacher_id {
                self.ensure_teacher(teacher_id).await?;
            }
            model.teacher_id = Set(teacher_id);
        }

        if let Some(capacity) = update.capacity {
            model.capacity = Set(checked_capacity(capacity)?);
        }

        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| write_error("更新班级失败", e, &[]))?;

        Ok(result.into_class())
    }

    /// 删除班级，同时删除选课、协同教师和优惠码适用范围中的关联行
    pub async fn delete(&self, id: i64) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::persistence(format!("开启事务失败: {e}")))?;

        let exists = Classes::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询班级失败: {e}")))?;
        if exists.is_none() {
            return Err(SchoolError::not_found("class", id));
        }

        ClassStudents::delete_many()
            .filter(EnrollmentColumn::ClassId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("删除选课记录失败: {e}")))?;

        ClassTeachers::delete_many()
            .filter(ClassTeacherColumn::ClassId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("删除教师分配失败: {e}")))?;

        PromoCodeClasses::delete_many()
            .filter(PromoClassColumn::ClassId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("删除优惠码适用班级失败: {e}")))?;

        Classes::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("删除班级失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| SchoolError::persistence(format!("提交事务失败: {e}")))?;

        info!("Class {} deleted", id);
        Ok(())
    }

    /// 分页列出班级
    pub async fn list(&self, query: &ListQuery) -> Result<PageResult<Class>> {
        let mut select = apply_search(Classes::find(), SEARCH_COLUMNS, query.search.as_deref());

        for (key, value) in &query.filters {
            select = match key.as_str() {
                "status" => select.filter(
                    Column::Status.eq(parse_filter::<EntityStatus>(key, value)?.to_string()),
                ),
                "teacher_id" => {
                    select.filter(Column::TeacherId.eq(parse_filter::<i64>(key, value)?))
                }
                CREATED_FROM | CREATED_TO => {
                    created_range(select, Column::CreatedAt, key, value)?
                }
                _ => return Err(unsupported_filter(key, FILTERS)),
            };
        }

        let sort = resolve_sort(query.sort_field.as_deref(), SORTABLE, Column::Id)?;
        let page = fetch_page(&self.db, select, sort, Column::Id, query).await?;

        Ok(page.map(Model::into_class))
    }

    /// 批量更新状态，返回实际更新的行数
    pub async fn set_status(&self, ids: &[i64], status: EntityStatus) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Classes::update_many()
            .col_expr(Column::Status, Expr::value(status.to_string()))
            .col_expr(
                Column::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("批量更新班级状态失败: {e}")))?;

        Ok(result.rows_affected)
    }

    /// 统计班级数量
    pub async fn count(&self) -> Result<u64> {
        Classes::find()
            .count(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("统计班级数量失败: {e}")))
    }

    async fn ensure_teacher(&self, teacher_id: i64) -> Result<()> {
        let teacher = Teachers::find_by_id(teacher_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询教师失败: {e}")))?;
        match teacher {
            Some(_) => Ok(()),
            None => Err(SchoolError::not_found("teacher", teacher_id)),
        }
    }

    async fn find_model(&self, id: i64) -> Result<Model> {
        Classes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询班级失败: {e}")))?
            .ok_or_else(|| SchoolError::not_found("class", id))
    }
}
