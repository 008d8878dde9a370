//! 关联关系管理
//!
//! 维护班级-学生（选课）、班级-协同教师、优惠码-适用班级三组关联。
//! 每次保存都是整体替换：在同一个事务里先校验全部 ID，再删除旧关联并插入新关联，
//! 校验失败时不会产生任何写入。

use std::collections::BTreeSet;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;

use super::ensure_all_exist;
use crate::entity::class_students::{
    ActiveModel as EnrollmentActiveModel, Column as EnrollmentColumn, Entity as ClassStudents,
};
use crate::entity::class_teachers::{
    ActiveModel as ClassTeacherActiveModel, Column as ClassTeacherColumn, Entity as ClassTeachers,
};
use crate::entity::classes::{Column as ClassColumn, Entity as Classes, Model as ClassModel};
use crate::entity::promo_code_classes::{
    ActiveModel as PromoClassActiveModel, Column as PromoClassColumn, Entity as PromoCodeClasses,
};
use crate::entity::promo_codes::{
    ActiveModel as PromoActiveModel, Column as PromoColumn, Entity as PromoCodes,
};
use crate::entity::students::{Column as StudentColumn, Entity as Students};
use crate::entity::teachers::Entity as Teachers;
use crate::errors::{Result, SchoolError};
use crate::models::EntityStatus;
use crate::models::promo_codes::entities::ClassRestriction;
use crate::models::relationships::entities::{ClassTeacherAssignment, Enrollment};

#[derive(Clone)]
pub struct RelationshipManager {
    db: DatabaseConnection,
}

fn txn_error(e: sea_orm::DbErr) -> SchoolError {
    SchoolError::persistence(format!("事务操作失败: {e}"))
}

impl RelationshipManager {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 整体替换班级名单，返回保存后的学生 ID（升序去重）
    pub async fn set_class_roster(&self, class_id: i64, student_ids: &[i64]) -> Result<Vec<i64>> {
        let ids: BTreeSet<i64> = student_ids.iter().copied().collect();
        let txn = self.db.begin().await.map_err(txn_error)?;

        find_class(&txn, class_id).await?;
        ensure_all_exist::<Students, _>(&txn, StudentColumn::Id, "student", &ids).await?;

        ClassStudents::delete_many()
            .filter(EnrollmentColumn::ClassId.eq(class_id))
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("清除班级名单失败: {e}")))?;

        let now = chrono::Utc::now().timestamp();
        if !ids.is_empty() {
            ClassStudents::insert_many(ids.iter().map(|&student_id| EnrollmentActiveModel {
                class_id: Set(class_id),
                student_id: Set(student_id),
                status: Set(EntityStatus::Active.to_string()),
                enrolled_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }))
            .exec_without_returning(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("写入班级名单失败: {e}")))?;
        }

        txn.commit().await.map_err(txn_error)?;

        info!("Class {} roster replaced with {} students", class_id, ids.len());
        Ok(ids.into_iter().collect())
    }

    /// 班级当前学生 ID（升序）
    pub async fn class_roster(&self, class_id: i64) -> Result<Vec<i64>> {
        find_class(&self.db, class_id).await?;

        ClassStudents::find()
            .select_only()
            .column(EnrollmentColumn::StudentId)
            .filter(EnrollmentColumn::ClassId.eq(class_id))
            .order_by_asc(EnrollmentColumn::StudentId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询班级名单失败: {e}")))
    }

    /// 班级的选课记录
    pub async fn class_enrollments(&self, class_id: i64) -> Result<Vec<Enrollment>> {
        find_class(&self.db, class_id).await?;

        let rows = ClassStudents::find()
            .filter(EnrollmentColumn::ClassId.eq(class_id))
            .order_by_asc(EnrollmentColumn::StudentId)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询选课记录失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_enrollment()).collect())
    }

    /// 整体替换学生所在班级，返回保存后的班级 ID（升序去重）
    pub async fn set_student_classes(
        &self,
        student_id: i64,
        class_ids: &[i64],
    ) -> Result<Vec<i64>> {
        let ids: BTreeSet<i64> = class_ids.iter().copied().collect();
        let txn = self.db.begin().await.map_err(txn_error)?;

        let student = Students::find_by_id(student_id)
            .one(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询学生失败: {e}")))?;
        if student.is_none() {
            return Err(SchoolError::not_found("student", student_id));
        }
        ensure_all_exist::<Classes, _>(&txn, ClassColumn::Id, "class", &ids).await?;

        ClassStudents::delete_many()
            .filter(EnrollmentColumn::StudentId.eq(student_id))
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("清除学生选课失败: {e}")))?;

        let now = chrono::Utc::now().timestamp();
        if !ids.is_empty() {
            ClassStudents::insert_many(ids.iter().map(|&class_id| EnrollmentActiveModel {
                class_id: Set(class_id),
                student_id: Set(student_id),
                status: Set(EntityStatus::Active.to_string()),
                enrolled_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }))
            .exec_without_returning(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("写入学生选课失败: {e}")))?;
        }

        txn.commit().await.map_err(txn_error)?;

        info!("Student {} enrolled in {} classes", student_id, ids.len());
        Ok(ids.into_iter().collect())
    }

    /// 学生所在班级 ID（升序）
    pub async fn student_classes(&self, student_id: i64) -> Result<Vec<i64>> {
        let student = Students::find_by_id(student_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询学生失败: {e}")))?;
        if student.is_none() {
            return Err(SchoolError::not_found("student", student_id));
        }

        ClassStudents::find()
            .select_only()
            .column(EnrollmentColumn::ClassId)
            .filter(EnrollmentColumn::StudentId.eq(student_id))
            .order_by_asc(EnrollmentColumn::ClassId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询学生选课失败: {e}")))
    }

    /// 整体替换教师的协同班级
    pub async fn set_teacher_classes(
        &self,
        teacher_id: i64,
        class_ids: &[i64],
    ) -> Result<Vec<i64>> {
        let ids: BTreeSet<i64> = class_ids.iter().copied().collect();
        let txn = self.db.begin().await.map_err(txn_error)?;

        let teacher = Teachers::find_by_id(teacher_id)
            .one(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询教师失败: {e}")))?;
        if teacher.is_none() {
            return Err(SchoolError::not_found("teacher", teacher_id));
        }
        ensure_all_exist::<Classes, _>(&txn, ClassColumn::Id, "class", &ids).await?;

        ClassTeachers::delete_many()
            .filter(ClassTeacherColumn::TeacherId.eq(teacher_id))
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("清除教师分配失败: {e}")))?;

        let now = chrono::Utc::now().timestamp();
        if !ids.is_empty() {
            ClassTeachers::insert_many(ids.iter().map(|&class_id| ClassTeacherActiveModel {
                class_id: Set(class_id),
                teacher_id: Set(teacher_id),
                assigned_at: Set(now),
                ..Default::default()
            }))
            .exec_without_returning(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("写入教师分配失败: {e}")))?;
        }

        txn.commit().await.map_err(txn_error)?;

        info!("Teacher {} assigned to {} classes", teacher_id, ids.len());
        Ok(ids.into_iter().collect())
    }

    /// 教师协同的班级 ID（升序）
    pub async fn teacher_classes(&self, teacher_id: i64) -> Result<Vec<i64>> {
        Ok(self
            .teacher_assignments(teacher_id)
            .await?
            .into_iter()
            .map(|a| a.class_id)
            .collect())
    }

    pub async fn teacher_assignments(&self, teacher_id: i64) -> Result<Vec<ClassTeacherAssignment>> {
        let teacher = Teachers::find_by_id(teacher_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询教师失败: {e}")))?;
        if teacher.is_none() {
            return Err(SchoolError::not_found("teacher", teacher_id));
        }

        let rows = ClassTeachers::find()
            .filter(ClassTeacherColumn::TeacherId.eq(teacher_id))
            .order_by_asc(ClassTeacherColumn::ClassId)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询教师分配失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_assignment()).collect())
    }

    /// 设置优惠码的适用班级
    ///
    /// `Unrestricted` 清空关联行并置位 applies_to_all_classes；
    /// `Restricted(ids)` 写入关联行，ids 为空表示不适用于任何班级。
    pub async fn set_promo_code_classes(
        &self,
        promo_id: i64,
        restriction: ClassRestriction,
    ) -> Result<ClassRestriction> {
        let txn = self.db.begin().await.map_err(txn_error)?;

        let promo = PromoCodes::find_by_id(promo_id)
            .one(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询优惠码失败: {e}")))?;
        if promo.is_none() {
            return Err(SchoolError::not_found("promo_code", promo_id));
        }

        let (applies_to_all, ids) = match &restriction {
            ClassRestriction::Unrestricted => (true, BTreeSet::new()),
            ClassRestriction::Restricted(ids) => (false, ids.iter().copied().collect()),
        };
        ensure_all_exist::<Classes, _>(&txn, ClassColumn::Id, "class", &ids).await?;

        PromoActiveModel {
            id: Set(promo_id),
            applies_to_all_classes: Set(applies_to_all),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(|e| SchoolError::persistence(format!("更新优惠码失败: {e}")))?;

        PromoCodeClasses::delete_many()
            .filter(PromoClassColumn::PromoCodeId.eq(promo_id))
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("清除优惠码适用班级失败: {e}")))?;

        if !ids.is_empty() {
            PromoCodeClasses::insert_many(ids.iter().map(|&class_id| PromoClassActiveModel {
                promo_code_id: Set(promo_id),
                class_id: Set(class_id),
                ..Default::default()
            }))
            .exec_without_returning(&txn)
            .await
            .map_err(|e| SchoolError::persistence(format!("写入优惠码适用班级失败: {e}")))?;
        }

        txn.commit().await.map_err(txn_error)?;

        Ok(match restriction {
            ClassRestriction::Unrestricted => ClassRestriction::Unrestricted,
            ClassRestriction::Restricted(_) => ClassRestriction::Restricted(ids.into_iter().collect()),
        })
    }

    /// 读取优惠码的适用班级
    pub async fn promo_code_classes(&self, promo_id: i64) -> Result<ClassRestriction> {
        let applies_to_all: Option<bool> = PromoCodes::find_by_id(promo_id)
            .select_only()
            .column(PromoColumn::AppliesToAllClasses)
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::persistence(format!("查询优惠码失败: {e}")))?;

        match applies_to_all {
            None => Err(SchoolError::not_found("promo_code", promo_id)),
            Some(true) => Ok(ClassRestriction::Unrestricted),
            Some(false) => {
                let ids: Vec<i64> = PromoCodeClasses::find()
                    .select_only()
                    .column(PromoClassColumn::ClassId)
                    .filter(PromoClassColumn::PromoCodeId.eq(promo_id))
                    .order_by_asc(PromoClassColumn::ClassId)
                    .into_tuple()
                    .all(&self.db)
                    .await
                    .map_err(|e| {
                        SchoolError::persistence(format!("查询优惠码适用班级失败: {e}"))
                    })?;
                Ok(ClassRestriction::Restricted(ids))
            }
        }
    }
}

async fn find_class<C: ConnectionTrait>(db: &C, class_id: i64) -> Result<ClassModel> {
    Classes::find_by_id(class_id)
        .one(db)
        .await
        .map_err(|e| SchoolError::persistence(format!("查询班级失败: {e}")))?
        .ok_or_else(|| SchoolError::not_found("class", class_id))
}
