//! 关联关系集成测试

mod common;

use chrono::Utc;

use common::{create_class, create_student, create_teacher, setup};
use school_manager::errors::SchoolError;
use school_manager::models::promo_codes::entities::{ClassRestriction, DiscountType};
use school_manager::models::promo_codes::requests::CreatePromoCodeRequest;
use school_manager::models::{EntityStatus, ListQuery};

#[tokio::test]
async fn test_set_class_roster_replaces_members() {
    let storage = setup().await;
    let class = create_class(&storage, "Algebra", None, 10).await;
    let mut ids = Vec::new();
    for n in 0..4 {
        ids.push(create_student(&storage, n).await.id);
    }
    let relationships = storage.relationships();

    // 重复 ID 只保存一次
    let saved = relationships
        .set_class_roster(class.id, &[ids[2], ids[0], ids[2]])
        .await
        .unwrap();
    assert_eq!(saved, vec![ids[0], ids[2]]);
    assert_eq!(
        relationships.class_roster(class.id).await.unwrap(),
        vec![ids[0], ids[2]]
    );

    relationships
        .set_class_roster(class.id, &[ids[1], ids[3]])
        .await
        .unwrap();
    assert_eq!(
        relationships.class_roster(class.id).await.unwrap(),
        vec![ids[1], ids[3]]
    );

    let enrollments = relationships.class_enrollments(class.id).await.unwrap();
    assert_eq!(enrollments.len(), 2);
    assert!(enrollments.iter().all(|e| e.status == EntityStatus::Active));

    // 非空名单可以整体清空
    relationships.set_class_roster(class.id, &[]).await.unwrap();
    assert!(relationships.class_roster(class.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_roster_with_unknown_student_changes_nothing() {
    let storage = setup().await;
    let class = create_class(&storage, "Algebra", None, 10).await;
    let student = create_student(&storage, 1).await;
    let relationships = storage.relationships();
    relationships
        .set_class_roster(class.id, &[student.id])
        .await
        .unwrap();

    let err = relationships
        .set_class_roster(class.id, &[student.id, 9999])
        .await
        .unwrap_err();
    assert!(matches!(err, SchoolError::NotFound { ref entity, id: 9999 } if entity == "student"));
    assert_eq!(
        relationships.class_roster(class.id).await.unwrap(),
        vec![student.id]
    );
}

#[tokio::test]
async fn test_roster_over_capacity_reads_back_exactly() {
    let storage = setup().await;
    let class = create_class(&storage, "Robotics", None, 2).await;
    let mut ids = Vec::new();
    for n in 0..3 {
        ids.push(create_student(&storage, n).await.id);
    }
    let relationships = storage.relationships();

    // 容量只作展示，名单按提交内容保存
    let saved = relationships.set_class_roster(class.id, &ids).await.unwrap();
    assert_eq!(saved, ids);
    assert_eq!(relationships.class_roster(class.id).await.unwrap(), ids);

    // 下调容量不影响已有名单
    storage
        .classes()
        .update(
            class.id,
            school_manager::models::classes::requests::UpdateClassRequest {
                capacity: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(relationships.class_roster(class.id).await.unwrap(), ids);
}

#[tokio::test]
async fn test_set_student_classes() {
    let storage = setup().await;
    let student = create_student(&storage, 1).await;
    let other = create_student(&storage, 2).await;
    let algebra = create_class(&storage, "Algebra", None, 10).await;
    let writing = create_class(&storage, "Writing", None, 1).await;
    let relationships = storage.relationships();

    relationships
        .set_student_classes(student.id, &[algebra.id, writing.id])
        .await
        .unwrap();
    assert_eq!(
        relationships.student_classes(student.id).await.unwrap(),
        vec![algebra.id, writing.id]
    );

    // 超出容量同样按提交内容保存
    relationships
        .set_student_classes(other.id, &[writing.id])
        .await
        .unwrap();
    assert_eq!(
        relationships.class_roster(writing.id).await.unwrap(),
        vec![student.id, other.id]
    );

    let in_algebra = storage
        .students()
        .list(&ListQuery::new().filter("class_id", algebra.id.to_string()))
        .await
        .unwrap();
    assert_eq!(in_algebra.total, 1);
    assert_eq!(in_algebra.items[0].id, student.id);
}

#[tokio::test]
async fn test_teacher_assignments() {
    let storage = setup().await;
    let teacher = create_teacher(&storage, 1).await;
    let a = create_class(&storage, "A", None, 5).await;
    let b = create_class(&storage, "B", None, 5).await;
    let relationships = storage.relationships();

    relationships
        .set_teacher_classes(teacher.id, &[b.id, a.id])
        .await
        .unwrap();
    assert_eq!(
        relationships.teacher_classes(teacher.id).await.unwrap(),
        vec![a.id, b.id]
    );
    let assignments = relationships.teacher_assignments(teacher.id).await.unwrap();
    assert_eq!(assignments.len(), 2);
    assert!(assignments.iter().all(|a| a.teacher_id == teacher.id));

    relationships.set_teacher_classes(teacher.id, &[]).await.unwrap();
    assert!(relationships.teacher_classes(teacher.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_teacher_clears_class_owner() {
    let storage = setup().await;
    let teacher = create_teacher(&storage, 1).await;
    let class = create_class(&storage, "Algebra", Some(teacher.id), 10).await;
    assert_eq!(class.teacher_id, Some(teacher.id));
    storage
        .relationships()
        .set_teacher_classes(teacher.id, &[class.id])
        .await
        .unwrap();

    storage.teachers().delete(teacher.id).await.unwrap();

    let class = storage.classes().get(class.id).await.unwrap();
    assert_eq!(class.teacher_id, None);
    assert!(matches!(
        storage.teachers().get(teacher.id).await,
        Err(SchoolError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_deleting_student_removes_only_their_enrollments() {
    let storage = setup().await;
    let keep = create_student(&storage, 1).await;
    let gone = create_student(&storage, 2).await;
    let a = create_class(&storage, "A", None, 5).await;
    let b = create_class(&storage, "B", None, 5).await;
    let relationships = storage.relationships();
    relationships
        .set_class_roster(a.id, &[keep.id, gone.id])
        .await
        .unwrap();
    relationships
        .set_class_roster(b.id, &[gone.id])
        .await
        .unwrap();

    storage.students().delete(gone.id).await.unwrap();

    assert_eq!(relationships.class_roster(a.id).await.unwrap(), vec![keep.id]);
    assert!(relationships.class_roster(b.id).await.unwrap().is_empty());
    assert_eq!(relationships.student_classes(keep.id).await.unwrap(), vec![a.id]);
}

#[tokio::test]
async fn test_deleting_class_removes_its_links() {
    let storage = setup().await;
    let student = create_student(&storage, 1).await;
    let a = create_class(&storage, "A", None, 5).await;
    let b = create_class(&storage, "B", None, 5).await;
    let relationships = storage.relationships();
    relationships
        .set_student_classes(student.id, &[a.id, b.id])
        .await
        .unwrap();

    storage.classes().delete(a.id).await.unwrap();

    assert_eq!(relationships.student_classes(student.id).await.unwrap(), vec![b.id]);
    assert!(storage.students().get(student.id).await.is_ok());
}

#[tokio::test]
async fn test_promo_code_class_restriction() {
    let storage = setup().await;
    let a = create_class(&storage, "A", None, 5).await;
    let b = create_class(&storage, "B", None, 5).await;
    let promo = storage
        .promo_codes()
        .create(CreatePromoCodeRequest {
            code: "ONLY-A".to_string(),
            discount_type: DiscountType::Percent,
            discount_value: 20.0,
            ..Default::default()
        })
        .await
        .unwrap();
    let relationships = storage.relationships();

    assert_eq!(
        relationships.promo_code_classes(promo.id).await.unwrap(),
        ClassRestriction::Unrestricted
    );

    let saved = relationships
        .set_promo_code_classes(promo.id, ClassRestriction::Restricted(vec![a.id, a.id]))
        .await
        .unwrap();
    assert_eq!(saved, ClassRestriction::Restricted(vec![a.id]));
    assert!(saved.allows(Some(a.id)));
    assert!(!saved.allows(Some(b.id)));

    let now = Utc::now();
    let codes = storage.promo_codes();
    let err = codes.redeem("ONLY-A", Some(b.id), now).await.unwrap_err();
    assert!(matches!(err, SchoolError::Validation { ref field, .. } if field == "class_id"));
    let err = codes.redeem("ONLY-A", None, now).await.unwrap_err();
    assert!(matches!(err, SchoolError::Validation { ref field, .. } if field == "class_id"));
    assert_eq!(codes.redeem("ONLY-A", Some(a.id), now).await.unwrap().usage_count, 1);

    // 空集合表示不适用于任何班级
    relationships
        .set_promo_code_classes(promo.id, ClassRestriction::Restricted(vec![]))
        .await
        .unwrap();
    assert_eq!(
        relationships.promo_code_classes(promo.id).await.unwrap(),
        ClassRestriction::Restricted(vec![])
    );
    assert!(codes.redeem("ONLY-A", Some(a.id), now).await.is_err());

    relationships
        .set_promo_code_classes(promo.id, ClassRestriction::Unrestricted)
        .await
        .unwrap();
    assert!(codes.redeem("ONLY-A", Some(b.id), now).await.is_ok());
}
