//! 实体仓储集成测试

mod common;

use chrono::{Duration, Utc};

use common::{create_student, create_teacher, setup};
use school_manager::errors::SchoolError;
use school_manager::models::promo_codes::entities::DiscountType;
use school_manager::models::promo_codes::requests::{
    CreatePromoCodeRequest, UpdatePromoCodeRequest,
};
use school_manager::models::students::requests::{CreateStudentRequest, UpdateStudentRequest};
use school_manager::models::teachers::requests::CreateTeacherRequest;
use school_manager::models::{EntityStatus, ListQuery};
use school_manager::utils::next_expiry;
use school_manager::utils::password::verify_password;

#[tokio::test]
async fn test_create_then_get_student() {
    let storage = setup().await;
    let repo = storage.students();

    let created = repo
        .create(CreateStudentRequest {
            first_name: " Ann ".to_string(),
            last_name: "Lee".to_string(),
            email: Some("ann.lee@school.test".to_string()),
            mobile: "0501234567".to_string(),
            password: Some("correct horse".to_string()),
            promo_code: Some("WELCOME10".to_string()),
            status: EntityStatus::Active,
        })
        .await
        .unwrap();

    let fetched = repo.get(created.id).await.unwrap();
    assert_eq!(fetched.first_name, "Ann");
    assert_eq!(fetched.last_name, "Lee");
    assert_eq!(fetched.email.as_deref(), Some("ann.lee@school.test"));
    assert_eq!(fetched.mobile, "0501234567");
    assert_eq!(fetched.promo_code.as_deref(), Some("WELCOME10"));
    assert_eq!(fetched.status, EntityStatus::Active);
    assert_eq!(fetched.expiry_date, Some(next_expiry(fetched.created_at)));
    assert!(verify_password("correct horse", &fetched.password_hash));
    assert!(!verify_password("wrong", &fetched.password_hash));

    let by_mobile = repo.find_by_mobile("0501234567").await.unwrap();
    assert_eq!(by_mobile.map(|s| s.id), Some(created.id));
}

#[tokio::test]
async fn test_teacher_gets_generated_password() {
    let storage = setup().await;
    let teacher = storage
        .teachers()
        .create(CreateTeacherRequest {
            email: "dana@school.test".to_string(),
            mobile: "0521000001".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(teacher.password_hash.starts_with("$argon2id$"));
    assert_eq!(teacher.display_name(), "dana@school.test");
}

#[tokio::test]
async fn test_duplicate_mobile_is_conflict() {
    let storage = setup().await;
    let repo = storage.students();
    create_student(&storage, 1).await;

    let err = repo
        .create(CreateStudentRequest {
            first_name: "Other".to_string(),
            last_name: "Student".to_string(),
            mobile: "0500000001".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SchoolError::Conflict { ref field, .. } if field == "mobile"));
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_duplicate_teacher_email_is_conflict() {
    let storage = setup().await;
    create_teacher(&storage, 1).await;

    let err = storage
        .teachers()
        .create(CreateTeacherRequest {
            email: "teacher1@school.test".to_string(),
            mobile: "0529999999".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SchoolError::Conflict { ref field, .. } if field == "email"));
    assert_eq!(storage.teachers().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_invalid_input_is_validation_error() {
    let storage = setup().await;

    let err = storage
        .students()
        .create(CreateStudentRequest {
            first_name: "   ".to_string(),
            last_name: "Lee".to_string(),
            mobile: "0501234567".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SchoolError::Validation { ref field, .. } if field == "first_name"));

    let err = storage
        .teachers()
        .create(CreateTeacherRequest {
            email: "not-an-email".to_string(),
            mobile: "0521000001".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SchoolError::Validation { ref field, .. } if field == "email"));
}

#[tokio::test]
async fn test_update_student_keeps_unspecified_fields() {
    let storage = setup().await;
    let student = create_student(&storage, 1).await;

    let updated = storage
        .students()
        .update(
            student.id,
            UpdateStudentRequest {
                last_name: Some("Cohen".to_string()),
                email: Some(Some("s1@school.test".to_string())),
                status: Some(EntityStatus::Inactive),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.first_name, "Student1");
    assert_eq!(updated.last_name, "Cohen");
    assert_eq!(updated.email.as_deref(), Some("s1@school.test"));
    assert_eq!(updated.status, EntityStatus::Inactive);
    assert_eq!(updated.password_hash, student.password_hash);

    // 显式清空邮箱
    let cleared = storage
        .students()
        .update(
            student.id,
            UpdateStudentRequest {
                email: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.email, None);
}

#[tokio::test]
async fn test_missing_records_are_not_found() {
    let storage = setup().await;

    let err = storage.teachers().get(404).await.unwrap_err();
    assert!(matches!(err, SchoolError::NotFound { ref entity, id: 404 } if entity == "teacher"));

    let err = storage.classes().delete(404).await.unwrap_err();
    assert!(matches!(err, SchoolError::NotFound { ref entity, .. } if entity == "class"));

    let err = storage
        .students()
        .update(404, UpdateStudentRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SchoolError::NotFound { ref entity, .. } if entity == "student"));
}

#[tokio::test]
async fn test_set_status_returns_count() {
    let storage = setup().await;
    let a = create_teacher(&storage, 1).await;
    let b = create_teacher(&storage, 2).await;

    let updated = storage
        .teachers()
        .set_status(&[a.id, b.id, 999], EntityStatus::Inactive)
        .await
        .unwrap();
    assert_eq!(updated, 2);
    assert_eq!(
        storage.teachers().get(a.id).await.unwrap().status,
        EntityStatus::Inactive
    );
    assert_eq!(
        storage.teachers().set_status(&[], EntityStatus::Active).await.unwrap(),
        0
    );
}

fn promo(code: &str, discount_type: DiscountType, value: f64) -> CreatePromoCodeRequest {
    CreatePromoCodeRequest {
        code: code.to_string(),
        discount_type,
        discount_value: value,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_percent_discount_over_100_is_rejected() {
    let storage = setup().await;
    let repo = storage.promo_codes();

    let err = repo
        .create(promo("HALFPLUS", DiscountType::Percent, 150.0))
        .await
        .unwrap_err();
    assert!(matches!(err, SchoolError::Validation { ref field, .. } if field == "discount_value"));

    let fixed = repo
        .create(promo("FLAT150", DiscountType::Fixed, 150.0))
        .await
        .unwrap();
    assert_eq!(fixed.discount_value, 150.0);
    assert!(fixed.applies_to_all_classes);
    assert_eq!(fixed.apply_discount(100.0), 0.0);

    // 修改类型后重新校验
    let err = repo
        .update(
            fixed.id,
            UpdatePromoCodeRequest {
                discount_type: Some(DiscountType::Percent),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SchoolError::Validation { .. }));
}

#[tokio::test]
async fn test_promo_code_is_unique_ignoring_case() {
    let storage = setup().await;
    let repo = storage.promo_codes();
    repo.create(promo("Spring25", DiscountType::Percent, 25.0))
        .await
        .unwrap();

    let err = repo
        .create(promo("SPRING25", DiscountType::Percent, 10.0))
        .await
        .unwrap_err();
    assert!(matches!(err, SchoolError::Conflict { ref field, .. } if field == "code"));

    let found = repo.find_by_code("spring25").await.unwrap().unwrap();
    assert_eq!(found.code, "Spring25");
}

#[tokio::test]
async fn test_promo_validity_window() {
    let storage = setup().await;
    let now = Utc::now();

    let err = storage
        .promo_codes()
        .create(CreatePromoCodeRequest {
            start_date: Some(now + Duration::days(10)),
            expiry_date: Some(now),
            ..promo("BACKWARDS", DiscountType::Fixed, 5.0)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SchoolError::Validation { ref field, .. } if field == "expiry_date"));

    let expired = storage
        .promo_codes()
        .create(CreatePromoCodeRequest {
            expiry_date: Some(now - Duration::days(1)),
            ..promo("OLD", DiscountType::Fixed, 5.0)
        })
        .await
        .unwrap();
    let err = storage
        .promo_codes()
        .redeem(&expired.code, None, now)
        .await
        .unwrap_err();
    assert!(matches!(err, SchoolError::Validation { ref field, .. } if field == "code"));
}

#[tokio::test]
async fn test_redeem_respects_usage_limit() {
    let storage = setup().await;
    let repo = storage.promo_codes();
    repo.create(CreatePromoCodeRequest {
        usage_limit: Some(2),
        ..promo("TWICE", DiscountType::Percent, 10.0)
    })
    .await
    .unwrap();

    let now = Utc::now();
    let first = repo.redeem("twice", None, now).await.unwrap();
    assert_eq!(first.usage_count, 1);
    assert_eq!(first.remaining_uses(), Some(1));
    let second = repo.redeem("TWICE", None, now).await.unwrap();
    assert_eq!(second.usage_count, 2);

    let err = repo.redeem("TWICE", None, now).await.unwrap_err();
    assert!(matches!(err, SchoolError::Validation { ref field, .. } if field == "code"));
    assert_eq!(
        repo.find_by_code("TWICE").await.unwrap().unwrap().usage_count,
        2
    );

    let err = repo.redeem("NOPE", None, now).await.unwrap_err();
    assert!(matches!(err, SchoolError::Validation { .. }));
}

#[tokio::test]
async fn test_redeem_zero_limit_is_used_up() {
    let storage = setup().await;
    let repo = storage.promo_codes();
    let promo = repo
        .create(CreatePromoCodeRequest {
            usage_limit: Some(0),
            ..promo("NEVER", DiscountType::Fixed, 5.0)
        })
        .await
        .unwrap();
    assert_eq!(promo.remaining_uses(), Some(0));

    let err = repo.redeem("never", None, Utc::now()).await.unwrap_err();
    assert!(matches!(err, SchoolError::Validation { ref field, .. } if field == "code"));
    assert_eq!(repo.get(promo.id).await.unwrap().usage_count, 0);
}

#[tokio::test]
async fn test_list_pagination() {
    let storage = setup().await;
    for n in 0..45 {
        create_student(&storage, n).await;
    }

    let page = storage
        .students()
        .list(&ListQuery::new().page(20, 40))
        .await
        .unwrap();
    assert_eq!(page.total, 45);
    assert_eq!(page.items.len(), 5);
    assert!(!page.has_more());

    let first = storage
        .students()
        .list(&ListQuery::new().page(20, 0))
        .await
        .unwrap();
    assert_eq!(first.items.len(), 20);
    assert!(first.has_more());
}

#[tokio::test]
async fn test_list_search_filter_and_sort() {
    let storage = setup().await;
    for n in 0..5 {
        create_teacher(&storage, n).await;
    }
    let last = create_teacher(&storage, 5).await;
    storage
        .teachers()
        .set_status(&[last.id], EntityStatus::Inactive)
        .await
        .unwrap();

    let found = storage
        .teachers()
        .list(&ListQuery::new().search("TEACHER3"))
        .await
        .unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.items[0].first_name.as_deref(), Some("Teacher3"));

    let inactive = storage
        .teachers()
        .list(&ListQuery::new().filter("status", "inactive"))
        .await
        .unwrap();
    assert_eq!(inactive.total, 1);
    assert_eq!(inactive.items[0].id, last.id);

    let sorted = storage
        .teachers()
        .list(&ListQuery::new().sort_by("email", true))
        .await
        .unwrap();
    assert_eq!(sorted.items[0].email, "teacher5@school.test");
}

#[tokio::test]
async fn test_list_rejects_unknown_columns() {
    let storage = setup().await;

    let err = storage
        .students()
        .list(&ListQuery::new().sort_by("password_hash", false))
        .await
        .unwrap_err();
    assert!(matches!(err, SchoolError::Validation { .. }));

    let err = storage
        .students()
        .list(&ListQuery::new().filter("1=1; --", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, SchoolError::Validation { .. }));
}
