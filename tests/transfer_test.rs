//! CSV 导入导出集成测试

mod common;

use chrono::{TimeZone, Utc};
use serde_json::Value;

use common::{create_class, create_student, create_teacher, setup};
use school_manager::errors::SchoolError;
use school_manager::models::classes::requests::CreateClassRequest;
use school_manager::models::promo_codes::entities::DiscountType;
use school_manager::models::promo_codes::requests::CreatePromoCodeRequest;
use school_manager::models::students::requests::CreateStudentRequest;
use school_manager::models::teachers::requests::CreateTeacherRequest;
use school_manager::models::{EntityStatus, ListQuery};
use school_manager::storage::SeaOrmStorage;
use school_manager::transfer::{
    CsvExporter, CsvImporter, CsvOptions, EntityKind, ExportFilter, ImportResult, write_template,
};

fn importer(storage: &school_manager::storage::SeaOrmStorage) -> CsvImporter {
    CsvImporter::new(storage.clone(), CsvOptions::default())
}

#[tokio::test]
async fn test_import_students_with_missing_first_name() {
    let storage = setup().await;
    let data = "first_name,last_name,mobile,status\n\
                Ann,Lee,0501234567,active\n\
                \"\",Cohen,0509999999,active\n";

    let result = importer(&storage)
        .import(EntityKind::Students, data.as_bytes())
        .await
        .unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.inserted, 1);
    assert_eq!(result.updated, 0);
    assert_eq!(result.skipped, 1);
    assert_eq!(
        result.errors,
        vec!["Row 2: Missing required fields: first_name".to_string()]
    );

    let ann = storage
        .students()
        .find_by_mobile("0501234567")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ann.full_name(), "Ann Lee");
    assert!(storage.students().find_by_mobile("0509999999").await.unwrap().is_none());
}

#[tokio::test]
async fn test_malformed_row_does_not_block_others() {
    let storage = setup().await;
    let data = "First Name,Last Name,Mobile,Email\n\
                Ann,Lee,0501111111,ann@school.test\n\
                Ben,Cohen,0502222222,not-an-email\n\
                Chen,Wu,0503333333,\n";

    let result = importer(&storage)
        .import(EntityKind::Students, data.as_bytes())
        .await
        .unwrap();

    assert_eq!(result.total, 3);
    assert_eq!(result.inserted, 2);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Row 2: Failed to insert record:"));
    assert_eq!(storage.students().count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_duplicate_rows_in_file_conflict() {
    let storage = setup().await;
    let data = "email,mobile\n\
                dana@school.test,0521000001\n\
                dana@school.test,0521000002\n";

    let result = importer(&storage)
        .import(EntityKind::Teachers, data.as_bytes())
        .await
        .unwrap();

    assert_eq!(result.inserted, 1);
    assert_eq!(result.skipped, 1);
    assert!(result.errors[0].contains("already exists"));
}

#[tokio::test]
async fn test_missing_required_columns_is_file_error() {
    let storage = setup().await;
    let data = "code,description\nSPRING,Spring sale\n";

    let err = importer(&storage)
        .import(EntityKind::PromoCodes, data.as_bytes())
        .await
        .unwrap_err();

    match err {
        SchoolError::MissingColumns { columns } => assert_eq!(columns, vec!["amount".to_string()]),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(storage.promo_codes().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_id_is_row_error() {
    let storage = setup().await;
    let data = "id,first_name,last_name,mobile\n\
                999,Ann,Lee,0501234567\n\
                abc,Ben,Cohen,0502222222\n";

    let result = importer(&storage)
        .import(EntityKind::Students, data.as_bytes())
        .await
        .unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.inserted, 0);
    assert_eq!(result.skipped, 2);
    assert_eq!(
        result.errors[0],
        "Row 1: Failed to update record: student 999 not found"
    );
    assert!(result.errors[1].starts_with("Row 2: Failed to update record: id:"));
    assert_eq!(storage.students().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_blank_rows_are_counted_separately() {
    let storage = setup().await;
    let data = "first_name,last_name,mobile\n\
                ,,\n\
                Ann,Lee,0501234567\n\
                \" \",,\n";

    let result = importer(&storage)
        .import(EntityKind::Students, data.as_bytes())
        .await
        .unwrap();

    assert_eq!(result.blank, 2);
    assert_eq!(result.total, 1);
    assert_eq!(result.inserted, 1);
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn test_import_promo_codes_coerces_values() {
    let storage = setup().await;
    let data = "Code,Discount Type,Amount,Usage Limit,Expiry Date,Status\n\
                SPRING,percent,25,100,2030-06-30,active\n\
                FLAT,whatever,abc,,,inactive\n";

    let result = importer(&storage)
        .import(EntityKind::PromoCodes, data.as_bytes())
        .await
        .unwrap();
    assert_eq!(result.inserted, 2, "errors: {:?}", result.errors);

    let spring = storage.promo_codes().find_by_code("SPRING").await.unwrap().unwrap();
    assert_eq!(spring.discount_type, DiscountType::Percent);
    assert_eq!(spring.discount_value, 25.0);
    assert_eq!(spring.usage_limit, Some(100));
    let expiry = spring.expiry_date.unwrap();
    assert_eq!(expiry.format("%Y-%m-%d %H:%M:%S").to_string(), "2030-06-30 23:59:59");

    let flat = storage.promo_codes().find_by_code("FLAT").await.unwrap().unwrap();
    assert_eq!(flat.discount_type, DiscountType::Fixed);
    assert_eq!(flat.discount_value, 0.0);
    assert_eq!(flat.usage_limit, None);
    assert_eq!(flat.status, EntityStatus::Inactive);
}

#[tokio::test]
async fn test_import_classes_with_teacher_reference() {
    let storage = setup().await;
    let teacher = create_teacher(&storage, 1).await;
    let data = format!(
        "Class Name,Teacher ID,Capacity\n\
         Algebra,{},12\n\
         Writing,9999,8\n",
        teacher.id
    );

    let result = importer(&storage)
        .import(EntityKind::Classes, data.as_bytes())
        .await
        .unwrap();

    assert_eq!(result.inserted, 1);
    assert_eq!(result.skipped, 1);
    assert!(result.errors[0].contains("teacher 9999 not found"));

    let classes = storage.classes().list(&ListQuery::new()).await.unwrap();
    assert_eq!(classes.items[0].teacher_id, Some(teacher.id));
    assert_eq!(classes.items[0].capacity, 12);
}

/// 每种实体都覆盖可选列为空、特殊字符和非默认状态
async fn populate(storage: &SeaOrmStorage) {
    let teacher = create_teacher(storage, 1).await;
    storage
        .teachers()
        .create(CreateTeacherRequest {
            email: "nameless@school.test".to_string(),
            mobile: "0527777777".to_string(),
            status: EntityStatus::Inactive,
            ..Default::default()
        })
        .await
        .unwrap();

    for n in 0..4 {
        create_student(storage, n).await;
    }
    storage
        .students()
        .create(CreateStudentRequest {
            first_name: "Noa".to_string(),
            last_name: "O'Brien, Jr.".to_string(),
            email: Some("noa@school.test".to_string()),
            mobile: "0508888888".to_string(),
            promo_code: Some("SPRING".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    storage
        .classes()
        .create(CreateClassRequest {
            name: "Algebra, \"Part 1\"".to_string(),
            description: Some("Line one\nline two".to_string()),
            teacher_id: Some(teacher.id),
            capacity: Some(12),
            status: EntityStatus::Active,
        })
        .await
        .unwrap();
    create_class(storage, "Writing", None, 30).await;

    storage
        .promo_codes()
        .create(CreatePromoCodeRequest {
            code: "Spring".to_string(),
            description: Some("Spring sale, 12.5% off".to_string()),
            discount_type: DiscountType::Percent,
            discount_value: 12.5,
            usage_limit: Some(100),
            start_date: None,
            expiry_date: Some(Utc.with_ymd_and_hms(2030, 6, 30, 23, 59, 59).unwrap()),
            status: EntityStatus::Active,
        })
        .await
        .unwrap();
    storage
        .promo_codes()
        .create(CreatePromoCodeRequest {
            code: "FLAT50".to_string(),
            discount_type: DiscountType::Fixed,
            discount_value: 50.0,
            status: EntityStatus::Inactive,
            ..Default::default()
        })
        .await
        .unwrap();
}

/// 按 id 排序的 JSON 快照，去掉导入时必然变化的 updated_at
async fn snapshot(storage: &SeaOrmStorage, kind: EntityKind) -> Vec<Value> {
    let query = ListQuery::new().page(200, 0);
    let mut items: Vec<Value> = match kind {
        EntityKind::Teachers => storage
            .teachers()
            .list(&query)
            .await
            .unwrap()
            .items
            .iter()
            .map(|t| serde_json::to_value(t).unwrap())
            .collect(),
        EntityKind::Students => storage
            .students()
            .list(&query)
            .await
            .unwrap()
            .items
            .iter()
            .map(|s| serde_json::to_value(s).unwrap())
            .collect(),
        EntityKind::Classes => storage
            .classes()
            .list(&query)
            .await
            .unwrap()
            .items
            .iter()
            .map(|c| serde_json::to_value(c).unwrap())
            .collect(),
        EntityKind::PromoCodes => storage
            .promo_codes()
            .list(&query)
            .await
            .unwrap()
            .items
            .iter()
            .map(|p| serde_json::to_value(p).unwrap())
            .collect(),
    };
    for item in &mut items {
        if let Some(object) = item.as_object_mut() {
            object.remove("updated_at");
        }
    }
    items.sort_by_key(|item| item["id"].as_i64());
    items
}

async fn export_all(storage: &SeaOrmStorage, kind: EntityKind) -> (u64, Vec<u8>) {
    // 批大小小于记录数，覆盖分页导出
    let mut buffer = Vec::new();
    let written = CsvExporter::new(storage.clone(), 2)
        .export(kind, &ExportFilter::default(), &mut buffer)
        .await
        .unwrap();
    (written, buffer)
}

#[tokio::test]
async fn test_export_then_reimport_round_trips_every_kind() {
    let storage = setup().await;
    populate(&storage).await;

    for kind in EntityKind::ALL {
        let before = snapshot(&storage, kind).await;
        let (written, buffer) = export_all(&storage, kind).await;
        assert_eq!(written as usize, before.len(), "{kind}");
        assert!(buffer.starts_with(b"\xEF\xBB\xBF"));

        let result = importer(&storage).import(kind, &buffer).await.unwrap();
        assert_eq!(result.total, before.len(), "{kind}");
        assert_eq!(result.updated, before.len(), "{kind}");
        assert_eq!(result.inserted, 0, "{kind}");
        assert_eq!(result.skipped, 0, "{kind}: {:?}", result.errors);

        assert_eq!(snapshot(&storage, kind).await, before, "{kind}");
    }
}

#[tokio::test]
async fn test_export_then_reimport_empty_tables() {
    let storage = setup().await;

    for kind in EntityKind::ALL {
        let (written, buffer) = export_all(&storage, kind).await;
        assert_eq!(written, 0);

        let result = importer(&storage).import(kind, &buffer).await.unwrap();
        assert_eq!(result, ImportResult::default(), "{kind}");
    }
}

#[tokio::test]
async fn test_export_students_header() {
    let storage = setup().await;
    create_student(&storage, 1).await;

    let (_, buffer) = export_all(&storage, EntityKind::Students).await;
    let text = String::from_utf8_lossy(&buffer[3..]).to_string();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("ID,First Name,Last Name,Email,Mobile,Promo Code,Status,Date Created")
    );
    assert_eq!(lines.count(), 1);
}

#[tokio::test]
async fn test_export_filter_by_status() {
    let storage = setup().await;
    let a = create_class(&storage, "A", None, 5).await;
    create_class(&storage, "B", None, 5).await;
    storage
        .classes()
        .set_status(&[a.id], EntityStatus::Inactive)
        .await
        .unwrap();

    let filter = ExportFilter {
        status: Some(EntityStatus::Inactive),
        ..Default::default()
    };
    let mut buffer = Vec::new();
    let written = CsvExporter::new(storage.clone(), 100)
        .export(EntityKind::Classes, &filter, &mut buffer)
        .await
        .unwrap();
    assert_eq!(written, 1);
    assert!(String::from_utf8_lossy(&buffer).contains(",A,"));
}

#[test]
fn test_template_has_label_and_hint_rows() {
    let mut buffer = Vec::new();
    write_template(EntityKind::Teachers, &mut buffer).unwrap();
    let text = String::from_utf8_lossy(&buffer[3..]).to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("ID,First Name"));
    assert!(lines[1].starts_with("example_id,example_first_name"));
    assert!(lines[2].starts_with("// ID,// First Name"));
}
