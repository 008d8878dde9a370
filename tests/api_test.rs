//! 管理接口集成测试

mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use serde_json::{Value, json};
use std::sync::Arc;

use common::{create_class, create_student, setup};
use school_manager::middlewares::StaticTokenCapability;
use school_manager::routes::configure_admin_routes;
use school_manager::services::TransferSettings;
use school_manager::storage::SeaOrmStorage;

const TOKEN: &str = "secret";

macro_rules! admin_app {
    ($storage:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($storage.clone()))
                .configure(configure_admin_routes(Arc::new(StaticTokenCapability::new(
                    TOKEN,
                )))),
        )
        .await
    };
}

const BOUNDARY: &str = "XBOUNDARY";

/// 单个 file 字段的 multipart 请求
fn csv_upload(uri: &str, csv: &str) -> test::TestRequest {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"upload.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{BOUNDARY}--\r\n"
    );
    authorized(test::TestRequest::post())
        .uri(uri)
        .insert_header((
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

fn authorized(req: test::TestRequest) -> test::TestRequest {
    req.insert_header(("X-Admin-Token", TOKEN))
}

async fn seeded() -> SeaOrmStorage {
    let storage = setup().await;
    for n in 0..3 {
        create_student(&storage, n).await;
    }
    storage
}

#[actix_web::test]
async fn test_requests_without_token_are_rejected() {
    let storage = seeded().await;
    let app = admin_app!(storage);

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/students")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/students")
        .insert_header(("X-Admin-Token", "wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_list_students_with_pagination() {
    let storage = seeded().await;
    let app = admin_app!(storage);

    let req = authorized(test::TestRequest::get())
        .uri("/api/v1/admin/students?page_size=2&sort=mobile&order=desc")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["total"], 3);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["mobile"], "0500000002");
}

#[actix_web::test]
async fn test_unknown_filter_is_unprocessable() {
    let storage = seeded().await;
    let app = admin_app!(storage);

    let req = authorized(test::TestRequest::get())
        .uri("/api/v1/admin/students?nickname=x")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_teacher_crud_status_codes() {
    let storage = setup().await;
    let app = admin_app!(storage);

    let payload = json!({
        "first_name": "Dana",
        "last_name": "Levi",
        "email": "dana@school.test",
        "mobile": "0521234567"
    });

    let req = authorized(test::TestRequest::post())
        .uri("/api/v1/admin/teachers")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let id = body["data"]["id"].as_i64().unwrap();
    assert!(body["data"].get("password_hash").is_none());

    let req = authorized(test::TestRequest::post())
        .uri("/api/v1/admin/teachers")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = authorized(test::TestRequest::put())
        .uri(&format!("/api/v1/admin/teachers/{id}"))
        .set_json(json!({ "first_name": null }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["data"]["first_name"].is_null());
    assert_eq!(body["data"]["last_name"], "Levi");

    let req = authorized(test::TestRequest::post())
        .uri("/api/v1/admin/teachers/status")
        .set_json(json!({ "ids": [id, 999], "status": "inactive" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["updated"], 1);

    let req = authorized(test::TestRequest::delete())
        .uri(&format!("/api/v1/admin/teachers/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = authorized(test::TestRequest::get())
        .uri(&format!("/api/v1/admin/teachers/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_invalid_student_is_unprocessable() {
    let storage = setup().await;
    let app = admin_app!(storage);

    let req = authorized(test::TestRequest::post())
        .uri("/api/v1/admin/students")
        .set_json(json!({
            "first_name": "  ",
            "last_name": "Lee",
            "mobile": "0501234567"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["field"], "first_name");
}

#[actix_web::test]
async fn test_class_roster_routes() {
    let storage = seeded().await;
    let class = create_class(&storage, "Algebra", None, 2).await;
    let app = admin_app!(storage);

    let req = authorized(test::TestRequest::put())
        .uri(&format!("/api/v1/admin/classes/{}/students", class.id))
        .set_json(json!({ "student_ids": [1, 2, 2] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = authorized(test::TestRequest::get())
        .uri(&format!("/api/v1/admin/classes/{}/students", class.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["student_ids"], json!([1, 2]));

    // 容量不限制名单写入
    let req = authorized(test::TestRequest::put())
        .uri(&format!("/api/v1/admin/classes/{}/students", class.id))
        .set_json(json!({ "student_ids": [3, 1, 2] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = authorized(test::TestRequest::get())
        .uri(&format!("/api/v1/admin/classes/{}/students", class.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["student_ids"], json!([1, 2, 3]));

    // 班级本身的 scope 仍然可达
    let req = authorized(test::TestRequest::get())
        .uri(&format!("/api/v1/admin/classes/{}", class.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["name"], "Algebra");
}

#[actix_web::test]
async fn test_export_and_template_downloads() {
    let storage = seeded().await;
    let app = admin_app!(storage);

    let req = authorized(test::TestRequest::get())
        .uri("/api/v1/admin/students/export?status=active")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/csv"))
    );
    let body = test::read_body(resp).await;
    let text = String::from_utf8_lossy(&body[3..]).to_string();
    assert_eq!(text.lines().count(), 4);

    let req = authorized(test::TestRequest::get())
        .uri("/api/v1/admin/promo-codes/template")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = authorized(test::TestRequest::get())
        .uri("/api/v1/admin/lessons/template")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_system_schema_status() {
    let storage = setup().await;
    let app = admin_app!(storage);

    let req = authorized(test::TestRequest::get())
        .uri("/api/v1/admin/system/schema")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["schema_version"], migration::SCHEMA_VERSION);
    assert_eq!(body["data"]["up_to_date"], true);
}

#[actix_web::test]
async fn test_import_upload() {
    let storage = setup().await;
    let app = admin_app!(storage);

    let csv = "First Name,Last Name,Mobile\nAnn,Lee,0501234567\n,,\n";
    let req = csv_upload("/api/v1/admin/students/import", csv).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["inserted"], 1);
    assert_eq!(body["data"]["blank"], 1);
    assert_eq!(storage.students().count().await.unwrap(), 1);

    // 只有表头
    let req = csv_upload("/api/v1/admin/students/import", "First Name,Last Name,Mobile\n")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total"], 0);
}

#[actix_web::test]
async fn test_import_upload_missing_columns() {
    let storage = setup().await;
    let app = admin_app!(storage);

    let req = csv_upload("/api/v1/admin/promo-codes/import", "code,description\nSPRING,x\n")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["missing_columns"], json!(["amount"]));
    assert_eq!(storage.promo_codes().count().await.unwrap(), 0);
}

#[actix_web::test]
async fn test_import_upload_size_limit() {
    let storage = setup().await;
    let settings = TransferSettings {
        max_upload_bytes: 64,
        ..Default::default()
    };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(settings))
            .configure(configure_admin_routes(Arc::new(StaticTokenCapability::new(
                TOKEN,
            )))),
    )
    .await;

    let mut csv = String::from("First Name,Last Name,Mobile\n");
    for n in 0..10 {
        csv.push_str(&format!("Student{n},Test,050{n:07}\n"));
    }
    let req = csv_upload("/api/v1/admin/students/import", &csv).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 4006);
    assert_eq!(storage.students().count().await.unwrap(), 0);
}
