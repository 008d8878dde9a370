use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::promo_codes::entities::ClassRestriction;
use crate::models::relationships::requests::{SetClassIdsRequest, SetStudentIdsRequest};
use crate::services::RelationshipService;

// 懒加载的全局 RELATIONSHIP_SERVICE 实例
static RELATIONSHIP_SERVICE: Lazy<RelationshipService> =
    Lazy::new(RelationshipService::new_lazy);

pub async fn get_class_roster(req: HttpRequest, class_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    RELATIONSHIP_SERVICE
        .get_class_roster(&req, class_id.into_inner())
        .await
}

pub async fn set_class_roster(
    req: HttpRequest,
    class_id: web::Path<i64>,
    body: web::Json<SetStudentIdsRequest>,
) -> ActixResult<HttpResponse> {
    RELATIONSHIP_SERVICE
        .set_class_roster(&req, class_id.into_inner(), body.into_inner().student_ids)
        .await
}

pub async fn get_class_enrollments(
    req: HttpRequest,
    class_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    RELATIONSHIP_SERVICE
        .get_class_enrollments(&req, class_id.into_inner())
        .await
}

pub async fn get_student_classes(
    req: HttpRequest,
    student_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    RELATIONSHIP_SERVICE
        .get_student_classes(&req, student_id.into_inner())
        .await
}

pub async fn set_student_classes(
    req: HttpRequest,
    student_id: web::Path<i64>,
    body: web::Json<SetClassIdsRequest>,
) -> ActixResult<HttpResponse> {
    RELATIONSHIP_SERVICE
        .set_student_classes(&req, student_id.into_inner(), body.into_inner().class_ids)
        .await
}

pub async fn get_teacher_classes(
    req: HttpRequest,
    teacher_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    RELATIONSHIP_SERVICE
        .get_teacher_classes(&req, teacher_id.into_inner())
        .await
}

pub async fn set_teacher_classes(
    req: HttpRequest,
    teacher_id: web::Path<i64>,
    body: web::Json<SetClassIdsRequest>,
) -> ActixResult<HttpResponse> {
    RELATIONSHIP_SERVICE
        .set_teacher_classes(&req, teacher_id.into_inner(), body.into_inner().class_ids)
        .await
}

pub async fn get_promo_code_classes(
    req: HttpRequest,
    promo_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    RELATIONSHIP_SERVICE
        .get_promo_code_classes(&req, promo_id.into_inner())
        .await
}

pub async fn set_promo_code_classes(
    req: HttpRequest,
    promo_id: web::Path<i64>,
    body: web::Json<ClassRestriction>,
) -> ActixResult<HttpResponse> {
    RELATIONSHIP_SERVICE
        .set_promo_code_classes(&req, promo_id.into_inner(), body.into_inner())
        .await
}

// 配置路由
pub fn configure_relationship_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/classes/{class_id}/students")
            .route(web::get().to(get_class_roster))
            .route(web::put().to(set_class_roster)),
    )
    .service(
        web::resource("/classes/{class_id}/enrollments").route(web::get().to(get_class_enrollments)),
    )
    .service(
        web::resource("/students/{student_id}/classes")
            .route(web::get().to(get_student_classes))
            .route(web::put().to(set_student_classes)),
    )
    .service(
        web::resource("/teachers/{teacher_id}/classes")
            .route(web::get().to(get_teacher_classes))
            .route(web::put().to(set_teacher_classes)),
    )
    .service(
        web::resource("/promo-codes/{promo_id}/classes")
            .route(web::get().to(get_promo_code_classes))
            .route(web::put().to(set_promo_code_classes)),
    );
}
