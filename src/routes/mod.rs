pub mod classes;
pub mod promo_codes;
pub mod relationships;
pub mod students;
pub mod system;
pub mod teachers;
pub mod transfer;

use actix_web::web;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::Result;
use crate::middlewares::{AdminCapability, RequireAdmin};
use crate::models::ListQuery;

pub use classes::configure_classes_routes;
pub use promo_codes::configure_promo_codes_routes;
pub use relationships::configure_relationship_routes;
pub use students::configure_students_routes;
pub use system::configure_system_routes;
pub use teachers::configure_teachers_routes;
pub use transfer::configure_transfer_routes;

/// 挂载全部管理接口，统一经过管理权限校验
pub fn configure_admin_routes(
    capability: Arc<dyn AdminCapability>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(
            web::scope("/api/v1/admin")
                .wrap(RequireAdmin::new(capability))
                // 嵌套路径必须先于实体 scope 注册，scope 匹配前缀后不会回退
                .configure(configure_relationship_routes)
                .configure(configure_transfer_routes)
                .configure(configure_teachers_routes)
                .configure(configure_students_routes)
                .configure(configure_classes_routes)
                .configure(configure_promo_codes_routes)
                .configure(configure_system_routes),
        );
    }
}

/// 查询参数转换为列表查询
pub(crate) fn list_query(params: web::Query<HashMap<String, String>>) -> Result<ListQuery> {
    ListQuery::from_params(params.into_inner())
}
