/*!
 * 管理接口访问控制中间件
 *
 * 鉴权本身不在本服务内实现：中间件只调用注入的 `AdminCapability`，
 * 由它判断调用方是否具备管理权限。默认实现 `StaticTokenCapability`
 * 比较请求头 `X-Admin-Token` 与配置中的 `admin.api_token`。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use std::sync::Arc;
 * use actix_web::{web, App};
 * use crate::middlewares::{RequireAdmin, StaticTokenCapability};
 *
 * let capability = Arc::new(StaticTokenCapability::new("secret"));
 * App::new().service(
 *     web::scope("/api/v1/admin")
 *         .wrap(RequireAdmin::new(capability))
 *         .route("/teachers", web::get().to(list_teachers)),
 * );
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::net::SocketAddr;
use std::rc::Rc;
use std::sync::Arc;
use tracing::info;

use super::create_error_response;
use crate::models::ErrorCode;

pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// 调用方上下文
#[derive(Debug, Clone, Default)]
pub struct CallerContext {
    pub token: Option<String>,
    pub peer: Option<SocketAddr>,
}

impl CallerContext {
    pub fn from_request(req: &ServiceRequest) -> Self {
        Self {
            token: req
                .headers()
                .get(ADMIN_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            peer: req.peer_addr(),
        }
    }
}

/// 管理权限判断
#[async_trait::async_trait]
pub trait AdminCapability: Send + Sync {
    async fn caller_has_admin_capability(&self, caller: &CallerContext) -> bool;
}

/// 固定令牌校验，令牌为空时拒绝所有请求
#[derive(Debug, Clone)]
pub struct StaticTokenCapability {
    token: String,
}

impl StaticTokenCapability {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait::async_trait]
impl AdminCapability for StaticTokenCapability {
    async fn caller_has_admin_capability(&self, caller: &CallerContext) -> bool {
        if self.token.is_empty() {
            return false;
        }
        caller.token.as_deref() == Some(self.token.as_str())
    }
}

#[derive(Clone)]
pub struct RequireAdmin {
    capability: Arc<dyn AdminCapability>,
}

impl RequireAdmin {
    pub fn new(capability: Arc<dyn AdminCapability>) -> Self {
        Self { capability }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAdmin
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAdminMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAdminMiddleware {
            service: Rc::new(service),
            capability: self.capability.clone(),
        }))
    }
}

pub struct RequireAdminMiddleware<S> {
    service: Rc<S>,
    capability: Arc<dyn AdminCapability>,
}

impl<S, B> Service<ServiceRequest> for RequireAdminMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let capability = self.capability.clone();

        Box::pin(async move {
            let caller = CallerContext::from_request(&req);

            if capability.caller_has_admin_capability(&caller).await {
                let res = srv.call(req).await?.map_into_left_body();
                return Ok(res);
            }

            info!(
                "Admin access denied for {} {} (peer: {:?}, token present: {})",
                req.method(),
                req.path(),
                caller.peer,
                caller.token.is_some()
            );
            Ok(req.into_response(
                create_error_response(
                    StatusCode::FORBIDDEN,
                    ErrorCode::Unauthorized,
                    "Admin capability required",
                )
                .map_into_right_body(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token_capability() {
        let capability = StaticTokenCapability::new("secret");
        let mut caller = CallerContext::default();
        assert!(!capability.caller_has_admin_capability(&caller).await);

        caller.token = Some("wrong".to_string());
        assert!(!capability.caller_has_admin_capability(&caller).await);

        caller.token = Some("secret".to_string());
        assert!(capability.caller_has_admin_capability(&caller).await);
    }

    #[tokio::test]
    async fn test_empty_token_denies_everyone() {
        let capability = StaticTokenCapability::new("");
        let caller = CallerContext {
            token: Some(String::new()),
            peer: None,
        };
        assert!(!capability.caller_has_admin_capability(&caller).await);
    }
}
