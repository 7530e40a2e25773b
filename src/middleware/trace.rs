//! 链路追踪中间件
//!
//! 按 B3 约定传递 X-B3-TraceId / X-B3-SpanId：
//! 请求带合法 TraceId 时沿用，否则生成新的；每个请求都会采样，
//! 并在响应头中回写本次的 TraceId 和 SpanId

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, HeaderName, HeaderValue},
    Error, HttpMessage,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;

pub const TRACE_ID_HEADER: &str = "x-b3-traceid";
pub const SPAN_ID_HEADER: &str = "x-b3-spanid";

/// 当前请求的追踪上下文，存放在请求扩展中
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: Option<String>,
}

impl TraceContext {
    /// 从请求头构造：沿用上游 TraceId，上游 SpanId 作为父 Span
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_lowercase())
                .filter(|v| is_valid_id(v))
        };

        Self {
            trace_id: header(TRACE_ID_HEADER).unwrap_or_else(new_id),
            span_id: new_id(),
            parent_span_id: header(SPAN_ID_HEADER),
        }
    }
}

/// 64 位十六进制 ID
fn new_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}

fn is_valid_id(id: &str) -> bool {
    matches!(id.len(), 16 | 32) && id.chars().all(|c| c.is_ascii_hexdigit())
}

/// 追踪中间件
pub struct TraceMiddleware;

impl<S, B> Transform<S, ServiceRequest> for TraceMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = TraceMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(TraceMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct TraceMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TraceMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let ctx = TraceContext::from_headers(req.headers());
            let method = req.method().clone();
            let path = req.path().to_string();
            req.extensions_mut().insert(ctx.clone());

            let mut res = service.call(req).await?;

            let headers = res.headers_mut();
            for (name, value) in [(TRACE_ID_HEADER, &ctx.trace_id), (SPAN_ID_HEADER, &ctx.span_id)] {
                if let Ok(value) = HeaderValue::from_str(value) {
                    headers.insert(HeaderName::from_static(name), value);
                }
            }

            // 跳过健康检查接口
            if !path.ends_with("/health") {
                log::debug!(
                    "[trace={} span={} parent={}] {} {} -> {}",
                    ctx.trace_id,
                    ctx.span_id,
                    ctx.parent_span_id.as_deref().unwrap_or("-"),
                    method,
                    path,
                    res.status()
                );
            }

            Ok(res)
        })
    }
}
