//! 诊断接口
//!
//! 在超时保护下执行一个固定返回值的命令，用于确认追踪链路与超时熔断是否接通

use std::future::Future;
use std::time::Duration;

use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};

use crate::error::AppError;
use crate::middleware::TraceContext;

const COMMAND_GROUP: &str = "springone";
const COMMAND_KEY: &str = "springonecommandkey";
const COMMAND_TIMEOUT: Duration = Duration::from_secs(1);

async fn run_command() -> String {
    "hello_from_springone_hystrix".to_string()
}

/// 在超时保护下执行命令，超时返回内部错误
async fn execute_command<F>(timeout: Duration, command: F) -> Result<String, AppError>
where
    F: Future<Output = String>,
{
    tokio::time::timeout(timeout, command).await.map_err(|_| {
        AppError::Internal(format!(
            "command {} timed out after {}ms",
            COMMAND_KEY,
            timeout.as_millis()
        ))
    })
}

/// /v1/springonehystrix（任意方法）
pub async fn springone_hystrix(req: HttpRequest) -> Result<HttpResponse, AppError> {
    let trace_id = req
        .extensions()
        .get::<TraceContext>()
        .map(|c| c.trace_id.clone())
        .unwrap_or_else(|| "-".to_string());

    log::debug!(
        "[trace={}] executing command group={} key={}",
        trace_id,
        COMMAND_GROUP,
        COMMAND_KEY
    );

    let output = execute_command(COMMAND_TIMEOUT, run_command()).await?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(format!("HYSTRIX [{}]", output)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/springonehystrix", web::route().to(springone_hystrix));
}
