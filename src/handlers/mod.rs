//! HTTP 请求处理器
//!
//! ## API 列表
//! - GET /health - 健康检查
//! - GET /v1/quotes?q=IBM,AAPL - 批量查询报价
//! - GET /v1/company/{name} - 按名称检索公司
//! - /v1/springonehystrix - 诊断命令

pub mod company;
pub mod diagnostic;
pub mod health;
pub mod quotes;

use actix_web::web;

use crate::error::AppError;

pub fn config(cfg: &mut web::ServiceConfig) {
    // 查询参数解析失败也走统一的错误格式
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .configure(health::config)
    .service(
        web::scope("/v1")
            .configure(quotes::config)
            .configure(company::config)
            .configure(diagnostic::config),
    );
}
