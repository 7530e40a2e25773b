//! 行情微服务
//!
//! 提供报价批量查询与公司检索的 RESTful API，
//! 数据来源：新浪财经（或内存演示数据），可选注册到 Eureka

mod config;     // 配置加载
mod error;      // HTTP 边界错误
mod handlers;   // HTTP 请求处理器
mod middleware; // 中间件
mod models;     // 数据模型定义
mod registry;   // 注册中心客户端
mod services;   // 业务逻辑服务

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use crate::config::AppConfig;
use crate::handlers::health::ServiceName;
use crate::handlers::quotes::QuoteLimits;
use crate::middleware::TraceMiddleware;
use crate::registry::EurekaClient;

/// 应用程序入口
///
/// 加载配置、创建行情服务并启动 HTTP 服务器
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let (config, config_path) = AppConfig::load()?;

    // 初始化日志系统，RUST_LOG 优先于配置文件
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));

    match &config_path {
        Some(path) => log::info!("从 {} 加载配置成功", path.display()),
        None => log::info!("使用默认配置"),
    }

    let service = services::build_service(&config.provider)?;
    let limits = web::Data::new(QuoteLimits {
        max_symbols: config.provider.max_symbols,
    });
    let service_name = web::Data::new(ServiceName(config.registry.app_name.clone()));

    log::info!(
        "启动行情服务 {}，数据源: {:?}，批量策略: {:?}",
        config.bind_addr(),
        config.provider.kind,
        config.provider.batch_policy
    );

    let service_data = web::Data::from(service);
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(service_data.clone())
            .app_data(limits.clone())
            .app_data(service_name.clone())
            .wrap(TraceMiddleware)  // B3 链路追踪
            .wrap(Logger::default())  // 添加请求日志中间件
            .configure(handlers::config)  // 配置路由
    })
    .bind(config.bind_addr())?;

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    let eureka = if config.registry.enabled {
        let client = Arc::new(EurekaClient::new(&config.registry, &config.server)?);
        if let Err(e) = client.register().await {
            log::warn!("注册到 Eureka 失败，将在心跳时重试: {}", e);
        }
        let heartbeat = client.clone().spawn_heartbeat();
        Some((client, heartbeat))
    } else {
        None
    };

    let result = registry::shutdown(server.run().await, eureka).await;
    log::info!("行情服务已停止");
    result
}
