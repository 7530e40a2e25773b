use actix_web::{web, HttpResponse, Result};
use crate::models::HealthStatus;

/// 对外公布的服务名
#[derive(Debug, Clone)]
pub struct ServiceName(pub String);

pub async fn health_check(name: web::Data<ServiceName>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthStatus::up(&name.0)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
