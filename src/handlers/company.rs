use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::services::QuoteService;

/// 检索名称或代码匹配的公司
///
/// GET /v1/company/{name}
pub async fn get_companies(
    service: web::Data<dyn QuoteService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let name = path.into_inner();
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Company name must not be empty".to_string()));
    }

    log::debug!("retrieving companies for: {}", name);
    let companies = service.get_company_info(name).await?;
    log::info!("Retrieved {} companies with search parameter: {}", companies.len(), name);

    Ok(HttpResponse::Ok().json(companies))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/company/{name}", web::get().to(get_companies));
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    use crate::handlers::test_support::{configure, RecordingService};

    #[actix_web::test]
    async fn test_company_search_returns_matches() {
        let service = Arc::new(RecordingService::default());
        let app = test::init_service(App::new().configure(configure(service.clone(), 50))).await;

        let req = test::TestRequest::get().uri("/v1/company/Apple").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get("Cache-Control").is_none());

        let json: Value = test::read_body_json(resp).await;
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["symbol"], "AAPL");
        assert_eq!(arr[1]["exchange"], "NYSE");
        assert_eq!(service.calls(), vec!["get_company_info:Apple"]);
    }

    #[actix_web::test]
    async fn test_company_search_no_matches() {
        let service = Arc::new(RecordingService::default());
        let app = test::init_service(App::new().configure(configure(service, 50))).await;

        let req = test::TestRequest::get().uri("/v1/company/Nothing").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "[]");
    }

    #[actix_web::test]
    async fn test_company_search_upstream_failure() {
        let service = Arc::new(RecordingService::default());
        let app = test::init_service(App::new().configure(configure(service, 50))).await;

        let req = test::TestRequest::get().uri("/v1/company/BOOM").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            test::read_body(resp).await,
            "ERROR: Upstream error: connection refused"
        );
    }

    #[actix_web::test]
    async fn test_blank_company_name_is_bad_request() {
        let service = Arc::new(RecordingService::default());
        let app = test::init_service(App::new().configure(configure(service.clone(), 50))).await;

        let req = test::TestRequest::get().uri("/v1/company/%20%20").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(service.calls().is_empty());
    }
}
