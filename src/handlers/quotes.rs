//! 报价查询处理器

use actix_web::{http::header, web, HttpResponse};
use serde::Serialize;

use crate::error::AppError;
use crate::models::{Quote, QuotesQuery};
use crate::services::QuoteService;

/// 报价查询限制
#[derive(Debug, Clone)]
pub struct QuoteLimits {
    /// 单次请求允许的最大代码数
    pub max_symbols: usize,
}

/// 带 no-cache 头的 JSON 响应，避免中间层缓存行情数据
fn no_cache_json<T: Serialize>(body: T) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .json(body)
}

/// 按逗号拆分查询串，只去掉末尾的空段
///
/// `IBM,` 拆为 `["IBM"]`，`,IBM` 拆为 `["", "IBM"]`
fn split_query(q: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = q.split(',').collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
}

/// 批量查询报价
///
/// GET /v1/quotes?q=IBM,AAPL
///
/// - q 缺失或为空：返回空数组
/// - 拆分后只有一段：调用 get_quote，返回单元素数组
/// - 拆分后多于一段：原样将 q 交给 get_quotes
/// - 段数超过 max_symbols：400
pub async fn get_quotes(
    service: web::Data<dyn QuoteService>,
    limits: web::Data<QuoteLimits>,
    query: web::Query<QuotesQuery>,
) -> Result<HttpResponse, AppError> {
    log::debug!("received Quote query for: {:?}", query.q);

    let Some(q) = query.q.as_deref() else {
        return Ok(no_cache_json(Vec::<Quote>::new()));
    };

    let parts = split_query(q);
    if parts.len() > limits.max_symbols {
        return Err(AppError::BadRequest(format!(
            "Too many symbols: {} (max {})",
            parts.len(),
            limits.max_symbols
        )));
    }

    let quotes = match parts.as_slice() {
        [] => Vec::new(),
        [symbol] if symbol.trim().is_empty() => Vec::new(),
        [symbol] => vec![service.get_quote(symbol.trim()).await?],
        _ => service.get_quotes(q).await?,
    };

    log::info!(
        "Retrieved symbols: {} with {} quotes ({} found)",
        q,
        quotes.len(),
        quotes.iter().filter(|quote| quote.is_found()).count()
    );
    Ok(no_cache_json(quotes))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/quotes", web::get().to(get_quotes));
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    use super::split_query;
    use crate::handlers::test_support::{configure, configure_with, RecordingService};
    use crate::services::{BatchPolicy, MemoryQuoteService};

    async fn call(uri: &str, max_symbols: usize) -> (StatusCode, Option<String>, String, Vec<String>) {
        let service = Arc::new(RecordingService::default());
        let app = test::init_service(App::new().configure(configure(service.clone(), max_symbols))).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = resp.status();
        let cache = resp
            .headers()
            .get("Cache-Control")
            .map(|v| v.to_str().unwrap().to_string());
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();

        (status, cache, body, service.calls())
    }

    #[actix_web::test]
    async fn test_missing_query_returns_empty_list() {
        let (status, cache, body, calls) = call("/v1/quotes", 50).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("no-cache"));
        assert_eq!(body, "[]");
        assert!(calls.is_empty());
    }

    #[actix_web::test]
    async fn test_blank_query_returns_empty_list() {
        let (status, cache, body, calls) = call("/v1/quotes?q=", 50).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("no-cache"));
        assert_eq!(body, "[]");
        assert!(calls.is_empty());
    }

    #[actix_web::test]
    async fn test_single_symbol_uses_single_lookup() {
        let (status, cache, body, calls) = call("/v1/quotes?q=IBM", 50).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("no-cache"));
        assert_eq!(calls, vec!["get_quote:IBM"]);

        let json: Value = serde_json::from_str(&body).unwrap();
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["symbol"], "IBM");
    }

    #[actix_web::test]
    async fn test_multiple_symbols_use_one_batch_call() {
        let (status, cache, body, calls) = call("/v1/quotes?q=IBM,AAPL", 50).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("no-cache"));
        assert_eq!(calls, vec!["get_quotes:IBM,AAPL"]);

        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_batch_receives_original_string() {
        let (_, _, _, calls) = call("/v1/quotes?q=IBM,%20AAPL,MSFT", 50).await;

        assert_eq!(calls, vec!["get_quotes:IBM, AAPL,MSFT"]);
    }

    #[actix_web::test]
    async fn test_unknown_symbol_is_not_found() {
        let (status, cache, body, _) = call("/v1/quotes?q=ZZZZ", 50).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(cache.is_none());
        assert_eq!(body, "ERROR: Symbol not found: ZZZZ");
    }

    #[actix_web::test]
    async fn test_upstream_failure_is_internal_error() {
        let (status, _, body, _) = call("/v1/quotes?q=IBM,BOOM", 50).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "ERROR: Upstream error: connection refused");
    }

    #[actix_web::test]
    async fn test_symbols_are_not_charset_checked() {
        let (status, _, _, calls) = call("/v1/quotes?q=BRK%20B,IBM", 50).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(calls, vec!["get_quotes:BRK B,IBM"]);
    }

    #[actix_web::test]
    async fn test_leading_empty_segment_uses_batch_call() {
        let (status, _, body, calls) = call("/v1/quotes?q=,IBM", 50).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(calls, vec!["get_quotes:,IBM"]);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_trailing_comma_uses_single_lookup() {
        let (status, _, _, calls) = call("/v1/quotes?q=IBM,", 50).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(calls, vec!["get_quote:IBM"]);
    }

    #[actix_web::test]
    async fn test_trailing_blank_segment_uses_batch_call() {
        let (_, _, _, calls) = call("/v1/quotes?q=IBM,%20", 50).await;

        assert_eq!(calls, vec!["get_quotes:IBM, "]);
    }

    #[actix_web::test]
    async fn test_only_commas_returns_empty_list() {
        let (status, cache, body, calls) = call("/v1/quotes?q=,,", 50).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("no-cache"));
        assert_eq!(body, "[]");
        assert!(calls.is_empty());
    }

    #[actix_web::test]
    async fn test_best_effort_batch_returns_markers() {
        let service = Arc::new(MemoryQuoteService::demo(BatchPolicy::BestEffort));
        let app = test::init_service(App::new().configure(configure_with(service, 50))).await;

        let req = test::TestRequest::get().uri("/v1/quotes?q=IBM,ZZZZ,AAPL").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("Cache-Control").unwrap(), "no-cache");
        let json: Value = test::read_body_json(resp).await;
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 3);
        assert_eq!(arr[0]["status"], "SUCCESS");
        assert_eq!(arr[1]["symbol"], "ZZZZ");
        assert_eq!(arr[1]["status"], "NOT_FOUND");
        assert_eq!(arr[1]["message"], "Symbol not found: ZZZZ");
        assert_eq!(arr[2]["symbol"], "AAPL");
    }

    #[actix_web::test]
    async fn test_fail_fast_batch_is_not_found() {
        let service = Arc::new(MemoryQuoteService::demo(BatchPolicy::FailFast));
        let app = test::init_service(App::new().configure(configure_with(service, 50))).await;

        let req = test::TestRequest::get().uri("/v1/quotes?q=IBM,ZZZZ").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(test::read_body(resp).await, "ERROR: Symbol not found: ZZZZ");
    }

    #[actix_web::test]
    async fn test_split_query() {
        assert_eq!(split_query("IBM"), vec!["IBM"]);
        assert_eq!(split_query("IBM,"), vec!["IBM"]);
        assert_eq!(split_query(",IBM"), vec!["", "IBM"]);
        assert_eq!(split_query("IBM, "), vec!["IBM", " "]);
        assert!(split_query(",,").is_empty());
        assert!(split_query("").is_empty());
    }

    #[actix_web::test]
    async fn test_too_many_symbols_is_bad_request() {
        let (status, _, body, calls) = call("/v1/quotes?q=A,B,C", 2).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "ERROR: Too many symbols: 3 (max 2)");
        assert!(calls.is_empty());
    }
}
