//! HTTP 边界错误
//!
//! 所有处理器错误在此归类为 404 / 400 / 500，
//! 响应体统一为纯文本 `ERROR: <message>`

use std::error::Error as StdError;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::services::QuoteError;

#[derive(Error, Debug)]
pub enum AppError {
    /// 请求参数不合法
    #[error("{0}")]
    BadRequest(String),

    /// 处理器自身的内部错误
    #[error("{0}")]
    Internal(String),

    /// 行情服务返回的错误，保留原始错误链
    #[error(transparent)]
    Service(#[from] QuoteError),
}

impl AppError {
    /// 底层错误链（不含自身）
    pub fn causes(&self) -> Vec<String> {
        let mut causes = Vec::new();
        let mut source = self.source();
        while let Some(err) = source {
            causes.push(err.to_string());
            source = err.source();
        }
        causes
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Service(err) => match err {
                QuoteError::SymbolNotFound(_) => StatusCode::NOT_FOUND,
                QuoteError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                QuoteError::Upstream(_) | QuoteError::Parse(_) | QuoteError::Http(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        log::warn!("Handle Error: {}", self);
        for cause in self.causes() {
            log::warn!("Caused by: {}", cause);
        }

        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(format!("ERROR: {}", self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_quote_error_classification() {
        let not_found: AppError = QuoteError::SymbolNotFound("ZZZZ".to_string()).into();
        let bad: AppError = QuoteError::InvalidInput("bad".to_string()).into();
        let internal: AppError = QuoteError::Upstream("503".to_string()).into();

        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(bad.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(not_found.to_string(), "Symbol not found: ZZZZ");
        assert_eq!(internal.to_string(), "Upstream error: 503");
    }

    #[actix_web::test]
    async fn test_http_error_keeps_source_chain() {
        let http_err = reqwest::Client::new().get("not a url").build().unwrap_err();
        let expected = http_err.to_string();
        let err: AppError = QuoteError::Http(http_err).into();

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), format!("HTTP error: {}", expected));

        let source = err.source().unwrap();
        assert!(source.downcast_ref::<reqwest::Error>().is_some());
        assert_eq!(err.causes()[0], expected);
    }

    #[actix_web::test]
    async fn test_error_body_is_prefixed() {
        let err = AppError::Internal("upstream down".to_string());
        let resp = err.error_response();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(resp.into_body()).await.unwrap();
        assert_eq!(body, "ERROR: upstream down");
    }
}
