//! 业务逻辑服务模块
//!
//! 定义行情服务接口 `QuoteService` 以及两种实现：
//! - sina: 对接新浪财经实时行情与联想搜索
//! - memory: 内存演示数据，用于本地运行和测试

pub mod memory; // 内存数据服务
pub mod sina;   // 新浪财经数据服务

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ProviderConfig, ProviderKind};
use crate::models::{CompanyInfo, Quote};

pub use memory::MemoryQuoteService;
pub use sina::SinaQuoteService;

/// 行情服务错误
#[derive(Error, Debug)]
pub enum QuoteError {
    /// 代码无法解析
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// 调用方输入不合法
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 上游返回非成功状态
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// 上游数据无法解析
    #[error("Failed to parse upstream data: {0}")]
    Parse(String),

    /// HTTP 传输错误
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// 批量查询中部分代码无法解析时的处理策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// 任一代码不存在则整个请求失败
    #[default]
    FailFast,
    /// 不存在的代码原位替换为 NOT_FOUND 标记
    BestEffort,
}

/// 行情服务接口
///
/// 处理器只依赖该接口，具体实现在启动时根据配置注入
#[async_trait]
pub trait QuoteService: Send + Sync {
    /// 获取单只证券报价，代码不存在时返回 `QuoteError::SymbolNotFound`
    async fn get_quote(&self, symbol: &str) -> Result<Quote, QuoteError>;

    /// 批量获取报价，参数为逗号分隔的代码列表
    async fn get_quotes(&self, symbols: &str) -> Result<Vec<Quote>, QuoteError>;

    /// 按名称或代码片段检索公司
    async fn get_company_info(&self, name: &str) -> Result<Vec<CompanyInfo>, QuoteError>;
}

/// 拆分逗号分隔的代码列表，去除空白并丢弃空段
pub fn split_symbols(query: &str) -> Vec<&str> {
    query
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// 按批量策略汇总逐个代码的查询结果，保持请求顺序
///
/// 非 SymbolNotFound 的错误在两种策略下都会使整个请求失败
pub fn collect_batch(
    policy: BatchPolicy,
    results: Vec<(String, Result<Quote, QuoteError>)>,
) -> Result<Vec<Quote>, QuoteError> {
    let mut quotes = Vec::with_capacity(results.len());

    for (symbol, result) in results {
        match result {
            Ok(quote) => quotes.push(quote),
            Err(QuoteError::SymbolNotFound(msg)) if policy == BatchPolicy::BestEffort => {
                log::debug!("批量查询中代码 {} 不存在，返回标记", symbol);
                quotes.push(Quote::not_found(
                    &symbol,
                    QuoteError::SymbolNotFound(msg).to_string(),
                ));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(quotes)
}

/// 根据配置创建行情服务实例
pub fn build_service(config: &ProviderConfig) -> anyhow::Result<Arc<dyn QuoteService>> {
    let service: Arc<dyn QuoteService> = match config.kind {
        ProviderKind::Sina => Arc::new(SinaQuoteService::new(config)?),
        ProviderKind::Memory => Arc::new(MemoryQuoteService::demo(config.batch_policy)),
    };
    Ok(service)
}
