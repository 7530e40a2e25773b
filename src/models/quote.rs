//! 行情数据模型
//!
//! 定义报价相关的数据结构

use serde::{Deserialize, Serialize};

/// 报价状态
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    /// 正常返回
    Success,
    /// 代码无法解析（仅 best_effort 批量查询时出现）
    NotFound,
}

/// 单只证券的实时报价
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Quote {
    /// 证券代码（大写）
    pub symbol: String,
    /// 证券名称
    pub name: String,
    /// 最新价
    pub last_price: f64,
    /// 涨跌额
    pub change: f64,
    /// 涨跌幅（百分比）
    pub change_percent: f64,
    /// 成交量
    pub volume: u64,
    /// 开盘价
    pub open: f64,
    /// 最高价
    pub high: f64,
    /// 最低价
    pub low: f64,
    /// 昨收
    pub prev_close: f64,
    /// 市值（可选）
    pub market_cap: Option<f64>,
    /// 行情时间（RFC 3339）
    pub timestamp: String,
    /// 状态
    pub status: QuoteStatus,
    /// 附加信息，仅在 NOT_FOUND 标记中出现
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Quote {
    /// 构造 best_effort 模式下的缺失标记，数值字段全部为 0
    pub fn not_found(symbol: &str, message: String) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            name: String::new(),
            last_price: 0.0,
            change: 0.0,
            change_percent: 0.0,
            volume: 0,
            open: 0.0,
            high: 0.0,
            low: 0.0,
            prev_close: 0.0,
            market_cap: None,
            timestamp: String::new(),
            status: QuoteStatus::NotFound,
            message: Some(message),
        }
    }

    pub fn is_found(&self) -> bool {
        self.status == QuoteStatus::Success
    }
}

/// `/v1/quotes` 查询参数
#[derive(Debug, Deserialize)]
pub struct QuotesQuery {
    /// 逗号分隔的代码列表
    pub q: Option<String>,
}
