//! 内存行情服务
//!
//! 使用固定的演示数据，不访问任何外部数据源

use async_trait::async_trait;
use chrono::Utc;

use super::{collect_batch, split_symbols, BatchPolicy, QuoteError, QuoteService};
use crate::models::{CompanyInfo, Quote, QuoteStatus};

/// 演示数据：(代码, 名称, 交易所, 最新价, 昨收, 成交量, 市值)
const DEMO_DATA: &[(&str, &str, &str, f64, f64, u64, f64)] = &[
    ("IBM", "International Business Machines Corp", "NYSE", 141.52, 140.10, 3_512_300, 129_000_000_000.0),
    ("AAPL", "Apple Inc", "NASDAQ", 178.72, 177.15, 52_164_500, 2_790_000_000_000.0),
    ("MSFT", "Microsoft Corp", "NASDAQ", 332.42, 329.82, 20_312_900, 2_470_000_000_000.0),
    ("GOOGL", "Alphabet Inc Class A", "NASDAQ", 138.98, 140.49, 24_051_700, 1_750_000_000_000.0),
    ("AMZN", "Amazon.com Inc", "NASDAQ", 132.55, 129.79, 49_344_600, 1_370_000_000_000.0),
    ("TSLA", "Tesla Inc", "NASDAQ", 254.85, 251.12, 93_562_900, 809_000_000_000.0),
];

/// 内存行情服务
pub struct MemoryQuoteService {
    quotes: Vec<Quote>,
    companies: Vec<CompanyInfo>,
    policy: BatchPolicy,
}

impl MemoryQuoteService {
    pub fn new(quotes: Vec<Quote>, companies: Vec<CompanyInfo>, policy: BatchPolicy) -> Self {
        Self {
            quotes,
            companies,
            policy,
        }
    }

    /// 使用内置演示数据创建服务
    pub fn demo(policy: BatchPolicy) -> Self {
        let timestamp = Utc::now().to_rfc3339();
        let mut quotes = Vec::new();
        let mut companies = Vec::new();

        for &(symbol, name, exchange, price, prev_close, volume, market_cap) in DEMO_DATA {
            let change = price - prev_close;
            quotes.push(Quote {
                symbol: symbol.to_string(),
                name: name.to_string(),
                last_price: price,
                change,
                change_percent: change / prev_close * 100.0,
                volume,
                open: prev_close,
                high: price.max(prev_close) + 1.25,
                low: price.min(prev_close) - 1.10,
                prev_close,
                market_cap: Some(market_cap),
                timestamp: timestamp.clone(),
                status: QuoteStatus::Success,
                message: None,
            });
            companies.push(CompanyInfo::new(symbol, name, exchange));
        }

        Self::new(quotes, companies, policy)
    }

    fn lookup(&self, symbol: &str) -> Result<Quote, QuoteError> {
        self.quotes
            .iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
            .cloned()
            .ok_or_else(|| QuoteError::SymbolNotFound(symbol.to_uppercase()))
    }
}

#[async_trait]
impl QuoteService for MemoryQuoteService {
    async fn get_quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        self.lookup(symbol.trim())
    }

    async fn get_quotes(&self, symbols: &str) -> Result<Vec<Quote>, QuoteError> {
        let results = split_symbols(symbols)
            .into_iter()
            .map(|s| (s.to_string(), self.lookup(s)))
            .collect();
        collect_batch(self.policy, results)
    }

    async fn get_company_info(&self, name: &str) -> Result<Vec<CompanyInfo>, QuoteError> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Err(QuoteError::InvalidInput("empty company name".to_string()));
        }

        Ok(self
            .companies
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.symbol.to_lowercase().starts_with(&needle)
            })
            .cloned()
            .collect())
    }
}
