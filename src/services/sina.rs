//! 新浪财经行情服务
//!
//! 对接 https://hq.sinajs.cn（实时行情）和 https://suggest3.sinajs.cn（联想搜索）
//! 支持沪深北 A 股与美股代码，批量查询只发起一次上游请求

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone};
use chrono_tz::Asia::Shanghai;
use regex::Regex;
use reqwest::Client;

use super::{collect_batch, split_symbols, BatchPolicy, QuoteError, QuoteService};
use crate::config::ProviderConfig;
use crate::models::{CompanyInfo, Quote, QuoteStatus};

/// 新浪实时行情 API
const SINA_QUOTE_API: &str = "https://hq.sinajs.cn/list=";
/// 新浪联想搜索 API
const SINA_SUGGEST_API: &str = "https://suggest3.sinajs.cn/suggest/";
/// 联想搜索类型：11 沪深 A 股，12 北交所，41 美股
const SINA_SUGGEST_TYPES: &str = "11,12,41";
const SINA_REFERER: &str = "https://finance.sina.com.cn/";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

lazy_static::lazy_static! {
    static ref HQ_LINE_RGX: Regex = Regex::new(r#"var hq_str_([A-Za-z0-9_$.]+)="([^"]*)""#).unwrap();
}

/// 证券所属市场
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Market {
    AShare,
    Us,
}

/// 转换为新浪内部代码
///
/// - sh600000 / sz000001 / bj430047 原样使用
/// - 6 位数字：5/6/9 开头补 sh，其余补 sz
/// - 其他视为美股，加 gb_ 前缀
fn to_sina_code(symbol: &str) -> (String, Market) {
    let lower = symbol.trim().to_lowercase();
    let is_digits = |s: &str| s.len() == 6 && s.chars().all(|c| c.is_ascii_digit());

    if lower.len() == 8
        && ["sh", "sz", "bj"].iter().any(|p| lower.starts_with(p))
        && is_digits(&lower[2..])
    {
        return (lower, Market::AShare);
    }

    if is_digits(&lower) {
        let prefix = if lower.starts_with(['5', '6', '9']) { "sh" } else { "sz" };
        return (format!("{}{}", prefix, lower), Market::AShare);
    }

    (format!("gb_{}", lower), Market::Us)
}

/// 将北京时间的日期和时间字符串转换为 RFC 3339
fn beijing_to_rfc3339(datetime: &str) -> String {
    NaiveDateTime::parse_from_str(datetime.trim(), "%Y-%m-%d %H:%M:%S")
        .ok()
        .and_then(|naive| Shanghai.from_local_datetime(&naive).single())
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| datetime.trim().to_string())
}

fn field_f64(fields: &[&str], index: usize) -> f64 {
    fields
        .get(index)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// 成交量可能带小数，统一按 f64 解析后取整
fn field_u64(fields: &[&str], index: usize) -> u64 {
    field_f64(fields, index).max(0.0) as u64
}

/// 解析行情响应，返回 新浪代码 -> 字段串 映射
fn parse_hq_lines(data: &str) -> HashMap<String, String> {
    HQ_LINE_RGX
        .captures_iter(data)
        .map(|c| (c[1].to_lowercase(), c[2].to_string()))
        .collect()
}

/// 解析 A 股实时数据
///
/// 格式: 名称,今开,昨收,现价,最高,最低,买一,卖一,成交量,成交额,...,日期(30),时间(31)
fn parse_a_share(symbol: &str, content: &str) -> Result<Quote, QuoteError> {
    let fields: Vec<&str> = content.split(',').collect();
    if fields.len() < 32 {
        return Err(QuoteError::Parse(format!(
            "{} 数据字段不足: {}",
            symbol,
            fields.len()
        )));
    }

    let prev_close = field_f64(&fields, 2);
    let last_price = field_f64(&fields, 3);
    let change = if prev_close > 0.0 { last_price - prev_close } else { 0.0 };
    let change_percent = if prev_close > 0.0 { change / prev_close * 100.0 } else { 0.0 };

    Ok(Quote {
        symbol: symbol.to_uppercase(),
        name: fields[0].to_string(),
        last_price,
        change,
        change_percent,
        volume: field_u64(&fields, 8),
        open: field_f64(&fields, 1),
        high: field_f64(&fields, 4),
        low: field_f64(&fields, 5),
        prev_close,
        market_cap: None, // 实时接口不提供市值
        timestamp: beijing_to_rfc3339(&format!("{} {}", fields[30], fields[31])),
        status: QuoteStatus::Success,
        message: None,
    })
}

/// 解析美股实时数据
///
/// 格式: 名称,现价,涨跌幅,时间,涨跌额,今开,最高,最低,52周高,52周低,成交量(10),均量,市值(12),...,昨收(26)
fn parse_us(symbol: &str, content: &str) -> Result<Quote, QuoteError> {
    let fields: Vec<&str> = content.split(',').collect();
    if fields.len() < 27 {
        return Err(QuoteError::Parse(format!(
            "{} 数据字段不足: {}",
            symbol,
            fields.len()
        )));
    }

    let market_cap = field_f64(&fields, 12);

    Ok(Quote {
        symbol: symbol.to_uppercase(),
        name: fields[0].to_string(),
        last_price: field_f64(&fields, 1),
        change: field_f64(&fields, 4),
        change_percent: field_f64(&fields, 2),
        volume: field_u64(&fields, 10),
        open: field_f64(&fields, 5),
        high: field_f64(&fields, 6),
        low: field_f64(&fields, 7),
        prev_close: field_f64(&fields, 26),
        market_cap: (market_cap > 0.0).then_some(market_cap),
        timestamp: beijing_to_rfc3339(fields[3]),
        status: QuoteStatus::Success,
        message: None,
    })
}

/// 从行情映射中取出并解析单个代码，空字段串表示代码无效
fn quote_from_lines(
    lines: &HashMap<String, String>,
    symbol: &str,
) -> Result<Quote, QuoteError> {
    let (code, market) = to_sina_code(symbol);
    let content = lines
        .get(&code)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| QuoteError::SymbolNotFound(symbol.to_uppercase()))?;

    match market {
        Market::AShare => parse_a_share(symbol, content),
        Market::Us => parse_us(symbol, content),
    }
}

/// 解析联想搜索结果
///
/// 格式: var suggestdata="key,type,code,fullcode,name,...;key,type,...";
fn parse_suggest(data: &str) -> Result<Vec<CompanyInfo>, QuoteError> {
    let start = data
        .find('"')
        .ok_or_else(|| QuoteError::Parse("无法解析联想搜索响应".to_string()))?;
    let end = data.rfind('"').unwrap_or(start);
    if end <= start {
        return Err(QuoteError::Parse("无法解析联想搜索响应".to_string()));
    }

    let mut companies = Vec::new();
    for entry in data[start + 1..end].split(';').filter(|e| !e.is_empty()) {
        let fields: Vec<&str> = entry.split(',').collect();
        if fields.len() < 5 {
            continue;
        }

        let full_code = fields[3].trim();
        let exchange = match fields[1] {
            "11" | "12" if full_code.starts_with("sh") => "SSE",
            "11" | "12" if full_code.starts_with("sz") => "SZSE",
            "11" | "12" if full_code.starts_with("bj") => "BSE",
            "41" => "US",
            _ => continue,
        };

        companies.push(CompanyInfo::new(
            &full_code.to_uppercase(),
            fields[4].trim(),
            exchange,
        ));
    }

    Ok(companies)
}

/// 新浪行情服务
pub struct SinaQuoteService {
    /// HTTP 客户端
    client: Client,
    /// 批量查询策略
    policy: BatchPolicy,
}

impl SinaQuoteService {
    /// 按配置的超时创建 HTTP 客户端
    pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            policy: config.batch_policy,
        })
    }

    /// 请求一个或多个新浪代码，返回 GBK 解码后的文本
    async fn fetch_hq(&self, codes: &[String]) -> Result<String, QuoteError> {
        let url = format!("{}{}", SINA_QUOTE_API, codes.join(","));
        log::debug!("请求新浪行情 URL: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Referer", SINA_REFERER)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QuoteError::Upstream(format!(
                "获取行情数据失败: {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        Ok(encoding_rs::GBK.decode(&bytes).0.to_string())
    }
}

#[async_trait]
impl QuoteService for SinaQuoteService {
    async fn get_quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        let symbol = symbol.trim();
        let (code, _) = to_sina_code(symbol);
        let text = self.fetch_hq(&[code]).await?;
        quote_from_lines(&parse_hq_lines(&text), symbol)
    }

    async fn get_quotes(&self, symbols: &str) -> Result<Vec<Quote>, QuoteError> {
        let symbols = split_symbols(symbols);
        if symbols.is_empty() {
            return Ok(Vec::new());
        }

        let codes: Vec<String> = symbols.iter().map(|s| to_sina_code(s).0).collect();
        let text = self.fetch_hq(&codes).await?;
        let lines = parse_hq_lines(&text);

        let results = symbols
            .into_iter()
            .map(|s| (s.to_string(), quote_from_lines(&lines, s)))
            .collect();
        collect_batch(self.policy, results)
    }

    async fn get_company_info(&self, name: &str) -> Result<Vec<CompanyInfo>, QuoteError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(QuoteError::InvalidInput("empty company name".to_string()));
        }

        let response = self
            .client
            .get(SINA_SUGGEST_API)
            .query(&[
                ("type", SINA_SUGGEST_TYPES),
                ("key", name),
                ("name", "suggestdata"),
            ])
            .header("Referer", SINA_REFERER)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QuoteError::Upstream(format!(
                "公司检索失败: {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        let text = encoding_rs::GBK.decode(&bytes).0.to_string();
        parse_suggest(&text)
    }
}
