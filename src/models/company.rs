use serde::{Deserialize, Serialize};

/// 公司检索结果
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CompanyInfo {
    /// 证券代码
    pub symbol: String,
    /// 公司名称
    pub name: String,
    /// 交易所
    pub exchange: String,
}

impl CompanyInfo {
    pub fn new(symbol: &str, name: &str, exchange: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            exchange: exchange.to_string(),
        }
    }
}
