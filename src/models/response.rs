//! 健康检查响应模型

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// 健康检查响应
///
/// - status: 固定为 UP
/// - service: 服务名（与注册中心中的应用名一致）
/// - timestamp: 响应时间戳（RFC 3339，UTC）
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}

impl HealthStatus {
    /// 创建 UP 状态响应
    pub fn up(service: &str) -> Self {
        Self {
            status: "UP".to_string(),
            service: service.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
