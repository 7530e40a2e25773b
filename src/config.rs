//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，所有字段均有默认值

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::services::BatchPolicy;

/// 配置文件路径环境变量
pub const CONFIG_ENV: &str = "QUOTES_CONFIG";

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// 行情数据源类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// 新浪财经
    #[default]
    Sina,
    /// 内存演示数据
    Memory,
}

/// 数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// 批量查询中部分代码不存在时的处理策略
    #[serde(default)]
    pub batch_policy: BatchPolicy,
    /// 单次请求允许的最大代码数
    #[serde(default = "default_max_symbols")]
    pub max_symbols: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 注册中心（Eureka）配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// 是否启用注册
    #[serde(default)]
    pub enabled: bool,
    /// Eureka 服务地址，例如 http://localhost:8761/eureka
    #[serde(default = "default_registry_url")]
    pub url: String,
    /// 注册的应用名
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// 对外公布的主机名
    #[serde(default = "default_instance_host")]
    pub instance_host: String,
    /// 心跳间隔（秒）
    #[serde(default = "default_heartbeat")]
    pub heartbeat_secs: u64,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 数据源配置
    #[serde(default)]
    pub provider: ProviderConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
    /// 注册中心配置
    #[serde(default)]
    pub registry: RegistryConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_max_symbols() -> usize { 50 }
fn default_log_level() -> String { "info".to_string() }
fn default_registry_url() -> String { "http://localhost:8761/eureka".to_string() }
fn default_app_name() -> String { "quotes".to_string() }
fn default_instance_host() -> String { "localhost".to_string() }
fn default_heartbeat() -> u64 { 30 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            batch_policy: BatchPolicy::default(),
            max_symbols: default_max_symbols(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_registry_url(),
            app_name: default_app_name(),
            instance_host: default_instance_host(),
            heartbeat_secs: default_heartbeat(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: AppConfig = serde_json::from_str(content)?;
        Ok(config)
    }

    /// 查找配置文件：优先环境变量 QUOTES_CONFIG，其次 config.json、config/config.json
    pub fn locate() -> Option<PathBuf> {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        ["config.json", "config/config.json"]
            .into_iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    }

    /// 加载配置，找不到配置文件时使用默认值
    ///
    /// 在日志初始化之前调用，因此返回实际使用的路径由调用方记录
    pub fn load() -> anyhow::Result<(Self, Option<PathBuf>)> {
        match Self::locate() {
            Some(path) => {
                let config = Self::from_file(&path)
                    .map_err(|e| anyhow::anyhow!("加载配置文件 {} 失败: {}", path.display(), e))?;
                Ok((config, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
