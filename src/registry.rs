//! 注册中心客户端
//!
//! 按 Eureka REST 协议完成注册、心跳续约与下线：
//! - POST   {url}/apps/{APP}
//! - PUT    {url}/apps/{APP}/{instanceId}
//! - DELETE {url}/apps/{APP}/{instanceId}

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::config::{RegistryConfig, ServerConfig};

/// 租约时长为心跳间隔的 3 倍
const LEASE_MULTIPLIER: u64 = 3;

#[derive(Debug, Serialize)]
struct PortInfo {
    #[serde(rename = "$")]
    port: u16,
    #[serde(rename = "@enabled")]
    enabled: String,
}

#[derive(Debug, Serialize)]
struct DataCenterInfo {
    #[serde(rename = "@class")]
    class: String,
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LeaseInfo {
    renewal_interval_in_secs: u64,
    duration_in_secs: u64,
}

/// Eureka 实例信息
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InstanceInfo {
    instance_id: String,
    host_name: String,
    app: String,
    ip_addr: String,
    status: String,
    port: PortInfo,
    vip_address: String,
    home_page_url: String,
    status_page_url: String,
    health_check_url: String,
    data_center_info: DataCenterInfo,
    lease_info: LeaseInfo,
}

#[derive(Debug, Serialize)]
struct Registration<'a> {
    instance: &'a InstanceInfo,
}

/// Eureka 客户端
pub struct EurekaClient {
    client: Client,
    base_url: String,
    app: String,
    instance: InstanceInfo,
    heartbeat: Duration,
}

impl EurekaClient {
    pub fn new(registry: &RegistryConfig, server: &ServerConfig) -> Result<Self> {
        let heartbeat_secs = registry.heartbeat_secs.max(1);
        let app = registry.app_name.to_uppercase();
        let host = registry.instance_host.clone();
        let home = format!("http://{}:{}/", host, server.port);

        let instance = InstanceInfo {
            instance_id: format!("{}:{}:{}", host, registry.app_name, server.port),
            host_name: host.clone(),
            app: app.clone(),
            ip_addr: host,
            status: "UP".to_string(),
            port: PortInfo {
                port: server.port,
                enabled: "true".to_string(),
            },
            vip_address: registry.app_name.clone(),
            status_page_url: format!("{}health", home),
            health_check_url: format!("{}health", home),
            home_page_url: home,
            data_center_info: DataCenterInfo {
                class: "com.netflix.appinfo.InstanceInfo$DefaultDataCenterInfo".to_string(),
                name: "MyOwn".to_string(),
            },
            lease_info: LeaseInfo {
                renewal_interval_in_secs: heartbeat_secs,
                duration_in_secs: heartbeat_secs * LEASE_MULTIPLIER,
            },
        };

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            base_url: registry.url.trim_end_matches('/').to_string(),
            app,
            instance,
            heartbeat: Duration::from_secs(heartbeat_secs),
        })
    }

    pub fn instance_id(&self) -> &str {
        &self.instance.instance_id
    }

    fn app_url(&self) -> String {
        format!("{}/apps/{}", self.base_url, self.app)
    }

    fn instance_url(&self) -> String {
        format!("{}/{}", self.app_url(), self.instance.instance_id)
    }

    /// 注册实例
    pub async fn register(&self) -> Result<()> {
        let response = self
            .client
            .post(self.app_url())
            .json(&Registration {
                instance: &self.instance,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("注册到 Eureka 失败: {}", response.status()));
        }

        log::info!("已注册到 Eureka: {} ({})", self.app, self.instance_id());
        Ok(())
    }

    /// 心跳续约，注册中心不认识该实例时重新注册
    pub async fn heartbeat(&self) -> Result<()> {
        let response = self.client.put(self.instance_url()).send().await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                log::warn!("Eureka 中不存在实例 {}，重新注册", self.instance_id());
                self.register().await
            }
            status => Err(anyhow!("Eureka 心跳失败: {}", status)),
        }
    }

    /// 下线实例
    pub async fn deregister(&self) -> Result<()> {
        let response = self.client.delete(self.instance_url()).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("从 Eureka 注销失败: {}", response.status()));
        }

        log::info!("已从 Eureka 注销: {}", self.instance_id());
        Ok(())
    }

    /// 启动后台心跳任务
    pub fn spawn_heartbeat(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.heartbeat);
            // 第一次 tick 立即返回，跳过
            interval.tick().await;

            loop {
                interval.tick().await;
                if let Err(e) = self.heartbeat().await {
                    log::warn!("Eureka 心跳异常: {}", e);
                }
            }
        })
    }
}

/// 服务退出后的收尾：无论服务是否出错，先停止心跳并注销实例，再返回服务结果
pub async fn shutdown<T>(
    result: std::io::Result<T>,
    eureka: Option<(Arc<EurekaClient>, JoinHandle<()>)>,
) -> Result<T> {
    if let Some((client, heartbeat)) = eureka {
        heartbeat.abort();
        if let Err(e) = client.deregister().await {
            log::warn!("从 Eureka 注销失败: {}", e);
        }
    }
    Ok(result?)
}
