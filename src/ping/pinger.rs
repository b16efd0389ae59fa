//! HTTP保活探测器实现
//!
//! 对目标服务的健康检查路径发起一次 GET 请求，并把结果归类为
//! 成功、网络错误或超时三者之一

use crate::config::DEFAULT_HEALTH_PATH;
use crate::error::{PingError, Result};
use crate::ping::outcome::{PingAttempt, PingOutcome};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response};
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::debug;

/// 探测器trait，定义单次探测接口
#[async_trait]
pub trait Pinger: Send + Sync {
    /// 执行一次探测
    ///
    /// 所有失败都折叠进返回记录的 `outcome`，调用方无需处理错误。
    /// 单次调用内不做重试。
    ///
    /// # 参数
    /// * `base_url` - 目标服务基础 URL
    /// * `timeout_duration` - 超时时间
    async fn ping_once(&self, base_url: &str, timeout_duration: Duration) -> PingAttempt;
}

/// 一次带响应体的探测结果，供 HTTP 端点使用
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    /// 实际请求的 URL
    pub url: String,
    /// HTTP状态码
    pub status_code: u16,
    /// 状态描述，如 "OK"
    pub status_text: String,
    /// 收到响应头的耗时
    pub latency: Duration,
    /// 响应体文本
    pub body: String,
}

/// HTTP探测器实现
#[derive(Debug, Clone)]
pub struct HttpPinger {
    /// HTTP客户端
    client: Client,
    /// 健康检查路径
    health_path: String,
}

impl HttpPinger {
    /// 创建新的HTTP探测器
    ///
    /// 客户端不设置全局超时，超时由每次探测单独控制。
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(PingError::Client)?;

        Ok(Self {
            client,
            health_path: DEFAULT_HEALTH_PATH.to_string(),
        })
    }

    /// 设置健康检查路径
    pub fn with_health_path(mut self, health_path: impl Into<String>) -> Self {
        self.health_path = health_path.into();
        self
    }

    /// 拼接健康检查 URL，基础 URL 末尾的 `/` 会被去掉
    pub fn health_url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.health_path)
    }

    /// 发送 GET 请求，超时后丢弃请求 future（即中止请求）
    async fn send(
        &self,
        url: &str,
        timeout_duration: Duration,
    ) -> std::result::Result<(Response, Duration), PingError> {
        let start_time = Instant::now();
        let timeout_ms = timeout_duration.as_millis() as u64;

        match timeout(timeout_duration, self.client.get(url).send()).await {
            Ok(Ok(response)) => Ok((response, start_time.elapsed())),
            Ok(Err(e)) if e.is_timeout() => Err(PingError::Timeout { timeout_ms }),
            Ok(Err(e)) => Err(PingError::Transport {
                message: format_request_error(&e),
            }),
            Err(_) => Err(PingError::Timeout { timeout_ms }),
        }
    }

    /// 执行一次探测并读取响应体
    ///
    /// 是否可达只取决于响应头是否在超时前到达；响应体在剩余时间内读取，
    /// 读取失败时返回空字符串。
    pub async fn probe(
        &self,
        base_url: &str,
        timeout_duration: Duration,
    ) -> std::result::Result<ProbeResponse, PingError> {
        let url = self.health_url(base_url);
        let (response, latency) = self.send(&url, timeout_duration).await?;

        let status = response.status();
        let remaining = timeout_duration.saturating_sub(latency);

        let body = match timeout(remaining, response.text()).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                debug!("读取响应体失败: {} - {}", url, e);
                String::new()
            }
            Err(_) => {
                debug!("读取响应体超时: {}", url);
                String::new()
            }
        };

        Ok(ProbeResponse {
            url,
            status_code: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            latency,
            body,
        })
    }
}

#[async_trait]
impl Pinger for HttpPinger {
    async fn ping_once(&self, base_url: &str, timeout_duration: Duration) -> PingAttempt {
        let url = self.health_url(base_url);
        let timestamp = Utc::now();

        debug!("开始保活探测: {}", url);

        let outcome = match self.send(&url, timeout_duration).await {
            // 任何状态码都视为存活
            Ok((response, latency)) => PingOutcome::Success {
                status_code: response.status().as_u16(),
                latency,
            },
            Err(PingError::Timeout { .. }) => PingOutcome::Timeout {
                timeout: timeout_duration,
            },
            Err(e) => PingOutcome::NetworkFailure {
                message: e.to_string(),
            },
        };

        let attempt = PingAttempt::new(url, timestamp, outcome);
        attempt.log();
        attempt
    }
}

/// 格式化请求错误：分类标签加完整错误链
///
/// 顶层错误信息包含请求 URL，分类只看 source 链上的底层原因。
fn format_request_error(error: &reqwest::Error) -> String {
    let causes = error
        .source()
        .map(error_chain)
        .unwrap_or_default()
        .to_lowercase();

    let label = if causes.contains("dns") || causes.contains("resolve") {
        "DNS resolution failed"
    } else if causes.contains("certificate") || causes.contains("tls") || causes.contains("ssl") {
        "SSL/TLS error"
    } else if error.is_connect() {
        "Connection failed"
    } else if error.is_builder() || error.is_request() {
        "Invalid request"
    } else {
        "Request failed"
    };

    format!("{label}: {}", error_chain(error))
}

/// 把错误及其 source 链拼成一行
fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
