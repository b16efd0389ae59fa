//! 探测结果数据结构
//!
//! 定义单次保活探测的记录、结果枚举和运行期统计

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// 单次探测的结果，每次探测恰好产生一个
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PingOutcome {
    /// 在超时前收到了响应（任意状态码都算存活）
    Success {
        /// HTTP状态码
        status_code: u16,
        /// 响应耗时
        #[serde(rename = "latency_ms", with = "duration_serde")]
        latency: Duration,
    },
    /// 传输层失败：DNS、连接拒绝、TLS 等
    NetworkFailure {
        /// 底层错误信息
        message: String,
    },
    /// 超时，未收到响应
    Timeout {
        /// 配置的超时时间
        #[serde(rename = "timeout_ms", with = "duration_serde")]
        timeout: Duration,
    },
}

impl PingOutcome {
    /// 目标是否存活
    pub fn is_alive(&self) -> bool {
        matches!(self, PingOutcome::Success { .. })
    }

    /// HTTP状态码（仅成功时有）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            PingOutcome::Success { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// 响应耗时（仅成功时有）
    pub fn latency(&self) -> Option<Duration> {
        match self {
            PingOutcome::Success { latency, .. } => Some(*latency),
            _ => None,
        }
    }
}

impl std::fmt::Display for PingOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PingOutcome::Success {
                status_code,
                latency,
            } => write!(f, "存活 HTTP {} ({}ms)", status_code, latency.as_millis()),
            PingOutcome::NetworkFailure { message } => write!(f, "网络错误: {}", message),
            PingOutcome::Timeout { timeout } => {
                write!(f, "超时: {}ms 内无响应", timeout.as_millis())
            }
        }
    }
}

/// 单次探测记录，产生后立即记录日志并丢弃
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingAttempt {
    /// 探测ID，仅用于日志关联
    pub id: Uuid,
    /// 实际请求的 URL（含健康检查路径）
    pub url: String,
    /// 探测开始时间
    pub timestamp: DateTime<Utc>,
    /// 探测结果
    pub outcome: PingOutcome,
}

impl PingAttempt {
    /// 创建探测记录，时间戳取探测开始时刻
    pub fn new(url: String, timestamp: DateTime<Utc>, outcome: PingOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
            timestamp,
            outcome,
        }
    }

    /// 目标是否存活
    pub fn is_alive(&self) -> bool {
        self.outcome.is_alive()
    }

    /// 输出一行日志
    pub fn log(&self) {
        match &self.outcome {
            PingOutcome::Success {
                status_code,
                latency,
            } => info!(
                "✓ 保活探测成功: {} - HTTP {} ({}ms)",
                self.url,
                status_code,
                latency.as_millis()
            ),
            PingOutcome::NetworkFailure { message } => {
                warn!("✗ 保活探测失败: {} - {}", self.url, message)
            }
            PingOutcome::Timeout { timeout } => warn!(
                "⏱ 保活探测超时: {} - {}ms 内无响应",
                self.url,
                timeout.as_millis()
            ),
        }
    }

    /// 转换为JSON字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Duration序列化模块（毫秒）
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// 单个探测循环的运行期统计，不持久化
#[derive(Debug, Clone, Default, Serialize)]
pub struct PingStats {
    /// 总探测次数
    pub total_attempts: u64,
    /// 成功次数
    pub successes: u64,
    /// 网络错误次数
    pub network_failures: u64,
    /// 超时次数
    pub timeouts: u64,
    /// 最小响应时间（毫秒）
    pub min_latency_ms: Option<u64>,
    /// 最大响应时间（毫秒）
    pub max_latency_ms: Option<u64>,
    /// 平均响应时间（毫秒）
    pub average_latency_ms: f64,
    /// 最后探测时间
    pub last_attempt_time: Option<DateTime<Utc>>,
}

impl PingStats {
    /// 更新统计信息
    pub fn update(&mut self, attempt: &PingAttempt) {
        self.total_attempts += 1;
        self.last_attempt_time = Some(attempt.timestamp);

        match &attempt.outcome {
            PingOutcome::Success { latency, .. } => {
                self.successes += 1;

                let latency_ms = latency.as_millis() as u64;
                self.min_latency_ms =
                    Some(self.min_latency_ms.map_or(latency_ms, |m| m.min(latency_ms)));
                self.max_latency_ms =
                    Some(self.max_latency_ms.map_or(latency_ms, |m| m.max(latency_ms)));

                // 平均值只统计成功的探测
                let total =
                    self.average_latency_ms * (self.successes - 1) as f64 + latency_ms as f64;
                self.average_latency_ms = total / self.successes as f64;
            }
            PingOutcome::NetworkFailure { .. } => self.network_failures += 1,
            PingOutcome::Timeout { .. } => self.timeouts += 1,
        }
    }

    /// 成功率（百分比）
    pub fn success_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            (self.successes as f64 / self.total_attempts as f64) * 100.0
        }
    }
}
