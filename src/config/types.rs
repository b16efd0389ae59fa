//! 配置数据结构定义
//!
//! 定义应用程序的配置结构体和验证逻辑

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// 未配置目标地址时使用的占位 URL
pub const DEFAULT_TARGET_URL: &str = "https://your-repl-name.your-username.repl.co";

/// 默认健康检查路径
pub const DEFAULT_HEALTH_PATH: &str = "/health";

/// 主配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// 目标服务基础 URL
    #[serde(default = "default_target_url")]
    pub target_url: String,
    /// 探测间隔（毫秒）
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// 单次探测超时时间（毫秒）
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// 健康检查路径，拼接在基础 URL 之后
    #[serde(default = "default_health_path")]
    pub health_path: String,
    /// HTTP 端点配置（serve 子命令使用）
    #[serde(default)]
    pub web: WebConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            interval_ms: default_interval_ms(),
            timeout_ms: default_timeout_ms(),
            health_path: default_health_path(),
            web: WebConfig::default(),
        }
    }
}

impl Config {
    /// 探测间隔
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// 单次探测超时时间
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// 目标地址是否仍是占位 URL
    pub fn uses_placeholder_target(&self) -> bool {
        self.target_url == DEFAULT_TARGET_URL
    }
}

/// HTTP 端点配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebConfig {
    /// 绑定地址
    #[serde(default = "default_web_bind_address")]
    pub bind_address: String,
    /// 监听端口
    #[serde(default = "default_web_port")]
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: default_web_bind_address(),
            port: default_web_port(),
        }
    }
}

impl WebConfig {
    /// 解析监听地址
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| format!("无效的监听地址 {}:{}: {}", self.bind_address, self.port, e))
    }
}

/// 命令行覆盖项，优先级高于配置文件和环境变量
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub target_url: Option<String>,
    pub interval_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
}

impl ConfigOverrides {
    /// 把覆盖项写入配置
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref url) = self.target_url {
            config.target_url = url.clone();
        }
        if let Some(interval_ms) = self.interval_ms {
            config.interval_ms = interval_ms;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(ref bind_address) = self.bind_address {
            config.web.bind_address = bind_address.clone();
        }
        if let Some(port) = self.port {
            config.web.port = port;
        }
    }
}

// 默认值函数
fn default_target_url() -> String {
    DEFAULT_TARGET_URL.to_string()
}
fn default_interval_ms() -> u64 {
    240_000
}
fn default_timeout_ms() -> u64 {
    15_000
}
fn default_health_path() -> String {
    DEFAULT_HEALTH_PATH.to_string()
}
fn default_web_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_web_port() -> u16 {
    8787
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    validate_target_url(&config.target_url)?;

    if config.interval_ms == 0 {
        return Err("探测间隔不能为0".to_string());
    }

    if config.timeout_ms == 0 {
        return Err("请求超时时间不能为0".to_string());
    }

    if !config.health_path.starts_with('/') {
        return Err(format!(
            "健康检查路径必须以 '/' 开头: {}",
            config.health_path
        ));
    }

    if config.web.port == 0 {
        return Err("HTTP端点端口不能为0".to_string());
    }

    if config.web.bind_address.trim().is_empty() {
        return Err("HTTP端点绑定地址不能为空".to_string());
    }

    Ok(())
}

/// 校验目标 URL：必须能解析，且协议为 http/https
pub fn validate_target_url(url: &str) -> Result<(), String> {
    let parsed =
        reqwest::Url::parse(url).map_err(|e| format!("目标URL格式无效: {url} ({e})"))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("目标URL必须使用 http 或 https 协议: {url}"));
    }

    if parsed.host_str().is_none() {
        return Err(format!("目标URL缺少主机名: {url}"));
    }

    Ok(())
}

/// 配置警告（不阻止启动）
pub fn config_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.interval_ms <= config.timeout_ms {
        warnings.push(format!(
            "探测间隔 ({}ms) 不大于超时时间 ({}ms)，慢响应会推迟后续探测",
            config.interval_ms, config.timeout_ms
        ));
    }

    if config.uses_placeholder_target() {
        warnings.push(format!(
            "目标URL仍为占位地址 {DEFAULT_TARGET_URL}，请通过 REPL_URL 或 --url 设置"
        ));
    }

    warnings
}
