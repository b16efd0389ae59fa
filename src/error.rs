//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// keepalive 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum KeepAliveError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 探测相关错误
    #[error("探测错误: {0}")]
    Ping(#[from] PingError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },

    /// 环境变量取值无效
    #[error("环境变量 {var} 的值无效: {value}")]
    InvalidEnvValue { var: String, value: String },
}

/// 探测错误类型
///
/// 定时探测不会把这些错误向上传播，而是折叠进 [`crate::ping::PingOutcome`]；
/// 只有 HTTP 端点需要把错误原样交给调用方。
#[derive(Error, Debug)]
pub enum PingError {
    /// 超时
    #[error("请求超时 ({timeout_ms}ms)")]
    Timeout { timeout_ms: u64 },

    /// 传输层错误（DNS、连接拒绝、TLS 等）
    #[error("{message}")]
    Transport { message: String },

    /// HTTP 客户端构建失败
    #[error("HTTP客户端初始化失败: {0}")]
    Client(#[source] reqwest::Error),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, KeepAliveError>;
