//! keepalive - 托管服务保活探测工具
//!
//! 定时向目标服务的健康检查路径发起 HTTP 请求，防止托管平台因空闲挂起服务：
//! - 单次探测：成功 / 网络错误 / 超时三种结果
//! - 探测循环：启动即探测，之后按固定间隔探测，收到终止信号后退出
//! - HTTP保活端点：供外部定时器调用，每次请求触发一次探测
//! - 结构化日志记录

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod ping;
pub mod signal;
pub mod web;

// 重新导出主要类型
pub use config::{Config, WebConfig};
pub use error::KeepAliveError;
pub use ping::{HttpPinger, PingAttempt, PingLoop, PingOutcome, Pinger};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
