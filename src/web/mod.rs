//! HTTP保活端点模块
//!
//! 提供一个可被外部定时器（如云函数 cron）调用的端点，
//! 每次请求触发一次对目标服务的探测并以 JSON 返回结果

use crate::ping::HttpPinger;
use std::sync::Arc;
use std::time::Duration;

pub mod handlers;
pub mod server;

pub use handlers::{FailureResponse, ReachableResponse};
pub use server::{build_router, WebServer};

/// Web 应用状态
#[derive(Debug, Clone)]
pub struct WebAppState {
    /// 探测器
    pub pinger: Arc<HttpPinger>,
    /// 目标服务基础 URL
    pub target_url: String,
    /// 单次探测超时
    pub timeout: Duration,
}

impl WebAppState {
    /// 创建新的应用状态
    pub fn new(pinger: Arc<HttpPinger>, target_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            pinger,
            target_url: target_url.into(),
            timeout,
        }
    }
}
