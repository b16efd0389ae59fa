//! Web服务器实现
//!
//! 提供HTTP服务器和路由管理

use super::{handlers, WebAppState};
use crate::config::WebConfig;
use crate::error::{ConfigError, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use tracing::info;

/// 构建路由：所有路径和方法都交给保活处理函数
pub fn build_router(state: WebAppState) -> Router {
    Router::new()
        .fallback(handlers::keepalive)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Web服务器
pub struct WebServer {
    /// 配置
    config: WebConfig,
    /// 应用状态
    state: WebAppState,
}

impl WebServer {
    /// 创建新的Web服务器
    pub fn new(config: WebConfig, state: WebAppState) -> Self {
        Self { config, state }
    }

    /// 启动Web服务器，收到关闭信号后优雅退出
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let addr = self
            .config
            .socket_addr()
            .map_err(ConfigError::ValidationError)?;

        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        info!("保活端点已启动: http://{}", local_addr);
        info!("探测目标: {}", self.state.pinger.health_url(&self.state.target_url));

        axum::serve(listener, build_router(self.state))
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("接收到关闭信号，正在关闭Web服务器...");
            })
            .await?;

        info!("Web服务器已关闭");
        Ok(())
    }
}
