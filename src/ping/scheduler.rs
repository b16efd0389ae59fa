//! 探测循环调度模块
//!
//! 启动后立即探测一次，之后每隔固定间隔探测一次，直到收到关闭信号

use crate::config::Config;
use crate::ping::outcome::{PingAttempt, PingStats};
use crate::ping::pinger::Pinger;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// 探测结果回调函数类型
pub type PingObserver = Arc<dyn Fn(&PingAttempt) + Send + Sync>;

/// 探测循环配置
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    /// 目标服务基础 URL
    pub target_url: String,
    /// 探测间隔
    pub interval: Duration,
    /// 单次探测超时
    pub timeout: Duration,
}

impl From<&Config> for LoopConfig {
    fn from(config: &Config) -> Self {
        Self {
            target_url: config.target_url.clone(),
            interval: config.interval(),
            timeout: config.timeout(),
        }
    }
}

/// 探测循环
///
/// 每次探测都在循环内顺序等待完成，同一循环的两次探测不会重叠。
/// 如果某次探测超过了间隔，错过的 tick 会顺延而不是补发。
pub struct PingLoop {
    /// 探测器
    pinger: Arc<dyn Pinger>,
    /// 循环配置
    config: LoopConfig,
    /// 探测结果回调
    observer: Option<PingObserver>,
}

impl PingLoop {
    /// 创建新的探测循环
    pub fn new(pinger: Arc<dyn Pinger>, config: LoopConfig) -> Self {
        Self {
            pinger,
            config,
            observer: None,
        }
    }

    /// 设置探测结果回调，每次探测完成后调用
    pub fn with_observer(mut self, observer: PingObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// 运行探测循环直到收到关闭信号
    ///
    /// 关闭时不再安排新的探测；正在进行的探测直接放弃，不等待其完成。
    ///
    /// # 返回
    /// * `PingStats` - 本次运行的统计信息
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> PingStats {
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut stats = PingStats::default();

        info!(
            "启动保活探测循环: {} (间隔 {}ms, 超时 {}ms)",
            self.config.target_url,
            self.config.interval.as_millis(),
            self.config.timeout.as_millis()
        );

        loop {
            // 第一次 tick 立即完成
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!("收到关闭信号，停止保活探测循环");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let attempt = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!("收到关闭信号，放弃进行中的探测");
                    break;
                }
                attempt = self.pinger.ping_once(
                    &self.config.target_url,
                    self.config.timeout,
                ) => attempt,
            };

            stats.update(&attempt);

            if let Some(ref observer) = self.observer {
                observer(&attempt);
            }

            debug!(
                "第 {} 次探测完成，下次探测在 {}ms 后",
                stats.total_attempts,
                self.config.interval.as_millis()
            );
        }

        info!(
            "保活探测循环已停止: 共 {} 次，成功 {} 次，超时 {} 次，网络错误 {} 次 (成功率 {:.1}%)",
            stats.total_attempts,
            stats.successes,
            stats.timeouts,
            stats.network_failures,
            stats.success_rate()
        );

        stats
    }
}
