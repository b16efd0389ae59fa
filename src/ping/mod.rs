//! 保活探测模块
//!
//! 提供单次HTTP探测、探测结果记录和定时探测循环

pub mod outcome;
pub mod pinger;
pub mod scheduler;

// 重新导出主要类型
pub use outcome::{PingAttempt, PingOutcome, PingStats};
pub use pinger::{HttpPinger, Pinger, ProbeResponse};
pub use scheduler::{LoopConfig, PingLoop, PingObserver};
