//! keepalive 主程序入口
//!
//! 托管服务保活探测工具

use anyhow::{Context, Result};
use clap::Parser;
use keepalive::cli::{execute_command, Args};
use keepalive::logging::{LogConfig, LoggingSystem};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统
    let log_config = LogConfig {
        level: args.log_level.clone().into(),
        file_path: args.log_file.clone(),
        json_format: args.json_logs,
    };

    LoggingSystem::setup_logging(&log_config).context("初始化日志系统失败")?;

    info!("keepalive v{} 启动", keepalive::VERSION);

    // 执行命令；收到终止信号后正常返回，进程以 0 退出
    if let Err(e) = execute_command(&args).await {
        error!("命令执行失败: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
