//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::cli::args::{Args, Commands, OutputFormat};
use crate::config::{config_warnings, resolve_config, Config};
use crate::error::{KeepAliveError, Result};
use crate::ping::{HttpPinger, LoopConfig, PingLoop, Pinger};
use crate::signal::{setup_signal_handlers, shutdown_channel};
use crate::web::{WebAppState, WebServer};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// `init` 生成的配置文件模板
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# keepalive 配置文件
#
# 优先级：命令行参数 > 环境变量 (REPL_URL / PING_INTERVAL / PING_TIMEOUT) > 本文件 > 默认值

# 目标服务基础 URL，探测请求发往 {target_url}{health_path}
target_url = "https://your-repl-name.your-username.repl.co"

# 探测间隔（毫秒），默认 4 分钟
interval_ms = 240000

# 单次探测超时（毫秒）
timeout_ms = 15000

# 健康检查路径
health_path = "/health"

# serve 子命令的监听配置
[web]
bind_address = "0.0.0.0"
port = 8787
"#;

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// 根据子命令分发执行
pub async fn execute_command(args: &Args) -> Result<()> {
    match &args.command {
        Commands::Start { .. } => StartCommand.execute(args).await,
        Commands::Check { .. } => CheckCommand.execute(args).await,
        Commands::Serve { .. } => ServeCommand.execute(args).await,
        Commands::Init { .. } => InitCommand.execute(args).await,
        Commands::Validate { .. } => ValidateCommand.execute(args).await,
        Commands::Version { .. } => VersionCommand.execute(args).await,
    }
}

/// 解析当前命令的生效配置
async fn load_effective_config(args: &Args) -> Result<Config> {
    resolve_config(args.config.as_deref(), &args.command.config_overrides()).await
}

fn build_pinger(config: &Config) -> Result<HttpPinger> {
    Ok(HttpPinger::new()?.with_health_path(config.health_path.clone()))
}

/// 启动命令
pub struct StartCommand;

#[async_trait]
impl Command for StartCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let config = load_effective_config(args).await?;
        let pinger = Arc::new(build_pinger(&config)?);

        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        setup_signal_handlers(shutdown_tx).await?;

        let ping_loop = PingLoop::new(pinger, LoopConfig::from(&config));
        ping_loop.run(shutdown_rx).await;

        info!("保活服务已停止");
        Ok(())
    }
}

/// 单次探测命令
pub struct CheckCommand;

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Check { format, .. } = &args.command {
            let config = load_effective_config(args).await?;
            let pinger = build_pinger(&config)?;

            let attempt = pinger.ping_once(&config.target_url, config.timeout()).await;

            match format {
                OutputFormat::Json => println!("{}", attempt.to_json()?),
                OutputFormat::Text => {
                    let status_icon = if attempt.is_alive() { "✓" } else { "✗" };
                    println!("{} {} - {}", status_icon, attempt.url, attempt.outcome);
                }
            }

            if !attempt.is_alive() {
                return Err(KeepAliveError::Other(anyhow::anyhow!(
                    "目标不可达: {}",
                    attempt.url
                )));
            }
        }
        Ok(())
    }
}

/// HTTP保活端点命令
pub struct ServeCommand;

#[async_trait]
impl Command for ServeCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let config = load_effective_config(args).await?;
        let pinger = Arc::new(build_pinger(&config)?);
        let state = WebAppState::new(pinger, config.target_url.clone(), config.timeout());

        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        setup_signal_handlers(shutdown_tx).await?;

        WebServer::new(config.web.clone(), state)
            .run(shutdown_rx)
            .await
    }
}

/// 初始化命令
pub struct InitCommand;

#[async_trait]
impl Command for InitCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Init { config_path, force } = &args.command {
            self.create_config_file(config_path, *force).await
        } else {
            Ok(())
        }
    }
}

impl InitCommand {
    /// 创建配置文件
    async fn create_config_file(&self, config_path: &Path, force: bool) -> Result<()> {
        if config_path.exists() && !force {
            eprintln!("配置文件已存在: {}", config_path.display());
            eprintln!("使用 --force 参数覆盖现有文件");
            return Ok(());
        }

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        tokio::fs::write(config_path, DEFAULT_CONFIG_TEMPLATE).await?;

        println!("配置文件已创建: {}", config_path.display());
        println!("请编辑 target_url 为您的服务地址");

        Ok(())
    }
}

/// 验证命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Validate { config_path } = &args.command {
            let path = config_path.as_deref().or(args.config.as_deref());
            let config = resolve_config(path, &args.command.config_overrides()).await?;

            println!("✓ 配置验证通过");
            println!("  目标地址: {}{}", config.target_url, config.health_path);
            println!("  探测间隔: {}ms", config.interval_ms);
            println!("  探测超时: {}ms", config.timeout_ms);
            println!(
                "  端点监听: {}:{}",
                config.web.bind_address, config.web.port
            );

            for warning in config_warnings(&config) {
                println!("⚠ {warning}");
            }
        }
        Ok(())
    }
}

/// 版本命令
pub struct VersionCommand;

#[async_trait]
impl Command for VersionCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Version { format } = &args.command {
            match format {
                OutputFormat::Json => {
                    let version_info = serde_json::json!({
                        "name": crate::APP_NAME,
                        "version": crate::VERSION,
                        "description": crate::APP_DESCRIPTION
                    });
                    println!("{}", serde_json::to_string_pretty(&version_info)?);
                }
                OutputFormat::Text => {
                    println!("{} v{}", crate::APP_NAME, crate::VERSION);
                    println!("{}", crate::APP_DESCRIPTION);
                }
            }
        }
        Ok(())
    }
}
