//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use crate::config::ConfigOverrides;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// keepalive - 定时探测托管服务，防止其因空闲被挂起
#[derive(Parser, Debug, Clone)]
#[command(
    name = "keepalive",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径",
        env = "KEEPALIVE_CONFIG",
        global = true
    )]
    pub config: Option<PathBuf>,

    /// 日志级别
    #[arg(
        short,
        long,
        value_enum,
        default_value = "info",
        help = "日志级别",
        env = "KEEPALIVE_LOG_LEVEL",
        global = true
    )]
    pub log_level: LogLevel,

    /// 是否输出JSON格式日志
    #[arg(long, help = "输出JSON格式日志", global = true)]
    pub json_logs: bool,

    /// 日志文件路径，设置后日志写入文件
    #[arg(
        long,
        value_name = "FILE",
        help = "日志文件路径",
        env = "KEEPALIVE_LOG_FILE",
        global = true
    )]
    pub log_file: Option<PathBuf>,

    /// 子命令
    #[command(subcommand)]
    pub command: Commands,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 启动保活探测循环，直到收到终止信号
    Start {
        /// 目标服务基础 URL（覆盖 REPL_URL）
        #[arg(short, long, value_name = "URL", help = "目标服务基础URL")]
        url: Option<String>,

        /// 探测间隔（毫秒，覆盖 PING_INTERVAL）
        #[arg(short, long, value_name = "MS", help = "探测间隔（毫秒）")]
        interval: Option<u64>,

        /// 单次探测超时（毫秒，覆盖 PING_TIMEOUT）
        #[arg(short, long, value_name = "MS", help = "单次探测超时（毫秒）")]
        timeout: Option<u64>,
    },

    /// 执行一次探测并输出结果
    Check {
        /// 目标服务基础 URL
        #[arg(short, long, value_name = "URL", help = "目标服务基础URL")]
        url: Option<String>,

        /// 超时时间（毫秒）
        #[arg(short, long, value_name = "MS", help = "超时时间（毫秒）")]
        timeout: Option<u64>,

        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },

    /// 启动HTTP保活端点，每次请求触发一次探测
    Serve {
        /// 目标服务基础 URL
        #[arg(short, long, value_name = "URL", help = "目标服务基础URL")]
        url: Option<String>,

        /// 绑定地址
        #[arg(long, value_name = "ADDR", help = "绑定地址")]
        bind: Option<String>,

        /// 监听端口
        #[arg(short, long, value_name = "PORT", help = "监听端口")]
        port: Option<u16>,

        /// 单次探测超时（毫秒）
        #[arg(short, long, value_name = "MS", help = "单次探测超时（毫秒）")]
        timeout: Option<u64>,
    },

    /// 初始化配置文件
    Init {
        /// 配置文件路径
        #[arg(
            value_name = "FILE",
            help = "配置文件路径",
            default_value = "keepalive.toml"
        )]
        config_path: PathBuf,

        /// 是否覆盖现有文件
        #[arg(short, long, help = "覆盖现有文件")]
        force: bool,
    },

    /// 验证配置并显示生效值
    Validate {
        /// 配置文件路径
        #[arg(value_name = "FILE", help = "配置文件路径")]
        config_path: Option<PathBuf>,
    },

    /// 显示版本信息
    Version {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },
}

/// 输出格式枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputFormat {
    /// 文本格式
    Text,
    /// JSON格式
    Json,
}

impl Commands {
    /// 子命令携带的配置覆盖项
    pub fn config_overrides(&self) -> ConfigOverrides {
        match self {
            Commands::Start {
                url,
                interval,
                timeout,
            } => ConfigOverrides {
                target_url: url.clone(),
                interval_ms: *interval,
                timeout_ms: *timeout,
                ..Default::default()
            },
            Commands::Check { url, timeout, .. } => ConfigOverrides {
                target_url: url.clone(),
                timeout_ms: *timeout,
                ..Default::default()
            },
            Commands::Serve {
                url,
                bind,
                port,
                timeout,
            } => ConfigOverrides {
                target_url: url.clone(),
                timeout_ms: *timeout,
                bind_address: bind.clone(),
                port: *port,
                ..Default::default()
            },
            _ => ConfigOverrides::default(),
        }
    }
}
