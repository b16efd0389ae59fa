//! 配置管理模块
//!
//! 提供配置文件解析、环境变量覆盖和验证功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{
    apply_env_overrides, resolve_config, ConfigLoader, TomlConfigLoader, ENV_PING_INTERVAL,
    ENV_PING_TIMEOUT, ENV_TARGET_URL,
};
pub use types::{
    config_warnings, validate_config, Config, ConfigOverrides, WebConfig, DEFAULT_HEALTH_PATH,
    DEFAULT_TARGET_URL,
};
