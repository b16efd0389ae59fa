//! 配置加载器实现
//!
//! 提供TOML配置文件解析、环境变量替换、环境变量覆盖和错误处理功能

use crate::config::types::{config_warnings, validate_config, Config, ConfigOverrides};
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};

/// 目标基础 URL 的环境变量
pub const ENV_TARGET_URL: &str = "REPL_URL";
/// 探测间隔（毫秒）的环境变量
pub const ENV_PING_INTERVAL: &str = "PING_INTERVAL";
/// 探测超时（毫秒）的环境变量
pub const ENV_PING_TIMEOUT: &str = "PING_TIMEOUT";

/// 配置加载器trait，定义配置加载接口
///
/// 加载只负责解析，验证在所有覆盖层合并之后单独进行。
#[async_trait]
pub trait ConfigLoader: Send + Sync {
    /// 从文件加载配置
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回
    /// * `Result<Config>` - 加载的配置或错误
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<Config>;

    /// 从字符串加载配置
    fn load_from_string(&self, content: &str) -> Result<Config>;

    /// 验证配置
    fn validate(&self, config: &Config) -> Result<()>;
}

/// TOML配置加载器实现
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl TomlConfigLoader {
    /// 创建新的TOML配置加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否启用 `${VAR}` 环境变量替换
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 替换字符串中的环境变量
    fn substitute_env_vars(&self, content: &str) -> Result<String> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        // 匹配 ${VAR_NAME} 格式的环境变量
        let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| ConfigError::ParseError(format!("正则表达式错误: {}", e)))?;

        let mut result = content.to_string();

        for captures in env_var_regex.captures_iter(content) {
            let full_match = &captures[0];
            let var_name = &captures[1];

            match std::env::var(var_name) {
                Ok(value) => {
                    result = result.replace(full_match, &value);
                }
                Err(_) => {
                    return Err(ConfigError::EnvVarError {
                        var: var_name.to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(result)
    }
}

#[async_trait]
impl ConfigLoader for TomlConfigLoader {
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::ParseError(format!("读取文件失败: {}", e)))?;

        let config = self.load_from_string(&content)?;

        log::info!("成功加载配置文件: {}", path.display());
        log::debug!("配置内容: {:?}", config);

        Ok(config)
    }

    fn load_from_string(&self, content: &str) -> Result<Config> {
        let processed_content = self.substitute_env_vars(content)?;

        let config: Config = toml::from_str(&processed_content)
            .map_err(|e| ConfigError::ParseError(format!("TOML解析失败: {}", e)))?;

        Ok(config)
    }

    fn validate(&self, config: &Config) -> Result<()> {
        validate_config(config).map_err(|e| ConfigError::ValidationError(e).into())
    }
}

/// 用环境变量覆盖配置
///
/// `lookup` 抽象了环境读取，便于测试时注入。
pub fn apply_env_overrides_from<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    // 空白值等同于未设置
    let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_blank(ENV_TARGET_URL) {
        config.target_url = url.trim().to_string();
    }

    if let Some(value) = non_blank(ENV_PING_INTERVAL) {
        config.interval_ms = parse_millis(ENV_PING_INTERVAL, &value)?;
    }

    if let Some(value) = non_blank(ENV_PING_TIMEOUT) {
        config.timeout_ms = parse_millis(ENV_PING_TIMEOUT, &value)?;
    }

    Ok(())
}

/// 用进程环境变量覆盖配置
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    apply_env_overrides_from(config, |name| std::env::var(name).ok())
}

fn parse_millis(var: &str, value: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|_| {
        ConfigError::InvalidEnvValue {
            var: var.to_string(),
            value: value.to_string(),
        }
        .into()
    })
}

/// 按层次解析最终配置：默认值 → 配置文件 → 环境变量 → 命令行
///
/// 显式指定的配置文件不存在时报错；未指定时只在默认路径存在的情况下读取。
pub async fn resolve_config(
    explicit_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<Config> {
    let loader = TomlConfigLoader::new(true);

    let mut config = match explicit_path {
        Some(path) => loader.load_from_file(path).await?,
        None => {
            let default_path = get_default_config_path();
            if default_path.exists() {
                loader.load_from_file(&default_path).await?
            } else {
                log::debug!("未找到配置文件，使用默认配置和环境变量");
                Config::default()
            }
        }
    };

    apply_env_overrides(&mut config)?;
    overrides.apply(&mut config);

    loader.validate(&config)?;

    for warning in config_warnings(&config) {
        log::warn!("配置警告: {}", warning);
    }

    Ok(config)
}

/// 获取默认配置文件路径
pub fn get_default_config_path() -> PathBuf {
    // 先检测当前目录是否存在keepalive.toml，不存在则使用用户配置目录
    if Path::new("keepalive.toml").exists() {
        PathBuf::from("keepalive.toml")
    } else {
        dirs::config_dir()
            .map(|config_dir| config_dir.join("keepalive").join("keepalive.toml"))
            .unwrap_or_else(|| PathBuf::from("keepalive.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use std::env;
    use tempfile::NamedTempFile;

    const TEST_CONFIG_TOML: &str = r#"
target_url = "https://my-app.example.com"
interval_ms = 60000
timeout_ms = 5000

[web]
bind_address = "127.0.0.1"
port = 9000
"#;

    #[tokio::test]
    async fn test_toml_parsing() {
        let loader = TomlConfigLoader::new(false);
        let config = loader.load_from_string(TEST_CONFIG_TOML).unwrap();

        assert_eq!(config.target_url, "https://my-app.example.com");
        assert_eq!(config.interval_ms, 60_000);
        assert_eq!(config.timeout_ms, 5_000);
        assert_eq!(config.health_path, "/health");
        assert_eq!(config.web.bind_address, "127.0.0.1");
        assert_eq!(config.web.port, 9000);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let loader = TomlConfigLoader::new(false);
        let result = loader.load_from_string("interval_ms = \"soon\"");
        assert!(result.unwrap_err().to_string().contains("TOML解析失败"));
    }

    #[test]
    fn test_load_does_not_validate() {
        let loader = TomlConfigLoader::new(false);
        let config = loader.load_from_string("interval_ms = 0").unwrap();

        // 之后的覆盖层可能修正该值，验证单独进行
        let result = loader.validate(&config);
        assert!(result.unwrap_err().to_string().contains("探测间隔不能为0"));
    }

    #[test]
    #[serial]
    fn test_env_var_substitution() {
        env::set_var("KEEPALIVE_TEST_HOST", "https://substituted.example.com");

        let loader = TomlConfigLoader::new(true);
        let config = loader
            .load_from_string(r#"target_url = "${KEEPALIVE_TEST_HOST}""#)
            .unwrap();

        assert_eq!(config.target_url, "https://substituted.example.com");

        env::remove_var("KEEPALIVE_TEST_HOST");
    }

    #[test]
    #[serial]
    fn test_env_var_substitution_missing_var() {
        env::remove_var("KEEPALIVE_MISSING_VAR");

        let loader = TomlConfigLoader::new(true);
        let result = loader.load_from_string(r#"target_url = "${KEEPALIVE_MISSING_VAR}""#);

        assert!(result.unwrap_err().to_string().contains("KEEPALIVE_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_disabled() {
        let loader = TomlConfigLoader::new(false);
        let content = "test ${VAR} content";
        let result = loader.substitute_env_vars(content).unwrap();
        assert_eq!(result, content);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), TEST_CONFIG_TOML).unwrap();

        let loader = TomlConfigLoader::new(false);
        let config = loader.load_from_file(file.path()).await.unwrap();
        assert_eq!(config.interval_ms, 60_000);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let loader = TomlConfigLoader::new(false);
        let result = loader.load_from_file("/nonexistent/keepalive.toml").await;
        assert!(result.unwrap_err().to_string().contains("配置文件不存在"));
    }

    #[test]
    fn test_env_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_TARGET_URL, "https://from-env.example.com"),
            (ENV_PING_INTERVAL, "120000"),
        ]);

        let mut config = Config::default();
        apply_env_overrides_from(&mut config, |name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.target_url, "https://from-env.example.com");
        assert_eq!(config.interval_ms, 120_000);
        assert_eq!(config.timeout_ms, 15_000);
    }

    #[test]
    fn test_env_overrides_blank_url_ignored() {
        let mut config = Config::default();
        apply_env_overrides_from(&mut config, |name| {
            (name == ENV_TARGET_URL).then(|| "   ".to_string())
        })
        .unwrap();

        assert!(config.uses_placeholder_target());
    }

    #[test]
    fn test_env_overrides_blank_numbers_ignored() {
        let mut config = Config::default();
        apply_env_overrides_from(&mut config, |name| match name {
            ENV_PING_INTERVAL => Some(String::new()),
            ENV_PING_TIMEOUT => Some("  ".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.interval_ms, 240_000);
        assert_eq!(config.timeout_ms, 15_000);
    }

    #[test]
    fn test_env_overrides_invalid_interval() {
        let mut config = Config::default();
        let result = apply_env_overrides_from(&mut config, |name| {
            (name == ENV_PING_INTERVAL).then(|| "four minutes".to_string())
        });

        let message = result.unwrap_err().to_string();
        assert!(message.contains(ENV_PING_INTERVAL));
        assert!(message.contains("four minutes"));
    }

    #[tokio::test]
    #[serial]
    async fn test_resolve_config_layering() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), TEST_CONFIG_TOML).unwrap();

        env::set_var(ENV_PING_INTERVAL, "30000");
        env::remove_var(ENV_TARGET_URL);
        env::remove_var(ENV_PING_TIMEOUT);

        let overrides = ConfigOverrides {
            timeout_ms: Some(2_000),
            ..Default::default()
        };
        let config = resolve_config(Some(file.path()), &overrides).await.unwrap();

        // 文件提供 URL，环境变量覆盖间隔，命令行覆盖超时
        assert_eq!(config.target_url, "https://my-app.example.com");
        assert_eq!(config.interval_ms, 30_000);
        assert_eq!(config.timeout_ms, 2_000);

        env::remove_var(ENV_PING_INTERVAL);
    }

    #[tokio::test]
    #[serial]
    async fn test_resolve_config_cli_beats_env() {
        env::set_var(ENV_TARGET_URL, "https://from-env.example.com");

        let overrides = ConfigOverrides {
            target_url: Some("http://127.0.0.1:8080".to_string()),
            ..Default::default()
        };
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "").unwrap();

        let config = resolve_config(Some(file.path()), &overrides).await.unwrap();
        assert_eq!(config.target_url, "http://127.0.0.1:8080");

        env::remove_var(ENV_TARGET_URL);
    }

    #[tokio::test]
    async fn test_resolve_config_explicit_missing_file() {
        let result = resolve_config(
            Some(Path::new("/nonexistent/keepalive.toml")),
            &ConfigOverrides::default(),
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_get_default_config_path() {
        let path = get_default_config_path();
        assert!(path.to_string_lossy().contains("keepalive.toml"));
    }
}
