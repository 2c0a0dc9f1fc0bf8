//! 服务配置
//!
//! 加载顺序：内置默认值、配置文件（可选）、`TRIAGE__` 前缀的环境变量，最后由命令行参数覆盖。

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tracing::debug;
use triage_core::{Result, TriageError};

/// 服务完整配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSettings {
    /// 监听配置
    pub server: ListenConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 跨域配置
    pub cors: CorsConfig,
}

/// 监听配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别或 `EnvFilter` 指令，例如 `info,triage_workflow=debug`
    pub level: String,
}

/// 跨域配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// 前端在其他源轮询队列时需要开启
    pub allow_any_origin: bool,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_any_origin: true,
        }
    }
}

impl ServerSettings {
    /// 加载配置
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = Config::try_from(&ServerSettings::default()).map_err(config_error)?;

        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = config_path {
            debug!("Loading configuration file {}", path);
            builder = builder.add_source(File::with_name(path).required(true));
        }

        let settings: ServerSettings = builder
            .add_source(
                Environment::with_prefix("TRIAGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)?;

        settings.validate()?;
        Ok(settings)
    }

    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(TriageError::Config("Server host cannot be empty".to_string()));
        }
        if self.server.port == 0 {
            return Err(TriageError::Config("Server port cannot be 0".to_string()));
        }
        Ok(())
    }

    /// 监听地址
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| {
                TriageError::Config(format!(
                    "Invalid listen address {}:{}: {}",
                    self.server.host, self.server.port, e
                ))
            })
    }
}

fn config_error(err: config::ConfigError) -> TriageError {
    TriageError::Config(err.to_string())
}
