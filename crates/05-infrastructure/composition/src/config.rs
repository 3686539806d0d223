//! 启动配置
//!
//! 配置文件为 TOML 格式，包含 `[container]` 和 `[scan]` 两节，缺省的字段使用默认值：
//!
//! ```toml
//! [container]
//! validate_on_close = true
//!
//! [scan]
//! base_path = "member_app"
//! exclude_stereotypes = ["configuration"]
//! ```

use core_common::{ConfigError, ConfigResult, Stereotype};
use di_abstractions::ContainerConfig;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// 组件扫描配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 扫描的基础模块路径，空字符串表示全部
    pub base_path: String,
    /// 排除的构造型
    pub exclude_stereotypes: Vec<Stereotype>,
    /// 排除的组件名称
    pub exclude_names: Vec<String>,
    /// 未扫描到任何组件时是否报错
    pub fail_on_empty: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            exclude_stereotypes: Vec::new(),
            exclude_names: Vec::new(),
            fail_on_empty: true,
        }
    }
}

/// 启动配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// 容器配置
    pub container: ContainerConfig,
    /// 扫描配置
    pub scan: ScanConfig,
}

impl BootstrapConfig {
    /// 从 TOML 文件加载
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        load_toml(path)
    }
}

/// 从 TOML 文件加载配置
pub fn load_toml<T: DeserializeOwned>(path: impl AsRef<Path>) -> ConfigResult<T> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    debug!("读取配置文件: {}", path.display());
    let content = std::fs::read_to_string(path)?;
    let config = parse_toml(&content)?;
    info!("配置文件加载完成: {}", path.display());
    Ok(config)
}

/// 解析 TOML 配置文本
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })
}
