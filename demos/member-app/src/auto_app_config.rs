//! 组件扫描配置

use crate::app_config::AppConfig;
use core_common::{catalog, ComponentDescriptor, ComponentError, Stereotype};
use core_composition::{BootstrapConfig, ContextBootstrapper, ScanConfig};
use di_impl::DiContainer;
use tracing::info;

/// 扫描 `member_app` 下的组件
///
/// `AppConfig` 导出的装配方法同样位于扫描路径下，需要按 `Configuration` 构造型排除，
/// 否则会与扫描到的组件同时提供 `MemberService`。
pub struct AutoAppConfig;

impl AutoAppConfig {
    /// 默认扫描配置
    pub fn scan_config() -> ScanConfig {
        ScanConfig {
            base_path: "member_app".to_string(),
            exclude_stereotypes: vec![Stereotype::Configuration],
            ..ScanConfig::default()
        }
    }

    /// 扫描候选：`#[component]` 目录加上 `AppConfig` 导出的配置组件
    pub fn candidates() -> Result<Vec<ComponentDescriptor>, ComponentError> {
        let mut candidates = catalog::candidates();
        candidates.extend(AppConfig::descriptors()?);
        Ok(candidates)
    }

    /// 扫描并启动容器
    pub fn container(config: BootstrapConfig) -> Result<DiContainer, ComponentError> {
        info!("按扫描配置启动容器: {}", config.scan.base_path);
        ContextBootstrapper::new(config)
            .with_candidates(Self::candidates()?)
            .bootstrap()
    }
}
