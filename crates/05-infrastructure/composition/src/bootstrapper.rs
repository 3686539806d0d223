//! 容器启动器

use crate::component_scanner::ComponentScannerImpl;
use crate::config::BootstrapConfig;
use core_common::{catalog, ComponentDescriptor, ComponentError};
use di_abstractions::ComponentRegistry;
use di_impl::{ComponentRegistryImpl, DiContainer};
use std::sync::Arc;
use tracing::{error, info};

/// 候选组件来源
#[derive(Debug, Default)]
pub enum CandidateSource {
    /// `#[component]` 生成的全局候选目录
    #[default]
    Catalog,
    /// 显式给出的候选描述符
    Explicit(Vec<ComponentDescriptor>),
}

impl CandidateSource {
    fn into_candidates(self) -> Vec<ComponentDescriptor> {
        match self {
            Self::Catalog => catalog::candidates(),
            Self::Explicit(descriptors) => descriptors,
        }
    }
}

/// 容器启动器
///
/// 依次注册手动描述符、扫描候选组件、关闭注册阶段，最后做静态依赖验证
#[derive(Debug, Default)]
pub struct ContextBootstrapper {
    /// 启动配置
    config: BootstrapConfig,
    /// 候选组件来源
    candidates: CandidateSource,
    /// 手动注册的描述符，先于扫描结果注册
    descriptors: Vec<ComponentDescriptor>,
}

impl ContextBootstrapper {
    /// 创建新的启动器
    pub fn new(config: BootstrapConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// 使用显式的候选描述符代替全局候选目录
    pub fn with_candidates(mut self, candidates: Vec<ComponentDescriptor>) -> Self {
        self.candidates = CandidateSource::Explicit(candidates);
        self
    }

    /// 添加手动注册的描述符
    pub fn with_descriptor(mut self, descriptor: ComponentDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// 批量添加手动注册的描述符
    pub fn with_descriptors(mut self, descriptors: impl IntoIterator<Item = ComponentDescriptor>) -> Self {
        self.descriptors.extend(descriptors);
        self
    }

    /// 启动容器
    pub fn bootstrap(self) -> Result<DiContainer, ComponentError> {
        info!("开始启动容器, 扫描路径: {:?}", self.config.scan.base_path);

        let registry = Arc::new(ComponentRegistryImpl::with_config(self.config.container.clone()));

        for descriptor in self.descriptors {
            registry.register(descriptor)?;
        }

        let scanner = ComponentScannerImpl::from_config(&self.config.scan).with_name("bootstrap-scanner");
        let scanned = scanner.scan_and_register(&*registry, self.candidates.into_candidates())?;

        let container = DiContainer::from_registry(registry)?;

        if let Err(errors) = container.validate() {
            for e in &errors {
                error!("依赖验证失败: {}", e);
            }
            return Err(ComponentError::ValidationFailed { errors });
        }

        let stats = container.stats();
        info!(
            "容器启动完成: 共 {} 个组件 (扫描 {} 个)",
            stats.registered_components, scanned
        );
        Ok(container)
    }
}
