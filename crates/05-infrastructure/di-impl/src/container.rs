//! 类型化依赖注入容器

use crate::registry::ComponentRegistryImpl;
use crate::resolver::DefaultResolver;
use core_common::{Capability, ComponentDescriptor, ComponentKey, DependencyError, Instance};
use di_abstractions::{ComponentRegistry, ContainerConfig, ContainerStats};
use std::sync::Arc;
use tracing::info;

/// 依赖注入容器
///
/// 注册阶段关闭之后的只读视图，克隆开销很小，可以在线程之间共享。
#[derive(Debug, Clone)]
pub struct DiContainer {
    registry: Arc<ComponentRegistryImpl>,
}

impl DiContainer {
    /// 创建容器构建器
    pub fn builder() -> DiContainerBuilder {
        DiContainerBuilder::new()
    }

    /// 包装一个已关闭注册的注册表
    pub fn from_registry(registry: Arc<ComponentRegistryImpl>) -> Result<Self, DependencyError> {
        registry.close_registration()?;
        Ok(Self { registry })
    }

    /// 底层注册表
    pub fn registry(&self) -> &Arc<ComponentRegistryImpl> {
        &self.registry
    }

    /// 按组件键解析实例
    pub fn get_by_key(&self, key: &ComponentKey) -> Result<Instance, DependencyError> {
        let resolver = DefaultResolver::new(self.registry.as_ref());
        let mut context = self.registry.config().resolve_context();
        self.registry.get_or_create(key, &resolver, &mut context)
    }

    /// 按能力解析唯一提供者的实例
    pub fn get<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<I>, DependencyError> {
        self.get_typed(&ComponentKey::of::<I>())
    }

    /// 按能力和组件名称解析实例
    pub fn get_named<I: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Arc<I>, DependencyError> {
        self.get_typed(&ComponentKey::named::<I>(name))
    }

    /// 解析某个能力的所有提供者，按注册顺序
    pub fn get_all<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<I>>, DependencyError> {
        self.registry
            .lookup_all(Capability::of::<I>())
            .iter()
            .map(|descriptor| self.get_typed(&descriptor.qualified_key()))
            .collect()
    }

    /// 是否存在能满足组件键的唯一提供者
    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.registry.is_registered(key)
    }

    /// 已注册的组件名称，按注册顺序
    pub fn component_names(&self) -> Vec<String> {
        self.registry
            .registered_components()
            .into_iter()
            .map(|summary| summary.name)
            .collect()
    }

    /// 统计信息
    pub fn stats(&self) -> ContainerStats {
        self.registry.stats()
    }

    /// 静态验证依赖关系
    pub fn validate(&self) -> Result<(), Vec<DependencyError>> {
        self.registry.validate()
    }

    fn get_typed<I: ?Sized + Send + Sync + 'static>(
        &self,
        key: &ComponentKey,
    ) -> Result<Arc<I>, DependencyError> {
        let instance = self.get_by_key(key)?;
        instance
            .downcast::<I>()
            .ok_or_else(|| DependencyError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<I>(),
            })
    }
}

/// 依赖注入容器构建器
#[derive(Debug, Default)]
pub struct DiContainerBuilder {
    config: ContainerConfig,
    descriptors: Vec<ComponentDescriptor>,
}

impl DiContainerBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置容器配置
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 添加组件描述符
    pub fn register(mut self, descriptor: ComponentDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// 批量添加组件描述符
    pub fn register_all(mut self, descriptors: impl IntoIterator<Item = ComponentDescriptor>) -> Self {
        self.descriptors.extend(descriptors);
        self
    }

    /// 注册所有组件并关闭注册阶段
    pub fn build(self) -> Result<DiContainer, DependencyError> {
        let registry = Arc::new(ComponentRegistryImpl::with_config(self.config));
        for descriptor in self.descriptors {
            registry.register(descriptor)?;
        }

        let container = DiContainer::from_registry(registry)?;
        info!("依赖注入容器构建完成, 组件数: {}", container.stats().registered_components);
        Ok(container)
    }
}
