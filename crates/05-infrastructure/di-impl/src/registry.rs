//! 组件注册表实现

use core_common::{Capability, ComponentDescriptor, ComponentKey, DependencyError, Instance};
use di_abstractions::{
    CircularDependencyDetector, ComponentRegistry, ComponentResolver, ComponentSummary,
    ContainerConfig, ContainerStats, DefaultCircularDependencyDetector, DependencyGraphNode,
    ResolveContext,
};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 提供者槽位
///
/// 实例单元只会被成功初始化一次；并发的首次访问者会等待第一个构造完成。
#[derive(Debug)]
struct ProviderSlot {
    /// 组件描述符
    descriptor: Arc<ComponentDescriptor>,
    /// 带组件名称的完整键
    key: ComponentKey,
    /// 单例实例
    instance: OnceCell<Instance>,
}

impl ProviderSlot {
    fn new(descriptor: ComponentDescriptor) -> Self {
        Self {
            key: descriptor.qualified_key(),
            descriptor: Arc::new(descriptor),
            instance: OnceCell::new(),
        }
    }
}

/// 注册表内部状态
#[derive(Debug, Default)]
struct RegistryState {
    /// 能力 -> 提供者列表（按注册顺序）
    table: HashMap<Capability, Vec<Arc<ProviderSlot>>>,
    /// 所有提供者（按注册顺序）
    slots: Vec<Arc<ProviderSlot>>,
    /// 注册阶段是否已关闭
    closed: bool,
}

impl RegistryState {
    /// 为组件键选择唯一的提供者
    fn select(&self, key: &ComponentKey, requester: &str) -> Result<Arc<ProviderSlot>, DependencyError> {
        let slots = self
            .table
            .get(&key.capability())
            .map(Vec::as_slice)
            .unwrap_or_default();

        match key.qualifier() {
            Some(name) => slots
                .iter()
                .find(|slot| slot.descriptor.component_name() == name)
                .cloned()
                .ok_or_else(|| DependencyError::unresolved(key, requester)),
            None => match slots {
                [] => Err(DependencyError::unresolved(key, requester)),
                [only] => Ok(Arc::clone(only)),
                many => Err(DependencyError::AmbiguousProvider {
                    key: key.to_string(),
                    candidates: many
                        .iter()
                        .map(|slot| slot.descriptor.component_name())
                        .collect(),
                }),
            },
        }
    }

    /// 静态验证：缺失依赖、歧义和循环依赖
    fn validate(&self) -> Result<(), Vec<DependencyError>> {
        let (graph, mut errors) = self.dependency_graph();
        errors.extend(DefaultCircularDependencyDetector.detect_circular_dependencies(&graph));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// 只检测循环依赖
    fn check_cycles(&self) -> Result<(), Vec<DependencyError>> {
        let (graph, _) = self.dependency_graph();
        let errors = DefaultCircularDependencyDetector.detect_circular_dependencies(&graph);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// 构建依赖图，同时收集无法选定提供者的依赖
    fn dependency_graph(&self) -> (Vec<DependencyGraphNode>, Vec<DependencyError>) {
        let mut errors = Vec::new();
        let mut graph = Vec::with_capacity(self.slots.len());

        for (id, slot) in self.slots.iter().enumerate() {
            let requester = slot.key.to_string();
            let mut dependencies = Vec::new();

            for dependency in slot.descriptor.dependencies() {
                match self.select(dependency, &requester) {
                    Ok(target) => {
                        if let Some(target_id) = self.slots.iter().position(|s| Arc::ptr_eq(s, &target)) {
                            dependencies.push(target_id);
                        }
                    }
                    Err(e) => errors.push(e),
                }
            }

            graph.push(DependencyGraphNode {
                id,
                name: slot.key.to_string(),
                dependencies,
            });
        }

        (graph, errors)
    }
}

/// 同一能力下两个提供者是否冲突
fn conflicts(existing: &ComponentDescriptor, candidate: &ComponentDescriptor) -> bool {
    (existing.name().is_none() && candidate.name().is_none())
        || existing.component_name() == candidate.component_name()
}

/// 组件注册表实现
#[derive(Debug)]
pub struct ComponentRegistryImpl {
    /// 容器配置
    config: ContainerConfig,
    /// 类型表
    state: RwLock<RegistryState>,
    /// 构造函数成功执行次数
    constructions: AtomicUsize,
    /// 顶层解析失败次数
    resolution_errors: AtomicUsize,
}

impl ComponentRegistryImpl {
    /// 创建新的组件注册表
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 使用指定配置创建组件注册表
    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            config,
            state: RwLock::new(RegistryState::default()),
            constructions: AtomicUsize::new(0),
            resolution_errors: AtomicUsize::new(0),
        }
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    fn find_slot(&self, key: &ComponentKey, requester: &str) -> Result<Arc<ProviderSlot>, DependencyError> {
        let state = self.state.read();
        if !state.closed {
            return Err(DependencyError::RegistrationOpen {
                key: key.to_string(),
            });
        }
        state.select(key, requester)
    }

    fn create_instance(
        &self,
        key: &ComponentKey,
        resolver: &dyn ComponentResolver,
        context: &mut ResolveContext,
    ) -> Result<Instance, DependencyError> {
        let slot = self.find_slot(key, &context.requester())?;

        if let Some(instance) = slot.instance.get() {
            debug!("命中单例缓存: {}", slot.key);
            return Ok(instance.clone());
        }

        // 必须在进入实例单元之前检测循环，否则同一线程会重入正在初始化的单元
        context.check(&slot.key)?;

        let instance = slot.instance.get_or_try_init(|| {
            let instance = resolver.resolve(&slot.key, context)?;
            self.constructions.fetch_add(1, Ordering::Relaxed);
            info!("创建单例: {} ({})", slot.key, slot.descriptor.provider().full_name());
            Ok::<_, DependencyError>(instance)
        })?;

        Ok(instance.clone())
    }
}

impl Default for ComponentRegistryImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry for ComponentRegistryImpl {
    fn register(&self, descriptor: ComponentDescriptor) -> Result<(), DependencyError> {
        let mut state = self.state.write();

        if state.closed {
            warn!("注册阶段已关闭, 拒绝注册: {}", descriptor.key());
            return Err(DependencyError::RegistrationClosed {
                key: descriptor.key().to_string(),
            });
        }

        let capability = descriptor.capability();
        if let Some(existing) = state
            .table
            .get(&capability)
            .and_then(|slots| slots.iter().find(|slot| conflicts(&slot.descriptor, &descriptor)))
        {
            return Err(DependencyError::DuplicateRegistration {
                key: descriptor.key().to_string(),
                existing: existing.descriptor.to_string(),
            });
        }

        info!("注册组件: {} -> {}", descriptor.qualified_key(), descriptor.provider().full_name());

        let slot = Arc::new(ProviderSlot::new(descriptor));
        state.table.entry(capability).or_default().push(Arc::clone(&slot));
        state.slots.push(slot);

        Ok(())
    }

    fn close_registration(&self) -> Result<(), DependencyError> {
        let mut state = self.state.write();

        if state.closed {
            return Ok(());
        }

        let checked = if self.config.validate_on_close {
            state.validate()
        } else if self.config.check_cycles_on_close {
            state.check_cycles()
        } else {
            Ok(())
        };

        if let Err(errors) = checked {
            for e in &errors {
                error!("依赖验证失败: {}", e);
            }
            return Err(DependencyError::ValidationFailed { errors });
        }

        state.closed = true;
        info!("注册阶段关闭, 共 {} 个组件", state.slots.len());
        Ok(())
    }

    fn is_registration_closed(&self) -> bool {
        self.state.read().closed
    }

    fn is_registered(&self, key: &ComponentKey) -> bool {
        self.state.read().select(key, "").is_ok()
    }

    fn lookup(
        &self,
        key: &ComponentKey,
        context: &ResolveContext,
    ) -> Result<Arc<ComponentDescriptor>, DependencyError> {
        self.find_slot(key, &context.requester())
            .map(|slot| Arc::clone(&slot.descriptor))
    }

    fn lookup_all(&self, capability: Capability) -> Vec<Arc<ComponentDescriptor>> {
        self.state
            .read()
            .table
            .get(&capability)
            .map(|slots| slots.iter().map(|slot| Arc::clone(&slot.descriptor)).collect())
            .unwrap_or_default()
    }

    fn get_or_create(
        &self,
        key: &ComponentKey,
        resolver: &dyn ComponentResolver,
        context: &mut ResolveContext,
    ) -> Result<Instance, DependencyError> {
        let is_root = context.depth() == 0;
        let result = self.create_instance(key, resolver, context);

        if let Err(e) = &result {
            if is_root {
                self.resolution_errors.fetch_add(1, Ordering::Relaxed);
                warn!("组件解析失败: {}, 原因: {}", key, e);
            }
        }

        result
    }

    fn registered_components(&self) -> Vec<ComponentSummary> {
        self.state
            .read()
            .slots
            .iter()
            .map(|slot| ComponentSummary {
                key: slot.key.clone(),
                name: slot.descriptor.component_name(),
                provider: slot.descriptor.provider().full_name(),
                dependencies: slot.descriptor.dependencies().to_vec(),
                instantiated: slot.instance.get().is_some(),
            })
            .collect()
    }

    fn validate(&self) -> Result<(), Vec<DependencyError>> {
        info!("验证容器依赖关系");
        self.state.read().validate()
    }

    fn stats(&self) -> ContainerStats {
        let state = self.state.read();
        ContainerStats {
            registered_components: state.slots.len(),
            active_singletons: state
                .slots
                .iter()
                .filter(|slot| slot.instance.get().is_some())
                .count(),
            constructions: self.constructions.load(Ordering::Relaxed),
            resolution_errors: self.resolution_errors.load(Ordering::Relaxed),
        }
    }
}
