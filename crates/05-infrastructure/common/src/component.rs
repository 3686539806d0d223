//! 组件描述符与实例定义
//!
//! 描述符声明组件满足的能力、依赖列表和构造函数；实例是类型擦除后的共享引用。

use crate::errors::DependencyError;
use crate::metadata::{Capability, ComponentKey, TypeInfo};
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 组件构造型
///
/// 扫描器根据构造型做排除过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stereotype {
    /// 普通组件
    Component,
    /// 业务服务
    Service,
    /// 数据仓库
    Repository,
    /// 手动装配配置
    Configuration,
}

impl Stereotype {
    /// 构造型名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Service => "service",
            Self::Repository => "repository",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for Stereotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 共享组件实例
///
/// 内部保存 `Arc<I>`，克隆只增加引用计数。
#[derive(Clone)]
pub struct Instance {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    /// 包装共享引用
    pub fn new<I: ?Sized + Send + Sync + 'static>(value: Arc<I>) -> Self {
        Self {
            type_name: std::any::type_name::<I>(),
            value: Arc::new(value),
        }
    }

    /// 还原为具体的共享引用
    pub fn downcast<I: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<I>> {
        self.value.downcast_ref::<Arc<I>>().cloned()
    }

    /// 是否为同一个实例
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }

    /// 实例的能力类型名称
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .field("ptr", &Arc::as_ptr(&self.value).cast::<()>())
            .finish()
    }
}

/// 已解析的依赖
///
/// 顺序与描述符中声明的依赖顺序一致
#[derive(Debug, Clone)]
pub struct ResolvedDependencies {
    requester: ComponentKey,
    entries: Vec<(ComponentKey, Instance)>,
}

impl ResolvedDependencies {
    /// 创建已解析的依赖列表
    pub fn new(requester: ComponentKey, entries: Vec<(ComponentKey, Instance)>) -> Self {
        Self { requester, entries }
    }

    /// 请求方组件键
    pub fn requester(&self) -> &ComponentKey {
        &self.requester
    }

    /// 依赖数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否没有依赖
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按声明位置获取依赖
    pub fn get<I: ?Sized + Send + Sync + 'static>(
        &self,
        index: usize,
    ) -> Result<Arc<I>, DependencyError> {
        let (key, instance) = self.entries.get(index).ok_or_else(|| {
            DependencyError::unresolved(
                format!("{}#{}", Capability::of::<I>(), index),
                &self.requester,
            )
        })?;
        instance
            .downcast::<I>()
            .ok_or_else(|| DependencyError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<I>(),
            })
    }

    /// 按声明的依赖键获取依赖
    pub fn by_key<I: ?Sized + Send + Sync + 'static>(
        &self,
        key: &ComponentKey,
    ) -> Result<Arc<I>, DependencyError> {
        let instance = self
            .entries
            .iter()
            .find(|(declared, _)| declared == key)
            .map(|(_, instance)| instance)
            .ok_or_else(|| DependencyError::unresolved(key, &self.requester))?;
        instance
            .downcast::<I>()
            .ok_or_else(|| DependencyError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<I>(),
            })
    }

    /// 按类型获取第一个匹配的依赖
    pub fn by_type<I: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<I>, DependencyError> {
        let wanted = TypeId::of::<I>();
        self.entries
            .iter()
            .find(|(key, _)| key.capability().id() == wanted)
            .and_then(|(_, instance)| instance.downcast::<I>())
            .ok_or_else(|| DependencyError::unresolved(Capability::of::<I>(), &self.requester))
    }
}

/// 组件构造函数类型
pub type ConstructorFn =
    Arc<dyn Fn(&ResolvedDependencies) -> Result<Instance, DependencyError> + Send + Sync>;

/// 组件描述符
#[derive(Clone)]
pub struct ComponentDescriptor {
    key: ComponentKey,
    provider: TypeInfo,
    dependencies: Vec<ComponentKey>,
    stereotypes: Vec<Stereotype>,
    constructor: ConstructorFn,
}

impl ComponentDescriptor {
    /// 创建描述符构建器
    ///
    /// `I` 为满足的能力（通常是 `dyn Trait`），`P` 为具体提供者类型。
    pub fn builder<I, P>() -> ComponentDescriptorBuilder<I>
    where
        I: ?Sized + Send + Sync + 'static,
        P: ?Sized + 'static,
    {
        ComponentDescriptorBuilder {
            key: ComponentKey::of::<I>(),
            provider: TypeInfo::of::<P>(),
            dependencies: Vec::new(),
            stereotypes: Vec::new(),
            _capability: PhantomData,
        }
    }

    /// 组件键（能力 + 显式名称）
    pub fn key(&self) -> &ComponentKey {
        &self.key
    }

    /// 满足的能力
    pub fn capability(&self) -> Capability {
        self.key.capability()
    }

    /// 显式名称
    pub fn name(&self) -> Option<&str> {
        self.key.qualifier()
    }

    /// 组件名称：显式名称或默认名称
    pub fn component_name(&self) -> String {
        self.name()
            .map_or_else(|| self.provider.default_component_name(), str::to_string)
    }

    /// 带组件名称的完整键，唯一标识一个提供者
    pub fn qualified_key(&self) -> ComponentKey {
        ComponentKey::new(self.capability(), Some(self.component_name()))
    }

    /// 提供者类型信息
    pub fn provider(&self) -> &TypeInfo {
        &self.provider
    }

    /// 声明的依赖，按构造参数顺序
    pub fn dependencies(&self) -> &[ComponentKey] {
        &self.dependencies
    }

    /// 构造型
    pub fn stereotypes(&self) -> &[Stereotype] {
        &self.stereotypes
    }

    /// 是否带有指定构造型
    pub fn has_stereotype(&self, stereotype: Stereotype) -> bool {
        self.stereotypes.contains(&stereotype)
    }

    /// 使用已解析的依赖构造实例
    pub fn construct(&self, dependencies: &ResolvedDependencies) -> Result<Instance, DependencyError> {
        (self.constructor)(dependencies)
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("key", &self.key)
            .field("provider", &self.provider.full_name())
            .field("dependencies", &self.dependencies)
            .field("stereotypes", &self.stereotypes)
            .field("constructor", &"<function>")
            .finish()
    }
}

impl fmt::Display for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.component_name(), self.provider.full_name())
    }
}

/// 组件描述符构建器
pub struct ComponentDescriptorBuilder<I: ?Sized> {
    key: ComponentKey,
    provider: TypeInfo,
    dependencies: Vec<ComponentKey>,
    stereotypes: Vec<Stereotype>,
    _capability: PhantomData<fn() -> Arc<I>>,
}

impl<I> ComponentDescriptorBuilder<I>
where
    I: ?Sized + Send + Sync + 'static,
{
    /// 设置显式名称
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.key = self.key.with_qualifier(name);
        self
    }

    /// 覆盖提供者类型信息
    ///
    /// 由配置类型中的装配方法产出的组件，以配置类型作为提供者。
    pub fn provided_by(mut self, provider: TypeInfo) -> Self {
        self.provider = provider;
        self
    }

    /// 声明对能力 `D` 的依赖
    pub fn depends_on<D: ?Sized + 'static>(self) -> Self {
        self.depends_on_key(ComponentKey::of::<D>())
    }

    /// 声明对指定名称的 `D` 的依赖
    pub fn depends_on_named<D: ?Sized + 'static>(self, name: impl Into<String>) -> Self {
        self.depends_on_key(ComponentKey::named::<D>(name))
    }

    /// 声明依赖
    pub fn depends_on_key(mut self, key: ComponentKey) -> Self {
        self.dependencies.push(key);
        self
    }

    /// 添加构造型
    pub fn stereotype(mut self, stereotype: Stereotype) -> Self {
        if !self.stereotypes.contains(&stereotype) {
            self.stereotypes.push(stereotype);
        }
        self
    }

    /// 设置构造函数并完成构建
    pub fn construct_with<F>(self, constructor: F) -> ComponentDescriptor
    where
        F: Fn(&ResolvedDependencies) -> Result<Arc<I>, DependencyError> + Send + Sync + 'static,
    {
        ComponentDescriptor {
            key: self.key,
            provider: self.provider,
            dependencies: self.dependencies,
            stereotypes: self.stereotypes,
            constructor: Arc::new(move |dependencies: &ResolvedDependencies| {
                constructor(dependencies).map(Instance::new)
            }),
        }
    }

    /// 使用现成的实例完成构建
    pub fn from_instance(self, instance: Arc<I>) -> ComponentDescriptor {
        self.construct_with(move |_| Ok(Arc::clone(&instance)))
    }
}
