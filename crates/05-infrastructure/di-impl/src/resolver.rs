//! 依赖解析器实现

use core_common::{ComponentKey, DependencyError, Instance, ResolvedDependencies};
use di_abstractions::{ComponentRegistry, ComponentResolver, ResolveContext};
use tracing::debug;

/// 默认组件解析器
///
/// 按声明顺序逐个解析依赖（依赖同样经过注册表的单例缓存），全部就绪后调用构造函数。
/// 任一依赖失败时不会调用构造函数。
pub struct DefaultResolver<'r, R: ComponentRegistry + ?Sized> {
    registry: &'r R,
}

impl<'r, R: ComponentRegistry + ?Sized> DefaultResolver<'r, R> {
    /// 创建解析器
    pub fn new(registry: &'r R) -> Self {
        Self { registry }
    }
}

impl<R: ComponentRegistry + ?Sized> ComponentResolver for DefaultResolver<'_, R> {
    fn resolve(&self, key: &ComponentKey, context: &mut ResolveContext) -> Result<Instance, DependencyError> {
        let descriptor = self.registry.lookup(key, context)?;
        let mut scope = context.enter(key.clone())?;

        debug!("解析组件: {} (深度 {})", key, scope.depth());

        let mut entries = Vec::with_capacity(descriptor.dependencies().len());
        for dependency in descriptor.dependencies() {
            let instance = self.registry.get_or_create(dependency, self, &mut scope)?;
            entries.push((dependency.clone(), instance));
        }

        descriptor.construct(&ResolvedDependencies::new(key.clone(), entries))
    }
}
