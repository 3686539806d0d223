//! 手动装配
//!
//! 配置类型用具名的装配方法直接构造对象图，每次调用都会创建新的实例。
//! 装配方法也可以导出为带 `Configuration` 构造型的组件描述符交给容器管理，
//! 此时由容器负责单例缓存，装配方法用到的其他装配方法同样从容器中取得。

use core_common::{
    Capability, ComponentDescriptor, ComponentError, ComponentKey, ComponentResult, DependencyError,
    DependencyResult, Instance, ResolvedDependencies, Stereotype, TypeInfo,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 装配方法
type Recipe = Arc<dyn Fn(&RecipeContext<'_>) -> DependencyResult<Instance> + Send + Sync>;

/// 装配方法导出为描述符
type Export = Arc<dyn Fn(Arc<ManualWiring>, Vec<ComponentKey>) -> ComponentDescriptor + Send + Sync>;

struct RecipeEntry {
    capability: Capability,
    /// 用到的其他装配方法
    uses: Vec<String>,
    recipe: Recipe,
    export: Export,
}

/// 依赖来源
enum Source<'a> {
    /// 直接调用，依赖同样现场构造
    Manual { parent: Option<&'a RecipeContext<'a>> },
    /// 由容器调用，依赖是容器中已解析的单例
    Container(&'a ResolvedDependencies),
}

/// 装配方法执行上下文
///
/// 装配方法只能通过上下文取得声明过的其他装配方法的产物。
pub struct RecipeContext<'a> {
    wiring: &'a ManualWiring,
    key: ComponentKey,
    uses: &'a [String],
    source: Source<'a>,
}

impl RecipeContext<'_> {
    /// 当前装配方法对应的组件键
    pub fn key(&self) -> &ComponentKey {
        &self.key
    }

    /// 是否由容器调用
    pub fn is_container_managed(&self) -> bool {
        matches!(self.source, Source::Container(_))
    }

    /// 取得另一个装配方法的产物
    ///
    /// 直接调用时构造新实例；由容器调用时返回容器中的单例。
    pub fn build<I: ?Sized + Send + Sync + 'static>(&self, name: &str) -> DependencyResult<Arc<I>> {
        if !self.uses.iter().any(|used| used == name) {
            return Err(DependencyError::unresolved(
                format!("{}[{}]", Capability::of::<I>(), name),
                &self.key,
            ));
        }

        match &self.source {
            Source::Container(dependencies) => {
                let key = self.wiring.key_of::<I>(name)?;
                dependencies.by_key::<I>(&key)
            }
            Source::Manual { .. } => {
                let key = self.wiring.key_of::<I>(name)?;
                let mut chain = self.chain();
                if chain.contains(&key) {
                    chain.push(key);
                    return Err(DependencyError::CircularDependency {
                        chain: chain.iter().map(ToString::to_string).collect(),
                    });
                }
                self.wiring
                    .invoke::<I>(name, Source::Manual { parent: Some(self) })
            }
        }
    }

    /// 直接调用链，从最外层开始
    fn chain(&self) -> Vec<ComponentKey> {
        let mut chain = vec![self.key.clone()];
        let mut current = self;
        while let Source::Manual { parent: Some(parent) } = &current.source {
            chain.push(parent.key.clone());
            current = *parent;
        }
        chain.reverse();
        chain
    }
}

/// 手动装配配置
pub struct ManualWiring {
    /// 配置类型
    owner: TypeInfo,
    /// 装配方法（按名称）
    recipes: HashMap<String, RecipeEntry>,
    /// 装配方法名称（按声明顺序）
    order: Vec<String>,
}

impl ManualWiring {
    /// 创建属于配置类型 `C` 的手动装配
    pub fn new<C: ?Sized + 'static>() -> Self {
        Self {
            owner: TypeInfo::of::<C>(),
            recipes: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// 配置类型信息
    pub fn owner(&self) -> &TypeInfo {
        &self.owner
    }

    /// 添加不依赖其他装配方法的装配方法
    pub fn recipe<I, F>(self, name: impl Into<String>, recipe: F) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(&RecipeContext<'_>) -> DependencyResult<Arc<I>> + Send + Sync + 'static,
    {
        self.recipe_using(name, &[], recipe)
    }

    /// 添加装配方法，`uses` 列出它会调用的其他装配方法
    ///
    /// 同名方法会被替换。
    pub fn recipe_using<I, F>(mut self, name: impl Into<String>, uses: &[&str], recipe: F) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(&RecipeContext<'_>) -> DependencyResult<Arc<I>> + Send + Sync + 'static,
    {
        let name = name.into();
        let owner = self.owner.clone();
        let export_name = name.clone();

        let entry = RecipeEntry {
            capability: Capability::of::<I>(),
            uses: uses.iter().map(|used| (*used).to_string()).collect(),
            recipe: Arc::new(move |context: &RecipeContext<'_>| recipe(context).map(Instance::new)),
            export: Arc::new(move |wiring: Arc<ManualWiring>, dependencies: Vec<ComponentKey>| {
                let name = export_name.clone();
                dependencies
                    .into_iter()
                    .fold(
                        ComponentDescriptor::builder::<I, I>()
                            .provided_by(owner.clone())
                            .named(name.clone())
                            .stereotype(Stereotype::Configuration),
                        |builder, key| builder.depends_on_key(key),
                    )
                    .construct_with(move |resolved| wiring.invoke::<I>(&name, Source::Container(resolved)))
            }),
        };

        if self.recipes.insert(name.clone(), entry).is_none() {
            self.order.push(name);
        }
        self
    }

    /// 调用装配方法构造新实例
    pub fn build<I: ?Sized + Send + Sync + 'static>(&self, name: &str) -> DependencyResult<Arc<I>> {
        self.invoke::<I>(name, Source::Manual { parent: None })
    }

    /// 是否存在指定装配方法
    pub fn contains(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    /// 装配方法名称，按声明顺序
    pub fn recipe_names(&self) -> &[String] {
        &self.order
    }

    /// 将所有装配方法导出为组件描述符
    ///
    /// 描述符的组件名称为装配方法名称，构造型为 `Configuration`，
    /// 用到的其他装配方法导出为带名称的依赖。
    pub fn into_descriptors(self) -> ComponentResult<Vec<ComponentDescriptor>> {
        let wiring = Arc::new(self);
        let mut descriptors = Vec::with_capacity(wiring.order.len());

        for name in &wiring.order {
            let Some(entry) = wiring.recipes.get(name) else {
                continue;
            };
            let dependencies = entry
                .uses
                .iter()
                .map(|used| {
                    wiring
                        .recipes
                        .get(used)
                        .map(|target| ComponentKey::new(target.capability, Some(used.clone())))
                        .ok_or_else(|| {
                            ComponentError::invalid_metadata(format!(
                                "装配方法 {}.{} 使用了未定义的装配方法 {}",
                                wiring.owner.name, name, used
                            ))
                        })
                })
                .collect::<ComponentResult<Vec<_>>>()?;

            descriptors.push((entry.export)(Arc::clone(&wiring), dependencies));
        }

        Ok(descriptors)
    }

    fn entry<I: ?Sized + 'static>(&self, name: &str) -> DependencyResult<&RecipeEntry> {
        let entry = self.recipes.get(name).ok_or_else(|| {
            DependencyError::unresolved(format!("{}[{}]", Capability::of::<I>(), name), self.owner.full_name())
        })?;

        if entry.capability != Capability::of::<I>() {
            return Err(DependencyError::TypeMismatch {
                key: format!("{}[{}]", entry.capability, name),
                expected: std::any::type_name::<I>(),
            });
        }
        Ok(entry)
    }

    fn key_of<I: ?Sized + 'static>(&self, name: &str) -> DependencyResult<ComponentKey> {
        self.entry::<I>(name)
            .map(|entry| ComponentKey::new(entry.capability, Some(name.to_string())))
    }

    fn invoke<'a, I: ?Sized + Send + Sync + 'static>(
        &'a self,
        name: &str,
        source: Source<'a>,
    ) -> DependencyResult<Arc<I>> {
        let entry = self.entry::<I>(name)?;
        let context = RecipeContext {
            wiring: self,
            key: ComponentKey::new(entry.capability, Some(name.to_string())),
            uses: &entry.uses,
            source,
        };

        debug!(
            "{}装配: {}.{}",
            if context.is_container_managed() { "容器" } else { "手动" },
            self.owner.name,
            name
        );
        let instance = (entry.recipe)(&context)?;
        instance.downcast::<I>().ok_or_else(|| DependencyError::TypeMismatch {
            key: context.key.to_string(),
            expected: std::any::type_name::<I>(),
        })
    }
}

impl fmt::Debug for ManualWiring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualWiring")
            .field("owner", &self.owner.full_name())
            .field("recipes", &self.order)
            .finish()
    }
}
