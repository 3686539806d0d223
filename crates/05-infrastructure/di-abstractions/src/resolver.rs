//! 组件解析器抽象接口
//!
//! 提供依赖解析和组件实例化的能力

use core_common::{ComponentKey, DependencyError, Instance};
use std::ops::{Deref, DerefMut};

/// 解析链为空时的请求方名称
pub const ROOT_REQUESTER: &str = "<application>";

/// 组件解析器 trait
///
/// 负责递归满足提供者声明的依赖并构造实例
pub trait ComponentResolver: Send + Sync {
    /// 解析指定组件，构造一个新实例交给注册表缓存
    fn resolve(&self, key: &ComponentKey, context: &mut ResolveContext) -> Result<Instance, DependencyError>;
}

/// 解析上下文
///
/// 记录当前调用栈上正在解析的组件，用于检测循环依赖。
/// 每次顶层解析创建一个，返回时丢弃。
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// 当前解析链
    resolution_chain: Vec<ComponentKey>,
    /// 最大递归深度
    max_depth: usize,
}

impl ResolveContext {
    /// 默认最大递归深度
    pub const DEFAULT_MAX_DEPTH: usize = 100;

    /// 创建新的解析上下文
    pub fn new() -> Self {
        Self::with_max_depth(Self::DEFAULT_MAX_DEPTH)
    }

    /// 指定最大深度创建解析上下文
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            resolution_chain: Vec::new(),
            max_depth,
        }
    }

    /// 当前解析链
    pub fn chain(&self) -> &[ComponentKey] {
        &self.resolution_chain
    }

    /// 当前深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    /// 是否正在解析指定组件
    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.resolution_chain.contains(key)
    }

    /// 当前请求方
    pub fn requester(&self) -> String {
        self.resolution_chain
            .last()
            .map_or_else(|| ROOT_REQUESTER.to_string(), ToString::to_string)
    }

    /// 检查能否进入指定组件
    pub fn check(&self, key: &ComponentKey) -> Result<(), DependencyError> {
        if let Some(start) = self.resolution_chain.iter().position(|k| k == key) {
            let chain = self.resolution_chain[start..]
                .iter()
                .chain(std::iter::once(key))
                .map(ToString::to_string)
                .collect();
            return Err(DependencyError::CircularDependency { chain });
        }

        if self.resolution_chain.len() >= self.max_depth {
            return Err(DependencyError::ResolutionDepthExceeded {
                key: key.to_string(),
                max_depth: self.max_depth,
            });
        }

        Ok(())
    }

    /// 进入指定组件的解析
    ///
    /// 返回的守卫在离开作用域时（包括出错返回）把组件移出解析链。
    pub fn enter(&mut self, key: ComponentKey) -> Result<ResolveGuard<'_>, DependencyError> {
        self.check(&key)?;
        self.resolution_chain.push(key);
        Ok(ResolveGuard { context: self })
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 解析链守卫
#[derive(Debug)]
pub struct ResolveGuard<'a> {
    context: &'a mut ResolveContext,
}

impl Deref for ResolveGuard<'_> {
    type Target = ResolveContext;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for ResolveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl Drop for ResolveGuard<'_> {
    fn drop(&mut self) {
        self.context.resolution_chain.pop();
    }
}
