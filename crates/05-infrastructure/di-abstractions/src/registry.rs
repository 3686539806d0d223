//! 组件注册表抽象接口

use crate::container::ContainerStats;
use crate::resolver::{ComponentResolver, ResolveContext};
use core_common::{Capability, ComponentDescriptor, ComponentKey, DependencyError, Instance};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// 组件注册表 trait
///
/// 持有类型表和单例缓存。注册阶段单线程写入，`close_registration` 之后只读，
/// 只有 `get_or_create` 会写入实例缓存。
pub trait ComponentRegistry: Send + Sync {
    /// 注册组件描述符，不会构造任何实例
    fn register(&self, descriptor: ComponentDescriptor) -> Result<(), DependencyError>;

    /// 关闭注册阶段
    fn close_registration(&self) -> Result<(), DependencyError>;

    /// 注册阶段是否已关闭
    fn is_registration_closed(&self) -> bool;

    /// 检查组件是否已注册
    fn is_registered(&self, key: &ComponentKey) -> bool;

    /// 查找组件键对应的唯一提供者
    fn lookup(
        &self,
        key: &ComponentKey,
        context: &ResolveContext,
    ) -> Result<Arc<ComponentDescriptor>, DependencyError>;

    /// 查找某个能力的所有提供者，按注册顺序
    fn lookup_all(&self, capability: Capability) -> Vec<Arc<ComponentDescriptor>>;

    /// 获取缓存的实例，不存在时调用解析器构造并缓存
    fn get_or_create(
        &self,
        key: &ComponentKey,
        resolver: &dyn ComponentResolver,
        context: &mut ResolveContext,
    ) -> Result<Instance, DependencyError>;

    /// 获取所有已注册组件的摘要
    fn registered_components(&self) -> Vec<ComponentSummary>;

    /// 静态验证依赖关系（缺失依赖、歧义、循环依赖）
    fn validate(&self) -> Result<(), Vec<DependencyError>>;

    /// 统计信息
    fn stats(&self) -> ContainerStats;
}

/// 已注册组件摘要
#[derive(Debug, Clone)]
pub struct ComponentSummary {
    /// 组件键
    pub key: ComponentKey,
    /// 组件名称
    pub name: String,
    /// 提供者完整类型名
    pub provider: String,
    /// 依赖列表
    pub dependencies: Vec<ComponentKey>,
    /// 是否已创建实例
    pub instantiated: bool,
}

/// 依赖图节点
#[derive(Debug, Clone)]
pub struct DependencyGraphNode {
    /// 节点编号
    pub id: usize,
    /// 组件名称
    pub name: String,
    /// 依赖的节点编号
    pub dependencies: Vec<usize>,
}

/// 循环依赖检测器
pub trait CircularDependencyDetector: Send + Sync {
    /// 检测循环依赖，返回发现的所有环
    fn detect_circular_dependencies(&self, graph: &[DependencyGraphNode]) -> Vec<DependencyError>;
}

/// 默认循环依赖检测器
#[derive(Debug, Default)]
pub struct DefaultCircularDependencyDetector;

impl CircularDependencyDetector for DefaultCircularDependencyDetector {
    fn detect_circular_dependencies(&self, graph: &[DependencyGraphNode]) -> Vec<DependencyError> {
        // 使用深度优先搜索检测循环依赖
        let mut visited = HashSet::new();
        let mut visiting = Vec::new();
        let mut cycles = Vec::new();

        for node in graph {
            if !visited.contains(&node.id) {
                self.dfs_check(node.id, graph, &mut visited, &mut visiting, &mut cycles);
            }
        }

        debug!("循环依赖检测完成: {} 个节点, {} 个环", graph.len(), cycles.len());
        cycles
    }
}

impl DefaultCircularDependencyDetector {
    fn dfs_check(
        &self,
        current: usize,
        graph: &[DependencyGraphNode],
        visited: &mut HashSet<usize>,
        visiting: &mut Vec<usize>,
        cycles: &mut Vec<DependencyError>,
    ) {
        if let Some(start) = visiting.iter().position(|id| *id == current) {
            let chain = visiting[start..]
                .iter()
                .chain(std::iter::once(&current))
                .map(|id| node_name(graph, *id))
                .collect();
            cycles.push(DependencyError::CircularDependency { chain });
            return;
        }

        if visited.contains(&current) {
            return;
        }

        visiting.push(current);

        if let Some(node) = graph.iter().find(|n| n.id == current) {
            for dep in &node.dependencies {
                self.dfs_check(*dep, graph, visited, visiting, cycles);
            }
        }

        visiting.pop();
        visited.insert(current);
    }
}

fn node_name(graph: &[DependencyGraphNode], id: usize) -> String {
    graph
        .iter()
        .find(|n| n.id == id)
        .map_or_else(|| format!("#{id}"), |n| n.name.clone())
}
