//! 依赖注入容器配置与统计

use crate::resolver::ResolveContext;
use serde::Deserialize;

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 关闭注册阶段时是否先做完整的静态依赖验证
    pub validate_on_close: bool,
    /// 关闭注册阶段时是否检测静态依赖图中的环
    ///
    /// 跨线程同时首次解析一个环的两端时，运行期检测无法发现，只能提前拒绝。
    pub check_cycles_on_close: bool,
    /// 最大解析深度
    pub max_resolution_depth: usize,
}

impl ContainerConfig {
    /// 按配置创建解析上下文
    pub fn resolve_context(&self) -> ResolveContext {
        ResolveContext::with_max_depth(self.max_resolution_depth)
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            validate_on_close: false,
            check_cycles_on_close: true,
            max_resolution_depth: ResolveContext::DEFAULT_MAX_DEPTH,
        }
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// 已注册组件数量
    pub registered_components: usize,
    /// 活跃单例数量
    pub active_singletons: usize,
    /// 构造函数成功执行次数
    pub constructions: usize,
    /// 解析错误数量
    pub resolution_errors: usize,
}
