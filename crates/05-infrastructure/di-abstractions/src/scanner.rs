//! 组件扫描器抽象接口
//!
//! 从候选描述符中挑选出扫描路径下、且未被排除的组件

use core_common::{ComponentDescriptor, ComponentError};
use std::fmt;

/// 组件扫描器 trait
pub trait ComponentScanner: Send + Sync {
    /// 从候选描述符中扫描组件
    fn scan(&self, candidates: Vec<ComponentDescriptor>) -> Result<Vec<ComponentDescriptor>, ComponentError>;

    /// 获取扫描器名称
    fn name(&self) -> &str;

    /// 扫描的基础路径
    fn base_path(&self) -> &str;
}

/// 组件过滤器
///
/// 扫描器用作排除条件：匹配的组件会被排除
pub trait ComponentFilter: Send + Sync {
    /// 是否匹配指定组件
    fn matches(&self, descriptor: &ComponentDescriptor) -> bool;

    /// 过滤器描述，用于日志
    fn describe(&self) -> String {
        "custom".to_string()
    }
}

impl<F> ComponentFilter for F
where
    F: Fn(&ComponentDescriptor) -> bool + Send + Sync,
{
    fn matches(&self, descriptor: &ComponentDescriptor) -> bool {
        self(descriptor)
    }
}

impl fmt::Debug for dyn ComponentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentFilter").field(&self.describe()).finish()
    }
}
