//! 候选组件目录
//!
//! `#[component]` 宏生成的启动函数会把描述符工厂写入这里，
//! 扫描器再从目录中读取候选组件。目录只保存类型元数据，不保存实例。

use crate::component::ComponentDescriptor;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

/// 候选描述符工厂
pub type CandidateFactory = fn() -> ComponentDescriptor;

static CANDIDATES: Lazy<RwLock<Vec<CandidateFactory>>> = Lazy::new(|| RwLock::new(Vec::new()));

/// 提交候选组件
pub fn submit_candidate(factory: CandidateFactory) {
    CANDIDATES.write().push(factory);
}

/// 获取所有候选组件描述符
pub fn candidates() -> Vec<ComponentDescriptor> {
    let factories = CANDIDATES.read();
    let descriptors: Vec<ComponentDescriptor> = factories.iter().map(|factory| factory()).collect();
    debug!("候选组件目录中共有 {} 个描述符", descriptors.len());
    descriptors
}

/// 候选组件数量
pub fn candidate_count() -> usize {
    CANDIDATES.read().len()
}
