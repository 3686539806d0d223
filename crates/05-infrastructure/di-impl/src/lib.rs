//! # 依赖注入具体实现
//!
//! 提供具体的组件注册表、解析器和类型化容器实现
//!
//! - [`ComponentRegistryImpl`] - 类型表 + 每个提供者一个单次初始化的实例槽
//! - [`DefaultResolver`] - 递归解析构造函数依赖
//! - [`DiContainer`] / [`DiContainerBuilder`] - 面向应用代码的类型化入口

mod container;
mod registry;
mod resolver;

pub use container::{DiContainer, DiContainerBuilder};
pub use registry::ComponentRegistryImpl;
pub use resolver::DefaultResolver;
