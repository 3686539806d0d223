//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组件注册和依赖解析的核心接口。
//!
//! ## 核心接口
//!
//! - [`ComponentRegistry`] - 组件注册表接口（类型表 + 单例缓存）
//! - [`ComponentResolver`] - 依赖解析器接口
//! - [`ComponentScanner`] - 组件扫描器接口
//! - [`ResolveContext`] - 单次解析的循环依赖守卫

pub mod container;
pub mod registry;
pub mod resolver;
pub mod scanner;

pub use container::*;
pub use registry::*;
pub use resolver::*;
pub use scanner::*;
