//! # Core Common
//!
//! 这个 crate 提供了 hello-core 依赖注入容器的公共类型。
//!
//! ## 核心类型
//!
//! - [`Capability`] / [`ComponentKey`] - 能力键与带限定名的组件键
//! - [`ComponentDescriptor`] - 组件描述符（依赖列表 + 构造函数）
//! - [`Instance`] - 类型擦除后的共享实例
//! - [`DependencyError`] / [`ComponentError`] - 错误类型
//! - [`catalog`] - 由 `#[component]` 宏填充的候选组件目录
//!
//! ## 设计原则
//!
//! - 只通过构造函数声明依赖，依赖全部就绪后才构造
//! - 能力键显式映射到提供者，不依赖运行时反射

pub mod catalog;
pub mod component;
pub mod errors;
pub mod metadata;

pub use component::*;
pub use errors::*;
pub use metadata::*;
