//! # 组合层
//!
//! 把组件来源组合成一个可用的容器。
//!
//! ## 主要功能
//!
//! - **组件扫描**: 按基础模块路径和排除过滤器挑选候选组件并注册
//! - **手动装配**: 配置类型中的具名装配方法，每次调用构造新实例
//! - **启动配置**: 从 TOML 文件加载容器配置和扫描配置
//! - **容器启动**: 注册、扫描、关闭注册阶段、验证
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use core_composition::{BootstrapConfig, ContextBootstrapper};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BootstrapConfig::from_file("hello-core.toml")?;
//!     let container = ContextBootstrapper::new(config).bootstrap()?;
//!
//!     println!("已注册组件: {:?}", container.component_names());
//!     Ok(())
//! }
//! ```

pub mod bootstrapper;
pub mod component_scanner;
pub mod config;
pub mod manual_wiring;

// 重新导出主要类型
pub use bootstrapper::{CandidateSource, ContextBootstrapper};
pub use component_scanner::{ComponentScannerImpl, NameFilter, StereotypeFilter};
pub use config::{BootstrapConfig, ScanConfig};
pub use manual_wiring::{ManualWiring, RecipeContext};
