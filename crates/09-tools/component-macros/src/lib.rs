//! # Component Macros
//!
//! 这个 crate 提供了生成组件描述符的过程宏。
//!
//! ## 核心宏
//!
//! - [`component`] - 把实现类型登记到候选组件目录
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use component_macros::component;
//! use std::sync::Arc;
//!
//! pub trait MemberRepository: Send + Sync {}
//! pub trait MemberService: Send + Sync {}
//!
//! pub struct MemberServiceImpl {
//!     member_repository: Arc<dyn MemberRepository>,
//! }
//!
//! impl MemberService for MemberServiceImpl {}
//!
//! #[component(provides = dyn MemberService, stereotype = service)]
//! impl MemberServiceImpl {
//!     pub fn new(member_repository: Arc<dyn MemberRepository>) -> Self {
//!         Self { member_repository }
//!     }
//! }
//! ```
//!
//! 生成的代码引用 `core_common` 和 `ctor`，使用方需要依赖这两个 crate。

use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemImpl};

mod component;
mod utils;

/// 组件登记宏
///
/// 标注在固有 `impl` 块上。宏读取构造函数签名，每个 `Arc<T>` 参数声明一个对 `T` 的依赖，
/// 并在程序启动时把组件描述符提交到 `core_common::catalog`，扫描器再从目录中挑选组件。
///
/// # 参数
///
/// - `provides = Type` - 满足的能力，通常是 `dyn Trait`（默认为实现类型本身）
/// - `name = "customName"` - 组件名称（默认为类型名首字母小写）
/// - `stereotype = service` - 构造型：`component`（默认）、`service`、`repository`、`configuration`
/// - `constructor = ident` - 构造函数名称（默认为 `new`）
///
/// 构造函数可以返回 `Self` 或 `Result<Self, E>`。参数上的 `#[qualifier("name")]`
/// 指定按名称注入。
///
/// # 示例
///
/// ```rust,ignore
/// #[component(provides = dyn MemberRepository, stereotype = repository)]
/// impl MemoryMemberRepository {
///     pub fn new() -> Self {
///         Self::default()
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn component(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args as component::ComponentArgs);
    let item = parse_macro_input!(input as ItemImpl);

    component::expand(args, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
