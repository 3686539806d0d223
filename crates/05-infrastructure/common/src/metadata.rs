//! 元数据定义
//!
//! 提供能力键、组件键和类型信息

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 类型名称（不含模块路径）
    pub name: String,
    /// 类型ID
    pub id: TypeId,
    /// 模块路径
    pub module_path: String,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        let (module_path, name) = split_type_name(std::any::type_name::<T>());
        Self {
            name: name.to_string(),
            id: TypeId::of::<T>(),
            module_path: module_path.to_string(),
        }
    }

    /// 获取完整类型名称
    pub fn full_name(&self) -> String {
        if self.module_path.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.module_path, self.name)
        }
    }

    /// 默认组件名称
    ///
    /// 类型名首字母小写，`MemberServiceImpl` -> `memberServiceImpl`；
    /// 前两个字母都是大写时保持原样（`URLParser` -> `URLParser`）。
    pub fn default_component_name(&self) -> String {
        let mut chars = self.name.chars();
        match (chars.next(), chars.next()) {
            (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => {
                self.name.clone()
            }
            (Some(first), _) => {
                let mut name: String = first.to_lowercase().collect();
                name.push_str(&self.name[first.len_utf8()..]);
                name
            }
            (None, _) => String::new(),
        }
    }

    /// 是否位于指定模块路径之下（空路径匹配所有类型）
    pub fn is_under(&self, base_path: &str) -> bool {
        let base_path = base_path.trim_end_matches("::");
        base_path.is_empty()
            || self.module_path == base_path
            || self
                .module_path
                .strip_prefix(base_path)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

/// 拆分完整类型名为 (模块路径, 类型名)，泛型参数里的路径不参与拆分
fn split_type_name(full: &str) -> (&str, &str) {
    let head_len = full.find('<').unwrap_or(full.len());
    match full[..head_len].rfind("::") {
        Some(idx) => (&full[..idx], &full[idx + 2..]),
        None => ("", full),
    }
}

/// 能力键
///
/// 标识提供者所满足的抽象（通常是 `dyn Trait`），按 `TypeId` 比较。
#[derive(Clone, Copy)]
pub struct Capability {
    id: TypeId,
    type_name: &'static str,
}

impl Capability {
    /// 获取指定类型的能力键
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// 类型ID
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// 完整类型名称
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 简短类型名称
    pub fn short_name(&self) -> &'static str {
        split_type_name(self.type_name).1.trim_start_matches("dyn ")
    }
}

impl PartialEq for Capability {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Capability {}

impl Hash for Capability {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Capability").field(&self.type_name).finish()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// 组件键
///
/// 能力键加上可选的限定名，限定名用于在多个提供者之间消歧。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentKey {
    capability: Capability,
    qualifier: Option<String>,
}

impl ComponentKey {
    /// 创建组件键
    pub fn new(capability: Capability, qualifier: Option<String>) -> Self {
        Self {
            capability,
            qualifier,
        }
    }

    /// 未限定的组件键
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(Capability::of::<T>(), None)
    }

    /// 带限定名的组件键
    pub fn named<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::new(Capability::of::<T>(), Some(name.into()))
    }

    /// 设置限定名
    pub fn with_qualifier(mut self, name: impl Into<String>) -> Self {
        self.qualifier = Some(name.into());
        self
    }

    /// 能力键
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// 限定名
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(name) => write!(f, "{}[{}]", self.capability, name),
            None => write!(f, "{}", self.capability),
        }
    }
}
