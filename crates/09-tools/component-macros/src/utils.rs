//! 宏工具函数

use proc_macro2::Span;
use syn::{GenericArgument, Ident, PathArguments, ReturnType, Type};

/// 取出 `Arc<T>` 中的 `T`
pub fn arc_inner_type(ty: &Type) -> Option<&Type> {
    generic_argument_of(ty, "Arc")
}

/// 构造函数是否返回 `Result`
pub fn returns_result(output: &ReturnType) -> bool {
    match output {
        ReturnType::Type(_, ty) => last_segment_is(ty, "Result"),
        ReturnType::Default => false,
    }
}

/// 从类型中提取最后一个路径段的名称
pub fn type_ident(ty: &Type) -> Option<&Ident> {
    match ty {
        Type::Path(type_path) => type_path.path.segments.last().map(|segment| &segment.ident),
        _ => None,
    }
}

/// 生成候选注册函数名
pub fn candidate_fn_ident(type_name: &str, constructor: &Ident) -> Ident {
    Ident::new(
        &format!(
            "__component_candidate_{}_{}",
            type_name.to_lowercase(),
            constructor
        ),
        Span::call_site(),
    )
}

fn last_segment_is(ty: &Type, name: &str) -> bool {
    type_ident(ty).is_some_and(|ident| ident == name)
}

fn generic_argument_of<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }

    match &segment.arguments {
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first()? {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}
