//! 组件宏实现
//!
//! `#[component]` 标注在固有 `impl` 块上，读取其中的构造函数签名，
//! 生成一个程序启动时把组件描述符提交到候选目录的函数。

use crate::utils::{arc_inner_type, candidate_fn_ident, returns_result, type_ident};
use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;
use syn::{Attribute, Error, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr, Result, Token, Type};

/// 组件宏参数
#[derive(Default)]
pub struct ComponentArgs {
    /// 满足的能力，缺省为实现类型本身
    pub provides: Option<Type>,
    /// 组件名称
    pub name: Option<LitStr>,
    /// 构造型
    pub stereotype: Option<Ident>,
    /// 构造函数名称，缺省为 `new`
    pub constructor: Option<Ident>,
}

impl Parse for ComponentArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut args = ComponentArgs::default();

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            if key == "provides" {
                args.provides = Some(input.parse()?);
            } else if key == "name" {
                args.name = Some(input.parse()?);
            } else if key == "stereotype" {
                args.stereotype = Some(input.parse()?);
            } else if key == "constructor" {
                args.constructor = Some(input.parse()?);
            } else {
                return Err(Error::new(
                    key.span(),
                    format!("未知的组件参数 `{key}`, 可用参数: provides, name, stereotype, constructor"),
                ));
            }

            if input.is_empty() {
                break;
            }
            input.parse::<Token![,]>()?;
        }

        Ok(args)
    }
}

impl ComponentArgs {
    fn stereotype_variant(&self) -> Result<TokenStream> {
        let Some(stereotype) = &self.stereotype else {
            return Ok(quote!(::core_common::Stereotype::Component));
        };

        let variant = match stereotype.to_string().as_str() {
            "component" => quote!(Component),
            "service" => quote!(Service),
            "repository" => quote!(Repository),
            "configuration" => quote!(Configuration),
            other => {
                return Err(Error::new(
                    stereotype.span(),
                    format!("未知的构造型 `{other}`, 可用: component, service, repository, configuration"),
                ))
            }
        };
        Ok(quote!(::core_common::Stereotype::#variant))
    }
}

/// 构造函数参数
struct Dependency {
    ty: Type,
    qualifier: Option<LitStr>,
}

/// 展开 `#[component]`
pub fn expand(args: ComponentArgs, mut item: ItemImpl) -> Result<TokenStream> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(Error::new(
            path.span(),
            "#[component] 只能用于固有 impl 块, 请把构造函数放在 `impl Type { .. }` 中",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(Error::new(item.generics.span(), "#[component] 不支持泛型类型"));
    }

    let self_ty = (*item.self_ty).clone();
    let type_name = type_ident(&self_ty)
        .map(ToString::to_string)
        .ok_or_else(|| Error::new(self_ty.span(), "#[component] 需要具名的实现类型"))?;

    let constructor_name = args
        .constructor
        .clone()
        .unwrap_or_else(|| Ident::new("new", proc_macro2::Span::call_site()));

    let constructor = find_constructor(&mut item, &constructor_name)?;
    let dependencies = collect_dependencies(constructor)?;
    let fallible = returns_result(&constructor.sig.output);

    let capability = args.provides.clone().unwrap_or_else(|| self_ty.clone());
    let stereotype = args.stereotype_variant()?;
    let named = args.name.as_ref().map(|name| quote!(.named(#name)));

    let declarations = dependencies.iter().map(|dependency| {
        let ty = &dependency.ty;
        match &dependency.qualifier {
            Some(name) => quote!(.depends_on_named::<#ty>(#name)),
            None => quote!(.depends_on::<#ty>()),
        }
    });

    let arguments = dependencies.iter().enumerate().map(|(index, dependency)| {
        let ty = &dependency.ty;
        quote!(dependencies.get::<#ty>(#index)?)
    });

    let construct = if fallible {
        quote! {
            <#self_ty>::#constructor_name(#(#arguments),*).map_err(|e| {
                ::core_common::DependencyError::creation_failed(#type_name, e)
            })?
        }
    } else {
        quote!(<#self_ty>::#constructor_name(#(#arguments),*))
    };

    let register_fn = candidate_fn_ident(&type_name, &constructor_name);

    Ok(quote! {
        #item

        #[::ctor::ctor]
        fn #register_fn() {
            ::core_common::catalog::submit_candidate(|| {
                ::core_common::ComponentDescriptor::builder::<#capability, #self_ty>()
                    #named
                    .stereotype(#stereotype)
                    #(#declarations)*
                    .construct_with(|dependencies| {
                        let component: ::std::sync::Arc<#capability> =
                            ::std::sync::Arc::new(#construct);
                        ::std::result::Result::Ok(component)
                    })
            });
        }
    })
}

fn find_constructor<'a>(item: &'a mut ItemImpl, name: &Ident) -> Result<&'a mut ImplItemFn> {
    let span = item.self_ty.span();
    item.items
        .iter_mut()
        .find_map(|impl_item| match impl_item {
            ImplItem::Fn(method) if method.sig.ident == *name => Some(method),
            _ => None,
        })
        .ok_or_else(|| Error::new(span, format!("impl 块中未找到构造函数 `{name}`")))
}

/// 读取构造函数参数，并移除参数上的 `#[qualifier(..)]` 属性
fn collect_dependencies(constructor: &mut ImplItemFn) -> Result<Vec<Dependency>> {
    let mut dependencies = Vec::new();

    for input in constructor.sig.inputs.iter_mut() {
        let arg = match input {
            FnArg::Typed(arg) => arg,
            FnArg::Receiver(receiver) => {
                return Err(Error::new(receiver.span(), "构造函数不能带 self 参数"))
            }
        };

        let qualifier = take_qualifier(&mut arg.attrs)?;
        let ty = arc_inner_type(&arg.ty).cloned().ok_or_else(|| {
            Error::new(arg.ty.span(), "构造函数参数必须是 `Arc<T>`, 依赖由容器注入")
        })?;

        dependencies.push(Dependency { ty, qualifier });
    }

    Ok(dependencies)
}

fn take_qualifier(attrs: &mut Vec<Attribute>) -> Result<Option<LitStr>> {
    let mut qualifier = None;
    let mut error = None;

    attrs.retain(|attr| {
        if !attr.path().is_ident("qualifier") {
            return true;
        }
        match attr.parse_args::<LitStr>() {
            Ok(name) => qualifier = Some(name),
            Err(e) => error = Some(e),
        }
        false
    });

    match error {
        Some(e) => Err(e),
        None => Ok(qualifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand_to_string(args: TokenStream, item: ItemImpl) -> Result<String> {
        let args: ComponentArgs = syn::parse2(args)?;
        expand(args, item).map(|tokens| tokens.to_string())
    }

    #[test]
    fn test_parse_all_args() {
        let args: ComponentArgs = syn::parse2(quote!(
            provides = dyn MemberService,
            name = "memberService",
            stereotype = service,
            constructor = create,
        ))
        .unwrap();

        assert!(args.provides.is_some());
        assert_eq!(args.name.unwrap().value(), "memberService");
        assert_eq!(args.stereotype.unwrap(), "service");
        assert_eq!(args.constructor.unwrap(), "create");
    }

    #[test]
    fn test_unknown_arg_is_rejected() {
        let error = syn::parse2::<ComponentArgs>(quote!(scope = prototype)).err().unwrap();
        assert!(error.to_string().contains("scope"));
    }

    #[test]
    fn test_expand_declares_dependencies_in_order() {
        let item: ItemImpl = parse_quote! {
            impl MemberServiceImpl {
                pub fn new(
                    repository: Arc<dyn MemberRepository>,
                    #[qualifier("auditLog")] audit: Arc<dyn AuditLog>,
                ) -> Self {
                    Self { repository, audit }
                }
            }
        };

        let expanded = expand_to_string(quote!(provides = dyn MemberService, stereotype = service), item).unwrap();

        let repository = expanded.find("depends_on :: < dyn MemberRepository >").unwrap();
        let audit = expanded.find("depends_on_named :: < dyn AuditLog > (\"auditLog\")").unwrap();
        assert!(repository < audit);
        assert!(expanded.contains("Stereotype :: Service"));
        assert!(expanded.contains("submit_candidate"));
        assert!(!expanded.contains("# [qualifier"));
    }

    #[test]
    fn test_fallible_constructor_maps_error() {
        let item: ItemImpl = parse_quote! {
            impl FileRepository {
                fn open() -> Result<Self, std::io::Error> {
                    Ok(Self)
                }
            }
        };

        let expanded = expand_to_string(quote!(constructor = open), item).unwrap();
        assert!(expanded.contains("creation_failed"));
        assert!(expanded.contains("builder :: < FileRepository , FileRepository >"));
    }

    #[test]
    fn test_non_arc_parameter_is_rejected() {
        let item: ItemImpl = parse_quote! {
            impl Greeter {
                fn new(prefix: String) -> Self {
                    Self { prefix }
                }
            }
        };

        let error = expand_to_string(TokenStream::new(), item).unwrap_err();
        assert!(error.to_string().contains("Arc<T>"));
    }

    #[test]
    fn test_missing_constructor_is_rejected() {
        let item: ItemImpl = parse_quote! {
            impl Greeter {
                fn greet(&self) {}
            }
        };

        let error = expand_to_string(TokenStream::new(), item).unwrap_err();
        assert!(error.to_string().contains("new"));
    }

    #[test]
    fn test_unknown_stereotype_is_rejected() {
        let item: ItemImpl = parse_quote! {
            impl Greeter {
                fn new() -> Self {
                    Self
                }
            }
        };

        let error = expand_to_string(quote!(stereotype = bean), item).unwrap_err();
        assert!(error.to_string().contains("bean"));
    }
}
