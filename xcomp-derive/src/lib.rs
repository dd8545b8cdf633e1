//! Derive macro for xcomp field injection
//!
//! `#[derive(Inject)]` generates an `xcomp::Inject` implementation from
//! `#[inject("ServiceName")]` field annotations.
//!
//! # Example
//!
//! ```rust,ignore
//! use xcomp::{Inject, Registry};
//! use std::sync::Arc;
//!
//! #[derive(Default, Inject)]
//! struct CustomerController {
//!     #[inject("CustomerService")]
//!     service: Option<Arc<dyn CustomerService>>,
//!     #[inject(name = "Logger")]
//!     logger: Option<Arc<dyn Logger>>,
//!     // Not annotated: never touched by injection
//!     requests_served: u64,
//! }
//!
//! let controller: CustomerController = registry.autowire()?;
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Type, parse_macro_input};

/// Derive macro for name-based field injection.
///
/// # Attributes
///
/// - `#[inject("Name")]` or `#[inject(name = "Name")]` - wire this field from
///   the service registered under `Name`.
///
/// Annotated fields must have type `Arc<T>` or `Option<Arc<T>>`; `T` may be a
/// concrete type or a `dyn Trait`. Unannotated fields are left as they are.
///
/// # Generated Code
///
/// ```rust,ignore
/// impl xcomp::Inject for CustomerController {
///     fn injection_points() -> Vec<xcomp::InjectionPoint> { /* one per annotated field */ }
///
///     fn inject(&mut self, registry: &xcomp::Registry) -> xcomp::Result<()> {
///         self.service = Some(registry.resolve_field::<dyn CustomerService>("CustomerService", "service")?);
///         self.logger = Some(registry.resolve_field::<dyn Logger>("Logger", "logger")?);
///         Ok(())
///     }
/// }
/// ```
#[proc_macro_derive(Inject, attributes(inject))]
pub fn derive_inject(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_inject(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_inject(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // Only support structs with named fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Inject can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Inject can only be derived for structs",
            ));
        }
    };

    let mut points = Vec::new();
    let mut assignments = Vec::new();

    for field in fields {
        let Some(service) = find_inject_attr(&field.attrs)? else {
            continue;
        };

        // Named fields always carry an ident
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = field_ident.unraw().to_string();

        let (inner, optional) = match field_shape(&field.ty) {
            Some(shape) => shape,
            None => {
                return Err(syn::Error::new_spanned(
                    &field.ty,
                    "Fields marked with #[inject] must have type Arc<T> or Option<Arc<T>>",
                ));
            }
        };

        points.push(quote! {
            ::xcomp::InjectionPoint {
                field: #field_name,
                service: #service,
                expected: ::std::any::type_name::<#inner>(),
            }
        });

        let resolve = quote! {
            registry.resolve_field::<#inner>(#service, #field_name)?
        };
        assignments.push(if optional {
            quote! { self.#field_ident = ::std::option::Option::Some(#resolve); }
        } else {
            quote! { self.#field_ident = #resolve; }
        });
    }

    Ok(quote! {
        impl #impl_generics ::xcomp::Inject for #name #ty_generics #where_clause {
            fn injection_points() -> ::std::vec::Vec<::xcomp::InjectionPoint> {
                ::std::vec![#(#points),*]
            }

            #[allow(unused_variables)]
            fn inject(&mut self, registry: &::xcomp::Registry) -> ::xcomp::Result<()> {
                #(#assignments)*
                ::std::result::Result::Ok(())
            }
        }
    })
}

/// Find the #[inject] attribute and return its service name
fn find_inject_attr(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("inject")) else {
        return Ok(None);
    };

    if attr.meta.require_path_only().is_ok() {
        return Err(syn::Error::new_spanned(
            attr,
            "#[inject] requires a service name, e.g. #[inject(\"Logger\")]",
        ));
    }

    // #[inject("Name")]
    let service = match attr.parse_args::<LitStr>() {
        Ok(service) => service,
        // #[inject(name = "Name")]
        Err(_) => {
            let mut service = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    service = Some(meta.value()?.parse::<LitStr>()?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported inject argument, expected `name = \"...\"`"))
                }
            })?;
            service.ok_or_else(|| syn::Error::new_spanned(attr, "missing service name"))?
        }
    };

    if service.value().is_empty() {
        return Err(syn::Error::new_spanned(
            &service,
            "service name must not be empty",
        ));
    }

    Ok(Some(service))
}

/// `Arc<T>` -> `(T, false)`, `Option<Arc<T>>` -> `(T, true)`
fn field_shape(ty: &Type) -> Option<(&Type, bool)> {
    if let Some(inner) = extract_arc_inner_type(ty) {
        return Some((inner, false));
    }
    let inner = single_generic_arg(ty, "Option")?;
    extract_arc_inner_type(inner).map(|inner| (inner, true))
}

/// Extract T from Arc<T>
fn extract_arc_inner_type(ty: &Type) -> Option<&Type> {
    single_generic_arg(ty, "Arc")
}

/// Extract T from Wrapper<T> where the last path segment is `wrapper`
fn single_generic_arg<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_field_shapes() {
        let arc: Type = parse_quote!(std::sync::Arc<Database>);
        let opt: Type = parse_quote!(Option<Arc<dyn Logger>>);
        let plain: Type = parse_quote!(u64);
        let boxed: Type = parse_quote!(Option<Box<Database>>);

        assert!(matches!(field_shape(&arc), Some((_, false))));
        assert!(matches!(field_shape(&opt), Some((_, true))));
        assert!(field_shape(&plain).is_none());
        assert!(field_shape(&boxed).is_none());
    }

    #[test]
    fn test_attr_forms() {
        let positional: Attribute = parse_quote!(#[inject("Logger")]);
        let named: Attribute = parse_quote!(#[inject(name = "Logger")]);
        let bare: Attribute = parse_quote!(#[inject]);
        let empty: Attribute = parse_quote!(#[inject("")]);

        assert_eq!(find_inject_attr(&[positional]).unwrap().unwrap().value(), "Logger");
        assert_eq!(find_inject_attr(&[named]).unwrap().unwrap().value(), "Logger");
        assert!(find_inject_attr(&[bare]).is_err());
        assert!(find_inject_attr(&[empty]).is_err());
        assert!(find_inject_attr(&[]).unwrap().is_none());
    }

    #[test]
    fn test_rejects_tuple_structs() {
        let input: DeriveInput = parse_quote! {
            struct Wrapper(#[inject("Logger")] Arc<Logger>);
        };
        assert!(expand_inject(&input).is_err());
    }
}
