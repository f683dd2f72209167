//! ServiceType derive macro for servicekit
//!
//! Implements `Capability` and `ServiceType` for a struct, so it can be
//! registered with `services.register::<T>()` and resolved directly or through
//! any capability listed in `supports(...)`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::Parse;
use syn::{parenthesized, DeriveInput, ExprPath, LitBool, LitStr, Token, Type};

/// Options collected from `#[service(...)]` attributes
#[derive(Default)]
struct ServiceArgs {
    name: Option<LitStr>,
    singleton: Option<bool>,
    supports: Vec<Type>,
    make: Option<ExprPath>,
}

impl ServiceArgs {
    fn from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut args = ServiceArgs::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("service")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    args.name = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("singleton") {
                    // Bare `singleton` means true
                    args.singleton = if meta.input.peek(Token![=]) {
                        Some(meta.value()?.parse::<LitBool>()?.value)
                    } else {
                        Some(true)
                    };
                } else if meta.path.is_ident("transient") {
                    args.singleton = Some(false);
                } else if meta.path.is_ident("supports") {
                    let content;
                    parenthesized!(content in meta.input);
                    let types = content.parse_terminated(Type::parse, Token![,])?;
                    args.supports.extend(types);
                } else if meta.path.is_ident("make") {
                    args.make = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error(concat!(
                        "unknown service option, expected ",
                        "`name`, `singleton`, `transient`, `supports` or `make`",
                    )));
                }
                Ok(())
            })?;
        }

        Ok(args)
    }
}

/// Implements `#[derive(ServiceType)]`
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Default, ServiceType)]
/// #[service(name = "all-caps", transient, supports(dyn Log))]
/// pub struct AllCapsLog;
///
/// // Expands to (roughly):
/// impl Capability for AllCapsLog {}
/// impl ServiceType for AllCapsLog {
///     fn service_name() -> Cow<'static, str> { Cow::Borrowed("all-caps") }
///     fn service_is_singleton() -> bool { false }
///     fn service_supports() -> Vec<Support<Self>> {
///         vec![Support::<Self>::of::<dyn Log, _>(|s| s)]
///     }
///     fn make_service(_: &Container) -> Result<Self, BoxError> {
///         Ok(Default::default())
///     }
/// }
/// ```
pub fn derive_service_type_impl(input: DeriveInput) -> syn::Result<TokenStream> {
    if !matches!(input.data, syn::Data::Struct(_)) {
        return Err(syn::Error::new_spanned(
            &input,
            "ServiceType can only be derived for structs",
        ));
    }

    let args = ServiceArgs::from_attrs(&input.attrs)?;
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let service_name = args.name.map(|lit| {
        quote! {
            fn service_name() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed(#lit)
            }
        }
    });

    let service_is_singleton = args.singleton.map(|singleton| {
        quote! {
            fn service_is_singleton() -> bool {
                #singleton
            }
        }
    });

    let service_supports = generate_supports(&args.supports);
    let make = generate_make(args.make.as_ref());

    Ok(quote! {
        impl #impl_generics ::servicekit::Capability for #name #ty_generics #where_clause {}

        impl #impl_generics ::servicekit::ServiceType for #name #ty_generics #where_clause {
            #service_name
            #service_is_singleton
            #service_supports

            fn make_service(
                container: &::servicekit::Container,
            ) -> ::std::result::Result<Self, ::servicekit::BoxError> {
                #make
            }
        }
    })
}

/// `service_supports` listing one identity cast per capability, if any
fn generate_supports(supports: &[Type]) -> Option<TokenStream> {
    if supports.is_empty() {
        return None;
    }

    Some(quote! {
        fn service_supports() -> ::std::vec::Vec<::servicekit::Support<Self>> {
            ::std::vec![
                #( ::servicekit::Support::<Self>::of::<#supports, _>(|s| s) ),*
            ]
        }
    })
}

/// Body of `make_service`: the named constructor, or `Default`
fn generate_make(make: Option<&ExprPath>) -> TokenStream {
    match make {
        Some(path) => quote! { #path(container) },
        None => quote! {
            let _ = container;
            ::std::result::Result::Ok(<Self as ::std::default::Default>::default())
        },
    }
}
