//! Procedural macros for servicekit
//!
//! This crate provides `#[derive(ServiceType)]`, which turns a struct into a
//! registrable service.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod service_type;

/// Derive `Capability` and `ServiceType` for a struct
///
/// Options, all optional, go in `#[service(...)]`:
/// - `name = "..."`: service name (default: kebab-cased type name)
/// - `singleton = bool`, `singleton` or `transient`: caching (default: singleton)
/// - `supports(dyn A, dyn B)`: capabilities the service can be resolved as
/// - `make = path`: constructor `fn(&Container) -> Result<Self, BoxError>`
///   (default: `Default::default()`)
///
/// # Example
///
/// ```rust,ignore
/// use servicekit::ServiceType;
///
/// #[derive(Default, ServiceType)]
/// #[service(name = "print", supports(dyn Log))]
/// pub struct PrintLog;
///
/// services.register::<PrintLog>();
/// ```
#[proc_macro_derive(ServiceType, attributes(service))]
pub fn derive_service_type(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    service_type::derive_service_type_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
