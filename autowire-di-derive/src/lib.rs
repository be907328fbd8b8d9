use crate::contract::{make_injectable, register_contract};
use crate::inspectable::expand_inspectable;
use crate::methods::expand_methods;
use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, Error, ItemImpl, ItemTrait};

mod attributes;
mod contract;
mod inspectable;
mod methods;
mod parameter;

/// Makes a struct constructible by the injector, with fields treated as constructor parameters.
/// See `autowire_di::inspectable` for supported field types and attributes.
#[proc_macro_derive(Inspectable, attributes(inspectable))]
pub fn derive_inspectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_inspectable(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

/// Exposes all `&self` methods of an inherent impl block to the injector. Parameters and
/// methods accept the same `#[inspectable]` configuration as struct fields and structs.
#[proc_macro_attribute]
pub fn inspectable_methods(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = parse_macro_input!(item as ItemImpl);
    expand_methods(item)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

/// Registers a trait implementation as satisfying the contract of the trait, which allows
/// injecting the implementing type as `InstancePtr<dyn Trait>`.
#[proc_macro_attribute]
pub fn contract(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = parse_macro_input!(item as ItemImpl);
    register_contract(&item)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

/// Marks a trait as injectable, so `dyn Trait` can be requested by key.
#[proc_macro_attribute]
pub fn injectable(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = parse_macro_input!(item as ItemTrait);
    make_injectable(&item)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}
