use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Error, ItemImpl, ItemTrait, Result};

pub fn register_contract(item: &ItemImpl) -> Result<TokenStream> {
    let trait_type = item
        .trait_
        .as_ref()
        .map(|(_, path, ..)| path)
        .ok_or_else(|| Error::new(item.span(), "Missing trait identifier!"))?;

    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "Contracts cannot be registered for generic implementations!",
        ));
    }

    let self_ty = &item.self_ty;

    Ok(quote! {
        #item

        const _: () = {
            fn cast(
                instance: autowire_di::instance::AnyPtr,
            ) -> Result<Box<dyn std::any::Any>, autowire_di::instance::AnyPtr> {
                instance.downcast::<#self_ty>().map(|instance| {
                    Box::new(instance as autowire_di::instance::InstancePtr<dyn #trait_type>)
                        as Box<dyn std::any::Any>
                })
            }

            fn register() -> autowire_di::type_catalog::internal::ContractDefinition {
                autowire_di::type_catalog::internal::ContractDefinition {
                    key: autowire_di::instance::key_of::<dyn #trait_type>(),
                    cast,
                }
            }

            autowire_di::type_catalog::internal::submit! {
                autowire_di::type_catalog::internal::ContractRegisterer {
                    register
                }
            };
        };
    })
}

pub fn make_injectable(item: &ItemTrait) -> Result<TokenStream> {
    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "Generic traits cannot be injectable!",
        ));
    }

    let ident = &item.ident;

    Ok(quote! {
        #item

        #[automatically_derived]
        impl autowire_di::instance::Injectable for dyn #ident {}
    })
}
