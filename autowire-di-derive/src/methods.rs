use crate::attributes::{extract_declaration_attributes, is_inspectable};
use crate::parameter::generate_parameter;
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{
    Error, FnArg, GenericArgument, ImplItem, ImplItemFn, ItemImpl, Pat, PathArguments, Result,
    ReturnType, Type, TypeTuple,
};

fn is_unit_type(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(TypeTuple { elems, .. }) if elems.is_empty())
}

fn is_unit(output: &ReturnType) -> bool {
    match output {
        ReturnType::Default => true,
        ReturnType::Type(_, ty) => is_unit_type(ty),
    }
}

/// Returns the success type of methods returning `Result<T, ErrorPtr>`.
fn fallible_output(output: &ReturnType) -> Option<&Type> {
    let ReturnType::Type(_, ty) = output else {
        return None;
    };

    let Type::Path(path) = ty.as_ref() else {
        return None;
    };

    let segment = path.path.segments.last()?;
    if segment.ident != "Result" {
        return None;
    }

    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };

    match (arguments.args.first(), arguments.args.last()) {
        (Some(GenericArgument::Type(value)), Some(GenericArgument::Type(Type::Path(error))))
            if arguments.args.len() == 2
                && error
                    .path
                    .segments
                    .last()
                    .map_or(false, |segment| segment.ident == "ErrorPtr") =>
        {
            Some(value)
        }
        _ => None,
    }
}

/// Only methods borrowing `self` immutably can be called on shared instances.
fn is_exposed(method: &ImplItemFn) -> bool {
    matches!(
        method.sig.receiver(),
        Some(receiver) if receiver.reference.is_some() && receiver.mutability.is_none()
    )
}

struct MethodDefinition {
    declaration: TokenStream,
    invoke: TokenStream,
}

fn generate_method(
    self_ty: &Type,
    method: &mut ImplItemFn,
    invoke_ident: Ident,
) -> Result<MethodDefinition> {
    let attributes = extract_declaration_attributes(&method.attrs)?;
    if attributes.constructor.is_some() {
        return Err(Error::new(
            method.sig.span(),
            "Constructors can only be declared on types!",
        ));
    }

    let markers = attributes.markers;
    method.attrs.retain(|attribute| !is_inspectable(attribute));

    let mut descriptors = vec![];
    let mut extractions = vec![];
    let mut arguments = vec![];

    for (index, input) in method.sig.inputs.iter_mut().enumerate() {
        let FnArg::Typed(input) = input else {
            continue;
        };

        let name = match input.pat.as_ref() {
            Pat::Ident(pat) => pat.ident.to_string(),
            _ => format!("arg{index}"),
        };

        let definition = generate_parameter(&name, &input.ty, &input.attrs)?;
        input.attrs.retain(|attribute| !is_inspectable(attribute));

        let argument = format_ident!("arg{}", index);
        let extraction = definition.extraction;
        extractions.push(quote!(let #argument = #extraction;));
        descriptors.push(definition.descriptor);
        arguments.push(argument);
    }

    let ident = &method.sig.ident;
    let name = ident.to_string();
    let call = quote!(this.#ident(#(#arguments),*));
    let result = if let Some(success_ty) = fallible_output(&method.sig.output) {
        let success = if is_unit_type(success_ty) {
            quote!(None)
        } else {
            quote!(Some(autowire_di::instance::InstancePtr::new(value) as autowire_di::instance::AnyPtr))
        };

        quote! {
            match #call {
                Ok(value) => Ok(#success),
                Err(error) => Err(autowire_di::InjectorError::Construction(error)),
            }
        }
    } else if is_unit(&method.sig.output) {
        quote! {
            #call;
            Ok(None)
        }
    } else {
        quote! {
            Ok(Some(autowire_di::instance::InstancePtr::new(#call) as autowire_di::instance::AnyPtr))
        }
    };

    Ok(MethodDefinition {
        declaration: quote! {
            autowire_di::inspectable::MethodDeclaration {
                name: #name,
                markers: &[#(#markers),*],
                parameters: vec![#(#descriptors),*],
                invoke: #invoke_ident,
            }
        },
        invoke: quote! {
            #[allow(unused_variables)]
            fn #invoke_ident(
                instance: &autowire_di::instance::AnyPtr,
                arguments: &mut autowire_di::inspectable::Arguments<'_>,
            ) -> Result<Option<autowire_di::instance::AnyPtr>, autowire_di::InjectorError> {
                let this = autowire_di::inspectable::receiver::<#self_ty>(instance)?;
                #(#extractions)*
                #result
            }
        },
    })
}

pub fn expand_methods(mut item: ItemImpl) -> Result<TokenStream> {
    if item.trait_.is_some() {
        return Err(Error::new(
            item.span(),
            "Inspectable methods need to be declared in inherent impl blocks!",
        ));
    }

    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "Inspectable methods cannot be declared for generic types!",
        ));
    }

    let self_ty = item.self_ty.as_ref().clone();
    let mut declarations = vec![];
    let mut invokes = vec![];

    for impl_item in &mut item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };

        if !is_exposed(method) {
            continue;
        }

        let invoke_ident = format_ident!("invoke_{}", method.sig.ident);
        let definition = generate_method(&self_ty, method, invoke_ident)?;
        declarations.push(definition.declaration);
        invokes.push(definition.invoke);
    }

    Ok(quote! {
        #item

        const _: () = {
            #(#invokes)*

            #[automatically_derived]
            impl autowire_di::inspectable::Invocable for #self_ty {
                fn methods() -> Vec<autowire_di::inspectable::MethodDeclaration> {
                    vec![#(#declarations),*]
                }
            }

            fn register() -> autowire_di::inspectable::MethodTable {
                autowire_di::inspectable::MethodTable::of::<#self_ty>()
            }

            autowire_di::type_catalog::internal::submit! {
                autowire_di::type_catalog::internal::MethodRegisterer {
                    register
                }
            };
        };
    })
}
