use crate::attributes::{extract_parameter_attributes, DefaultDefinition};
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Attribute, Error, GenericArgument, PathArguments, Result, Type};

const POINTER_TYPES: [&str; 2] = ["InstancePtr", "Rc"];

enum ParameterKind<'a> {
    Dependency(&'a Type),
    OptionalDependency(&'a Type),
    OptionalValue(&'a Type),
    Value(&'a Type),
}

/// Code generated for a single constructor or method parameter.
pub struct ParameterDefinition {
    /// Expression creating the `Parameter` descriptor.
    pub descriptor: TokenStream,
    /// Expression taking the value from `arguments`.
    pub extraction: TokenStream,
}

fn single_generic_argument<'a>(ty: &'a Type, names: &[&str]) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };

    let segment = path.path.segments.last()?;
    if !names.iter().any(|name| segment.ident == name) {
        return None;
    }

    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };

    match arguments.args.first() {
        Some(GenericArgument::Type(ty)) if arguments.args.len() == 1 => Some(ty),
        _ => None,
    }
}

fn classify(ty: &Type) -> Result<ParameterKind> {
    if let Type::Reference(reference) = ty {
        return Err(Error::new(
            reference.span(),
            "Reference parameters cannot be injected - use InstancePtr instead!",
        ));
    }

    if let Some(target) = single_generic_argument(ty, &POINTER_TYPES) {
        return Ok(ParameterKind::Dependency(target));
    }

    if let Some(inner) = single_generic_argument(ty, &["Option"]) {
        return Ok(match single_generic_argument(inner, &POINTER_TYPES) {
            Some(target) => ParameterKind::OptionalDependency(target),
            None => ParameterKind::OptionalValue(inner),
        });
    }

    Ok(ParameterKind::Value(ty))
}

pub fn generate_parameter(
    name: &str,
    ty: &Type,
    attributes: &[Attribute],
) -> Result<ParameterDefinition> {
    let default = extract_parameter_attributes(attributes)?.and_then(|attributes| attributes.default);

    Ok(match classify(ty)? {
        ParameterKind::Dependency(target) => ParameterDefinition {
            descriptor: quote! {
                autowire_di::inspectable::Parameter::injected::<#target>(#name, false)
            },
            extraction: quote!(arguments.dependency::<#target>()?),
        },
        ParameterKind::OptionalDependency(target) => ParameterDefinition {
            descriptor: quote! {
                autowire_di::inspectable::Parameter::injected::<#target>(#name, true)
            },
            extraction: quote!(arguments.optional_dependency::<#target>()?),
        },
        ParameterKind::OptionalValue(inner) => ParameterDefinition {
            descriptor: quote! {
                autowire_di::inspectable::Parameter::builtin::<#inner>(#name, true)
            },
            extraction: quote!(arguments.optional_value::<#inner>()?),
        },
        ParameterKind::Value(ty) => {
            let extraction = match default {
                Some(DefaultDefinition::Default) => quote! {
                    arguments.value_or_else::<#ty, _>(std::default::Default::default)?
                },
                Some(DefaultDefinition::Expr(path)) => {
                    quote!(arguments.value_or_else::<#ty, _>(#path)?)
                }
                None => quote!(arguments.value::<#ty>()?),
            };

            ParameterDefinition {
                descriptor: quote! {
                    autowire_di::inspectable::Parameter::builtin::<#ty>(#name, false)
                },
                extraction,
            }
        }
    })
}
