use crate::attributes::extract_declaration_attributes;
use crate::parameter::{generate_parameter, ParameterDefinition};
use itertools::Itertools;
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DataStruct, DeriveInput, Error, Field, Fields, Result};

struct Constructor {
    parameters: Option<Vec<TokenStream>>,
    extractions: Vec<TokenStream>,
    construction: TokenStream,
}

fn generate_fields<'a, I: Iterator<Item = (String, &'a Field)>>(
    fields: I,
) -> Result<Vec<ParameterDefinition>> {
    fields
        .map(|(name, field)| generate_parameter(&name, &field.ty, &field.attrs))
        .try_collect()
}

fn generate_constructor(fields: &Fields) -> Result<Constructor> {
    Ok(match fields {
        Fields::Named(fields) => {
            let definitions = generate_fields(fields.named.iter().map(|field| {
                (
                    field
                        .ident
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    field,
                )
            }))?;
            let idents = fields.named.iter().map(|field| &field.ident);
            let extractions = definitions
                .iter()
                .map(|definition| definition.extraction.clone())
                .collect_vec();

            Constructor {
                construction: quote! {
                    Self {
                        #(#idents: #extractions),*
                    }
                },
                extractions,
                parameters: Some(
                    definitions
                        .into_iter()
                        .map(|definition| definition.descriptor)
                        .collect(),
                ),
            }
        }
        Fields::Unnamed(fields) => {
            let definitions = generate_fields(
                fields
                    .unnamed
                    .iter()
                    .enumerate()
                    .map(|(index, field)| (index.to_string(), field)),
            )?;
            let extractions = definitions
                .iter()
                .map(|definition| definition.extraction.clone())
                .collect_vec();

            Constructor {
                construction: quote! {
                    Self(#(#extractions),*)
                },
                extractions,
                parameters: Some(
                    definitions
                        .into_iter()
                        .map(|definition| definition.descriptor)
                        .collect(),
                ),
            }
        }
        Fields::Unit => Constructor {
            extractions: vec![],
            construction: quote!(Self),
            parameters: None,
        },
    })
}

pub fn expand_inspectable(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(DataStruct { fields, .. }) = &input.data else {
        return Err(Error::new(
            input.span(),
            "Can only derive Inspectable on structs!",
        ));
    };

    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Cannot derive Inspectable on generic structs!",
        ));
    }

    let ident = &input.ident;
    let attributes = extract_declaration_attributes(&input.attrs)?;
    let markers = attributes.markers;
    let Constructor {
        parameters,
        extractions,
        construction,
    } = generate_constructor(fields)?;

    // a custom constructor receives field values in declaration order
    let construction = match attributes.constructor {
        Some(constructor) => quote! {
            #constructor(#(#extractions),*).map_err(autowire_di::InjectorError::Construction)
        },
        None => quote!(Ok(#construction)),
    };

    let constructor = match parameters {
        Some(parameters) => quote!(Some(vec![#(#parameters),*])),
        None => quote!(None),
    };

    Ok(quote! {
        #[automatically_derived]
        impl autowire_di::instance::Injectable for #ident {}

        #[automatically_derived]
        impl autowire_di::inspectable::Constructible for #ident {
            fn constructor() -> Option<Vec<autowire_di::inspectable::Parameter>> {
                #constructor
            }

            #[allow(unused_variables)]
            fn construct(
                arguments: &mut autowire_di::inspectable::Arguments<'_>,
            ) -> Result<Self, autowire_di::InjectorError> {
                #construction
            }

            fn markers() -> &'static [&'static str] {
                &[#(#markers),*]
            }
        }

        const _: () = {
            fn register() -> autowire_di::inspectable::TypeToken {
                autowire_di::inspectable::TypeToken::of::<#ident>()
            }

            autowire_di::type_catalog::internal::submit! {
                autowire_di::type_catalog::internal::TypeRegisterer {
                    register
                }
            };
        };
    })
}
