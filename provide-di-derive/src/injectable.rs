use crate::attributes::{DefaultDefinition, FieldAttributes};
use itertools::Itertools;
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DataStruct, DeriveInput, Error, Field, Fields, Result};

const INJECT: &str = "inject";

/// How a single field gets its value.
struct FieldInjection {
    parameter: Option<TokenStream>,
    construction: TokenStream,
}

fn field_attributes(field: &Field) -> Result<FieldAttributes> {
    field
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident(INJECT))
        .at_most_one()
        .map_err(|_| Error::new(field.span(), "Duplicate inject attribute!"))?
        .map(FieldAttributes::try_from)
        .transpose()
        .map(Option::unwrap_or_default)
}

fn generate_injection(field: &Field, parameter_name: String) -> Result<FieldInjection> {
    let attributes = field_attributes(field)?;
    match attributes.default {
        Some(DefaultDefinition::Expr(path)) => {
            return Ok(FieldInjection {
                parameter: None,
                construction: quote!(#path()),
            })
        }
        Some(DefaultDefinition::Default) => {
            return Ok(FieldInjection {
                parameter: None,
                construction: quote!(std::default::Default::default()),
            })
        }
        None => {}
    }

    let ty = &field.ty;
    let target = quote!(<#ty as std::ops::Deref>::Target);
    let parameter = if attributes.injector {
        quote!(provide_di::injectable::Parameter::injector(#parameter_name))
    } else if let Some(name) = attributes.name {
        quote!(provide_di::injectable::Parameter::named::<#target>(#parameter_name, #name))
    } else {
        quote!(provide_di::injectable::Parameter::of::<#target>(#parameter_name))
    };

    Ok(FieldInjection {
        parameter: Some(parameter),
        construction: quote!(arguments.next::<#target>()?),
    })
}

fn generate_injections(fields: &Fields) -> Result<Vec<FieldInjection>> {
    fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let name = field
                .ident
                .as_ref()
                .map(|ident| ident.to_string())
                .unwrap_or_else(|| index.to_string());
            generate_injection(field, name)
        })
        .try_collect()
}

pub fn expand_injectable(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(DataStruct { fields, .. }) = &input.data else {
        return Err(Error::new(
            input.span(),
            "Can only derive Injectable on structs!",
        ));
    };

    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Can only derive Injectable on non-generic structs!",
        ));
    }

    let ident = &input.ident;
    let injections = generate_injections(fields)?;
    let parameters = injections
        .iter()
        .filter_map(|injection| injection.parameter.as_ref());
    let constructions = injections.iter().map(|injection| &injection.construction);
    let generation = match fields {
        Fields::Named(fields) => {
            let idents = fields.named.iter().map(|field| &field.ident);
            quote! {
                Self {
                    #(#idents: #constructions),*
                }
            }
        }
        Fields::Unnamed(_) => quote! {
            Self(#(#constructions),*)
        },
        Fields::Unit => quote! { Self },
    };

    Ok(quote! {
        #[automatically_derived]
        impl provide_di::injectable::Injectable for #ident {
            fn parameters() -> Vec<provide_di::injectable::Parameter> {
                vec![#(#parameters),*]
            }

            #[allow(unused_variables)]
            fn construct(
                arguments: &mut provide_di::instance_provider::Arguments,
            ) -> Result<Self, provide_di::instance_provider::ErrorPtr> {
                Ok(#generation)
            }
        }

        const _: () = {
            fn register() -> provide_di::injectable::InjectableDefinition {
                provide_di::injectable::InjectableDefinition::of::<#ident>()
            }

            provide_di::injectable::internal::submit! {
                provide_di::injectable::internal::InjectableRegisterer {
                    register
                }
            };
        };
    })
}
