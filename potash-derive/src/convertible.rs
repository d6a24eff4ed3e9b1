use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use quote::quote;
use syn::{Attribute, DataEnum, DataStruct, DeriveInput, Fields, LitStr, Result};

/// Field names listed in `#[converter(ignored = "..")]`.
fn ignored_fields(attrs: &[Attribute]) -> Result<Vec<String>> {
    let mut ignored = Vec::new();
    for attr in attrs {
        if attr.path().is_ident("converter") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("ignored") {
                    let s: LitStr = meta.value()?.parse()?;
                    ignored.extend(s.value().split(',').map(|f| f.trim().to_string()));
                    Ok(())
                } else {
                    Err(meta.error("Unknown converter attribute"))
                }
            })?;
        }
    }
    Ok(ignored)
}

/// Statements putting each non-ignored field into `document`.
fn put_fields(
    fields: &[(Ident, String)],
    ignored: &[String],
    access: impl Fn(&Ident) -> proc_macro2::TokenStream,
) -> Vec<proc_macro2::TokenStream> {
    fields
        .iter()
        .filter(|(_, name)| !ignored.contains(name))
        .map(|(ident, name)| {
            let value = access(ident);
            quote! { document.put(#name, potash::common::Convertible::to_value(#value)?)?; }
        })
        .collect()
}

/// Initialisers reading each field from `document`.
fn read_fields(fields: &syn::FieldsNamed, ignored: &[String]) -> Vec<proc_macro2::TokenStream> {
    fields
        .named
        .iter()
        .filter_map(|f| f.ident.as_ref().map(|ident| (ident, &f.ty)))
        .map(|(ident, ty)| {
            let name = ident.to_string();
            if ignored.contains(&name) {
                quote! { #ident: Default::default() }
            } else {
                quote! {
                    #ident: potash::common::from_value::<#ty>(
                        document.get(#name).unwrap_or(&potash::common::Value::Null)
                    )?
                }
            }
        })
        .collect()
}

fn named_idents(fields: &syn::FieldsNamed) -> Vec<(Ident, String)> {
    fields
        .named
        .iter()
        .filter_map(|f| f.ident.clone())
        .map(|ident| {
            let name = ident.to_string();
            (ident, name)
        })
        .collect()
}

fn mapping_error(message: &str) -> proc_macro2::TokenStream {
    quote! {
        potash::errors::PotashError::new(#message, potash::errors::ErrorKind::MappingError)
    }
}

pub(crate) fn generate_convertible_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let fields = match &data.fields {
        Fields::Named(fields) => fields,
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                "Convertible can only be derived for structs with named fields",
            ))
        }
    };
    let ignored = ignored_fields(&ast.attrs)?;

    let puts = put_fields(&named_idents(fields), &ignored, |ident| quote! { &self.#ident });
    let reads = read_fields(fields, &ignored);
    let not_a_document = mapping_error(&format!("Value of {} is not a document", ast.ident));

    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let gen = quote! {
        impl #impl_generics potash::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> potash::errors::PotashResult<potash::common::Value> {
                let mut document = potash::collection::Document::new();
                #(#puts)*
                Ok(potash::common::Value::Document(document))
            }

            fn from_value(value: &potash::common::Value) -> potash::errors::PotashResult<Self::Output> {
                match value {
                    potash::common::Value::Document(document) => Ok(#name {
                        #(#reads,)*
                    }),
                    _ => Err(#not_a_document),
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}

pub(crate) fn generate_convertible_for_enum(ast: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let ignored = ignored_fields(&ast.attrs)?;

    let mut to_value_arms = Vec::with_capacity(data.variants.len());
    let mut from_value_arms = Vec::with_capacity(data.variants.len());

    for variant in &data.variants {
        let variant_ident = &variant.ident;
        let variant_name = variant_ident.to_string();

        match &variant.fields {
            Fields::Named(fields) => {
                let idents = named_idents(fields);
                let bindings: Vec<&Ident> = idents.iter().map(|(ident, _)| ident).collect();
                let puts = put_fields(&idents, &ignored, |ident| quote! { #ident });
                let reads = read_fields(fields, &ignored);
                let bad_data = mapping_error(&format!("Data of {}::{} is not a document", name, variant_name));

                to_value_arms.push(quote! {
                    #name::#variant_ident { #(#bindings),* } => {
                        let mut document = potash::collection::Document::new();
                        #(#puts)*
                        (#variant_name, potash::common::Value::Document(document))
                    }
                });
                from_value_arms.push(quote! {
                    Some(#variant_name) => {
                        let document = data.as_document().ok_or_else(|| #bad_data)?;
                        Ok(#name::#variant_ident { #(#reads,)* })
                    }
                });
            }
            Fields::Unnamed(fields) => {
                let count = fields.unnamed.len();
                let bindings: Vec<Ident> = (0..count)
                    .map(|i| Ident::new(&format!("field_{}", i), Span::call_site()))
                    .collect();
                let types: Vec<&syn::Type> = fields.unnamed.iter().map(|f| &f.ty).collect();
                let indices: Vec<usize> = (0..count).collect();
                let bad_data = mapping_error(&format!(
                    "Data of {}::{} is not an array of {} values",
                    name, variant_name, count
                ));

                to_value_arms.push(quote! {
                    #name::#variant_ident(#(#bindings),*) => {
                        let values = vec![#(potash::common::Convertible::to_value(#bindings)?),*];
                        (#variant_name, potash::common::Value::Array(values))
                    }
                });
                from_value_arms.push(quote! {
                    Some(#variant_name) => {
                        let values = data.as_array().filter(|v| v.len() == #count).ok_or_else(|| #bad_data)?;
                        Ok(#name::#variant_ident(#(potash::common::from_value::<#types>(&values[#indices])?),*))
                    }
                });
            }
            Fields::Unit => {
                to_value_arms.push(quote! {
                    #name::#variant_ident => (#variant_name, potash::common::Value::Null)
                });
                from_value_arms.push(quote! {
                    Some(#variant_name) => Ok(#name::#variant_ident)
                });
            }
        }
    }

    let not_a_document = mapping_error(&format!("Value of {} is not a document", name));
    let unknown_variant = mapping_error(&format!("Value is not a variant of {}", name));

    let gen = quote! {
        impl #impl_generics potash::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            #[allow(unused_variables)]
            fn to_value(&self) -> potash::errors::PotashResult<potash::common::Value> {
                let (variant, data): (&str, potash::common::Value) = match self {
                    #(#to_value_arms),*
                };
                let mut document = potash::collection::Document::new();
                document.put("variant", variant)?;
                document.put("value", data)?;
                Ok(potash::common::Value::Document(document))
            }

            #[allow(unused_variables)]
            fn from_value(value: &potash::common::Value) -> potash::errors::PotashResult<Self::Output> {
                let document = value.as_document().ok_or_else(|| #not_a_document)?;
                let data = document.get("value").unwrap_or(&potash::common::Value::Null);
                match document.get("variant").and_then(|v| v.as_str()) {
                    #(#from_value_arms,)*
                    _ => Err(#unknown_variant),
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}
