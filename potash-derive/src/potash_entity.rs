use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use syn::meta::ParseNestedMeta;
use syn::{DataStruct, DeriveInput, LitStr, Result, Type};

fn field_list(meta: &ParseNestedMeta) -> Result<Vec<String>> {
    let s: LitStr = meta.value()?.parse()?;
    let fields: Vec<String> = s
        .value()
        .split(',')
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();
    if fields.is_empty() {
        return Err(meta.error("At least one field is required"));
    }
    Ok(fields)
}

/// Whether `ty` is `PotashId` or `Option<PotashId>`, by last path segment.
fn is_potash_id(ty: &Type) -> bool {
    let segment = match ty {
        Type::Path(path) => path.path.segments.last(),
        _ => None,
    };
    match segment {
        Some(segment) if segment.ident == "PotashId" => true,
        Some(segment) if segment.ident == "Option" => match &segment.arguments {
            syn::PathArguments::AngleBracketed(args) => args.args.iter().any(|arg| match arg {
                syn::GenericArgument::Type(inner) => is_potash_id(inner),
                _ => false,
            }),
            _ => false,
        },
        _ => false,
    }
}

pub(crate) fn generate_entity_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    if !matches!(data.fields, syn::Fields::Named(_)) {
        return Err(syn::Error::new_spanned(
            ast,
            "PotashEntity can only be derived for structs with named fields",
        ));
    }

    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let entity_type = name.to_string();
    let mut entity_name = name.to_string();
    let mut entity_id: Option<String> = None;
    let mut indexes: Vec<(Vec<String>, Option<String>)> = Vec::new();

    for attr in &ast.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let s: LitStr = meta.value()?.parse()?;
                entity_name = s.value();
                Ok(())
            } else if meta.path.is_ident("id") {
                if entity_id.is_some() {
                    return Err(meta.error("Multiple id attributes are not allowed"));
                }
                meta.parse_nested_meta(|meta| {
                    if meta.path.is_ident("field") {
                        let s: LitStr = meta.value()?.parse()?;
                        entity_id = Some(s.value());
                        Ok(())
                    } else {
                        Err(meta.error("Unknown id attribute"))
                    }
                })
            } else if meta.path.is_ident("index") {
                let mut index_fields = None;
                let mut index_type = None;
                meta.parse_nested_meta(|meta| {
                    if meta.path.is_ident("fields") {
                        index_fields = Some(field_list(&meta)?);
                        Ok(())
                    } else if meta.path.is_ident("index_type") {
                        let s: LitStr = meta.value()?.parse()?;
                        index_type = Some(s.value());
                        Ok(())
                    } else {
                        Err(meta.error("Unknown index attribute"))
                    }
                })?;
                match index_fields {
                    Some(fields) => {
                        indexes.push((fields, index_type));
                        Ok(())
                    }
                    None => Err(meta.error("Index fields are required")),
                }
            } else {
                Err(meta.error("Unknown entity attribute"))
            }
        })?;
    }

    let (id_type, entity_id_code) = match entity_id {
        Some(id_field_name) => {
            let id_field = data
                .fields
                .iter()
                .find(|field| field.ident.as_ref().is_some_and(|ident| ident == &id_field_name))
                .ok_or_else(|| {
                    syn::Error::new_spanned(ast, format!("Id field {} not found in struct", id_field_name))
                })?;

            if is_potash_id(&id_field.ty) {
                (
                    quote! { potash::collection::PotashId },
                    quote! { Some(potash::repository::EntityId::new(#id_field_name, true)) },
                )
            } else {
                (
                    id_field.ty.to_token_stream(),
                    quote! { Some(potash::repository::EntityId::new(#id_field_name, false)) },
                )
            }
        }
        None => (quote! { potash::collection::PotashId }, quote! { None }),
    };

    let index_code = indexes.iter().map(|(fields, index_type)| {
        let index_type = match index_type {
            Some(index_type) => quote! { Some(#index_type) },
            None => quote! { None },
        };
        quote! { potash::repository::EntityIndex::new(vec![#(#fields),*], #index_type) }
    });

    let gen = quote! {
        impl #impl_generics potash::repository::PotashEntity for #name #ty_generics #where_clause {
            type Id = #id_type;

            fn entity_name() -> String {
                #entity_name.to_string()
            }

            fn entity_type() -> String {
                #entity_type.to_string()
            }

            fn entity_indexes() -> Vec<potash::repository::EntityIndex> {
                vec![#(#index_code),*]
            }

            fn entity_id() -> Option<potash::repository::EntityId> {
                #entity_id_code
            }
        }
    };

    Ok(TokenStream::from(gen))
}
