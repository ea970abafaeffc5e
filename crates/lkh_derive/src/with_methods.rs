use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Field, Fields, GenericArgument, PathArguments, Type, parse_macro_input,
    spanned::Spanned,
};

fn is_skipped(field: &Field) -> syn::Result<bool> {
    let mut skip = false;

    for attr in field.attrs.iter().filter(|a| a.path().is_ident("with")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                return Ok(());
            }
            Err(meta.error("unsupported with attribute; expected skip"))
        })?;
    }

    Ok(skip)
}

/// Returns the single type argument of `Option<T>` or `Vec<T>` when `ty` is
/// that wrapper.
fn wrapped_type<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };

    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }

    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }

    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

pub fn derive_with_methods_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "WithMethods can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data_struct.fields else {
        return Err(syn::Error::new(
            struct_ident.span(),
            "WithMethods requires a struct with named fields",
        ));
    };

    let mut methods = Vec::new();

    for field in &fields.named {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        if is_skipped(field)? {
            continue;
        }

        let method_ident = format_ident!("with_{}", field_ident);

        let method = if let Some(inner) = wrapped_type(&field.ty, "Option") {
            quote! {
                pub fn #method_ident(mut self, #field_ident: impl Into<#inner>) -> Self {
                    self.#field_ident = Some(#field_ident.into());
                    self
                }
            }
        } else if let Some(inner) = wrapped_type(&field.ty, "Vec") {
            quote! {
                pub fn #method_ident<I, V>(mut self, #field_ident: I) -> Self
                where
                    I: IntoIterator<Item = V>,
                    V: Into<#inner>,
                {
                    self.#field_ident = #field_ident.into_iter().map(Into::into).collect();
                    self
                }
            }
        } else {
            let ty = &field.ty;
            quote! {
                pub fn #method_ident(mut self, #field_ident: impl Into<#ty>) -> Self {
                    self.#field_ident = #field_ident.into();
                    self
                }
            }
        };
        methods.push(method);
    }

    Ok(quote! {
        impl #impl_generics #struct_ident #ty_generics #where_clause {
            #(#methods)*
        }
    })
}
