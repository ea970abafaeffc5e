use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Variant, parse_macro_input, spanned::Spanned};

const DEFAULT_SEPARATOR: &str = "-";

/// Turns a PascalCase variant name into an upper-case keyword, inserting
/// `separator` on word boundaries. Runs of capitals stay together.
fn keyword_from_ident(ident: &syn::Ident, separator: &str) -> String {
    let chars: Vec<char> = ident.to_string().chars().collect();
    let mut out = String::with_capacity(chars.len() * 2);

    for (idx, &ch) in chars.iter().enumerate() {
        if idx > 0 && ch.is_ascii_uppercase() {
            let prev = chars[idx - 1];
            let next_is_lower = chars.get(idx + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                out.push_str(separator);
            }
        }
        out.push(ch.to_ascii_uppercase());
    }

    out
}

fn container_separator(input: &DeriveInput) -> syn::Result<String> {
    let mut separator = DEFAULT_SEPARATOR.to_string();

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("lkh")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("separator") {
                let lit: LitStr = meta.value()?.parse()?;
                separator = lit.value();
                return Ok(());
            }
            Err(meta.error("expected #[lkh(separator = \"...\")] on the enum"))
        })?;
    }

    Ok(separator)
}

/// Returns the keyword from `#[lkh("...")]`, or one derived from the variant
/// name.
fn variant_keyword(variant: &Variant, separator: &str) -> syn::Result<LitStr> {
    let mut keyword: Option<LitStr> = None;

    for attr in variant.attrs.iter().filter(|a| a.path().is_ident("lkh")) {
        keyword = Some(attr.parse_args::<LitStr>()?);
    }

    Ok(keyword.unwrap_or_else(|| {
        LitStr::new(
            &keyword_from_ident(&variant.ident, separator),
            variant.ident.span(),
        )
    }))
}

pub fn derive_lkh_keyword_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let enum_ident = &input.ident;
    let separator = container_separator(input)?;

    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "LkhKeyword can only be derived for enums",
        ));
    };

    let mut display_arms = Vec::new();
    let mut parse_arms = Vec::new();

    for variant in &data_enum.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "LkhKeyword supports unit variants only; implement Display by hand",
            ));
        }

        let ident = &variant.ident;
        let keyword = variant_keyword(variant, &separator)?;
        let upper = keyword.value().to_ascii_uppercase();

        display_arms.push(quote! { Self::#ident => #keyword, });
        parse_arms.push(quote! { #upper => Ok(Self::#ident), });
    }

    let type_name = enum_ident.to_string();

    Ok(quote! {
        impl ::std::fmt::Display for #enum_ident {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                let keyword = match self {
                    #(#display_arms)*
                };
                f.write_str(keyword)
            }
        }

        impl ::std::str::FromStr for #enum_ident {
            type Err = String;

            fn from_str(value: &str) -> ::std::result::Result<Self, Self::Err> {
                match value.trim().to_ascii_uppercase().as_str() {
                    #(#parse_arms)*
                    other => Err(format!("unknown {} value '{}'", #type_name, other)),
                }
            }
        }
    })
}
