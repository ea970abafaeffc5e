mod lkh_keyword;
mod with_methods;

use proc_macro::TokenStream;

/// Derives `Display` and case-insensitive `FromStr` for unit-variant enums that
/// mirror TSPLIB/LKH keywords.
#[proc_macro_derive(LkhKeyword, attributes(lkh))]
pub fn derive_lkh_keyword(input: TokenStream) -> TokenStream {
    lkh_keyword::derive_lkh_keyword_inner(input)
}

/// Derives chainable `with_<field>` setters for every named field.
#[proc_macro_derive(WithMethods, attributes(with))]
pub fn derive_with_methods(input: TokenStream) -> TokenStream {
    with_methods::derive_with_methods_inner(input)
}
