//! `#[derive(ChoiceEnum)]` implementation.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, spanned::Spanned};

use crate::args::crate_path;

struct Variant {
    ident: syn::Ident,
    value: String,
    label: String,
}

pub fn derive_choice_enum(input: &DeriveInput) -> syn::Result<TokenStream> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "ChoiceEnum can only be derived for enums",
        ));
    };
    let krate = crate_path(&input.attrs, "choice")?;
    let name = &input.ident;

    let variants = data
        .variants
        .iter()
        .map(|variant| {
            if !matches!(variant.fields, Fields::Unit) {
                return Err(syn::Error::new(
                    variant.span(),
                    "ChoiceEnum variants cannot carry data",
                ));
            }

            let mut value = None;
            let mut label = None;
            for attr in variant.attrs.iter().filter(|a| a.path().is_ident("choice")) {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("value") {
                        value = Some(meta.value()?.parse::<LitStr>()?.value());
                    } else if meta.path.is_ident("label") {
                        label = Some(meta.value()?.parse::<LitStr>()?.value());
                    } else {
                        return Err(meta.error("expected `label` or `value`"));
                    }
                    Ok(())
                })?;
            }

            let value = value.unwrap_or_else(|| variant.ident.to_string());
            Ok(Variant {
                ident: variant.ident.clone(),
                label: label.unwrap_or_else(|| value.clone()),
                value,
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    if variants.is_empty() {
        return Err(syn::Error::new(
            input.span(),
            "ChoiceEnum needs at least one variant",
        ));
    }

    let idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();
    let values = variants.iter().map(|v| &v.value);
    let labels = variants.iter().map(|v| &v.label);

    Ok(quote! {
        impl #krate::args::ChoiceEnum for #name {
            const VARIANTS: &'static [Self] = &[#(Self::#idents),*];

            fn value(self) -> &'static str {
                match self {
                    #(Self::#idents => #values,)*
                }
            }

            fn label(self) -> &'static str {
                match self {
                    #(Self::#idents => #labels,)*
                }
            }
        }

        impl #krate::args::ArgValue for #name {
            const SEMANTIC: #krate::args::SemanticType = #krate::args::SemanticType::String;

            fn from_option(
                value: &#krate::__private::OptionValue,
            ) -> ::std::option::Option<Self> {
                match value {
                    #krate::__private::OptionValue::String(s) => #krate::args::from_value(s),
                    _ => ::std::option::Option::None,
                }
            }

            fn to_option(&self) -> #krate::__private::OptionValue {
                #krate::__private::OptionValue::String(::std::string::String::from(
                    <Self as #krate::args::ChoiceEnum>::value(*self),
                ))
            }

            fn implied_choices() -> ::std::vec::Vec<#krate::__private::Choice> {
                #krate::args::choices_of::<Self>()
            }
        }
    })
}
