//! `#[derive(CommandArgs)]` implementation.
//!
//! Each named field becomes one option, in declaration order. The expansion
//! looks like:
//!
//! ```rust,ignore
//! impl CommandArgs for Ban {
//!     fn declare(decl: ArgsDeclaration) -> ArgsDeclaration {
//!         decl.arg(ArgBuilder::<UserRef>::new("user", "Who to ban"))
//!             .arg(ArgBuilder::<String>::new("reason", "Why").optional())
//!     }
//!
//!     fn decode(reader: &OptionReader<'_>) -> DecodeResult<Self> {
//!         Ok(Self {
//!             user: reader.required::<UserRef>("user")?,
//!             reason: reader.optional::<String>("reason")?,
//!         })
//!     }
//!
//!     fn encode(&self) -> Vec<RawOption> { /* one RawOption per present field */ }
//! }
//! ```

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Expr, Fields, GenericArgument, Ident, Lit, LitStr, PathArguments,
    Type, spanned::Spanned,
};

// ============================================================================
// Attribute structures
// ============================================================================

/// How a missing option is filled in.
enum Presence {
    Required,
    /// `Option<T>` field; holds `T`.
    Option(Type),
    /// `#[arg(default)]` or `#[arg(default = "expr")]`.
    Default(Option<Expr>),
}

struct ArgField {
    ident: Ident,
    ty: Type,
    name: String,
    description: String,
    choices: Vec<(LitStr, Lit)>,
    presence: Presence,
}

// ============================================================================
// Entry point
// ============================================================================

pub fn derive_command_args(input: &DeriveInput) -> syn::Result<TokenStream> {
    let krate = crate_path(&input.attrs, "args")?;
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named
                .named
                .iter()
                .map(parse_field)
                .collect::<syn::Result<Vec<_>>>()?,
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new(
                    input.span(),
                    "CommandArgs requires named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.span(),
                "CommandArgs can only be derived for structs",
            ));
        }
    };

    let declare = fields.iter().map(|f| declare_arg(&krate, f));
    let decode = fields.iter().map(decode_field);
    let encode = fields.iter().map(|f| encode_field(&krate, f));
    let construct = if matches!(&input.data, Data::Struct(s) if matches!(s.fields, Fields::Unit)) {
        quote!(Self)
    } else {
        quote!(Self { #(#decode,)* })
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #krate::args::CommandArgs for #name #ty_generics #where_clause {
            fn declare(
                decl: #krate::args::ArgsDeclaration,
            ) -> #krate::args::ArgsDeclaration {
                decl #(#declare)*
            }

            fn decode(
                reader: &#krate::args::OptionReader<'_>,
            ) -> #krate::error::DecodeResult<Self> {
                ::std::result::Result::Ok(#construct)
            }

            fn encode(&self) -> ::std::vec::Vec<#krate::__private::RawOption> {
                #[allow(unused_mut)]
                let mut options = ::std::vec::Vec::new();
                #(#encode)*
                options
            }
        }
    })
}

/// Reads `#[<attr>(crate = "path")]`, defaulting to `::cobalt::framework`.
pub(crate) fn crate_path(attrs: &[Attribute], attr_name: &str) -> syn::Result<TokenStream> {
    let mut path = None;
    for attr in attrs {
        if !attr.path().is_ident(attr_name) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let lit: LitStr = meta.value()?.parse()?;
                path = Some(lit.parse::<syn::Path>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported container attribute"))
            }
        })?;
    }
    Ok(match path {
        Some(path) => quote!(#path),
        None => quote!(::cobalt::framework),
    })
}

// ============================================================================
// Field parsing
// ============================================================================

fn parse_field(field: &syn::Field) -> syn::Result<ArgField> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new(field.span(), "expected a named field"))?;

    let mut rename = None;
    let mut description = None;
    let mut choices = Vec::new();
    let mut default = None;

    for attr in field.attrs.iter().filter(|a| a.path().is_ident("arg")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("description") {
                description = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("rename") {
                rename = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("default") {
                default = Some(if meta.input.peek(syn::Token![=]) {
                    Some(meta.value()?.parse::<LitStr>()?.parse::<Expr>()?)
                } else {
                    None
                });
            } else if meta.path.is_ident("choice") {
                let mut label = None;
                let mut value = None;
                meta.parse_nested_meta(|choice| {
                    if choice.path.is_ident("name") {
                        label = Some(choice.value()?.parse::<LitStr>()?);
                    } else if choice.path.is_ident("value") {
                        value = Some(choice.value()?.parse::<Lit>()?);
                    } else {
                        return Err(choice.error("expected `name` or `value`"));
                    }
                    Ok(())
                })?;
                match (label, value) {
                    (Some(label), Some(value)) => choices.push((label, value)),
                    _ => return Err(meta.error("choice needs both `name` and `value`")),
                }
            } else {
                return Err(meta.error("unsupported #[arg] key"));
            }
            Ok(())
        })?;
    }

    let description = description.ok_or_else(|| {
        syn::Error::new(
            ident.span(),
            "missing #[arg(description = \"…\")] on command argument",
        )
    })?;

    let presence = match (option_inner(&field.ty), default) {
        (Some(_), Some(_)) => {
            return Err(syn::Error::new(
                field.ty.span(),
                "`default` cannot be used on an `Option` field",
            ));
        }
        (Some(inner), None) => Presence::Option(inner.clone()),
        (None, Some(expr)) => Presence::Default(expr),
        (None, None) => Presence::Required,
    };

    let name = rename.unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());

    Ok(ArgField {
        ident,
        ty: field.ty.clone(),
        name,
        description,
        choices,
        presence,
    })
}

/// Returns `T` if `ty` is written as `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

// ============================================================================
// Code generation
// ============================================================================

impl ArgField {
    /// The type the option value decodes into.
    fn value_type(&self) -> &Type {
        match &self.presence {
            Presence::Option(inner) => inner,
            _ => &self.ty,
        }
    }
}

fn declare_arg(krate: &TokenStream, field: &ArgField) -> TokenStream {
    let ty = field.value_type();
    let name = &field.name;
    let description = &field.description;
    let choices = field.choices.iter().map(|(label, value)| {
        let value = match value {
            Lit::Str(s) => quote!(::std::string::String::from(#s)),
            other => quote!(#other),
        };
        quote!(.choice(#label, #value))
    });
    let optional = match field.presence {
        Presence::Required => quote!(),
        _ => quote!(.optional()),
    };

    quote! {
        .arg(
            #krate::args::ArgBuilder::<#ty>::new(#name, #description)
                #(#choices)*
                #optional
        )
    }
}

fn decode_field(field: &ArgField) -> TokenStream {
    let ident = &field.ident;
    let ty = field.value_type();
    let name = &field.name;

    match &field.presence {
        Presence::Required => quote!(#ident: reader.required::<#ty>(#name)?),
        Presence::Option(_) => quote!(#ident: reader.optional::<#ty>(#name)?),
        Presence::Default(None) => quote! {
            #ident: reader.optional::<#ty>(#name)?.unwrap_or_default()
        },
        Presence::Default(Some(expr)) => quote! {
            #ident: reader.optional::<#ty>(#name)?.unwrap_or_else(|| #expr)
        },
    }
}

fn encode_field(krate: &TokenStream, field: &ArgField) -> TokenStream {
    let ident = &field.ident;
    let ty = field.value_type();
    let name = &field.name;

    match &field.presence {
        Presence::Option(_) => quote! {
            if let ::std::option::Option::Some(value) = &self.#ident {
                options.push(#krate::__private::RawOption::new(
                    #name,
                    <#ty as #krate::args::ArgValue>::to_option(value),
                ));
            }
        },
        _ => quote! {
            options.push(#krate::__private::RawOption::new(
                #name,
                <#ty as #krate::args::ArgValue>::to_option(&self.#ident),
            ));
        },
    }
}
