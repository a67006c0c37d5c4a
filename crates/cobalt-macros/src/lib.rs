//! Procedural macros for the Cobalt interaction framework.
//!
//! - `#[derive(CommandArgs)]` turns a struct into a slash command argument
//!   record.
//! - `#[derive(ChoiceEnum)]` turns a fieldless enum into a string argument
//!   whose static choices are the variants.
//!
//! Both expand to calls of the explicit declaration API in
//! `cobalt::framework::args`; nothing is inspected at run time.
//!
//! ```rust,ignore
//! use cobalt::prelude::*;
//!
//! #[derive(Clone, Copy, ChoiceEnum)]
//! enum Severity {
//!     #[choice(label = "Warning only")]
//!     Warn,
//!     Ban,
//! }
//!
//! #[derive(CommandArgs)]
//! struct Punish {
//!     #[arg(description = "Who to punish")]
//!     user: UserRef,
//!     #[arg(description = "How hard")]
//!     severity: Severity,
//!     #[arg(description = "Days of messages to delete", default = "1")]
//!     days: i64,
//!     #[arg(description = "Shown in the audit log")]
//!     reason: Option<String>,
//! }
//! ```

mod args;
mod choice;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives `CommandArgs` for a struct with named fields.
///
/// # Field attributes
///
/// | Key | Description |
/// |-----|-------------|
/// | `description = "…"` | Required. Shown next to the option. |
/// | `rename = "…"` | Option name, defaults to the field name. |
/// | `choice(name = "…", value = …)` | Adds a static choice; repeatable. |
/// | `default` / `default = "expr"` | Makes the option optional, falling back to `Default::default()` or `expr`. |
///
/// `Option<T>` fields are optional and decode to `None` when absent.
///
/// # Container attributes
///
/// `#[args(crate = "path")]` overrides the path to the framework crate
/// (default `::cobalt::framework`).
#[proc_macro_derive(CommandArgs, attributes(arg, args))]
pub fn derive_command_args(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match args::derive_command_args(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derives `ChoiceEnum` and `ArgValue` for a fieldless enum.
///
/// Each variant's value defaults to its name, and its label to its value.
/// Override either with `#[choice(label = "…", value = "…")]`. The enum also
/// accepts `#[choice(crate = "path")]`.
#[proc_macro_derive(ChoiceEnum, attributes(choice))]
pub fn derive_choice_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match choice::derive_choice_enum(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
