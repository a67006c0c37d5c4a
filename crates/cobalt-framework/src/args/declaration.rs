//! Explicit argument declarations.
//!
//! An argument list is declared with a small builder instead of being
//! discovered at run time:
//!
//! ```rust,ignore
//! impl CommandArgs for Search {
//!     fn declare(decl: ArgsDeclaration) -> ArgsDeclaration {
//!         decl.arg(ArgBuilder::<String>::new("query", "search text"))
//!             .arg(ArgBuilder::<i64>::new("limit", "max results").optional().choice("ten", 10))
//!     }
//!     // ...
//! }
//! ```
//!
//! `#[derive(CommandArgs)]` writes the same calls from field attributes.

use std::marker::PhantomData;

use cobalt_core::{Choice, OptionKind, OptionSchema, RawOption};

use super::reader::OptionReader;
use super::value::{ArgValue, ChoiceArg, SemanticType};
use crate::error::DecodeResult;

/// One declared argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub description: String,
    pub optional: bool,
    pub semantic: SemanticType,
    /// Static choices in declaration order.
    pub choices: Vec<Choice>,
    /// Set when an autocomplete provider is attached by the owning command.
    pub autocomplete: bool,
}

impl ArgumentDescriptor {
    pub fn kind(&self) -> OptionKind {
        self.semantic.option_kind()
    }

    pub fn required(&self) -> bool {
        !self.optional
    }

    /// Converts the descriptor into its wire form.
    pub fn to_option_schema(&self) -> OptionSchema {
        OptionSchema {
            required: !self.optional,
            choices: self.choices.clone(),
            autocomplete: self.autocomplete,
            channel_types: self.semantic.channel_types().to_vec(),
            ..OptionSchema::new(self.kind(), &self.name, &self.description)
        }
    }
}

/// Typed builder for one argument.
///
/// Static choices are only available for [`ChoiceArg`] types, so their
/// values always match the argument's type.
#[derive(Debug)]
pub struct ArgBuilder<T> {
    descriptor: ArgumentDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ArgValue> ArgBuilder<T> {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            descriptor: ArgumentDescriptor {
                name: name.into(),
                description: description.into(),
                optional: false,
                semantic: T::SEMANTIC,
                choices: T::implied_choices(),
                autocomplete: false,
            },
            _marker: PhantomData,
        }
    }

    /// Marks the argument as optional.
    pub fn optional(mut self) -> Self {
        self.descriptor.optional = true;
        self
    }

    pub fn into_descriptor(self) -> ArgumentDescriptor {
        self.descriptor
    }
}

impl<T: ChoiceArg> ArgBuilder<T> {
    /// Adds a static choice.
    pub fn choice(mut self, label: impl Into<String>, value: T) -> Self {
        self.descriptor
            .choices
            .push(Choice::new(label, value.to_choice_value()));
        self
    }
}

/// The ordered argument list of one argument type.
#[derive(Debug, Clone, Default)]
pub struct ArgsDeclaration {
    descriptors: Vec<ArgumentDescriptor>,
}

impl ArgsDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an argument.
    pub fn arg<T: ArgValue>(mut self, arg: ArgBuilder<T>) -> Self {
        self.descriptors.push(arg.into_descriptor());
        self
    }

    /// Appends a required argument without choices.
    pub fn required<T: ArgValue>(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.arg(ArgBuilder::<T>::new(name, description))
    }

    /// Appends an optional argument without choices.
    pub fn optional<T: ArgValue>(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.arg(ArgBuilder::<T>::new(name, description).optional())
    }

    pub fn descriptors(&self) -> &[ArgumentDescriptor] {
        &self.descriptors
    }

    pub(crate) fn into_descriptors(self) -> Vec<ArgumentDescriptor> {
        self.descriptors
    }
}

/// A typed argument record for a slash command or sub-command.
///
/// Usually derived with `#[derive(CommandArgs)]`.
pub trait CommandArgs: Sized + Send + Sync + 'static {
    /// Declares the arguments in order.
    fn declare(decl: ArgsDeclaration) -> ArgsDeclaration;

    /// Rebuilds the record from resolved options.
    fn decode(reader: &OptionReader<'_>) -> DecodeResult<Self>;

    /// Produces the options that decode back into `self`.
    fn encode(&self) -> Vec<RawOption>;
}

/// Commands without arguments.
impl CommandArgs for () {
    fn declare(decl: ArgsDeclaration) -> ArgsDeclaration {
        decl
    }

    fn decode(_reader: &OptionReader<'_>) -> DecodeResult<Self> {
        Ok(())
    }

    fn encode(&self) -> Vec<RawOption> {
        Vec::new()
    }
}
