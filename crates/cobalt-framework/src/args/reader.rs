use cobalt_core::{OptionValue, RawOption};

use super::value::ArgValue;
use crate::error::{DecodeError, DecodeResult};

/// Read access to the raw options of one invocation, by name.
#[derive(Debug, Clone, Copy)]
pub struct OptionReader<'a> {
    options: &'a [RawOption],
}

impl<'a> OptionReader<'a> {
    pub fn new(options: &'a [RawOption]) -> Self {
        Self { options }
    }

    pub fn raw(&self, name: &str) -> Option<&'a OptionValue> {
        self.options
            .iter()
            .find(|option| option.name == name)
            .map(|option| &option.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.raw(name).is_some()
    }

    /// Reads a required option.
    pub fn required<T: ArgValue>(&self, name: &str) -> DecodeResult<T> {
        self.optional(name)?
            .ok_or_else(|| DecodeError::MissingRequired {
                name: name.to_string(),
            })
    }

    /// Reads an optional option; absence is `None`.
    pub fn optional<T: ArgValue>(&self, name: &str) -> DecodeResult<Option<T>> {
        let Some(value) = self.raw(name) else {
            return Ok(None);
        };
        T::from_option(value)
            .map(Some)
            .ok_or_else(|| DecodeError::TypeMismatch {
                name: name.to_string(),
                expected: T::SEMANTIC.as_str(),
                found: value.kind_name(),
            })
    }
}
