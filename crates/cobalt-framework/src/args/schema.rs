//! Validated argument schemas and the per-type cache.

use std::any::{TypeId, type_name};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use tracing::debug;

use cobalt_core::{OptionSchema, RawOption};

use super::declaration::{ArgsDeclaration, ArgumentDescriptor, CommandArgs};
use super::reader::OptionReader;
use crate::error::{DeclarationError, DeclarationResult, DecodeError, DecodeResult};

/// Platform limit on options per command and choices per option.
pub const MAX_OPTIONS: usize = 25;
pub const MAX_CHOICES: usize = 25;
pub const MAX_NAME_LEN: usize = 32;
pub const MAX_DESCRIPTION_LEN: usize = 100;

/// Checks a slash command, group, sub-command or argument name.
pub(crate) fn validate_name(name: &str) -> DeclarationResult<()> {
    let invalid = |reason| {
        Err(DeclarationError::InvalidName {
            name: name.to_string(),
            reason,
        })
    };
    let len = name.chars().count();
    if len == 0 {
        return invalid("name is empty");
    }
    if len > MAX_NAME_LEN {
        return invalid("name is longer than 32 characters");
    }
    if name.chars().any(char::is_uppercase) {
        return invalid("name must be lowercase");
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return invalid("name may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}

pub(crate) fn validate_description(name: &str, description: &str) -> DeclarationResult<()> {
    if description.trim().is_empty() {
        return Err(DeclarationError::EmptyDescription {
            name: name.to_string(),
        });
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(DeclarationError::DescriptionTooLong {
            name: name.to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }
    Ok(())
}

/// The validated, ordered arguments of one argument type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArgumentSchema {
    descriptors: Vec<ArgumentDescriptor>,
}

impl ArgumentSchema {
    /// Validates a declaration.
    pub fn from_declaration(decl: ArgsDeclaration) -> DeclarationResult<Self> {
        let descriptors = decl.into_descriptors();

        if descriptors.len() > MAX_OPTIONS {
            return Err(DeclarationError::TooManyOptions {
                owner: "arguments".to_string(),
                count: descriptors.len(),
                max: MAX_OPTIONS,
            });
        }

        let mut names = HashSet::new();
        let mut seen_optional = false;
        for descriptor in &descriptors {
            validate_name(&descriptor.name)?;
            validate_description(&descriptor.name, &descriptor.description)?;

            if !names.insert(descriptor.name.as_str()) {
                return Err(DeclarationError::DuplicateName {
                    scope: "arguments".to_string(),
                    name: descriptor.name.clone(),
                });
            }

            if descriptor.optional {
                seen_optional = true;
            } else if seen_optional {
                return Err(DeclarationError::RequiredAfterOptional {
                    argument: descriptor.name.clone(),
                });
            }

            if descriptor.choices.len() > MAX_CHOICES {
                return Err(DeclarationError::TooManyChoices {
                    argument: descriptor.name.clone(),
                    count: descriptor.choices.len(),
                    max: MAX_CHOICES,
                });
            }
            let mut labels = HashSet::new();
            for choice in &descriptor.choices {
                if !labels.insert(choice.name.as_str()) {
                    return Err(DeclarationError::DuplicateChoice {
                        argument: descriptor.name.clone(),
                        label: choice.name.clone(),
                    });
                }
            }
        }

        Ok(Self { descriptors })
    }

    pub fn descriptors(&self) -> &[ArgumentDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, name: &str) -> Option<&ArgumentDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// The wire form of every argument, in declaration order.
    pub fn to_options(&self) -> Vec<OptionSchema> {
        self.descriptors
            .iter()
            .map(ArgumentDescriptor::to_option_schema)
            .collect()
    }

    /// Rebuilds `T` from raw options.
    ///
    /// Every required argument must be present before `T::decode` runs.
    pub fn decode<T: CommandArgs>(&self, options: &[RawOption]) -> DecodeResult<T> {
        let reader = OptionReader::new(options);
        if let Some(missing) = self
            .descriptors
            .iter()
            .find(|d| d.required() && !reader.contains(&d.name))
        {
            return Err(DecodeError::MissingRequired {
                name: missing.name.clone(),
            });
        }
        T::decode(&reader)
    }

    /// Returns a copy with autocomplete enabled on `fields`.
    pub(crate) fn with_autocomplete<'a>(
        &self,
        command: &str,
        fields: impl IntoIterator<Item = &'a str>,
    ) -> DeclarationResult<Self> {
        let mut schema = self.clone();
        for field in fields {
            let descriptor = schema
                .descriptors
                .iter_mut()
                .find(|d| d.name == field)
                .ok_or_else(|| DeclarationError::UnknownAutocompleteField {
                    command: command.to_string(),
                    field: field.to_string(),
                })?;

            if !descriptor.kind().supports_autocomplete() {
                return Err(DeclarationError::AutocompleteUnsupported {
                    argument: descriptor.name.clone(),
                    kind: descriptor.kind(),
                });
            }
            if !descriptor.choices.is_empty() {
                return Err(DeclarationError::ChoicesWithAutocomplete {
                    argument: descriptor.name.clone(),
                });
            }
            descriptor.autocomplete = true;
        }
        Ok(schema)
    }
}

static SCHEMAS: LazyLock<RwLock<HashMap<TypeId, Arc<ArgumentSchema>>>> =
    LazyLock::new(Default::default);

/// Derives the schema of `T`, once per type for the process lifetime.
pub fn derive<T: CommandArgs>() -> DeclarationResult<Arc<ArgumentSchema>> {
    let id = TypeId::of::<T>();
    if let Some(schema) = SCHEMAS.read().get(&id) {
        return Ok(Arc::clone(schema));
    }

    let schema = Arc::new(ArgumentSchema::from_declaration(T::declare(
        ArgsDeclaration::new(),
    ))?);
    debug!(
        args = type_name::<T>(),
        count = schema.len(),
        "Derived argument schema"
    );

    Ok(Arc::clone(SCHEMAS.write().entry(id).or_insert(schema)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{ArgBuilder, OptionReader};
    use cobalt_core::{OptionKind, OptionValue};

    #[derive(Debug, PartialEq)]
    struct Search {
        query: String,
        limit: Option<i64>,
    }

    impl CommandArgs for Search {
        fn declare(decl: ArgsDeclaration) -> ArgsDeclaration {
            decl.required::<String>("query", "search text")
                .optional::<i64>("limit", "max results")
        }

        fn decode(reader: &OptionReader<'_>) -> DecodeResult<Self> {
            Ok(Self {
                query: reader.required("query")?,
                limit: reader.optional("limit")?,
            })
        }

        fn encode(&self) -> Vec<RawOption> {
            let mut options = vec![RawOption::new("query", OptionValue::String(self.query.clone()))];
            if let Some(limit) = self.limit {
                options.push(RawOption::new("limit", OptionValue::Integer(limit)));
            }
            options
        }
    }

    #[test]
    fn test_derive_preserves_order_and_requiredness() {
        let schema = derive::<Search>().unwrap();
        let names: Vec<_> = schema.descriptors().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["query", "limit"]);

        let query = schema.get("query").unwrap();
        assert!(query.required());
        assert_eq!(query.kind(), OptionKind::String);
        assert!(query.choices.is_empty());
        assert!(!query.autocomplete);
        assert!(!schema.get("limit").unwrap().required());
    }

    #[test]
    fn test_derive_is_cached() {
        let a = derive::<Search>().unwrap();
        let b = derive::<Search>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_decode_present_and_missing() {
        let schema = derive::<Search>().unwrap();

        let options = vec![RawOption::new("query", OptionValue::String("abc".into()))];
        let args: Search = schema.decode(&options).unwrap();
        assert_eq!(
            args,
            Search {
                query: "abc".into(),
                limit: None
            }
        );

        let missing = schema.decode::<Search>(&[]);
        assert_eq!(
            missing,
            Err(DecodeError::MissingRequired {
                name: "query".into()
            })
        );
    }

    #[test]
    fn test_encode_then_decode() {
        let schema = derive::<Search>().unwrap();
        let args = Search {
            query: "rust".into(),
            limit: Some(5),
        };
        assert_eq!(schema.decode::<Search>(&args.encode()).unwrap(), args);
    }

    #[test]
    fn test_rejects_empty_description() {
        let decl = ArgsDeclaration::new().required::<String>("query", "  ");
        assert_eq!(
            ArgumentSchema::from_declaration(decl),
            Err(DeclarationError::EmptyDescription {
                name: "query".into()
            })
        );
    }

    #[test]
    fn test_rejects_required_after_optional() {
        let decl = ArgsDeclaration::new()
            .optional::<String>("a", "first")
            .required::<String>("b", "second");
        assert!(matches!(
            ArgumentSchema::from_declaration(decl),
            Err(DeclarationError::RequiredAfterOptional { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_names() {
        for name in ["", "Upper", "has space", "a".repeat(33).as_str()] {
            let decl = ArgsDeclaration::new().required::<String>(name, "desc");
            assert!(
                matches!(
                    ArgumentSchema::from_declaration(decl),
                    Err(DeclarationError::InvalidName { .. })
                ),
                "{name:?} accepted"
            );
        }
    }

    #[test]
    fn test_rejects_duplicates() {
        let decl = ArgsDeclaration::new()
            .required::<String>("a", "first")
            .required::<String>("a", "again");
        assert!(matches!(
            ArgumentSchema::from_declaration(decl),
            Err(DeclarationError::DuplicateName { .. })
        ));

        let decl = ArgsDeclaration::new().arg(
            ArgBuilder::<String>::new("a", "first")
                .choice("x", "1".into())
                .choice("x", "2".into()),
        );
        assert!(matches!(
            ArgumentSchema::from_declaration(decl),
            Err(DeclarationError::DuplicateChoice { .. })
        ));
    }

    #[test]
    fn test_rejects_too_many_choices() {
        let mut arg = ArgBuilder::<i64>::new("n", "number");
        for i in 0..26 {
            arg = arg.choice(format!("c{i}"), i);
        }
        let decl = ArgsDeclaration::new().arg(arg);
        assert!(matches!(
            ArgumentSchema::from_declaration(decl),
            Err(DeclarationError::TooManyChoices { count: 26, .. })
        ));
    }

    #[test]
    fn test_autocomplete_validation() {
        let schema = derive::<Search>().unwrap();

        let enabled = schema.with_autocomplete("search", ["query"]).unwrap();
        assert!(enabled.get("query").unwrap().autocomplete);
        assert!(!schema.get("query").unwrap().autocomplete);

        assert!(matches!(
            schema.with_autocomplete("search", ["nope"]),
            Err(DeclarationError::UnknownAutocompleteField { .. })
        ));

        let with_choices = ArgumentSchema::from_declaration(
            ArgsDeclaration::new().arg(ArgBuilder::<i64>::new("n", "number").choice("one", 1)),
        )
        .unwrap();
        assert!(matches!(
            with_choices.with_autocomplete("pick", ["n"]),
            Err(DeclarationError::ChoicesWithAutocomplete { .. })
        ));

        let boolean =
            ArgumentSchema::from_declaration(ArgsDeclaration::new().required::<bool>("b", "flag"))
                .unwrap();
        assert!(matches!(
            boolean.with_autocomplete("flag", ["b"]),
            Err(DeclarationError::AutocompleteUnsupported { .. })
        ));
    }
}
