//! Enum-backed choices.
//!
//! A fieldless enum can stand in for a string argument whose static choices
//! are the enum's variants. `#[derive(ChoiceEnum)]` implements both
//! [`ChoiceEnum`] and [`ArgValue`](super::ArgValue) for it.

use cobalt_core::{Choice, ChoiceValue};

/// A fieldless enum whose variants are offered as string choices.
pub trait ChoiceEnum: Copy + Send + Sync + 'static {
    /// Every variant, in the order the choices are published.
    const VARIANTS: &'static [Self];

    /// The stable value sent to and received from the platform.
    fn value(self) -> &'static str;

    /// The label shown to users.
    fn label(self) -> &'static str {
        self.value()
    }

    fn to_choice(self) -> Choice {
        Choice::new(self.label(), self.value())
    }
}

/// Every variant of `E` as a choice.
pub fn choices_of<E: ChoiceEnum>() -> Vec<Choice> {
    E::VARIANTS.iter().map(|variant| variant.to_choice()).collect()
}

/// Looks up the variant whose value is `value`.
pub fn from_value<E: ChoiceEnum>(value: &str) -> Option<E> {
    E::VARIANTS
        .iter()
        .copied()
        .find(|variant| variant.value() == value)
}

/// Looks up the variant a choice was made from.
pub fn from_choice<E: ChoiceEnum>(choice: &Choice) -> Option<E> {
    match &choice.value {
        ChoiceValue::String(value) => from_value(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Size {
        Small,
        Large,
    }

    impl ChoiceEnum for Size {
        const VARIANTS: &'static [Self] = &[Size::Small, Size::Large];

        fn value(self) -> &'static str {
            match self {
                Size::Small => "Small",
                Size::Large => "Large",
            }
        }

        fn label(self) -> &'static str {
            match self {
                Size::Small => "Small size",
                Size::Large => "Large size",
            }
        }
    }

    #[test]
    fn test_choices_of() {
        let choices = choices_of::<Size>();
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[1], Choice::new("Large size", "Large"));
    }

    #[test]
    fn test_back_to_variant() {
        assert_eq!(from_value::<Size>("Small"), Some(Size::Small));
        assert_eq!(from_value::<Size>("Medium"), None);
        assert_eq!(
            from_choice::<Size>(&Size::Large.to_choice()),
            Some(Size::Large)
        );
    }
}
