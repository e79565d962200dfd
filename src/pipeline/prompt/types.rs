use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Generates a closed enum with `as_str`, `all`, `Display` and `FromStr`.
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident, $err:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            /// Every variant, in declaration order.
            pub fn all() -> &'static [$name] {
                &[$(Self::$variant),+]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::all()
                    .iter()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .copied()
                    .ok_or_else(|| ValidationError::$err(s.to_string()))
            }
        }
    };
}

str_enum!(
    /// Appointment or specialty type the patient is preparing for.
    Category, UnknownCategory {
        GeneralPractitioner => "General Practitioner",
        Cardiologist => "Cardiologist",
        Dermatologist => "Dermatologist",
        Pediatrician => "Pediatrician",
        Other => "Other",
    }
);

str_enum!(
    /// Output sections the model is asked to produce.
    ///
    /// Declaration order is the canonical prompt order; `Ord` follows it,
    /// so a `BTreeSet<Section>` iterates canonically.
    Section, UnknownSection {
        Explanation => "explanation",
        Questions => "questions",
        Summary => "summary",
    }
);

impl Default for Category {
    fn default() -> Self {
        Self::GeneralPractitioner
    }
}

/// User choices that shape one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSelections {
    pub category: Category,
    pub sections: BTreeSet<Section>,
    pub creativity: f32,
}

impl Default for GenerationSelections {
    /// Matches the form's initial state: all sections on, creativity 0.7.
    fn default() -> Self {
        Self {
            category: Category::default(),
            sections: Section::all().iter().copied().collect(),
            creativity: crate::config::DEFAULT_CREATIVITY,
        }
    }
}

impl GenerationSelections {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sections.is_empty() {
            return Err(ValidationError::NoSectionsSelected);
        }
        validate_creativity(self.creativity)
    }
}

/// Creativity must lie in [0.0, 1.0]. NaN is rejected.
pub fn validate_creativity(creativity: f32) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&creativity) {
        Ok(())
    } else {
        Err(ValidationError::CreativityOutOfRange(creativity))
    }
}

/// Final prompt text for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt(String);

impl ComposedPrompt {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ComposedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_match_form() {
        let labels: Vec<_> = Category::all().iter().map(|c| c.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "General Practitioner",
                "Cardiologist",
                "Dermatologist",
                "Pediatrician",
                "Other"
            ]
        );
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("cardiologist".parse::<Category>().unwrap(), Category::Cardiologist);
        assert_eq!(
            " General Practitioner ".parse::<Category>().unwrap(),
            Category::GeneralPractitioner
        );
    }

    #[test]
    fn unknown_category_rejected() {
        let err = "Dentist".parse::<Category>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownCategory("Dentist".into()));
    }

    #[test]
    fn section_order_is_canonical() {
        let set: BTreeSet<Section> =
            [Section::Summary, Section::Explanation, Section::Questions].into_iter().collect();
        let ordered: Vec<_> = set.into_iter().collect();
        assert_eq!(
            ordered,
            vec![Section::Explanation, Section::Questions, Section::Summary]
        );
    }

    #[test]
    fn default_selections_enable_everything() {
        let selections = GenerationSelections::default();
        assert_eq!(selections.sections.len(), 3);
        assert_eq!(selections.category, Category::GeneralPractitioner);
        assert!(selections.validate().is_ok());
    }

    #[test]
    fn empty_sections_rejected() {
        let selections = GenerationSelections {
            sections: BTreeSet::new(),
            ..Default::default()
        };
        assert_eq!(selections.validate(), Err(ValidationError::NoSectionsSelected));
    }

    #[test]
    fn creativity_bounds() {
        assert!(validate_creativity(0.0).is_ok());
        assert!(validate_creativity(1.0).is_ok());
        assert!(validate_creativity(-0.1).is_err());
        assert!(validate_creativity(1.1).is_err());
        assert!(validate_creativity(f32::NAN).is_err());
    }

    #[test]
    fn category_serializes_as_label() {
        let json = serde_json::to_string(&Category::GeneralPractitioner).unwrap();
        assert_eq!(json, "\"General Practitioner\"");
    }
}
