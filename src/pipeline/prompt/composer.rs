use super::templates::{section_block, PERSONA_PREAMBLE, SECTIONS_LEAD_IN};
use super::types::{ComposedPrompt, GenerationSelections, Section};
use super::ValidationError;

/// Build the generation prompt from symptom text, appointment category and
/// the enabled sections.
///
/// Pure: the same arguments always give byte-identical output. Section
/// blocks follow the canonical `Section::all()` order whatever order (or
/// duplication) the caller passes. The symptom text is embedded verbatim.
pub fn compose(
    text: &str,
    category: &str,
    sections: &[Section],
) -> Result<ComposedPrompt, ValidationError> {
    if text.is_empty() || category.is_empty() {
        return Err(ValidationError::MissingInput);
    }
    if sections.is_empty() {
        return Err(ValidationError::NoSectionsSelected);
    }

    let blocks: Vec<&str> = Section::all()
        .iter()
        .filter(|s| sections.contains(s))
        .map(|s| section_block(*s))
        .collect();

    let prompt = format!(
        "{PERSONA_PREAMBLE}\n\n\
The patient is going to a **{category}** appointment.\n\
Their symptoms are: {text}\n\n\
{SECTIONS_LEAD_IN}\n\n\
{blocks}",
        blocks = blocks.concat(),
    );

    Ok(ComposedPrompt::new(prompt))
}

/// `compose` driven by validated form selections.
pub fn compose_from_selections(
    text: &str,
    selections: &GenerationSelections,
) -> Result<ComposedPrompt, ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::MissingInput);
    }
    selections.validate()?;

    let sections: Vec<Section> = selections.sections.iter().copied().collect();
    compose(text, selections.category.as_str(), &sections)
}
