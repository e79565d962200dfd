use docx_rs::{
    read_docx, DocumentChild, InsertChild, MoveToChild, Paragraph, ParagraphChild, Run, RunChild,
    StructuredDataTag, StructuredDataTagChild,
};

use super::types::DocxTextSource;
use super::ExtractionError;

/// DOCX paragraph extractor using the docx-rs crate.
///
/// Walks top-level body paragraphs only; tables and other block elements
/// are not paragraphs and contribute nothing. Empty paragraphs are kept.
pub struct DocxParagraphExtractor;

impl DocxTextSource for DocxParagraphExtractor {
    fn paragraph_texts(&self, docx_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        // docx-rs unwraps zip read errors, so a bad deflate stream or CRC panics
        let outcome = std::panic::catch_unwind(|| read_docx(docx_bytes));
        let docx = match outcome {
            Ok(result) => result.map_err(|e| ExtractionError::ExtractionFailed(format!("{e:?}")))?,
            Err(_) => {
                return Err(ExtractionError::ExtractionFailed(
                    "DOCX archive is corrupt".into(),
                ))
            }
        };

        let paragraphs = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
                _ => None,
            })
            .collect();

        Ok(paragraphs)
    }
}

/// Visible text of a paragraph. Runs are concatenated without a separator,
/// including runs nested in hyperlinks, tracked insertions, moves and inline
/// content controls. Deleted and moved-from text is left out.
fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    push_children(&para.children, &mut text);
    text
}

fn push_children(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, text),
            ParagraphChild::Hyperlink(link) => push_children(&link.children, text),
            ParagraphChild::Insert(ins) => {
                for c in &ins.children {
                    if let InsertChild::Run(run) = c {
                        push_run(run, text);
                    }
                }
            }
            ParagraphChild::MoveTo(moved) => {
                for c in &moved.children {
                    if let MoveToChild::Run(run) = c {
                        push_run(run, text);
                    }
                }
            }
            ParagraphChild::StructuredDataTag(tag) => push_tag(tag, text),
            _ => {}
        }
    }
}

fn push_tag(tag: &StructuredDataTag, text: &mut String) {
    for child in &tag.children {
        match child {
            StructuredDataTagChild::Run(run) => push_run(run, text),
            StructuredDataTagChild::StructuredDataTag(inner) => push_tag(inner, text),
            _ => {}
        }
    }
}

fn push_run(run: &Run, text: &mut String) {
    for run_child in &run.children {
        match run_child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            _ => {}
        }
    }
}
