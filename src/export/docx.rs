//! Word-document rendering: one heading, one paragraph of transcript text.

use super::ExportError;
use docx_rs::{Docx, Paragraph, Run, Style, StyleType};
use std::fs::File;
use std::path::Path;

/// Heading text at the top of every exported document
pub const DOC_HEADING: &str = "Audio Transcript";

const HEADING_STYLE_ID: &str = "Heading1";

/// Build the document: a level-1 heading followed by a single paragraph
/// holding the full transcript.
fn build_docx(transcript_text: &str) -> Docx {
    Docx::new()
        .add_style(
            Style::new(HEADING_STYLE_ID, StyleType::Paragraph)
                .name("Heading 1")
                .size(32)
                .bold(),
        )
        .add_paragraph(
            Paragraph::new()
                .style(HEADING_STYLE_ID)
                .add_run(Run::new().add_text(DOC_HEADING)),
        )
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(transcript_text)))
}

/// Write the document to `path`, overwriting any prior file.
pub fn write_docx(transcript_text: &str, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    build_docx(transcript_text)
        .build()
        .pack(file)
        .map_err(|e| ExportError::Docx(e.to_string()))?;
    Ok(())
}
