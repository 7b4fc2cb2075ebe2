pub mod classify;
pub mod html;
pub mod paragraphs;

use classify::ClassifiedFields;
use paragraphs::ExtractedText;

/// Paragraphs and derived fields of one AD document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub paragraphs: ExtractedText,
    pub fields: ClassifiedFields,
}

/// html → flat text → lettered paragraphs → classified fields.
pub fn process_html(html: &str) -> ParsedDocument {
    let text = html::flatten(html);
    let paragraphs = ExtractedText::from_text(&text);
    let fields = ClassifiedFields::from_paragraphs(&paragraphs);
    ParsedDocument { paragraphs, fields }
}
