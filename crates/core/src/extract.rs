//! Plain-text extraction of whole slides, used as keyword-service input.

use crate::types::{Presentation, Slide};

/// Flatten a slide into one string.
///
/// Every run of every paragraph of every text-bearing shape contributes its
/// text followed by a single space; the result is trimmed. Shapes without a
/// text frame contribute nothing.
pub fn slide_text(slide: &Slide) -> String {
    let mut text = String::new();

    for paragraph in slide.paragraphs() {
        for run in paragraph.runs() {
            text.push_str(&run.text);
            text.push(' ');
        }
    }

    text.trim().to_string()
}

/// Extract `(slide number, text)` for every slide, in presentation order.
pub fn presentation_texts(presentation: &Presentation) -> Vec<(usize, String)> {
    presentation
        .slides
        .iter()
        .map(|slide| (slide.number, slide_text(slide)))
        .collect()
}
