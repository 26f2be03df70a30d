//! Core document model, text extraction, keyword matching, and paragraph
//! highlighting for study slides.

pub mod error;
pub mod extract;
pub mod highlight;
pub mod matcher;
pub mod pipeline;
pub mod types;

pub use error::{Error, Result};
pub use extract::{presentation_texts, slide_text};
pub use highlight::{MatchSpan, Palette, SlideHighlighter};
pub use matcher::WordMatcher;
pub use pipeline::{
    highlight_presentation, highlighted_output_path, HighlightOptions, HighlightSummary,
    KeywordSource, SlideEvent, SlideSummary,
};
pub use types::{Paragraph, Presentation, Rgb, Run, RunStyle, Shape, Slide, TextFrame};
