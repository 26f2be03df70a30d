//! PPTX (Office Open XML) backend for slide keyword highlighting.
//!
//! Loads .pptx files (ZIP archives containing XML documents) into the core
//! slide model and writes highlighted paragraphs back, leaving every other
//! byte of the package as it was.

pub mod document;
pub mod package;
pub mod parser;
pub mod writer;

#[cfg(test)]
mod fixtures;

pub use document::PptxDocument;
pub use package::{looks_like_pptx, PptxPackage};
pub use parser::{parse_slide_xml, ParagraphSource, ParsedSlide};
