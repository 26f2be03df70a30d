//! Domain types for representing presentation text and its styling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// An entire presentation, as far as its slide text is concerned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presentation {
    /// Original filename (without path).
    pub filename: String,

    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl Presentation {
    /// Create a new, empty presentation with the given filename.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            slides: Vec::new(),
        }
    }

    /// Add a slide to the presentation.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }
}

/// A single slide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based slide number.
    pub number: usize,

    /// Shapes in document order.
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// Create a new slide with the given number.
    pub fn new(number: usize) -> Self {
        Self {
            number,
            shapes: Vec::new(),
        }
    }

    /// Add a shape to this slide.
    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    /// All paragraphs of all text-bearing shapes, in shape-then-paragraph order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.shapes
            .iter()
            .filter_map(Shape::as_text_frame)
            .flat_map(|frame| frame.paragraphs.iter())
    }

    /// Mutable counterpart of [`Slide::paragraphs`].
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.shapes
            .iter_mut()
            .filter_map(Shape::as_text_frame_mut)
            .flat_map(|frame| frame.paragraphs.iter_mut())
    }
}

/// A shape on a slide. Only some shapes can hold text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    /// A shape with a text frame.
    Text(TextFrame),
    /// Pictures, tables, groups, connectors and anything else without its own text frame.
    Other,
}

impl Shape {
    /// The text frame of this shape, if it has one.
    pub fn as_text_frame(&self) -> Option<&TextFrame> {
        match self {
            Shape::Text(frame) => Some(frame),
            Shape::Other => None,
        }
    }

    /// Mutable access to the text frame of this shape, if it has one.
    pub fn as_text_frame_mut(&mut self) -> Option<&mut TextFrame> {
        match self {
            Shape::Text(frame) => Some(frame),
            Shape::Other => None,
        }
    }
}

/// The text body of a shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextFrame {
    pub paragraphs: Vec<Paragraph>,
}

impl TextFrame {
    /// Create a text frame holding `paragraphs`.
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }
}

/// An ordered sequence of runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    runs: Vec<Run>,

    /// Set once the paragraph has been cleared; writers re-emit rebuilt paragraphs.
    rebuilt: bool,
}

impl Paragraph {
    /// Create a paragraph from runs read out of a document.
    pub fn new(runs: Vec<Run>) -> Self {
        Self {
            runs,
            rebuilt: false,
        }
    }

    /// The paragraph's runs in reading order.
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Concatenated run text, with nothing inserted between runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Remove every run. The paragraph is considered rebuilt from here on.
    pub fn clear(&mut self) {
        self.runs.clear();
        self.rebuilt = true;
    }

    /// Append a run.
    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Whether the paragraph was cleared and rebuilt since it was read.
    pub fn is_rebuilt(&self) -> bool {
        self.rebuilt
    }
}

/// A contiguous span of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub style: RunStyle,
}

impl Run {
    /// A run with no explicit styling.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::default(),
        }
    }

    /// A bold run in the given color.
    pub fn highlighted(text: impl Into<String>, color: Rgb) -> Self {
        Self {
            text: text.into(),
            style: RunStyle {
                color: Some(color),
                bold: Some(true),
            },
        }
    }

    /// Create a run with an explicit style.
    pub fn with_style(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Character styling of a run. `None` means inherited from the paragraph or theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStyle {
    pub color: Option<Rgb>,
    pub bold: Option<bool>,
}

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Default color for keywords at even ranks, starting with rank 0.
    pub const RED: Rgb = Rgb(255, 0, 0);
    /// Default color for keywords at odd ranks.
    pub const GREEN: Rgb = Rgb(0, 150, 0);

    /// Upper-case hex form without a leading `#`, as used by `srgbClr`.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = Error;

    /// Parse `FF0000` or `#ff0000`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| Error::InvalidColor(s.to_string()))
        };
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex_roundtrip() {
        assert_eq!(Rgb::GREEN.to_hex(), "009600");
        assert_eq!("#ff0000".parse::<Rgb>().unwrap(), Rgb::RED);
        assert_eq!("009600".parse::<Rgb>().unwrap(), Rgb::GREEN);
    }

    #[test]
    fn test_rgb_rejects_bad_input() {
        assert!("F00".parse::<Rgb>().is_err());
        assert!("GG0000".parse::<Rgb>().is_err());
        assert!("".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_paragraph_text_has_no_separator() {
        let p = Paragraph::new(vec![Run::plain("Hel"), Run::plain("lo "), Run::plain("world")]);
        assert_eq!(p.text(), "Hello world");
        assert!(!p.is_rebuilt());
    }

    #[test]
    fn test_paragraph_clear_marks_rebuilt() {
        let mut p = Paragraph::new(vec![Run::plain("text")]);
        p.clear();
        assert!(p.runs().is_empty());
        assert!(p.is_rebuilt());
        p.add_run(Run::highlighted("text", Rgb::RED));
        assert_eq!(p.text(), "text");
    }

    #[test]
    fn test_slide_paragraphs_skip_other_shapes() {
        let mut slide = Slide::new(1);
        slide.add_shape(Shape::Other);
        slide.add_shape(Shape::Text(TextFrame::new(vec![
            Paragraph::new(vec![Run::plain("a")]),
            Paragraph::new(vec![Run::plain("b")]),
        ])));
        let texts: Vec<String> = slide.paragraphs().map(Paragraph::text).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }
}
