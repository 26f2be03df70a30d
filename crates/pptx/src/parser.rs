//! Slide XML parsing into the core slide model.
//!
//! Besides the model, parsing records where each paragraph lives in the
//! source XML so the writer can replace rebuilt paragraphs in place.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slidemark_core::{Error, Paragraph, Result, Rgb, Run, RunStyle, Shape, Slide, TextFrame};
use std::ops::Range;

use crate::package::local_name;

/// Location of one `<a:p>` element in the slide XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphSource {
    /// The whole element, start tag through end tag.
    pub range: Range<usize>,

    /// The start tag, or `None` for a self-closing `<a:p/>`.
    pub open_tag: Option<Range<usize>>,

    /// The end tag, or `None` for a self-closing `<a:p/>`.
    pub close_tag: Option<Range<usize>>,

    /// Children that survive a rebuild, in document order: `<a:pPr>` and
    /// anything else that is not a run, line break, field or `<a:endParaRPr>`.
    pub retained: Vec<Range<usize>>,

    /// `<a:endParaRPr>` end-of-paragraph run properties.
    pub end_properties: Option<Range<usize>>,

    /// Namespace prefix used for DrawingML elements (usually `a`).
    pub prefix: String,
}

/// A parsed slide together with the source location of each of its paragraphs,
/// in the same order as [`Slide::paragraphs`].
#[derive(Debug, Clone)]
pub struct ParsedSlide {
    pub slide: Slide,
    pub paragraphs: Vec<ParagraphSource>,
}

/// Top-level children of `<p:spTree>` that are not shapes.
const TREE_PROPERTIES: &[&[u8]] = &[b"nvGrpSpPr", b"grpSpPr", b"extLst"];

#[derive(Debug, Default)]
struct ParagraphBuilder {
    start: usize,
    open_tag: Range<usize>,
    retained: Vec<Range<usize>>,
    end_properties: Option<Range<usize>>,
    prefix: String,
    runs: Vec<Run>,
    /// Start of the direct child element currently open.
    open_child: Option<usize>,
}

#[derive(Debug, Default)]
struct RunBuilder {
    text: String,
    style: RunStyle,
    in_text: bool,
}

#[derive(Debug, Default)]
struct SlideParser {
    slide_paragraphs: Vec<ParagraphSource>,
    shapes: Vec<Shape>,
    /// Local names of the currently open elements.
    stack: Vec<Vec<u8>>,
    /// Paragraphs of the top-level `<p:sp>` being read; `None` outside such a shape.
    shape: Option<Option<Vec<Paragraph>>>,
    paragraph: Option<ParagraphBuilder>,
    run: Option<RunBuilder>,
}

/// Parse slide XML into a [`Slide`] numbered `number`.
///
/// Only top-level `<p:sp>` shapes with a `<p:txBody>` become text shapes;
/// pictures, tables, connectors and groups (including the shapes inside them)
/// are [`Shape::Other`]. Paragraph text comes from `<a:r>` runs only.
pub fn parse_slide_xml(xml: &str, number: usize) -> Result<ParsedSlide> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut parser = SlideParser::default();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("Slide {}: {}", number, e)))?;
        let end = reader.buffer_position();

        match event {
            Event::Start(ref e) => {
                let start = tag_start(xml, end);
                parser.open(e, start..end, false)?;
                parser.stack.push(local_name(e.name().as_ref()).to_vec());
            }
            Event::Empty(ref e) => {
                let start = tag_start(xml, end);
                parser.open(e, start..end, true)?;
            }
            Event::End(ref e) => {
                parser.stack.pop();
                let start = tag_start(xml, end);
                parser.close(local_name(e.name().as_ref()), start..end);
            }
            Event::Text(ref e) => {
                if let Some(run) = parser.run.as_mut().filter(|r| r.in_text) {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::XmlError(format!("Slide {}: {}", number, e)))?;
                    run.text.push_str(&text);
                }
            }
            Event::CData(ref e) => {
                if let Some(run) = parser.run.as_mut().filter(|r| r.in_text) {
                    run.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut slide = Slide::new(number);
    for shape in parser.shapes {
        slide.add_shape(shape);
    }

    log::debug!(
        "Slide {}: {} shapes, {} paragraphs",
        number,
        slide.shapes.len(),
        parser.slide_paragraphs.len()
    );

    Ok(ParsedSlide {
        slide,
        paragraphs: parser.slide_paragraphs,
    })
}

impl SlideParser {
    fn parent(&self) -> &[u8] {
        self.stack.last().map(Vec::as_slice).unwrap_or_default()
    }

    fn grandparent(&self) -> &[u8] {
        self.stack
            .len()
            .checked_sub(2)
            .map(|i| self.stack[i].as_slice())
            .unwrap_or_default()
    }

    fn open(&mut self, e: &BytesStart<'_>, tag: Range<usize>, empty: bool) -> Result<()> {
        let qualified = e.name();
        let name = local_name(qualified.as_ref());

        if self.parent() == b"spTree" {
            if TREE_PROPERTIES.iter().any(|p| *p == name) {
                return Ok(());
            }
            if name == b"sp" && !empty {
                self.shape = Some(None);
            } else {
                self.shapes.push(Shape::Other);
            }
            return Ok(());
        }

        match name {
            b"txBody" if self.parent() == b"sp" => {
                if let Some(body) = self.shape.as_mut() {
                    body.get_or_insert_with(Vec::new);
                }
            }
            b"p" if self.parent() == b"txBody" && self.shape.is_some() => {
                let prefix = qualified
                    .prefix()
                    .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
                    .unwrap_or_default();
                if empty {
                    self.finish_paragraph(
                        Paragraph::new(Vec::new()),
                        ParagraphSource {
                            range: tag,
                            open_tag: None,
                            close_tag: None,
                            retained: Vec::new(),
                            end_properties: None,
                            prefix,
                        },
                    );
                } else {
                    self.paragraph = Some(ParagraphBuilder {
                        start: tag.start,
                        open_tag: tag,
                        prefix,
                        ..ParagraphBuilder::default()
                    });
                }
            }
            b"r" if self.parent() == b"p" && self.paragraph.is_some() => {
                self.run = Some(RunBuilder::default());
            }
            _ if self.parent() == b"p" => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    if empty {
                        paragraph.keep_child(name, tag);
                    } else {
                        paragraph.open_child = Some(tag.start);
                    }
                }
            }
            b"rPr" if self.parent() == b"r" => {
                if let Some(run) = self.run.as_mut() {
                    run.style.bold = read_bold(e)?;
                }
            }
            b"srgbClr" if self.parent() == b"solidFill" && self.grandparent() == b"rPr" => {
                if let Some(run) = self.run.as_mut() {
                    run.style.color = read_color(e)?;
                }
            }
            b"t" if self.parent() == b"r" && !empty => {
                if let Some(run) = self.run.as_mut() {
                    run.in_text = true;
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn close(&mut self, name: &[u8], tag: Range<usize>) {
        match name {
            b"t" => {
                if let Some(run) = self.run.as_mut() {
                    run.in_text = false;
                }
            }
            b"r" if self.parent() == b"p" => {
                if let (Some(run), Some(paragraph)) = (self.run.take(), self.paragraph.as_mut()) {
                    paragraph.runs.push(Run::with_style(run.text, run.style));
                }
            }
            b"p" if self.parent() == b"txBody" => {
                if let Some(builder) = self.paragraph.take() {
                    let source = ParagraphSource {
                        range: builder.start..tag.end,
                        open_tag: Some(builder.open_tag),
                        close_tag: Some(tag),
                        retained: builder.retained,
                        end_properties: builder.end_properties,
                        prefix: builder.prefix,
                    };
                    self.finish_paragraph(Paragraph::new(builder.runs), source);
                }
            }
            b"sp" if self.parent() == b"spTree" => {
                let shape = match self.shape.take() {
                    Some(Some(paragraphs)) => Shape::Text(TextFrame::new(paragraphs)),
                    _ => Shape::Other,
                };
                self.shapes.push(shape);
            }
            _ if self.parent() == b"p" => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    if let Some(start) = paragraph.open_child.take() {
                        paragraph.keep_child(name, start..tag.end);
                    }
                }
            }
            _ => {}
        }
    }

    fn finish_paragraph(&mut self, paragraph: Paragraph, source: ParagraphSource) {
        if let Some(Some(paragraphs)) = self.shape.as_mut() {
            paragraphs.push(paragraph);
            self.slide_paragraphs.push(source);
        }
    }
}

impl ParagraphBuilder {
    /// Record a closed direct child. Line breaks and fields are dropped
    /// along with the runs when the paragraph is rebuilt.
    fn keep_child(&mut self, name: &[u8], range: Range<usize>) {
        match name {
            b"br" | b"fld" => {}
            b"endParaRPr" => self.end_properties = Some(range),
            _ => self.retained.push(range),
        }
    }
}

/// Position of the `<` opening the tag that ends at `end`.
fn tag_start(xml: &str, end: usize) -> usize {
    xml[..end].rfind('<').unwrap_or(0)
}

fn read_bold(e: &BytesStart<'_>) -> Result<Option<bool>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::XmlError(format!("Bad run attribute: {}", e)))?;
        if attr.key.as_ref() == b"b" {
            return Ok(match attr.value.as_ref() {
                b"1" | b"true" | b"on" => Some(true),
                b"0" | b"false" | b"off" => Some(false),
                _ => None,
            });
        }
    }
    Ok(None)
}

fn read_color(e: &BytesStart<'_>) -> Result<Option<Rgb>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::XmlError(format!("Bad color attribute: {}", e)))?;
        if attr.key.as_ref() == b"val" {
            let value = String::from_utf8_lossy(&attr.value);
            return Ok(value.parse::<Rgb>().ok());
        }
    }
    Ok(None)
}
