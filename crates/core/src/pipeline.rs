//! Slide-by-slide keyword highlighting of a whole presentation.

use std::path::{Path, PathBuf};

use crate::extract::presentation_texts;
use crate::highlight::{Palette, SlideHighlighter};
use crate::types::Presentation;

/// Suffix inserted before the extension of the output file.
pub const OUTPUT_SUFFIX: &str = "_highlighted";

/// Anything that can suggest study keywords for a slide.
///
/// Implementations never fail outward: any problem degrades to an empty list.
pub trait KeywordSource {
    /// Keywords for one slide's text, at most `max_keywords` of them, in preference order.
    fn keywords(&self, slide_number: usize, text: &str, max_keywords: usize) -> Vec<String>;
}

/// Settings for a highlighting pass.
#[derive(Debug, Clone)]
pub struct HighlightOptions {
    /// Number of keywords requested per slide.
    pub max_keywords: usize,

    /// Highlight colors, alternating by keyword rank.
    pub palette: Palette,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            max_keywords: 5,
            palette: Palette::default(),
        }
    }
}

/// Progress notifications, emitted in slide order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideEvent<'a> {
    /// The slide has no text and was skipped.
    NoText { slide: usize },
    /// Keywords are about to be requested for the slide.
    FetchingKeywords { slide: usize },
    /// Keywords received for the slide (possibly none).
    Keywords { slide: usize, keywords: &'a [String] },
    /// Highlighting finished for a slide that had keywords.
    Highlighted { slide: usize, count: usize },
}

/// What happened to one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideSummary {
    pub number: usize,
    pub text_found: bool,
    pub keywords: Vec<String>,
    pub highlights: usize,
}

/// Outcome of a highlighting pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSummary {
    pub slides: Vec<SlideSummary>,
    pub total_highlights: usize,
}

/// Fetch keywords for every slide with text and highlight them in place.
///
/// Slides are processed strictly in order, one request per slide at most.
/// Slides whose extracted text is empty are skipped without a request.
pub fn highlight_presentation<K, F>(
    presentation: &mut Presentation,
    source: &K,
    options: &HighlightOptions,
    mut progress: F,
) -> HighlightSummary
where
    K: KeywordSource + ?Sized,
    F: FnMut(SlideEvent<'_>),
{
    let texts = presentation_texts(presentation);
    let mut summary = HighlightSummary::default();

    for (slide, (number, text)) in presentation.slides.iter_mut().zip(texts) {
        if text.is_empty() {
            progress(SlideEvent::NoText { slide: number });
            summary.slides.push(SlideSummary {
                number,
                text_found: false,
                keywords: Vec::new(),
                highlights: 0,
            });
            continue;
        }

        progress(SlideEvent::FetchingKeywords { slide: number });
        let keywords = source.keywords(number, &text, options.max_keywords);
        progress(SlideEvent::Keywords {
            slide: number,
            keywords: &keywords,
        });

        let mut highlights = 0;
        if !keywords.is_empty() {
            highlights = SlideHighlighter::new(&keywords, options.palette).highlight_slide(slide);
            log::debug!("Slide {}: {} highlighted runs", number, highlights);
            progress(SlideEvent::Highlighted {
                slide: number,
                count: highlights,
            });
        }

        summary.total_highlights += highlights;
        summary.slides.push(SlideSummary {
            number,
            text_found: true,
            keywords,
            highlights,
        });
    }

    summary
}

/// Output path next to `input`: `deck.pptx` becomes `deck_highlighted.pptx`.
pub fn highlighted_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "presentation".to_string());

    let filename = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, OUTPUT_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}.pptx", stem, OUTPUT_SUFFIX),
    };

    input.with_file_name(filename)
}
