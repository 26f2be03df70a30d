//! Keyword highlighting of paragraphs.
//!
//! A paragraph is matched on its flattened text (run texts concatenated with
//! no separator), so a keyword may span several input runs. When at least one
//! match survives overlap resolution the paragraph is cleared and rebuilt as
//! alternating plain and highlighted runs covering every original character
//! exactly once. Paragraphs without matches keep their original runs.

use std::collections::HashSet;

use crate::matcher::WordMatcher;
use crate::types::{Paragraph, Rgb, Run, Slide};

/// Two highlight colors, picked by keyword rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; 2],
}

impl Palette {
    /// Create a palette that alternates between `first` and `second`.
    pub fn new(first: Rgb, second: Rgb) -> Self {
        Self {
            colors: [first, second],
        }
    }

    /// Color for the keyword at `rank` (its index in the keyword list).
    pub fn color_for(&self, rank: usize) -> Rgb {
        self.colors[rank % 2]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(Rgb::RED, Rgb::GREEN)
    }
}

/// One keyword occurrence in a paragraph's flattened text.
///
/// Offsets are byte offsets; `text` is the source substring with its
/// original casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub color: Rgb,
}

#[derive(Debug)]
struct RankedKeyword {
    rank: usize,
    matcher: WordMatcher,
}

/// Highlighting state for a single slide.
///
/// Each keyword is highlighted in at most one paragraph per slide: the first
/// paragraph (in processing order) that contains it. Create a new highlighter
/// for every slide.
#[derive(Debug)]
pub struct SlideHighlighter {
    keywords: Vec<RankedKeyword>,
    palette: Palette,
    highlighted: HashSet<String>,
}

impl SlideHighlighter {
    /// Build a highlighter for `keywords`, ranked by their position in the list.
    pub fn new<S: AsRef<str>>(keywords: &[S], palette: Palette) -> Self {
        let keywords = keywords
            .iter()
            .enumerate()
            .filter_map(|(rank, keyword)| {
                WordMatcher::new(keyword.as_ref()).map(|matcher| RankedKeyword { rank, matcher })
            })
            .collect();

        Self {
            keywords,
            palette,
            highlighted: HashSet::new(),
        }
    }

    /// Highlight every paragraph of the slide in shape-then-paragraph order.
    ///
    /// Returns the number of highlighted runs emitted.
    pub fn highlight_slide(&mut self, slide: &mut Slide) -> usize {
        slide
            .paragraphs_mut()
            .map(|paragraph| self.highlight_paragraph(paragraph))
            .sum()
    }

    /// Highlight one paragraph, returning the number of highlighted runs emitted.
    pub fn highlight_paragraph(&mut self, paragraph: &mut Paragraph) -> usize {
        let text = paragraph.text();
        if text.trim().is_empty() {
            return 0;
        }

        let selected = self.select_keywords(&text);
        if selected.is_empty() {
            return 0;
        }

        let spans = resolve_overlaps(find_spans(&text, &selected));
        if spans.is_empty() {
            return 0;
        }

        paragraph.clear();
        for run in rebuild_runs(&text, &spans) {
            paragraph.add_run(run);
        }

        spans.len()
    }

    /// Lower-cased keywords already consumed on this slide.
    pub fn highlighted_keywords(&self) -> impl Iterator<Item = &str> {
        self.highlighted.iter().map(String::as_str)
    }

    /// Pick the keywords not yet used on this slide that occur in `text`,
    /// marking them as used.
    fn select_keywords(&mut self, text: &str) -> Vec<(&WordMatcher, Rgb)> {
        let Self {
            keywords,
            palette,
            highlighted,
        } = self;

        let mut selected = Vec::new();
        for keyword in keywords.iter() {
            let key = keyword.matcher.keyword().to_lowercase();
            if highlighted.contains(&key) || !keyword.matcher.is_match(text) {
                continue;
            }
            highlighted.insert(key);
            selected.push((&keyword.matcher, palette.color_for(keyword.rank)));
        }
        selected
    }
}

/// Every occurrence of every selected keyword, sorted by start offset.
///
/// The sort is stable: spans starting at the same offset keep keyword order.
pub fn find_spans(text: &str, selected: &[(&WordMatcher, Rgb)]) -> Vec<MatchSpan> {
    let mut spans: Vec<MatchSpan> = selected
        .iter()
        .flat_map(|(matcher, color)| {
            matcher.find_iter(text).map(move |m| MatchSpan {
                start: m.start(),
                end: m.end(),
                text: m.as_str().to_string(),
                color: *color,
            })
        })
        .collect();

    spans.sort_by_key(|span| span.start);
    spans
}

/// Keep spans left to right, dropping any that starts before an accepted span ends.
///
/// `spans` must be sorted by start offset.
pub fn resolve_overlaps(spans: Vec<MatchSpan>) -> Vec<MatchSpan> {
    let mut accepted: Vec<MatchSpan> = Vec::with_capacity(spans.len());
    let mut covered_until = 0;

    for span in spans {
        if span.start < covered_until {
            continue;
        }
        covered_until = covered_until.max(span.end);
        accepted.push(span);
    }

    accepted
}

/// Runs covering all of `text`: plain runs for the gaps, highlighted runs for the spans.
///
/// `spans` must be sorted and non-overlapping.
pub fn rebuild_runs(text: &str, spans: &[MatchSpan]) -> Vec<Run> {
    let mut runs = Vec::with_capacity(spans.len() * 2 + 1);
    let mut last = 0;

    for span in spans {
        if span.start > last {
            runs.push(Run::plain(&text[last..span.start]));
        }
        runs.push(Run::highlighted(&text[span.start..span.end], span.color));
        last = span.end;
    }

    if last < text.len() {
        runs.push(Run::plain(&text[last..]));
    }

    runs
}
