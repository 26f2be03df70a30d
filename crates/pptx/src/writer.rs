//! Serialization of rebuilt paragraphs back into slide XML.

use quick_xml::escape::escape;
use slidemark_core::{Error, Paragraph, Result, Run};

use crate::parser::ParagraphSource;

/// Qualify a DrawingML element name with `prefix`.
fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

/// Serialize one run as `<a:r>`.
///
/// Plain runs carry no run properties; styled runs get `b` and a solid
/// fill with an explicit sRGB color.
pub fn render_run(prefix: &str, run: &Run) -> String {
    let r = qualified(prefix, "r");
    let r_pr = qualified(prefix, "rPr");
    let t = qualified(prefix, "t");

    let mut xml = format!("<{}>", r);

    let bold = run
        .style
        .bold
        .map(|b| format!(r#" b="{}""#, if b { 1 } else { 0 }))
        .unwrap_or_default();
    match run.style.color {
        Some(color) => {
            let fill = qualified(prefix, "solidFill");
            let clr = qualified(prefix, "srgbClr");
            xml.push_str(&format!(
                r#"<{r_pr}{bold}><{fill}><{clr} val="{hex}"/></{fill}></{r_pr}>"#,
                hex = color.to_hex()
            ));
        }
        None if !bold.is_empty() => {
            xml.push_str(&format!("<{}{}/>", r_pr, bold));
        }
        None => {}
    }

    xml.push_str(&format!("<{t}>{}</{t}>", escape(run.text.as_str())));
    xml.push_str(&format!("</{}>", r));
    xml
}

/// Serialize a rebuilt paragraph.
///
/// Retained children (paragraph properties, equations and other non-run
/// content) come first in their original order, then the new runs, then
/// the original end-of-paragraph properties.
pub fn render_paragraph(xml: &str, source: &ParagraphSource, paragraph: &Paragraph) -> String {
    let mut out = String::new();

    match &source.open_tag {
        Some(open) => out.push_str(&xml[open.clone()]),
        None => out.push_str(&format!("<{}>", qualified(&source.prefix, "p"))),
    }
    for child in &source.retained {
        out.push_str(&xml[child.clone()]);
    }
    for run in paragraph.runs() {
        out.push_str(&render_run(&source.prefix, run));
    }
    if let Some(end_properties) = &source.end_properties {
        out.push_str(&xml[end_properties.clone()]);
    }
    match &source.close_tag {
        Some(close) => out.push_str(&xml[close.clone()]),
        None => out.push_str(&format!("</{}>", qualified(&source.prefix, "p"))),
    }

    out
}

/// Rewrite slide XML, replacing every rebuilt paragraph and copying
/// everything else verbatim.
///
/// `paragraphs` must be the slide's paragraphs in the order they were parsed.
/// Returns `None` when nothing was rebuilt.
pub fn render_slide<'a, I>(
    xml: &str,
    sources: &[ParagraphSource],
    paragraphs: I,
) -> Result<Option<String>>
where
    I: IntoIterator<Item = &'a Paragraph>,
{
    let paragraphs: Vec<&Paragraph> = paragraphs.into_iter().collect();
    if paragraphs.len() != sources.len() {
        return Err(Error::PptxWriteError(format!(
            "Slide has {} paragraphs but {} were parsed",
            paragraphs.len(),
            sources.len()
        )));
    }

    if !paragraphs.iter().any(|p| p.is_rebuilt()) {
        return Ok(None);
    }

    let mut out = String::with_capacity(xml.len() + xml.len() / 4);
    let mut last = 0;
    for (source, paragraph) in sources.iter().zip(paragraphs) {
        if !paragraph.is_rebuilt() {
            continue;
        }
        out.push_str(&xml[last..source.range.start]);
        out.push_str(&render_paragraph(xml, source, paragraph));
        last = source.range.end;
    }
    out.push_str(&xml[last..]);

    Ok(Some(out))
}
