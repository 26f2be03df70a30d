//! A loaded .pptx: the core presentation plus what is needed to save it back.

use slidemark_core::{Error, Presentation, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::package::{looks_like_pptx, PptxPackage};
use crate::parser::{parse_slide_xml, ParagraphSource};
use crate::writer::render_slide;

/// Source XML of one slide part.
#[derive(Debug, Clone)]
struct SlidePart {
    path: String,
    xml: String,
    paragraphs: Vec<ParagraphSource>,
}

/// An open presentation document.
///
/// Edit paragraphs through [`PptxDocument::presentation_mut`]; saving writes
/// only the rebuilt paragraphs and copies every other part unchanged.
#[derive(Debug, Clone)]
pub struct PptxDocument {
    package: PptxPackage,
    presentation: Presentation,
    parts: Vec<SlidePart>,
}

impl PptxDocument {
    /// Open a .pptx file from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).map_err(|_| {
            Error::UnsupportedFormat(format!("{} is too short to be a .pptx", path.display()))
        })?;
        if !looks_like_pptx(&magic) {
            return Err(Error::UnsupportedFormat(format!(
                "{} is not an Office Open XML package",
                path.display()
            )));
        }
        reader.seek(SeekFrom::Start(0))?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");

        Self::from_reader(reader, filename)
    }

    /// Read a .pptx from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R, filename: &str) -> Result<Self> {
        let package = PptxPackage::from_reader(reader)?;
        let mut presentation = Presentation::new(filename);
        let mut parts = Vec::new();

        for (idx, slide_path) in package.slide_paths()?.into_iter().enumerate() {
            let xml = package.part_str(&slide_path)?.to_string();
            let parsed = parse_slide_xml(&xml, idx + 1)?;

            presentation.add_slide(parsed.slide);
            parts.push(SlidePart {
                path: slide_path,
                xml,
                paragraphs: parsed.paragraphs,
            });
        }

        log::debug!("Parsed {} slides from {}", parts.len(), filename);

        Ok(Self {
            package,
            presentation,
            parts,
        })
    }

    /// The parsed slide model.
    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// Mutable slide model. Rebuilt paragraphs are written back on save.
    pub fn presentation_mut(&mut self) -> &mut Presentation {
        &mut self.presentation
    }

    /// Save to `path`. The file appears only once it is completely written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let replacements = self.rendered_slides()?;
        self.package.save(path, &replacements)
    }

    /// Write the document to any seekable writer.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let replacements = self.rendered_slides()?;
        self.package.write_to(writer, &replacements)
    }

    /// New XML for every slide that has rebuilt paragraphs, keyed by part path.
    fn rendered_slides(&self) -> Result<HashMap<String, Vec<u8>>> {
        let mut replacements = HashMap::new();

        for (part, slide) in self.parts.iter().zip(&self.presentation.slides) {
            if let Some(xml) = render_slide(&part.xml, &part.paragraphs, slide.paragraphs())? {
                log::debug!("Rewriting {}", part.path);
                replacements.insert(part.path.clone(), xml.into_bytes());
            }
        }

        Ok(replacements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{build_package, slide_xml, text_shape, FixtureSlide};
    use slidemark_core::{slide_text, Palette, Paragraph, Rgb, SlideHighlighter};
    use std::io::Cursor;

    fn sample_package() -> Vec<u8> {
        let first = slide_xml(&[
            text_shape(2, r#"<a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="en-US" b="1"/><a:t>Neural networks</a:t></a:r></a:p>"#),
            r#"<p:pic><p:nvPicPr><p:cNvPr id="3" name="Diagram"/></p:nvPicPr></p:pic>"#.to_string(),
            text_shape(
                4,
                r#"<a:p><a:r><a:t>Back</a:t></a:r><a:r><a:t>propagation trains networks</a:t></a:r><a:endParaRPr lang="en-US"/></a:p><a:p><a:endParaRPr/></a:p>"#,
            ),
        ]
        .concat());
        let second = slide_xml("");
        let third = slide_xml(&text_shape(2, "<a:p><a:r><a:t>Summary: networks</a:t></a:r></a:p>"));

        build_package(
            &[
                FixtureSlide::new("rId2", "slides/slide1.xml", first),
                FixtureSlide::new("rId3", "slides/slide2.xml", second),
                FixtureSlide::new("rId4", "slides/slide3.xml", third),
            ],
            Some(&["rId2", "rId3", "rId4"][..]),
        )
    }

    #[test]
    fn test_slides_are_loaded_in_order() {
        let doc = PptxDocument::from_reader(Cursor::new(sample_package()), "deck.pptx").unwrap();
        let presentation = doc.presentation();

        assert_eq!(presentation.filename, "deck.pptx");
        assert_eq!(presentation.slides.len(), 3);
        assert_eq!(
            slide_text(&presentation.slides[0]),
            "Neural networks Back propagation trains networks"
        );
        assert_eq!(slide_text(&presentation.slides[1]), "");
        assert_eq!(presentation.slides[2].number, 3);
    }

    #[test]
    fn test_unmodified_document_roundtrips_parts() {
        let original = sample_package();
        let doc = PptxDocument::from_reader(Cursor::new(original.clone()), "deck.pptx").unwrap();
        let written = doc.write_to(Cursor::new(Vec::new())).unwrap().into_inner();

        let before = PptxPackage::from_reader(Cursor::new(original)).unwrap();
        let after = PptxPackage::from_reader(Cursor::new(written)).unwrap();
        for name in before.part_names() {
            assert_eq!(before.part(name), after.part(name), "part {} changed", name);
        }
    }

    #[test]
    fn test_highlights_survive_save_and_reload() {
        let mut doc = PptxDocument::from_reader(Cursor::new(sample_package()), "deck.pptx").unwrap();
        let keywords = ["backpropagation", "networks"];

        let mut total = 0;
        for slide in &mut doc.presentation_mut().slides {
            total += SlideHighlighter::new(&keywords, Palette::default()).highlight_slide(slide);
        }
        // "networks" goes to the title on slide 1 and to the summary on slide 3.
        assert_eq!(total, 3);

        let written = doc.write_to(Cursor::new(Vec::new())).unwrap().into_inner();
        let reloaded = PptxDocument::from_reader(Cursor::new(written.clone()), "deck.pptx").unwrap();

        let before: Vec<String> = doc
            .presentation()
            .slides
            .iter()
            .flat_map(|s| s.paragraphs().map(Paragraph::text))
            .collect();
        let after: Vec<String> = reloaded
            .presentation()
            .slides
            .iter()
            .flat_map(|s| s.paragraphs().map(Paragraph::text))
            .collect();
        assert_eq!(before, after);

        let body = reloaded.presentation().slides[0].paragraphs().nth(1).unwrap();
        let styled: Vec<(&str, Option<Rgb>, Option<bool>)> = body
            .runs()
            .iter()
            .map(|r| (r.text.as_str(), r.style.color, r.style.bold))
            .collect();
        assert_eq!(
            styled,
            vec![
                ("Backpropagation", Some(Rgb::RED), Some(true)),
                (" trains networks", None, None),
            ]
        );

        let package = PptxPackage::from_reader(Cursor::new(written)).unwrap();
        let slide1 = package.part_str("ppt/slides/slide1.xml").unwrap();
        assert!(slide1.contains(r#"<a:pPr algn="ctr"/>"#));
        assert!(slide1.contains(r#"<a:endParaRPr lang="en-US"/></a:p><a:p><a:endParaRPr/></a:p>"#));
        assert!(slide1.contains(r#"<p:cNvPr id="3" name="Diagram"/>"#));
    }

    #[test]
    fn test_save_writes_file_atomically() {
        let dir = std::env::temp_dir().join(format!("slidemark-save-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("deck.pptx");
        std::fs::write(&input, sample_package()).unwrap();

        let mut doc = PptxDocument::open(&input).unwrap();
        SlideHighlighter::new(&["summary"], Palette::default())
            .highlight_slide(&mut doc.presentation_mut().slides[2]);

        let output = dir.join("deck_highlighted.pptx");
        doc.save(&output).unwrap();

        let reopened = PptxDocument::open(&output).unwrap();
        let run = &reopened.presentation().slides[2].paragraphs().next().unwrap().runs()[0];
        assert_eq!(run.text, "Summary");
        assert_eq!(run.style.color, Some(Rgb::RED));
        assert!(!dir.join(".deck_highlighted.pptx.tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_non_zip_input_is_rejected() {
        let path = std::env::temp_dir().join(format!("slidemark-not-zip-{}.pptx", std::process::id()));
        std::fs::write(&path, b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1legacy").unwrap();

        let result = PptxDocument::open(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let result = PptxDocument::open(Path::new("/nonexistent/slidemark/deck.pptx"));
        assert!(matches!(result, Err(Error::IoError(_))));
    }
}
