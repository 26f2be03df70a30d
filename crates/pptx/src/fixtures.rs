//! Small in-memory packages for tests.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const SLIDE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

pub struct FixtureSlide {
    pub rel_id: &'static str,
    pub target: &'static str,
    pub xml: String,
}

impl FixtureSlide {
    pub fn new(rel_id: &'static str, target: &'static str, xml: impl Into<String>) -> Self {
        Self {
            rel_id,
            target,
            xml: xml.into(),
        }
    }
}

/// Wrap shape XML in a slide document with the usual namespaces.
pub fn slide_xml(shapes: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
            r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
            r#"<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
            r#"<p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#
        ),
        shapes
    )
}

/// A text shape holding the given paragraph XML.
pub fn text_shape(id: u32, paragraphs: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#
    )
}

/// Build a .pptx archive. `order` lists relationship ids for the slide id
/// list of `ppt/presentation.xml`; `None` leaves the list out.
pub fn build_package(slides: &[FixtureSlide], order: Option<&[&str]>) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let deflated = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut add = |name: &str, content: &str| {
        zip.start_file(name, deflated).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    };

    add(
        "[Content_Types].xml",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#,
    );

    let sld_id_lst = order
        .map(|ids| {
            let entries: String = ids
                .iter()
                .enumerate()
                .map(|(i, id)| format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, id))
                .collect();
            format!("<p:sldIdLst>{}</p:sldIdLst>", entries)
        })
        .unwrap_or_default();
    add(
        "ppt/presentation.xml",
        &format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">{}</p:presentation>"#,
            sld_id_lst
        ),
    );

    let rels: String = slides
        .iter()
        .map(|s| {
            format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                s.rel_id, SLIDE_REL_TYPE, s.target
            )
        })
        .collect();
    add(
        "ppt/_rels/presentation.xml.rels",
        &format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>{}</Relationships>"#,
            rels
        ),
    );

    for slide in slides {
        add(&format!("ppt/{}", slide.target), &slide.xml);
    }

    zip.finish().unwrap().into_inner()
}
