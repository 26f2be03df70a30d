//! In-memory OOXML package: ZIP parts, relationships, and slide order.

use quick_xml::events::Event;
use quick_xml::Reader;
use slidemark_core::{Error, Result};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOCATED_PART: usize = 16 * 1024 * 1024;

/// Buffer size to reserve for a part whose header declares `declared` bytes.
/// The header is untrusted, so the reservation is capped.
fn initial_capacity(declared: u64) -> usize {
    usize::try_from(declared)
        .unwrap_or(usize::MAX)
        .min(MAX_PREALLOCATED_PART)
}

/// Whether the leading bytes look like a ZIP container (PK\x03\x04).
pub fn looks_like_pptx(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04])
}

/// One entry of the ZIP archive, kept verbatim.
#[derive(Debug, Clone)]
struct PackagePart {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

/// Every part of a .pptx archive, held in memory in archive order.
#[derive(Debug, Clone)]
pub struct PptxPackage {
    parts: Vec<PackagePart>,
}

impl PptxPackage {
    /// Read a whole package from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", index, e)))?;

            let name = file.name().to_string();
            let mut data = Vec::with_capacity(initial_capacity(file.size()));
            file.read_to_end(&mut data)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", name, e)))?;

            parts.push(PackagePart {
                is_dir: file.is_dir(),
                compression: file.compression(),
                name,
                data,
            });
        }

        log::debug!("Loaded package with {} parts", parts.len());
        Ok(Self { parts })
    }

    /// Raw bytes of a part, if present.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// A part decoded as UTF-8 text.
    pub fn part_str(&self, name: &str) -> Result<&str> {
        let data = self
            .part(name)
            .ok_or_else(|| Error::PptxParseError(format!("File not found in archive '{}'", name)))?;
        std::str::from_utf8(data)
            .map_err(|e| Error::CorruptedFile(format!("'{}' is not valid UTF-8: {}", name, e)))
    }

    /// Names of all parts, in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Slide part paths in presentation order.
    ///
    /// Uses the slide id list of `ppt/presentation.xml`, resolved through the
    /// presentation relationships. Falls back to the numbers found in the
    /// relationship ids or targets when the id list is missing.
    pub fn slide_paths(&self) -> Result<Vec<String>> {
        let rels = self.presentation_relationships()?;

        let ordered_ids = match self.part(PRESENTATION_PART) {
            Some(_) => slide_id_order(self.part_str(PRESENTATION_PART)?)?,
            None => Vec::new(),
        };

        if !ordered_ids.is_empty() {
            let mut paths = Vec::with_capacity(ordered_ids.len());
            for id in &ordered_ids {
                match rels.iter().find(|r| &r.id == id && r.is_slide()) {
                    Some(rel) => paths.push(resolve_target(&rel.target)),
                    None => log::warn!("Slide relationship '{}' not found, skipping", id),
                }
            }
            return Ok(paths);
        }

        log::debug!("No slide id list, ordering slides by relationship numbers");
        let mut slides: Vec<(String, Option<usize>)> = rels
            .iter()
            .filter(|r| r.is_slide())
            .map(|r| {
                let order_num = extract_slide_number(&r.id).or_else(|| extract_slide_number(&r.target));
                (resolve_target(&r.target), order_num)
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Write the package, substituting the bytes of any part named in `replacements`.
    pub fn write_to<W: Write + Seek>(
        &self,
        writer: W,
        replacements: &HashMap<String, Vec<u8>>,
    ) -> Result<W> {
        let mut zip = ZipWriter::new(writer);

        for part in &self.parts {
            let method = match part.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = FileOptions::default().compression_method(method);

            if part.is_dir {
                zip.add_directory(part.name.as_str(), options)
                    .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", part.name, e)))?;
                continue;
            }

            let data = replacements.get(&part.name).unwrap_or(&part.data);
            zip.start_file(part.name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", part.name, e)))?;
            zip.write_all(data)
                .map_err(|e| Error::PptxWriteError(format!("Failed to write '{}': {}", part.name, e)))?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))
    }

    /// Save to `path` through a sibling temporary file, so a failed save
    /// never leaves a partial file at `path`.
    pub fn save(&self, path: &Path, replacements: &HashMap<String, Vec<u8>>) -> Result<()> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "presentation.pptx".to_string());
        let temp_path = path.with_file_name(format!(".{}.tmp", filename));

        let result = self.write_file(&temp_path, replacements).and_then(|()| {
            fs::rename(&temp_path, path)?;
            Ok(())
        });

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    fn write_file(&self, path: &Path, replacements: &HashMap<String, Vec<u8>>) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = self.write_to(BufWriter::new(file), replacements)?;
        writer.flush()?;
        Ok(())
    }

    fn presentation_relationships(&self) -> Result<Vec<Relationship>> {
        parse_relationships(self.part_str(PRESENTATION_RELS_PART)?)
    }
}

/// A `<Relationship>` entry of a .rels part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

impl Relationship {
    fn is_slide(&self) -> bool {
        self.rel_type.ends_with("/slide")
    }
}

fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut rels = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut rel = Relationship::default();
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"Id" => rel.id = value,
                        b"Type" => rel.rel_type = value,
                        b"Target" => rel.target = value,
                        _ => {}
                    }
                }
                rels.push(rel);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(rels)
}

/// Relationship ids of `<p:sldId r:id="...">` entries, in document order.
fn slide_id_order(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                let rel_id = e.attributes().flatten().find_map(|attr| {
                    let key = attr.key.as_ref();
                    let namespaced = key.contains(&b':');
                    (namespaced && local_name(key) == b"id")
                        .then(|| String::from_utf8_lossy(&attr.value).to_string())
                });
                if let Some(id) = rel_id {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation.xml: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Turn a relationship target relative to `ppt/` into an archive path.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        format!("ppt/{}", target)
    }
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
