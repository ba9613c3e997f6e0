//! PPTX reader.
//!
//! A `.pptx` file is an OPC zip package. Slide order comes from the
//! `sldIdLst` in `ppt/presentation.xml`, resolved through the presentation's
//! relationships; packages without a usable list fall back to the numeric
//! order of `ppt/slides/slideN.xml`. Speaker notes live in a separate
//! notes-slide part linked from each slide's relationships.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sc_core::Slide;
use zip::result::ZipError;
use zip::ZipArchive;

const PRESENTATION: &str = "ppt/presentation.xml";
const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";
const SLIDE_REL: &str = "/slide";
const NOTES_REL: &str = "/notesSlide";

/// Read every slide of the deck at `path`, in presentation order.
///
/// `content` and `notes` switch off body-text and speaker-notes extraction.
/// Narration is left empty.
pub fn read_pptx(path: &Path, content: bool, notes: bool) -> sc_core::Result<Vec<Slide>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| bad_package(path, e))?;

    let parts = slide_parts(&mut archive).map_err(|e| bad_package(path, e))?;
    let mut slides = Vec::with_capacity(parts.len());

    for (index, part) in parts.iter().enumerate() {
        let slide_number = index as u32 + 1;
        let Some(xml) = read_part(&mut archive, part).map_err(|e| bad_package(path, e))? else {
            tracing::warn!("Slide part {part} listed but missing; skipping");
            continue;
        };
        let shapes = parse_shapes(&xml).map_err(|e| bad_package(path, e))?;

        let title = shapes
            .iter()
            .find(|s| s.is_title())
            .map(Shape::text)
            .unwrap_or_default();
        let body = if content {
            shapes
                .iter()
                .filter(|s| !s.is_title())
                .map(Shape::text)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            String::new()
        };
        let speaker_notes = if notes {
            notes_text(&mut archive, part).map_err(|e| bad_package(path, e))?
        } else {
            String::new()
        };

        tracing::debug!(slide = slide_number, "extracted {part}: {title:?}");
        slides.push(Slide::new(slide_number, title, body, speaker_notes));
    }

    // Numbers stay contiguous even if a listed part was missing.
    for (i, slide) in slides.iter_mut().enumerate() {
        slide.slide_number = i as u32 + 1;
    }
    Ok(slides)
}

fn bad_package(path: &Path, e: impl std::fmt::Display) -> sc_core::Error {
    sc_core::Error::Input(format!(
        "cannot read presentation {}: {e}",
        path.display()
    ))
}

type PartResult<T> = Result<T, String>;

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> PartResult<Option<String>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.to_string()),
    };
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| format!("{name}: {e}"))?;
    Ok(Some(xml))
}

/// Slide part names in presentation order.
fn slide_parts<R: Read + Seek>(archive: &mut ZipArchive<R>) -> PartResult<Vec<String>> {
    let listed = match (
        read_part(archive, PRESENTATION)?,
        read_part(archive, PRESENTATION_RELS)?,
    ) {
        (Some(pres), Some(rels)) => {
            let targets = relationships(&rels, "ppt")?;
            slide_id_list(&pres)?
                .into_iter()
                .filter_map(|rid| {
                    targets
                        .get(&rid)
                        .filter(|(kind, _)| kind.ends_with(SLIDE_REL))
                        .map(|(_, target)| target.clone())
                })
                .collect()
        }
        _ => Vec::new(),
    };
    if !listed.is_empty() {
        return Ok(listed);
    }

    let mut numbered: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let n = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse()
                .ok()?;
            Some((n, name.to_string()))
        })
        .collect();
    numbered.sort();
    Ok(numbered.into_iter().map(|(_, name)| name).collect())
}

/// Relationship ids of `<p:sldId>` entries, in document order.
fn slide_id_list(xml: &str) -> PartResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut ids = Vec::new();
    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldId" => {
                if let Some(rid) = attr(&e, b"id", true) {
                    ids.push(rid);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(ids)
}

/// Map of relationship id to `(type, resolved part name)`.
///
/// `base` is the directory of the source part; targets are resolved
/// against it.
fn relationships(xml: &str, base: &str) -> PartResult<HashMap<String, (String, String)>> {
    let mut reader = Reader::from_str(xml);
    let mut rels = HashMap::new();
    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(kind), Some(target)) = (
                    attr(&e, b"Id", false),
                    attr(&e, b"Type", false),
                    attr(&e, b"Target", false),
                ) {
                    rels.insert(id, (kind, resolve_part(base, &target)));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rels)
}

/// Value of attribute `name`. With `prefixed`, only an attribute carrying a
/// namespace prefix matches (`r:id`, not `id`).
fn attr(e: &BytesStart<'_>, name: &[u8], prefixed: bool) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        let matches = a.key.local_name().as_ref() == name && (!prefixed || a.key.prefix().is_some());
        if matches {
            a.unescape_value().ok().map(|v| v.into_owned())
        } else {
            None
        }
    })
}

/// Resolve a relationship target against the source part's directory.
fn resolve_part(base: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Notes text for the slide part `slide`, or empty when it has none.
fn notes_text<R: Read + Seek>(archive: &mut ZipArchive<R>, slide: &str) -> PartResult<String> {
    let (dir, file) = slide.rsplit_once('/').unwrap_or(("", slide));
    let rels_name = format!("{dir}/_rels/{file}.rels");
    let Some(rels) = read_part(archive, &rels_name)? else {
        return Ok(String::new());
    };
    let notes_part = relationships(&rels, dir)?
        .into_values()
        .find(|(kind, _)| kind.ends_with(NOTES_REL))
        .map(|(_, target)| target);
    let Some(notes_part) = notes_part else {
        return Ok(String::new());
    };
    let Some(xml) = read_part(archive, &notes_part)? else {
        return Ok(String::new());
    };
    Ok(parse_shapes(&xml)?
        .iter()
        .find(|s| s.placeholder.as_deref() == Some("body"))
        .map(Shape::text)
        .unwrap_or_default())
}

/// A text-bearing shape (`<p:sp>`) on a slide.
#[derive(Debug, Default)]
struct Shape {
    /// Placeholder type; `<p:ph/>` without a type is a body placeholder.
    placeholder: Option<String>,
    paragraphs: Vec<String>,
}

impl Shape {
    fn is_title(&self) -> bool {
        matches!(self.placeholder.as_deref(), Some("title") | Some("ctrTitle"))
    }

    fn text(&self) -> String {
        self.paragraphs.join("\n").trim().to_string()
    }
}

fn parse_shapes(xml: &str) -> PartResult<Vec<Shape>> {
    let mut reader = Reader::from_str(xml);
    let mut shapes = Vec::new();
    let mut stack: Vec<Shape> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"sp" => stack.push(Shape::default()),
                b"ph" => set_placeholder(&mut stack, &e),
                b"p" => {
                    if let Some(shape) = stack.last_mut() {
                        shape.paragraphs.push(String::new());
                    }
                }
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"ph" => set_placeholder(&mut stack, &e),
                b"br" => push_text(&mut stack, "\n"),
                b"p" => {
                    if let Some(shape) = stack.last_mut() {
                        shape.paragraphs.push(String::new());
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(|e| e.to_string())?;
                push_text(&mut stack, &text);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"sp" => {
                    if let Some(shape) = stack.pop() {
                        shapes.push(shape);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(shapes)
}

fn set_placeholder(stack: &mut [Shape], e: &BytesStart<'_>) {
    if let Some(shape) = stack.last_mut() {
        shape.placeholder = Some(attr(e, b"type", false).unwrap_or_else(|| "body".into()));
    }
}

fn push_text(stack: &mut [Shape], text: &str) {
    if let Some(shape) = stack.last_mut() {
        match shape.paragraphs.last_mut() {
            Some(p) => p.push_str(text),
            None => shape.paragraphs.push(text.to_string()),
        }
    }
}
