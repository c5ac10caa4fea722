//! PPTX text extraction.
//!
//! A `.pptx` file is a ZIP archive of Open XML parts; the slides live in
//! `ppt/slides/slideN.xml`.  Extraction walks slides in ascending order and,
//! within each slide, every shape (`<p:sp>`) in its native order: a shape
//! with a text body (`<a:txBody>`) contributes its text (paragraphs joined
//! by `'\n'`) followed by a newline, a shape without one is skipped.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::ExtractError;

/// Extract the plain text of every slide, in slide order.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let cursor = Cursor::new(bytes);
    let mut archive = ZipArchive::new(cursor)
        .map_err(|e| ExtractError::Slides(format!("not a PPTX archive: {e}")))?;

    let slide_count = count_slides(&mut archive);

    let mut text = String::new();
    for slide_num in 1..=slide_count {
        let xml = read_slide_xml(&mut archive, slide_num)?;
        append_slide_text(&xml, &mut text)?;
    }

    Ok(text)
}

/// Count the `ppt/slides/slideN.xml` entries in the archive.
fn count_slides<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>) -> usize {
    let mut count = 0;
    for i in 0..archive.len() {
        if let Ok(file) = archive.by_index(i) {
            let name = file.name();
            if name.starts_with("ppt/slides/slide") && name.ends_with(".xml") {
                count += 1;
            }
        }
    }
    count
}

fn read_slide_xml<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    slide_num: usize,
) -> Result<String, ExtractError> {
    let path = format!("ppt/slides/slide{slide_num}.xml");
    let mut file = archive
        .by_name(&path)
        .map_err(|e| ExtractError::Slides(format!("slide {slide_num} missing: {e}")))?;

    let mut xml = String::new();
    file.read_to_string(&mut xml)
        .map_err(|e| ExtractError::Slides(format!("slide {slide_num} unreadable: {e}")))?;
    Ok(xml)
}

/// Walk one slide's XML and append its shape texts to `out`.
///
/// Element matching is by local name, so the `p:`/`a:` namespace prefixes
/// never need resolving: `sp` is a shape, `txBody` its text body, `p` a
/// paragraph and `t` a text run.
fn append_slide_text(xml: &str, out: &mut String) -> Result<(), ExtractError> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut in_shape = false;
    let mut in_text_body = false;
    let mut in_text = false;
    let mut body_text = String::new();
    let mut paragraph = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"sp" => in_shape = true,
                b"txBody" => in_text_body = true,
                b"p" => paragraph.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"sp" => in_shape = false,
                b"txBody" => {
                    in_text_body = false;
                    out.push_str(&body_text);
                    out.push('\n');
                    body_text.clear();
                }
                b"p" => {
                    if !body_text.is_empty() {
                        body_text.push('\n');
                    }
                    body_text.push_str(&paragraph);
                    paragraph.clear();
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text && in_text_body && in_shape {
                    let text = e
                        .unescape()
                        .map_err(|err| ExtractError::Slides(err.to_string()))?;
                    paragraph.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Slides(format!("malformed slide XML: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Build an in-memory PPTX archive from `(entry name, XML)` pairs.
    fn pptx_with_slides(slides: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        for (name, xml) in slides {
            writer.start_file(*name, options).expect("start entry");
            writer.write_all(xml.as_bytes()).expect("write entry");
        }

        writer.finish().expect("finish archive").into_inner()
    }

    fn slide_xml(shapes: &[&str]) -> String {
        let mut xml = String::from("<p:sld><p:cSld><p:spTree>");
        for shape in shapes {
            xml.push_str(shape);
        }
        xml.push_str("</p:spTree></p:cSld></p:sld>");
        xml
    }

    fn text_shape(paragraphs: &[&str]) -> String {
        let mut xml = String::from("<p:sp><p:txBody>");
        for p in paragraphs {
            xml.push_str(&format!("<a:p><a:r><a:t>{p}</a:t></a:r></a:p>"));
        }
        xml.push_str("</p:txBody></p:sp>");
        xml
    }

    #[test]
    fn one_shape_per_line() {
        let slide = slide_xml(&[&text_shape(&["Rubrik"]), &text_shape(&["Brödtext"])]);
        let bytes = pptx_with_slides(&[("ppt/slides/slide1.xml", &slide)]);

        let text = extract_text(&bytes).expect("extract");
        assert_eq!(text, "Rubrik\nBrödtext\n");
    }

    #[test]
    fn slides_are_walked_in_order() {
        let first = slide_xml(&[&text_shape(&["först"])]);
        let second = slide_xml(&[&text_shape(&["sedan"])]);
        // Deliberately written out of order in the archive.
        let bytes = pptx_with_slides(&[
            ("ppt/slides/slide2.xml", &second),
            ("ppt/slides/slide1.xml", &first),
        ]);

        let text = extract_text(&bytes).expect("extract");
        assert_eq!(text, "först\nsedan\n");
    }

    #[test]
    fn paragraphs_within_a_shape_join_with_newline() {
        let slide = slide_xml(&[&text_shape(&["rad ett", "rad två"])]);
        let bytes = pptx_with_slides(&[("ppt/slides/slide1.xml", &slide)]);

        let text = extract_text(&bytes).expect("extract");
        assert_eq!(text, "rad ett\nrad två\n");
    }

    #[test]
    fn shapes_without_text_are_skipped() {
        let slide = slide_xml(&[
            "<p:pic><p:blipFill/></p:pic>",
            &text_shape(&["bara den här"]),
        ]);
        let bytes = pptx_with_slides(&[("ppt/slides/slide1.xml", &slide)]);

        let text = extract_text(&bytes).expect("extract");
        assert_eq!(text, "bara den här\n");
    }

    #[test]
    fn deck_without_slides_yields_empty_text() {
        let bytes = pptx_with_slides(&[("ppt/presentation.xml", "<p:presentation/>")]);
        assert_eq!(extract_text(&bytes).expect("extract"), "");
    }

    #[test]
    fn garbage_bytes_fail() {
        let err = extract_text(b"not a zip archive").unwrap_err();
        assert!(matches!(err, ExtractError::Slides(_)));
    }

    #[test]
    fn malformed_slide_xml_fails() {
        let slide = slide_xml(&[&text_shape(&["&okändentitet;"])]);
        let bytes = pptx_with_slides(&[("ppt/slides/slide1.xml", &slide)]);
        assert!(extract_text(&bytes).is_err());
    }
}
