use crate::error::StatementError;
use crate::extraction::{PageFragments, PdfExtractor, PositionedFragment};
use std::io::Write;
use std::process::Command;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -bbox-layout` so every word carries its position on the
/// page; line reconstruction happens downstream from those coordinates.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageFragments>, StatementError> {
        // Write PDF bytes to a temp file
        let mut tmpfile = tempfile::NamedTempFile::new()
            .map_err(|e| StatementError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| StatementError::Extraction(e.to_string()))?;

        let output = Command::new("pdftotext")
            .arg("-bbox-layout")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StatementError::PdftotextNotFound
                } else {
                    StatementError::Extraction(format!("pdftotext failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(StatementError::PdftotextFailed { code, stderr });
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        let pages = parse_bbox_xml(&xml);
        if pages.is_empty() {
            return Err(StatementError::Extraction(
                "no text content found in PDF".into(),
            ));
        }
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Parse pdftotext -bbox-layout XML into word-level fragments per page.
fn parse_bbox_xml(xml: &str) -> Vec<PageFragments> {
    let mut pages: Vec<PageFragments> = Vec::new();
    let mut current: Option<PageFragments> = None;

    for raw in xml.lines() {
        let line = raw.trim();

        if line.starts_with("<page ") {
            if let Some(page) = current.take() {
                if !page.fragments.is_empty() {
                    pages.push(page);
                }
            }
            let page_number = parse_attr_usize(line, "number").unwrap_or(pages.len() + 1);
            current = Some(PageFragments {
                page_number,
                fragments: Vec::new(),
            });
            continue;
        }

        if line.starts_with("<word ") {
            let Some(page) = current.as_mut() else {
                continue;
            };
            if let (Some(x), Some(y), Some(text)) = (
                parse_attr_f32(line, "xMin"),
                parse_attr_f32(line, "yMin"),
                parse_word_text(line),
            ) {
                let text = decode_xml_entities(&text).trim().to_string();
                if !text.is_empty() {
                    page.fragments.push(PositionedFragment { text, x, y });
                }
            }
        }
    }

    if let Some(page) = current.take() {
        if !page.fragments.is_empty() {
            pages.push(page);
        }
    }

    pages
}

fn parse_attr_usize(tag: &str, name: &str) -> Option<usize> {
    parse_attr(tag, name)?.parse().ok()
}

fn parse_attr_f32(tag: &str, name: &str) -> Option<f32> {
    parse_attr(tag, name)?.parse().ok()
}

fn parse_attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{}=\"", name);
    let start = tag.find(&needle)? + needle.len();
    let rest = &tag[start..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

fn parse_word_text(word_tag: &str) -> Option<String> {
    let start = word_tag.find('>')? + 1;
    let end = word_tag.rfind("</word>")?;
    Some(word_tag[start..end].to_string())
}

fn decode_xml_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox_xml_words() {
        let xml = r#"
<doc>
  <page number="1" width="595" height="842">
    <line xMin="10.0" yMin="20.0" xMax="160.0" yMax="30.0">
      <word xMin="10.0" yMin="20.0" xMax="60.0" yMax="30.0">01-Jan-2024</word>
      <word xMin="80.0" yMin="20.5" xMax="120.0" yMax="30.0">Salary</word>
      <word xMin="140.0" yMin="20.0" xMax="160.0" yMax="30.0">50000.00</word>
    </line>
  </page>
</doc>
"#;
        let pages = parse_bbox_xml(xml);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[0].fragments.len(), 3);
        assert_eq!(pages[0].fragments[0].text, "01-Jan-2024");
        assert_eq!(pages[0].fragments[0].x, 10.0);
        assert_eq!(pages[0].fragments[1].y, 20.5);
    }

    #[test]
    fn test_entities_decoded() {
        let xml = r#"
<page number="1">
  <word xMin="5.0" yMin="7.0" xMax="9.0" yMax="9.0">AT&amp;T</word>
</page>
"#;
        let pages = parse_bbox_xml(xml);
        assert_eq!(pages[0].fragments[0].text, "AT&T");
    }

    #[test]
    fn test_empty_pages_dropped() {
        let xml = r#"
<page number="1"></page>
<page number="2">
  <word xMin="1.0" yMin="1.0" xMax="2.0" yMax="2.0">x</word>
</page>
"#;
        let pages = parse_bbox_xml(xml);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_number, 2);
    }
}
