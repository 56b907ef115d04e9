//! Relationship parts (`.rels`) of the package.

use crate::error::Result;
use quick_xml::escape::escape;
use std::fmt::Write as _;

pub(crate) const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub(crate) const REL_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub(crate) const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub(crate) const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(crate) const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(crate) const REL_THEME: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
pub(crate) const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub(crate) const REL_CHART: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";

/// A relationship entry of a .rels part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: &'static str,
    /// Target path, relative to the source part
    pub target: String,
}

/// Ordered relationships of one part; IDs are assigned sequentially.
#[derive(Debug, Clone, Default)]
pub(crate) struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a relationship and return its ID.
    pub fn add(&mut self, rel_type: &'static str, target: impl Into<String>) -> String {
        let id = format!("rId{}", self.entries.len() + 1);
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type,
            target: target.into(),
        });
        id
    }

    /// Serialize as a .rels part.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(256 + self.entries.len() * 160);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for rel in &self.entries {
            write!(
                xml,
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                rel.id,
                rel.rel_type,
                escape(rel.target.as_str())
            )?;
        }
        xml.push_str("</Relationships>");
        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut rels = Relationships::new();
        assert_eq!(rels.add(REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"), "rId1");
        assert_eq!(rels.add(REL_IMAGE, "../media/image1.png"), "rId2");
        assert_eq!(rels.entries[1].rel_type, REL_IMAGE);
        assert_eq!(rels.entries[1].target, "../media/image1.png");
    }

    #[test]
    fn test_to_xml() {
        let mut rels = Relationships::new();
        rels.add(REL_CHART, "../charts/chart1.xml");
        let xml = rels.to_xml().unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart" Target="../charts/chart1.xml"/>"#
        ));
        assert!(xml.ends_with("</Relationships>"));
    }
}
