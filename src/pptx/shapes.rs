//! Slide XML: text boxes, pictures and chart graphic frames.

use super::escape_text;
use crate::error::Result;
use crate::model::{ChartFrame, PictureFrame, TextAlignment, TextFrame};
use std::fmt::Write as _;

const SLIDE_OPEN: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
    "<p:cSld><p:spTree>",
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
);

const SLIDE_CLOSE: &str =
    "</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>";

/// Accumulates the shape tree of one slide.
///
/// Shape IDs start at 2; ID 1 is the group shape of the tree itself.
pub(crate) struct SlideXml {
    xml: String,
    next_id: u32,
}

impl SlideXml {
    pub fn new() -> Self {
        let mut xml = String::with_capacity(4096);
        xml.push_str(SLIDE_OPEN);
        Self { xml, next_id: 2 }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Write a text frame as a text box shape.
    pub fn text_box(&mut self, frame: &TextFrame) -> Result<()> {
        let id = self.next_id();
        let xml = &mut self.xml;
        let b = frame.bounds;

        xml.push_str("<p:sp><p:nvSpPr>");
        write!(xml, r#"<p:cNvPr id="{}" name="TextBox {}"/>"#, id, id - 1)?;
        xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#);
        xml.push_str("<p:spPr><a:xfrm>");
        write!(xml, r#"<a:off x="{}" y="{}"/>"#, b.x, b.y)?;
        write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, b.width, b.height)?;
        xml.push_str(r#"</a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#);

        xml.push_str(r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#);
        for paragraph in &frame.paragraphs {
            xml.push_str("<a:p>");
            let mut ppr = String::new();
            if frame.alignment != TextAlignment::Left {
                write!(ppr, r#" algn="{}""#, alignment_value(frame.alignment))?;
            }
            if paragraph.bullet {
                ppr.push_str(r#" marL="285750" indent="-285750""#);
                write!(xml, "<a:pPr{}>", ppr)?;
                xml.push_str(r#"<a:buFont typeface="Arial"/><a:buChar char="&#8226;"/></a:pPr>"#);
            } else if !ppr.is_empty() {
                write!(xml, "<a:pPr{}/>", ppr)?;
            }

            let size = (paragraph.font_size_pt * 100.0).round() as u32;
            xml.push_str("<a:r>");
            write!(xml, r#"<a:rPr lang="en-US" sz="{}""#, size)?;
            if paragraph.bold {
                xml.push_str(r#" b="1""#);
            }
            xml.push_str(r#" dirty="0"/>"#);
            write!(xml, "<a:t>{}</a:t>", escape_text(paragraph.text.as_str()))?;
            xml.push_str("</a:r></a:p>");
        }
        xml.push_str("</p:txBody></p:sp>");
        Ok(())
    }

    /// Write a picture referencing an image relationship.
    pub fn picture(&mut self, frame: &PictureFrame, rel_id: &str) -> Result<()> {
        let id = self.next_id();
        let xml = &mut self.xml;
        let b = frame.bounds;

        xml.push_str("<p:pic><p:nvPicPr>");
        write!(
            xml,
            r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
            id,
            id - 1,
            escape_text(frame.description.as_str())
        )?;
        xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#);
        write!(xml, r#"<p:blipFill><a:blip r:embed="{}"/>"#, rel_id)?;
        xml.push_str("<a:stretch><a:fillRect/></a:stretch></p:blipFill>");
        xml.push_str("<p:spPr><a:xfrm>");
        write!(xml, r#"<a:off x="{}" y="{}"/>"#, b.x, b.y)?;
        write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, b.width, b.height)?;
        xml.push_str(r#"</a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
        Ok(())
    }

    /// Write a graphic frame referencing a chart relationship.
    pub fn chart(&mut self, frame: &ChartFrame, rel_id: &str) -> Result<()> {
        let id = self.next_id();
        let xml = &mut self.xml;
        let b = frame.bounds;

        xml.push_str("<p:graphicFrame><p:nvGraphicFramePr>");
        write!(xml, r#"<p:cNvPr id="{}" name="Chart {}"/>"#, id, id - 1)?;
        xml.push_str(r#"<p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr>"#);
        xml.push_str("<p:xfrm>");
        write!(xml, r#"<a:off x="{}" y="{}"/>"#, b.x, b.y)?;
        write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, b.width, b.height)?;
        xml.push_str("</p:xfrm>");
        xml.push_str(r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart">"#);
        write!(
            xml,
            r#"<c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" r:id="{}"/>"#,
            rel_id
        )?;
        xml.push_str("</a:graphicData></a:graphic></p:graphicFrame>");
        Ok(())
    }

    /// Close the shape tree and return the slide part.
    pub fn finish(mut self) -> String {
        self.xml.push_str(SLIDE_CLOSE);
        self.xml
    }
}

fn alignment_value(alignment: TextAlignment) -> &'static str {
    match alignment {
        TextAlignment::Left => "l",
        TextAlignment::Center => "ctr",
        TextAlignment::Right => "r",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bounds, ChartKind, ChartSeries, ImageData, TextParagraph, TextRole};

    #[test]
    fn test_text_box_xml() {
        let frame = TextFrame {
            role: TextRole::Title,
            bounds: Bounds::inches(0.5, 2.0, 9.0, 1.5),
            alignment: TextAlignment::Center,
            paragraphs: vec![TextParagraph::new("Cats & <Dogs>", 40.0).bold()],
        };
        let mut slide = SlideXml::new();
        slide.text_box(&frame).unwrap();
        let xml = slide.finish();

        assert!(xml.contains(r#"<p:cNvPr id="2" name="TextBox 1"/>"#));
        assert!(xml.contains(r#"<a:off x="457200" y="1828800"/>"#));
        assert!(xml.contains(r#"<a:pPr algn="ctr"/>"#));
        assert!(xml.contains(r#"sz="4000" b="1""#));
        assert!(xml.contains("<a:t>Cats &amp; &lt;Dogs&gt;</a:t>"));
        assert!(xml.ends_with("</p:sld>"));
    }

    #[test]
    fn test_bulleted_paragraph() {
        let frame = TextFrame {
            role: TextRole::LeftColumn,
            bounds: Bounds::default(),
            alignment: TextAlignment::Left,
            paragraphs: vec![TextParagraph::new("point", 18.0).bulleted()],
        };
        let mut slide = SlideXml::new();
        slide.text_box(&frame).unwrap();
        let xml = slide.finish();
        assert!(xml.contains(r#"<a:pPr marL="285750" indent="-285750">"#));
        assert!(xml.contains("<a:buChar"));
    }

    #[test]
    fn test_picture_and_chart_ids() {
        let image = ImageData::from_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        let picture = PictureFrame {
            bounds: Bounds::default(),
            image,
            description: "a \"moon\" base".to_string(),
        };
        let chart = ChartFrame {
            bounds: Bounds::default(),
            kind: ChartKind::ClusteredColumn,
            categories: vec!["A".to_string()],
            series: vec![ChartSeries {
                name: "Series 1".to_string(),
                values: vec![1.0],
            }],
        };

        let mut slide = SlideXml::new();
        slide.picture(&picture, "rId2").unwrap();
        slide.chart(&chart, "rId3").unwrap();
        let xml = slide.finish();

        assert!(xml.contains(r#"<p:cNvPr id="2" name="Picture 1" descr="a &quot;moon&quot; base"/>"#));
        assert!(xml.contains(r#"<a:blip r:embed="rId2"/>"#));
        assert!(xml.contains(r#"<p:cNvPr id="3" name="Chart 2"/>"#));
        assert!(xml.contains(r#"r:id="rId3""#));
    }
}
