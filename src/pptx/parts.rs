//! Fixed and document-level package parts.

use super::escape_text;
use crate::error::Result;
use crate::model::{ImageFormat, Metadata};
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Slide width in EMUs (10 inches).
pub const SLIDE_WIDTH_EMU: i64 = 9_144_000;

/// Slide height in EMUs (7.5 inches).
pub const SLIDE_HEIGHT_EMU: i64 = 6_858_000;

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";

/// `[Content_Types].xml` for a package with the given parts.
pub(crate) fn content_types(
    slide_count: usize,
    chart_count: usize,
    image_formats: &BTreeSet<ImageFormat>,
) -> Result<String> {
    let mut xml = String::with_capacity(1024 + slide_count * 160);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for format in image_formats {
        write!(
            xml,
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            format.extension(),
            format.mime_type()
        )?;
    }

    override_part(&mut xml, "/ppt/presentation.xml", CT_PRESENTATION)?;
    override_part(&mut xml, "/ppt/slideMasters/slideMaster1.xml", CT_SLIDE_MASTER)?;
    override_part(&mut xml, "/ppt/slideLayouts/slideLayout1.xml", CT_SLIDE_LAYOUT)?;
    override_part(&mut xml, "/ppt/theme/theme1.xml", CT_THEME)?;
    for n in 1..=slide_count {
        override_part(&mut xml, &format!("/ppt/slides/slide{}.xml", n), CT_SLIDE)?;
    }
    for n in 1..=chart_count {
        override_part(&mut xml, &format!("/ppt/charts/chart{}.xml", n), CT_CHART)?;
    }
    override_part(&mut xml, "/docProps/core.xml", CT_CORE)?;
    override_part(&mut xml, "/docProps/app.xml", CT_APP)?;

    xml.push_str("</Types>");
    Ok(xml)
}

fn override_part(xml: &mut String, part: &str, content_type: &str) -> Result<()> {
    write!(
        xml,
        r#"<Override PartName="{}" ContentType="{}"/>"#,
        part, content_type
    )?;
    Ok(())
}

/// `ppt/presentation.xml`; slide relationships are `rId2..` after the master.
pub(crate) fn presentation(slide_count: usize) -> Result<String> {
    let mut xml = String::with_capacity(1024 + slide_count * 48);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#);
    xml.push_str(r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#);
    xml.push_str(r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" saveSubsetFonts="1">"#);
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    xml.push_str("<p:sldIdLst>");
    for n in 0..slide_count {
        write!(xml, r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + n, n + 2)?;
    }
    xml.push_str("</p:sldIdLst>");
    write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}" type="screen4x3"/>"#,
        SLIDE_WIDTH_EMU, SLIDE_HEIGHT_EMU
    )?;
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("<p:defaultTextStyle>");
    xml.push_str(r#"<a:defPPr><a:defRPr lang="en-US"/></a:defPPr>"#);
    xml.push_str("</p:defaultTextStyle>");
    xml.push_str("</p:presentation>");
    Ok(xml)
}

/// `docProps/core.xml`.
pub(crate) fn core_properties(metadata: &Metadata) -> Result<String> {
    let mut xml = String::with_capacity(1024);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#);
    xml.push_str(r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#);
    xml.push_str(r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#);

    let title = metadata.title.as_deref().unwrap_or(&metadata.topic);
    write!(xml, "<dc:title>{}</dc:title>", escape_text(title))?;
    write!(xml, "<dc:subject>{}</dc:subject>", escape_text(metadata.topic.as_str()))?;
    xml.push_str("<dc:creator>slidegen</dc:creator>");

    if let Some(created) = &metadata.created {
        write!(
            xml,
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
            escape_text(created.as_str())
        )?;
        write!(
            xml,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>"#,
            escape_text(created.as_str())
        )?;
    }

    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

/// `docProps/app.xml`.
pub(crate) fn app_properties(slide_count: usize) -> Result<String> {
    let mut xml = String::with_capacity(512);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#);
    xml.push_str(r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#);
    xml.push_str("<Application>slidegen</Application>");
    write!(xml, "<Slides>{}</Slides>", slide_count)?;
    write!(xml, "<AppVersion>{}</AppVersion>", app_version())?;
    xml.push_str("</Properties>");
    Ok(xml)
}

/// Crate version in the `XX.YYYY` shape Office expects.
fn app_version() -> String {
    let major: u32 = env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0);
    let minor: u32 = env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0);
    format!("{:02}.{:04}", major, minor)
}

/// `ppt/slideMasters/slideMaster1.xml`.
pub(crate) fn slide_master() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
        r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
        r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>"#,
        r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
        r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
        r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
        r#"</p:spTree></p:cSld>"#,
        r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
        r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
        r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
        r#"<p:txStyles>"#,
        r#"<p:titleStyle><a:lvl1pPr><a:defRPr sz="4400"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill>"#,
        r#"<a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr></p:titleStyle>"#,
        r#"<p:bodyStyle><a:lvl1pPr><a:defRPr sz="1800"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill>"#,
        r#"<a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></p:bodyStyle>"#,
        r#"<p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill>"#,
        r#"<a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></p:otherStyle>"#,
        r#"</p:txStyles></p:sldMaster>"#,
    )
}

/// `ppt/slideLayouts/slideLayout1.xml`: the blank layout every slide uses.
pub(crate) fn slide_layout() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
        r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1">"#,
        r#"<p:cSld name="Blank"><p:spTree>"#,
        r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
        r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
        r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
        r#"</p:spTree></p:cSld>"#,
        r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
    )
}

/// `ppt/theme/theme1.xml`.
pub(crate) fn theme() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">"#,
        r#"<a:themeElements>"#,
        r#"<a:clrScheme name="Office">"#,
        r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
        r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
        r#"<a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2>"#,
        r#"<a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2>"#,
        r#"<a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4>"#,
        r#"<a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6>"#,
        r#"<a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink>"#,
        r#"</a:clrScheme>"#,
        r#"<a:fontScheme name="Office">"#,
        r#"<a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
        r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
        r#"</a:fontScheme>"#,
        r#"<a:fmtScheme name="Office">"#,
        r#"<a:fillStyleLst>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="50000"/></a:schemeClr></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"><a:shade val="80000"/></a:schemeClr></a:solidFill>"#,
        r#"</a:fillStyleLst>"#,
        r#"<a:lnStyleLst>"#,
        r#"<a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
        r#"<a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
        r#"<a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
        r#"</a:lnStyleLst>"#,
        r#"<a:effectStyleLst>"#,
        r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
        r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
        r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#,
        r#"</a:effectStyleLst>"#,
        r#"<a:bgFillStyleLst>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="95000"/></a:schemeClr></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"><a:shade val="90000"/></a:schemeClr></a:solidFill>"#,
        r#"</a:bgFillStyleLst>"#,
        r#"</a:fmtScheme>"#,
        r#"</a:themeElements>"#,
        r#"<a:objectDefaults/><a:extraClrSchemeLst/>"#,
        r#"</a:theme>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        let formats: BTreeSet<_> = [ImageFormat::Png, ImageFormat::Jpeg].into_iter().collect();
        let xml = content_types(2, 1, &formats).unwrap();
        assert!(xml.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
        assert!(xml.contains(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#));
        assert!(xml.contains(r#"PartName="/ppt/slides/slide2.xml""#));
        assert!(!xml.contains("slide3.xml"));
        assert!(xml.contains(r#"PartName="/ppt/charts/chart1.xml""#));
    }

    #[test]
    fn test_presentation_slide_ids() {
        let xml = presentation(3).unwrap();
        assert!(xml.contains(r#"<p:sldId id="256" r:id="rId2"/>"#));
        assert!(xml.contains(r#"<p:sldId id="258" r:id="rId4"/>"#));
        assert!(xml.contains(r#"<p:sldSz cx="9144000" cy="6858000""#));
    }

    #[test]
    fn test_core_properties_escape() {
        let metadata = Metadata {
            topic: "Cats & dogs".to_string(),
            title: Some("<Secret>".to_string()),
            slide_count: 1,
            created: Some("2026-01-01T00:00:00+00:00".to_string()),
        };
        let xml = core_properties(&metadata).unwrap();
        assert!(xml.contains("<dc:title>&lt;Secret&gt;</dc:title>"));
        assert!(xml.contains("<dc:subject>Cats &amp; dogs</dc:subject>"));
        assert!(xml.contains("2026-01-01T00:00:00+00:00</dcterms:created>"));
    }

    #[test]
    fn test_app_properties() {
        let xml = app_properties(7).unwrap();
        assert!(xml.contains("<Slides>7</Slides>"));
        assert!(xml.contains("<AppVersion>00.0001</AppVersion>"));
    }
}
