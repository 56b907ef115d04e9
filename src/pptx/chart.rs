//! Chart parts (`ppt/charts/chartN.xml`).
//!
//! Charts carry their data as literals, so no embedded workbook is needed.

use super::escape_text;
use crate::error::Result;
use crate::model::{ChartFrame, ChartKind};
use std::fmt::Write as _;

const CATEGORY_AXIS_ID: u32 = 111_111_111;
const VALUE_AXIS_ID: u32 = 222_222_222;

/// Generate the chart part for a chart frame.
pub(crate) fn chart_xml(frame: &ChartFrame) -> Result<String> {
    let mut xml = String::with_capacity(2048);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" "#);
    xml.push_str(r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#);
    xml.push_str(r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);
    xml.push_str(r#"<c:date1904 val="0"/><c:lang val="en-US"/><c:roundedCorners val="0"/>"#);
    xml.push_str(r#"<c:chart><c:autoTitleDeleted val="1"/><c:plotArea><c:layout/>"#);

    match frame.kind {
        ChartKind::ClusteredColumn => {
            xml.push_str(r#"<c:barChart><c:barDir val="col"/><c:grouping val="clustered"/><c:varyColors val="0"/>"#);
        }
    }

    for (index, series) in frame.series.iter().enumerate() {
        xml.push_str("<c:ser>");
        write!(xml, r#"<c:idx val="{}"/><c:order val="{}"/>"#, index, index)?;
        write!(xml, "<c:tx><c:v>{}</c:v></c:tx>", escape_text(series.name.as_str()))?;
        xml.push_str(r#"<c:invertIfNegative val="0"/>"#);

        xml.push_str("<c:cat><c:strLit>");
        write!(xml, r#"<c:ptCount val="{}"/>"#, frame.categories.len())?;
        for (i, category) in frame.categories.iter().enumerate() {
            write!(
                xml,
                r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#,
                i,
                escape_text(category.as_str())
            )?;
        }
        xml.push_str("</c:strLit></c:cat>");

        xml.push_str("<c:val><c:numLit><c:formatCode>General</c:formatCode>");
        write!(xml, r#"<c:ptCount val="{}"/>"#, series.values.len())?;
        for (i, value) in series.values.iter().enumerate() {
            write!(xml, r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#, i, value)?;
        }
        xml.push_str("</c:numLit></c:val>");
        xml.push_str("</c:ser>");
    }

    xml.push_str(r#"<c:gapWidth val="150"/>"#);
    write!(
        xml,
        r#"<c:axId val="{}"/><c:axId val="{}"/></c:barChart>"#,
        CATEGORY_AXIS_ID, VALUE_AXIS_ID
    )?;

    xml.push_str("<c:catAx>");
    write!(xml, r#"<c:axId val="{}"/>"#, CATEGORY_AXIS_ID)?;
    xml.push_str(r#"<c:scaling><c:orientation val="minMax"/></c:scaling><c:delete val="0"/><c:axPos val="b"/>"#);
    xml.push_str(r#"<c:majorTickMark val="out"/><c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/>"#);
    write!(xml, r#"<c:crossAx val="{}"/>"#, VALUE_AXIS_ID)?;
    xml.push_str(r#"<c:crosses val="autoZero"/><c:auto val="1"/><c:lblAlgn val="ctr"/><c:lblOffset val="100"/><c:noMultiLvlLbl val="0"/>"#);
    xml.push_str("</c:catAx>");

    xml.push_str("<c:valAx>");
    write!(xml, r#"<c:axId val="{}"/>"#, VALUE_AXIS_ID)?;
    xml.push_str(r#"<c:scaling><c:orientation val="minMax"/></c:scaling><c:delete val="0"/><c:axPos val="l"/><c:majorGridlines/>"#);
    xml.push_str(r#"<c:numFmt formatCode="General" sourceLinked="1"/>"#);
    xml.push_str(r#"<c:majorTickMark val="out"/><c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/>"#);
    write!(xml, r#"<c:crossAx val="{}"/>"#, CATEGORY_AXIS_ID)?;
    xml.push_str(r#"<c:crosses val="autoZero"/><c:crossBetween val="between"/>"#);
    xml.push_str("</c:valAx>");

    xml.push_str("</c:plotArea>");
    xml.push_str(r#"<c:legend><c:legendPos val="r"/><c:overlay val="0"/></c:legend>"#);
    xml.push_str(r#"<c:plotVisOnly val="1"/><c:dispBlanksAs val="gap"/></c:chart>"#);
    xml.push_str("</c:chartSpace>");

    Ok(xml)
}
