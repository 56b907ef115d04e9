//! PPTX package writer.

use super::chart::chart_xml;
use super::parts;
use super::rels::{
    Relationships, REL_CHART, REL_CORE_PROPERTIES, REL_EXTENDED_PROPERTIES, REL_IMAGE,
    REL_OFFICE_DOCUMENT, REL_SLIDE, REL_SLIDE_LAYOUT, REL_SLIDE_MASTER, REL_THEME,
};
use super::shapes::SlideXml;
use crate::error::Result;
use crate::model::{Document, ImageFormat, Shape, SlideElement};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes a [`Document`] as a PowerPoint package.
///
/// Every slide uses one blank layout; text frames become text boxes,
/// charts become chart parts with literal data and pictures are stored
/// under `ppt/media/`.
///
/// # Example
///
/// ```no_run
/// use slidegen::pptx::PptxWriter;
/// # fn run(document: &slidegen::Document) -> slidegen::Result<()> {
/// PptxWriter::new().write_to_path(document, "deck.pptx")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PptxWriter {
    compression: CompressionMethod,
}

impl Default for PptxWriter {
    fn default() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
        }
    }
}

/// A serialized slide with the parts it references.
struct SlidePart {
    xml: String,
    rels: String,
}

/// Everything the package holds, before it is zipped.
struct Package {
    slides: Vec<SlidePart>,
    charts: Vec<String>,
    media: Vec<(String, Vec<u8>)>,
    image_formats: BTreeSet<ImageFormat>,
}

impl PptxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store parts without compression.
    pub fn stored(mut self) -> Self {
        self.compression = CompressionMethod::Stored;
        self
    }

    /// Write the document to a file, replacing it if it exists.
    pub fn write_to_path(&self, document: &Document, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write(document, &mut writer)?;
        writer.flush()?;
        debug!(path = %path.display(), slides = document.len(), "wrote presentation");
        Ok(())
    }

    /// Write the document into an in-memory buffer.
    pub fn write_to_vec(&self, document: &Document) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write(document, &mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write the document to any seekable writer.
    pub fn write<W: Write + Seek>(&self, document: &Document, writer: W) -> Result<()> {
        let package = Self::collect(document)?;
        let options = SimpleFileOptions::default().compression_method(self.compression);
        let mut zip = ZipWriter::new(writer);

        let slide_count = package.slides.len();
        let put = |zip: &mut ZipWriter<W>, name: &str, data: &[u8]| -> Result<()> {
            zip.start_file(name, options)?;
            zip.write_all(data)?;
            Ok(())
        };

        let content_types =
            parts::content_types(slide_count, package.charts.len(), &package.image_formats)?;
        put(&mut zip, "[Content_Types].xml", content_types.as_bytes())?;
        put(&mut zip, "_rels/.rels", package_rels()?.as_bytes())?;
        put(
            &mut zip,
            "docProps/core.xml",
            parts::core_properties(document.metadata())?.as_bytes(),
        )?;
        put(
            &mut zip,
            "docProps/app.xml",
            parts::app_properties(slide_count)?.as_bytes(),
        )?;

        put(
            &mut zip,
            "ppt/presentation.xml",
            parts::presentation(slide_count)?.as_bytes(),
        )?;
        put(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            presentation_rels(slide_count)?.as_bytes(),
        )?;

        put(
            &mut zip,
            "ppt/slideMasters/slideMaster1.xml",
            parts::slide_master().as_bytes(),
        )?;
        put(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            master_rels()?.as_bytes(),
        )?;
        put(
            &mut zip,
            "ppt/slideLayouts/slideLayout1.xml",
            parts::slide_layout().as_bytes(),
        )?;
        put(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            layout_rels()?.as_bytes(),
        )?;
        put(&mut zip, "ppt/theme/theme1.xml", parts::theme().as_bytes())?;

        for (i, slide) in package.slides.iter().enumerate() {
            let n = i + 1;
            put(
                &mut zip,
                &format!("ppt/slides/slide{}.xml", n),
                slide.xml.as_bytes(),
            )?;
            put(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", n),
                slide.rels.as_bytes(),
            )?;
        }

        for (i, chart) in package.charts.iter().enumerate() {
            put(
                &mut zip,
                &format!("ppt/charts/chart{}.xml", i + 1),
                chart.as_bytes(),
            )?;
        }

        for (name, data) in &package.media {
            put(&mut zip, &format!("ppt/media/{}", name), data)?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Serialize every slide, numbering charts and media across the deck.
    fn collect(document: &Document) -> Result<Package> {
        let mut package = Package {
            slides: Vec::with_capacity(document.len()),
            charts: Vec::new(),
            media: Vec::new(),
            image_formats: BTreeSet::new(),
        };

        for slide in document.slides() {
            let part = Self::slide_part(slide, &mut package)?;
            package.slides.push(part);
        }

        Ok(package)
    }

    fn slide_part(slide: &SlideElement, package: &mut Package) -> Result<SlidePart> {
        let mut rels = Relationships::new();
        rels.add(REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");

        let mut xml = SlideXml::new();
        for shape in &slide.shapes {
            match shape {
                Shape::Text(frame) => xml.text_box(frame)?,
                Shape::Picture(frame) => {
                    let format = frame.image.format;
                    let name = format!("image{}.{}", package.media.len() + 1, format.extension());
                    let rel_id = rels.add(REL_IMAGE, format!("../media/{}", name));
                    xml.picture(frame, &rel_id)?;
                    package.image_formats.insert(format);
                    package.media.push((name, frame.image.data.clone()));
                }
                Shape::Chart(frame) => {
                    let n = package.charts.len() + 1;
                    let rel_id = rels.add(REL_CHART, format!("../charts/chart{}.xml", n));
                    xml.chart(frame, &rel_id)?;
                    package.charts.push(chart_xml(frame)?);
                }
            }
        }

        Ok(SlidePart {
            xml: xml.finish(),
            rels: rels.to_xml()?,
        })
    }
}

fn package_rels() -> Result<String> {
    let mut rels = Relationships::new();
    rels.add(REL_OFFICE_DOCUMENT, "ppt/presentation.xml");
    rels.add(REL_CORE_PROPERTIES, "docProps/core.xml");
    rels.add(REL_EXTENDED_PROPERTIES, "docProps/app.xml");
    rels.to_xml()
}

/// Master is `rId1`, slides `rId2..`, theme last.
fn presentation_rels(slide_count: usize) -> Result<String> {
    let mut rels = Relationships::new();
    rels.add(REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml");
    for n in 1..=slide_count {
        rels.add(REL_SLIDE, format!("slides/slide{}.xml", n));
    }
    rels.add(REL_THEME, "theme/theme1.xml");
    rels.to_xml()
}

fn master_rels() -> Result<String> {
    let mut rels = Relationships::new();
    rels.add(REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
    rels.add(REL_THEME, "../theme/theme1.xml");
    rels.to_xml()
}

fn layout_rels() -> Result<String> {
    let mut rels = Relationships::new();
    rels.add(REL_SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
    rels.to_xml()
}
