//! Laid-out slide elements: positioned text frames, charts and pictures.

use super::{ImageData, SlideType};
use serde::{Deserialize, Serialize};

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// Position and size of a shape, in EMUs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Bounds {
    /// Build bounds from inch measurements.
    pub fn inches(x: f64, y: f64, width: f64, height: f64) -> Self {
        let emu = |v: f64| (v * EMU_PER_INCH as f64).round() as i64;
        Self {
            x: emu(x),
            y: emu(y),
            width: emu(width),
            height: emu(height),
        }
    }

    /// Right edge in EMUs.
    pub fn right(&self) -> i64 {
        self.x + self.width
    }

    /// Bottom edge in EMUs.
    pub fn bottom(&self) -> i64 {
        self.y + self.height
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// What a text frame represents on its slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRole {
    Title,
    Subtitle,
    Heading,
    Body,
    LeftColumn,
    RightColumn,
    /// Stands in for a chart or picture that could not be produced
    Placeholder,
    Closing,
}

/// One paragraph inside a text frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextParagraph {
    /// Paragraph text
    pub text: String,
    /// Font size in points
    pub font_size_pt: f64,
    /// Bold text
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    /// Rendered with a bullet marker
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bullet: bool,
}

impl TextParagraph {
    /// A plain paragraph at the given size.
    pub fn new(text: impl Into<String>, font_size_pt: f64) -> Self {
        Self {
            text: text.into(),
            font_size_pt,
            bold: false,
            bullet: false,
        }
    }

    /// Make this paragraph bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Render this paragraph with a bullet marker.
    pub fn bulleted(mut self) -> Self {
        self.bullet = true;
        self
    }
}

/// A positioned text region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFrame {
    pub role: TextRole,
    pub bounds: Bounds,
    #[serde(default)]
    pub alignment: TextAlignment,
    pub paragraphs: Vec<TextParagraph>,
}

impl TextFrame {
    /// Concatenated paragraph text, one paragraph per line.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Chart kinds the assembler emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    ClusteredColumn,
}

/// A named data series of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Series name (legend label)
    pub name: String,
    /// One value per category
    pub values: Vec<f64>,
}

/// A positioned chart with literal category and value data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartFrame {
    pub bounds: Bounds,
    pub kind: ChartKind,
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// A positioned picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PictureFrame {
    pub bounds: Bounds,
    pub image: ImageData,
    /// Alt text
    pub description: String,
}

/// A renderable shape on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Shape {
    Text(TextFrame),
    Chart(ChartFrame),
    Picture(PictureFrame),
}

impl Shape {
    /// Position and size of the shape.
    pub fn bounds(&self) -> Bounds {
        match self {
            Shape::Text(frame) => frame.bounds,
            Shape::Chart(frame) => frame.bounds,
            Shape::Picture(frame) => frame.bounds,
        }
    }

    /// The text frame, if this is one.
    pub fn as_text(&self) -> Option<&TextFrame> {
        match self {
            Shape::Text(frame) => Some(frame),
            _ => None,
        }
    }

    /// The chart frame, if this is one.
    pub fn as_chart(&self) -> Option<&ChartFrame> {
        match self {
            Shape::Chart(frame) => Some(frame),
            _ => None,
        }
    }

    /// The picture frame, if this is one.
    pub fn as_picture(&self) -> Option<&PictureFrame> {
        match self {
            Shape::Picture(frame) => Some(frame),
            _ => None,
        }
    }
}

/// How a slide's content was obtained, ordered from best to worst.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SlideStatus {
    /// Generated and parsed without falling back
    #[default]
    Generated,
    /// Generated, but the parser substituted defaults
    Degraded,
    /// Generation failed; default content was used
    Fallback,
}

impl SlideStatus {
    /// Combine two statuses, keeping the worse one.
    pub fn worst(self, other: SlideStatus) -> SlideStatus {
        self.max(other)
    }
}

/// The laid-out representation of one slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideElement {
    /// Position in the deck (0-based)
    pub index: usize,
    /// Declared slide type
    pub slide_type: SlideType,
    /// How the content was obtained
    #[serde(default)]
    pub status: SlideStatus,
    /// Shapes in z-order
    pub shapes: Vec<Shape>,
}

impl SlideElement {
    /// Create a slide element.
    pub fn new(index: usize, slide_type: SlideType, shapes: Vec<Shape>) -> Self {
        Self {
            index,
            slide_type,
            status: SlideStatus::Generated,
            shapes,
        }
    }

    /// Set the status.
    pub fn with_status(mut self, status: SlideStatus) -> Self {
        self.status = status;
        self
    }

    /// All text frames on the slide.
    pub fn text_frames(&self) -> impl Iterator<Item = &TextFrame> {
        self.shapes.iter().filter_map(Shape::as_text)
    }

    /// The first text frame with the given role.
    pub fn text_frame(&self, role: TextRole) -> Option<&TextFrame> {
        self.text_frames().find(|f| f.role == role)
    }

    /// Whether the slide contains a chart.
    pub fn has_chart(&self) -> bool {
        self.shapes.iter().any(|s| s.as_chart().is_some())
    }

    /// Whether the slide contains a picture.
    pub fn has_picture(&self) -> bool {
        self.shapes.iter().any(|s| s.as_picture().is_some())
    }

    /// All text on the slide, frame by frame.
    pub fn plain_text(&self) -> String {
        self.text_frames()
            .map(TextFrame::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_inches() {
        let b = Bounds::inches(1.0, 1.5, 8.0, 5.5);
        assert_eq!(b.x, 914_400);
        assert_eq!(b.y, 1_371_600);
        assert_eq!(b.right(), 9 * EMU_PER_INCH);
        assert_eq!(b.bottom(), 7 * EMU_PER_INCH);
    }

    #[test]
    fn test_status_worst() {
        use SlideStatus::*;
        assert_eq!(Generated.worst(Degraded), Degraded);
        assert_eq!(Fallback.worst(Degraded), Fallback);
        assert_eq!(Generated.worst(Generated), Generated);
    }

    #[test]
    fn test_element_queries() {
        let frame = TextFrame {
            role: TextRole::Heading,
            bounds: Bounds::default(),
            alignment: TextAlignment::Left,
            paragraphs: vec![
                TextParagraph::new("Details", 32.0).bold(),
                TextParagraph::new("More", 18.0),
            ],
        };
        let element = SlideElement::new(0, SlideType::Text, vec![Shape::Text(frame)]);

        assert_eq!(element.plain_text(), "Details\nMore");
        assert!(element.text_frame(TextRole::Heading).is_some());
        assert!(element.text_frame(TextRole::Body).is_none());
        assert!(!element.has_chart());
        assert!(!element.has_picture());
    }
}
