//! Slide assembler: typed content to positioned shapes.
//!
//! The slide canvas is 10 x 7.5 inches. All geometry is expressed in inches
//! here and converted to EMUs by [`Bounds::inches`].

use crate::config::{ColumnPolicy, COLUMN_CAPACITY};
use crate::model::{
    Bounds, ChartContent, ChartFrame, ChartKind, ChartSeries, ImageData, PictureFrame, Shape,
    SlideContent, TextAlignment, TextFrame, TextParagraph, TextRole, DEFAULT_SLIDE_CONTENT,
    THANKS_MESSAGE,
};

/// Slide width in inches.
pub const SLIDE_WIDTH_IN: f64 = 10.0;

/// Slide height in inches.
pub const SLIDE_HEIGHT_IN: f64 = 7.5;

/// Caption of Text slides.
pub const TEXT_HEADING: &str = "Details";

/// Placeholder shown when a chart has no data.
pub const CHART_PLACEHOLDER: &str = "Chart data is not available.";

/// Placeholder shown when no picture could be produced.
pub const IMAGE_PLACEHOLDER: &str = "Image is not available.";

/// Name of the single chart series.
pub const SERIES_NAME: &str = "Series 1";

const TITLE_PT: f64 = 40.0;
const HEADING_PT: f64 = 32.0;
const BODY_PT: f64 = 18.0;
const CLOSING_PT: f64 = 54.0;

/// Lays out slide content.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlideAssembler {
    column_policy: ColumnPolicy,
}

impl SlideAssembler {
    /// Create an assembler with a bullet column policy.
    pub fn new(column_policy: ColumnPolicy) -> Self {
        Self { column_policy }
    }

    /// Number of bullets that fit on one slide.
    pub fn capacity(&self) -> usize {
        self.column_policy.capacity()
    }

    /// Lay out one slide. Never returns an empty list.
    pub fn layout(&self, content: &SlideContent) -> Vec<Shape> {
        match content {
            SlideContent::Title { title, intro } => vec![
                text_frame(
                    TextRole::Title,
                    Bounds::inches(0.5, 2.0, 9.0, 1.5),
                    TextAlignment::Center,
                    vec![TextParagraph::new(title, TITLE_PT).bold()],
                ),
                text_frame(
                    TextRole::Subtitle,
                    Bounds::inches(1.0, 3.75, 8.0, 2.5),
                    TextAlignment::Left,
                    vec![TextParagraph::new(intro, BODY_PT)],
                ),
            ],
            SlideContent::Bullets { heading, bullets } => self.layout_bullets(heading, bullets),
            SlideContent::Text { body } => {
                let mut paragraphs: Vec<TextParagraph> = body
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(|line| TextParagraph::new(line, BODY_PT))
                    .collect();
                if paragraphs.is_empty() {
                    paragraphs.push(TextParagraph::new(DEFAULT_SLIDE_CONTENT, BODY_PT));
                }
                vec![
                    heading_frame(TEXT_HEADING),
                    text_frame(
                        TextRole::Body,
                        body_bounds(),
                        TextAlignment::Left,
                        paragraphs,
                    ),
                ]
            }
            SlideContent::Chart(chart) => vec![layout_chart(chart)],
            SlideContent::Image {
                source_prompt,
                image,
            } => vec![layout_image(source_prompt, image.as_ref())],
            SlideContent::Thanks { .. } => vec![text_frame(
                TextRole::Closing,
                Bounds::inches(1.0, 2.75, 8.0, 2.0),
                TextAlignment::Center,
                vec![TextParagraph::new(THANKS_MESSAGE, CLOSING_PT).bold()],
            )],
        }
    }

    fn layout_bullets(&self, heading: &str, bullets: &[String]) -> Vec<Shape> {
        let mut shapes = vec![heading_frame(heading)];

        let bullets = &bullets[..bullets.len().min(self.capacity())];
        if bullets.is_empty() {
            shapes.push(bullet_column(
                TextRole::Body,
                Bounds::inches(0.5, 1.6, 9.0, 5.4),
                &[DEFAULT_SLIDE_CONTENT.to_string()],
            ));
            return shapes;
        }

        match self.column_policy {
            ColumnPolicy::SingleColumn => {
                shapes.push(bullet_column(
                    TextRole::Body,
                    Bounds::inches(0.5, 1.6, 9.0, 5.4),
                    bullets,
                ));
            }
            ColumnPolicy::TwoColumn => {
                let split = bullets.len().div_ceil(2).min(COLUMN_CAPACITY);
                let (left, right) = bullets.split_at(split);
                shapes.push(bullet_column(
                    TextRole::LeftColumn,
                    Bounds::inches(0.5, 1.6, 4.4, 5.4),
                    left,
                ));
                if !right.is_empty() {
                    shapes.push(bullet_column(
                        TextRole::RightColumn,
                        Bounds::inches(5.1, 1.6, 4.4, 5.4),
                        right,
                    ));
                }
            }
        }

        shapes
    }
}

fn layout_chart(chart: &ChartContent) -> Shape {
    if chart.is_empty() {
        return placeholder(CHART_PLACEHOLDER);
    }
    Shape::Chart(ChartFrame {
        bounds: Bounds::inches(2.0, 2.0, 6.0, 4.5),
        kind: ChartKind::ClusteredColumn,
        categories: chart.categories.clone(),
        series: vec![ChartSeries {
            name: SERIES_NAME.to_string(),
            values: chart.values.clone(),
        }],
    })
}

fn layout_image(prompt: &str, image: Option<&ImageData>) -> Shape {
    match image {
        Some(image) => Shape::Picture(PictureFrame {
            bounds: Bounds::inches(1.5, 1.25, 7.0, 5.0),
            image: image.clone(),
            description: prompt.to_string(),
        }),
        None => placeholder(IMAGE_PLACEHOLDER),
    }
}

fn heading_frame(text: &str) -> Shape {
    text_frame(
        TextRole::Heading,
        Bounds::inches(0.5, 0.4, 9.0, 1.0),
        TextAlignment::Left,
        vec![TextParagraph::new(text, HEADING_PT).bold()],
    )
}

fn bullet_column(role: TextRole, bounds: Bounds, bullets: &[String]) -> Shape {
    let paragraphs = bullets
        .iter()
        .map(|b| TextParagraph::new(b, BODY_PT).bulleted())
        .collect();
    text_frame(role, bounds, TextAlignment::Left, paragraphs)
}

fn placeholder(text: &str) -> Shape {
    text_frame(
        TextRole::Placeholder,
        body_bounds(),
        TextAlignment::Left,
        vec![TextParagraph::new(text, BODY_PT)],
    )
}

fn body_bounds() -> Bounds {
    Bounds::inches(1.0, 1.5, 8.0, 5.5)
}

fn text_frame(
    role: TextRole,
    bounds: Bounds,
    alignment: TextAlignment,
    paragraphs: Vec<TextParagraph>,
) -> Shape {
    Shape::Text(TextFrame {
        role,
        bounds,
        alignment,
        paragraphs,
    })
}
