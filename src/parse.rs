//! Content parser: untrusted generated text to typed slide content.
//!
//! Every function here is total. Malformed input never fails; it degrades to
//! documented defaults and the outcome records why, so the caller can log it.

use crate::model::{
    ChartContent, ImageData, RawGeneration, SlideContent, SlideStatus, SlideType,
    DEFAULT_SLIDE_CONTENT,
};
use std::fmt;

/// Why a parser substituted defaults.
///
/// This is a warning, not an error; it never aborts a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseDegraded {
    /// The text was empty after trimming
    EmptyText,
    /// No bullet survived trimming
    NoBullets,
    /// Fewer than two non-empty lines of chart data
    MissingChartLines,
    /// A value token was not a finite number
    InvalidChartValue,
    /// Value count differs from category count
    ChartLengthMismatch,
    /// Image bytes in an unrecognized format
    UnrecognizedImage,
}

impl fmt::Display for ParseDegraded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ParseDegraded::EmptyText => "generated text was empty",
            ParseDegraded::NoBullets => "no usable bullet",
            ParseDegraded::MissingChartLines => "chart data needs a categories line and a values line",
            ParseDegraded::InvalidChartValue => "chart values are not all numbers",
            ParseDegraded::ChartLengthMismatch => "chart value count differs from category count",
            ParseDegraded::UnrecognizedImage => "image format not recognized",
        };
        f.write_str(reason)
    }
}

/// Parsed content plus the degradation that occurred, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub content: SlideContent,
    pub degradation: Option<ParseDegraded>,
}

impl ParseOutcome {
    /// Content parsed without falling back.
    pub fn clean(content: SlideContent) -> Self {
        Self {
            content,
            degradation: None,
        }
    }

    /// Content that fell back to defaults.
    pub fn degraded(content: SlideContent, reason: ParseDegraded) -> Self {
        Self {
            content,
            degradation: Some(reason),
        }
    }

    /// Whether defaults were substituted.
    pub fn is_degraded(&self) -> bool {
        self.degradation.is_some()
    }

    /// Slide status implied by this outcome.
    pub fn status(&self) -> SlideStatus {
        if self.is_degraded() {
            SlideStatus::Degraded
        } else {
            SlideStatus::Generated
        }
    }
}

/// Generated material for one slide, ready to be parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideInput {
    Title {
        title: RawGeneration,
        intro: RawGeneration,
    },
    Bullets {
        heading: String,
        generations: Vec<RawGeneration>,
    },
    Text(RawGeneration),
    Chart(RawGeneration),
    Image {
        prompt: String,
        bytes: Option<Vec<u8>>,
    },
    Thanks(RawGeneration),
}

impl SlideInput {
    /// The slide type this input is for.
    pub fn slide_type(&self) -> SlideType {
        match self {
            SlideInput::Title { .. } => SlideType::Title,
            SlideInput::Bullets { .. } => SlideType::Bullets,
            SlideInput::Text(_) => SlideType::Text,
            SlideInput::Chart(_) => SlideType::Chart,
            SlideInput::Image { .. } => SlideType::Image,
            SlideInput::Thanks(_) => SlideType::Thanks,
        }
    }
}

/// Parse the generated material of one slide.
pub fn parse_slide(input: SlideInput) -> ParseOutcome {
    match input {
        SlideInput::Title { title, intro } => parse_title(&title.text, &intro.text),
        SlideInput::Bullets {
            heading,
            generations,
        } => bullets_from_generations(&heading, &generations),
        SlideInput::Text(raw) => parse_text(&raw.text),
        SlideInput::Chart(raw) => parse_chart(&raw.text),
        SlideInput::Image { prompt, bytes } => parse_image(&prompt, bytes),
        SlideInput::Thanks(raw) => parse_thanks(&raw.text),
    }
}

/// Parse a newline-separated bullet list.
///
/// Lines are trimmed, empty lines dropped, order kept.
pub fn parse_bullets(heading: &str, raw: &str) -> ParseOutcome {
    let bullets = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    bullets_outcome(heading, bullets)
}

/// Build a bullet list from independent generations, one bullet each.
///
/// Each generation is collapsed onto a single line; empty ones are dropped.
pub fn bullets_from_generations(heading: &str, generations: &[RawGeneration]) -> ParseOutcome {
    let bullets = generations
        .iter()
        .map(|g| g.text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect();
    bullets_outcome(heading, bullets)
}

fn bullets_outcome(heading: &str, bullets: Vec<String>) -> ParseOutcome {
    let heading = non_empty_or_default(heading);
    let degraded = bullets.is_empty();
    let content = SlideContent::Bullets { heading, bullets };
    if degraded {
        ParseOutcome::degraded(content, ParseDegraded::NoBullets)
    } else {
        ParseOutcome::clean(content)
    }
}

/// Parse chart data from a categories line followed by a values line.
///
/// With fewer than two non-empty lines the result is the "no data" sentinel.
/// Categories keep empty tokens as `""`. If any value token is not a finite
/// number, or the counts differ, the values are replaced by zeros.
pub fn parse_chart(raw: &str) -> ParseOutcome {
    let mut lines = raw.lines().filter(|line| !line.trim().is_empty());
    let (Some(category_line), Some(value_line)) = (lines.next(), lines.next()) else {
        return ParseOutcome::degraded(
            SlideContent::Chart(ChartContent::no_data()),
            ParseDegraded::MissingChartLines,
        );
    };

    let categories: Vec<String> = category_line
        .split(',')
        .map(|token| token.trim().to_string())
        .collect();

    let values: Option<Vec<f64>> = value_line
        .split(',')
        .map(|token| token.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect();

    match values {
        Some(values) if values.len() == categories.len() => {
            ParseOutcome::clean(SlideContent::Chart(ChartContent::new(categories, values)))
        }
        Some(_) => ParseOutcome::degraded(
            SlideContent::Chart(ChartContent::zero_filled(categories)),
            ParseDegraded::ChartLengthMismatch,
        ),
        None => ParseOutcome::degraded(
            SlideContent::Chart(ChartContent::zero_filled(categories)),
            ParseDegraded::InvalidChartValue,
        ),
    }
}

/// Parse a body paragraph.
pub fn parse_text(raw: &str) -> ParseOutcome {
    let (body, degradation) = verbatim(raw);
    ParseOutcome {
        content: SlideContent::Text { body },
        degradation,
    }
}

/// Parse the closing message.
pub fn parse_thanks(raw: &str) -> ParseOutcome {
    let (message, degradation) = verbatim(raw);
    ParseOutcome {
        content: SlideContent::Thanks { message },
        degradation,
    }
}

/// Parse the deck title and introduction.
pub fn parse_title(title_raw: &str, intro_raw: &str) -> ParseOutcome {
    let (title, title_degraded) = verbatim(title_raw);
    let (intro, intro_degraded) = verbatim(intro_raw);
    ParseOutcome {
        content: SlideContent::Title { title, intro },
        degradation: title_degraded.or(intro_degraded),
    }
}

/// Wrap generated image bytes.
///
/// Missing or empty bytes mean no picture. Bytes in a format that cannot be
/// detected are dropped as well, and the outcome is marked degraded.
pub fn parse_image(prompt: &str, bytes: Option<Vec<u8>>) -> ParseOutcome {
    let source_prompt = prompt.to_string();
    match bytes.filter(|b| !b.is_empty()) {
        None => ParseOutcome::clean(SlideContent::Image {
            source_prompt,
            image: None,
        }),
        Some(bytes) => match ImageData::from_bytes(bytes) {
            Some(image) => ParseOutcome::clean(SlideContent::Image {
                source_prompt,
                image: Some(image),
            }),
            None => ParseOutcome::degraded(
                SlideContent::Image {
                    source_prompt,
                    image: None,
                },
                ParseDegraded::UnrecognizedImage,
            ),
        },
    }
}

fn verbatim(raw: &str) -> (String, Option<ParseDegraded>) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        (DEFAULT_SLIDE_CONTENT.to_string(), Some(ParseDegraded::EmptyText))
    } else {
        (trimmed.to_string(), None)
    }
}

fn non_empty_or_default(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        DEFAULT_SLIDE_CONTENT.to_string()
    } else {
        trimmed.to_string()
    }
}
