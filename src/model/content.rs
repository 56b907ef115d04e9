//! Typed slide content produced by the content parser.

use super::{ImageData, SlideType};
use serde::{Deserialize, Serialize};

/// Text substituted whenever a text region would otherwise be empty.
pub const DEFAULT_SLIDE_CONTENT: &str = "Default Slide Content";

/// Closing message of the Thanks slide.
pub const THANKS_MESSAGE: &str = "Thank You!";

/// Category/value series for a chart slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartContent {
    /// Category labels in source order; empty labels keep their position
    pub categories: Vec<String>,
    /// One value per category
    pub values: Vec<f64>,
    /// True when the values came from the source rather than zero-fill
    pub same_length: bool,
}

impl ChartContent {
    /// Chart data whose values were parsed successfully.
    ///
    /// Falls back to [`ChartContent::zero_filled`] when the lengths differ.
    pub fn new(categories: Vec<String>, values: Vec<f64>) -> Self {
        if categories.len() != values.len() {
            return Self::zero_filled(categories);
        }
        Self {
            categories,
            values,
            same_length: true,
        }
    }

    /// Chart data whose values could not be established.
    pub fn zero_filled(categories: Vec<String>) -> Self {
        let values = vec![0.0; categories.len()];
        Self {
            categories,
            values,
            same_length: false,
        }
    }

    /// The "no data" sentinel: rendered as a placeholder, never as a chart.
    pub fn no_data() -> Self {
        Self::default()
    }

    /// Whether this is the "no data" sentinel.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() || self.values.is_empty()
    }
}

/// Validated content for one slide, keyed by slide type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SlideContent {
    Title {
        title: String,
        intro: String,
    },
    Bullets {
        heading: String,
        bullets: Vec<String>,
    },
    Text {
        body: String,
    },
    Chart(ChartContent),
    Image {
        source_prompt: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        image: Option<ImageData>,
    },
    Thanks {
        message: String,
    },
}

impl SlideContent {
    /// The slide type this content belongs to.
    pub fn slide_type(&self) -> SlideType {
        match self {
            SlideContent::Title { .. } => SlideType::Title,
            SlideContent::Bullets { .. } => SlideType::Bullets,
            SlideContent::Text { .. } => SlideType::Text,
            SlideContent::Chart(_) => SlideType::Chart,
            SlideContent::Image { .. } => SlideType::Image,
            SlideContent::Thanks { .. } => SlideType::Thanks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_new_keeps_matching_values() {
        let chart = ChartContent::new(vec!["A".into(), "B".into()], vec![1.5, 2.5]);
        assert!(chart.same_length);
        assert_eq!(chart.values, vec![1.5, 2.5]);
    }

    #[test]
    fn test_chart_new_zero_fills_mismatch() {
        let chart = ChartContent::new(vec!["A".into(), "B".into(), "C".into()], vec![1.0]);
        assert!(!chart.same_length);
        assert_eq!(chart.values, vec![0.0, 0.0, 0.0]);
        assert_eq!(chart.categories.len(), chart.values.len());
    }

    #[test]
    fn test_no_data_sentinel() {
        let chart = ChartContent::no_data();
        assert!(chart.is_empty());
        assert!(!chart.same_length);
    }

    #[test]
    fn test_content_serialization_tag() {
        let content = SlideContent::Text {
            body: "Hello".to_string(),
        };
        let json = serde_json::to_string(&content).unwrap();
        assert_eq!(json, r#"{"type":"text","body":"Hello"}"#);
        assert_eq!(content.slide_type(), SlideType::Text);
    }
}
