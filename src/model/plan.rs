//! Deck plan: topic, slide types and the ordered slide sequence.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of slide content shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideType {
    /// Deck title plus introduction paragraph
    Title,
    /// Heading plus a list of short bullets
    Bullets,
    /// A single paragraph under a fixed caption
    Text,
    /// A clustered column chart
    Chart,
    /// A generated picture
    Image,
    /// Closing slide
    Thanks,
}

impl SlideType {
    /// All slide types, in declaration order.
    pub const ALL: [SlideType; 6] = [
        SlideType::Title,
        SlideType::Bullets,
        SlideType::Text,
        SlideType::Chart,
        SlideType::Image,
        SlideType::Thanks,
    ];

    /// The lowercase tag used in plans and serialized output.
    pub fn tag(&self) -> &'static str {
        match self {
            SlideType::Title => "title",
            SlideType::Bullets => "bullets",
            SlideType::Text => "text",
            SlideType::Chart => "chart",
            SlideType::Image => "image",
            SlideType::Thanks => "thanks",
        }
    }
}

impl fmt::Display for SlideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SlideType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_lowercase();
        SlideType::ALL
            .into_iter()
            .find(|t| t.tag() == tag)
            .ok_or_else(|| Error::config(format!("unknown slide type '{}'", s.trim())))
    }
}

/// One entry of the deck plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideSpec {
    /// Position in the deck (0-based)
    pub index: usize,
    /// Declared content shape
    pub slide_type: SlideType,
}

/// The fixed, ordered sequence of slides a deck is built from.
///
/// A plan is never empty; indices always equal positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SlideType>", into = "Vec<SlideType>")]
pub struct DeckPlan {
    slides: Vec<SlideSpec>,
}

impl DeckPlan {
    /// Build a plan from slide types, assigning indices in order.
    pub fn new(types: impl IntoIterator<Item = SlideType>) -> Result<Self> {
        let slides: Vec<SlideSpec> = types
            .into_iter()
            .enumerate()
            .map(|(index, slide_type)| SlideSpec { index, slide_type })
            .collect();

        if slides.is_empty() {
            return Err(Error::config("deck plan is empty"));
        }

        Ok(Self { slides })
    }

    /// Parse a comma-separated list of slide tags, e.g. `"title,bullets,thanks"`.
    pub fn parse(list: &str) -> Result<Self> {
        let types = list
            .split(',')
            .filter(|tag| !tag.trim().is_empty())
            .map(SlideType::from_str)
            .collect::<Result<Vec<_>>>()?;
        Self::new(types)
    }

    /// The slides in deck order.
    pub fn slides(&self) -> &[SlideSpec] {
        &self.slides
    }

    /// Number of slides in the plan.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Slide types in deck order.
    pub fn types(&self) -> impl Iterator<Item = SlideType> + '_ {
        self.slides.iter().map(|s| s.slide_type)
    }

    /// Whether the plan contains at least one slide of the given type.
    pub fn contains(&self, slide_type: SlideType) -> bool {
        self.slides.iter().any(|s| s.slide_type == slide_type)
    }
}

impl Default for DeckPlan {
    fn default() -> Self {
        Self {
            slides: [
                SlideType::Title,
                SlideType::Bullets,
                SlideType::Text,
                SlideType::Chart,
                SlideType::Image,
                SlideType::Text,
                SlideType::Thanks,
            ]
            .into_iter()
            .enumerate()
            .map(|(index, slide_type)| SlideSpec { index, slide_type })
            .collect(),
        }
    }
}

impl TryFrom<Vec<SlideType>> for DeckPlan {
    type Error = Error;

    fn try_from(types: Vec<SlideType>) -> Result<Self> {
        DeckPlan::new(types)
    }
}

impl From<DeckPlan> for Vec<SlideType> {
    fn from(plan: DeckPlan) -> Self {
        plan.types().collect()
    }
}

impl fmt::Display for DeckPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<&str> = self.types().map(|t| t.tag()).collect();
        f.write_str(&tags.join(","))
    }
}

/// The subject of a whole deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    /// Create a topic, rejecting blank input.
    ///
    /// Control characters (including line breaks) are replaced with spaces so
    /// the topic can be embedded in any prompt.
    pub fn new(text: impl AsRef<str>) -> Result<Self> {
        let cleaned = replace_control_chars(text.as_ref());
        let trimmed = cleaned.trim();
        if trimmed.is_empty() {
            return Err(Error::config("topic must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The topic text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Topic {
    type Error = Error;

    fn try_from(text: String) -> Result<Self> {
        Topic::new(text)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

/// Replace every control character with a single space.
pub(crate) fn replace_control_chars(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Unvalidated text returned by the generation service for one slide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGeneration {
    /// Slide the text was generated for
    pub slide_index: usize,
    /// Raw generated text
    pub text: String,
}

impl RawGeneration {
    /// Wrap generated text for a slide.
    pub fn new(slide_index: usize, text: impl Into<String>) -> Self {
        Self {
            slide_index,
            text: text.into(),
        }
    }

    /// The degradation default: no text at all.
    pub fn empty(slide_index: usize) -> Self {
        Self {
            slide_index,
            text: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_type_from_str() {
        assert_eq!("Bullets".parse::<SlideType>().unwrap(), SlideType::Bullets);
        assert_eq!(" chart ".parse::<SlideType>().unwrap(), SlideType::Chart);
        assert!("video".parse::<SlideType>().is_err());
    }

    #[test]
    fn test_plan_assigns_indices() {
        let plan = DeckPlan::new([SlideType::Title, SlideType::Text, SlideType::Thanks]).unwrap();
        assert_eq!(plan.len(), 3);
        for (i, spec) in plan.slides().iter().enumerate() {
            assert_eq!(spec.index, i);
        }
        assert_eq!(plan.slides()[1].slide_type, SlideType::Text);
    }

    #[test]
    fn test_empty_plan_rejected() {
        let err = DeckPlan::new(Vec::new()).unwrap_err();
        assert!(err.is_fatal());
        assert!(DeckPlan::parse(" , ").is_err());
    }

    #[test]
    fn test_plan_parse_and_display() {
        let plan = DeckPlan::parse("title, bullets,chart,thanks").unwrap();
        assert_eq!(plan.to_string(), "title,bullets,chart,thanks");
        assert!(DeckPlan::parse("title,slideshow").is_err());
    }

    #[test]
    fn test_default_plan() {
        let plan = DeckPlan::default();
        assert_eq!(plan.slides()[0].slide_type, SlideType::Title);
        assert_eq!(plan.slides()[plan.len() - 1].slide_type, SlideType::Thanks);
        assert!(plan.contains(SlideType::Chart));
    }

    #[test]
    fn test_plan_serde() {
        let plan = DeckPlan::parse("title,thanks").unwrap();
        let json = serde_json::to_string(&plan).unwrap();
        assert_eq!(json, r#"["title","thanks"]"#);

        let parsed: DeckPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, plan);
        assert!(serde_json::from_str::<DeckPlan>("[]").is_err());
    }

    #[test]
    fn test_topic_validation() {
        assert!(Topic::new("   ").is_err());
        let topic = Topic::new("  Moon\nlanding\t").unwrap();
        assert_eq!(topic.as_str(), "Moon landing");
    }
}
