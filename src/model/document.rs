//! Document model structures.

use super::{DeckPlan, SlideElement, SlideStatus, SlideType};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Deck-level metadata, also written to docProps/core.xml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Topic the deck was generated for
    pub topic: String,

    /// Generated deck title (shared with every Bullets slide)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Number of slides
    pub slide_count: usize,

    /// Creation date (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// An in-progress document owned by the document builder.
///
/// Slides can only be appended, and only in plan order.
#[derive(Debug)]
pub struct DocumentDraft {
    plan: DeckPlan,
    metadata: Metadata,
    slides: Vec<SlideElement>,
}

impl DocumentDraft {
    /// Start an empty draft for a plan.
    pub fn new(plan: DeckPlan, topic: impl Into<String>) -> Self {
        let capacity = plan.len();
        Self {
            plan,
            metadata: Metadata {
                topic: topic.into(),
                ..Default::default()
            },
            slides: Vec::with_capacity(capacity),
        }
    }

    /// Record the deck title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.metadata.title = Some(title.into());
    }

    /// Index of the next slide the draft expects.
    pub fn next_index(&self) -> usize {
        self.slides.len()
    }

    /// Number of slides appended so far.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether no slides were appended yet.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Append the next slide.
    ///
    /// The element must carry the index and type the plan expects next.
    pub fn append(&mut self, element: SlideElement) -> Result<()> {
        let expected = self
            .plan
            .slides()
            .get(self.slides.len())
            .ok_or_else(|| Error::config("document already holds every planned slide"))?;

        if element.index != expected.index || element.slide_type != expected.slide_type {
            return Err(Error::config(format!(
                "slide {} ({}) appended where slide {} ({}) was planned",
                element.index, element.slide_type, expected.index, expected.slide_type
            )));
        }

        self.slides.push(element);
        Ok(())
    }

    /// Seal the draft into an immutable document.
    ///
    /// Fails if fewer slides were appended than the plan holds.
    pub fn finalize(self) -> Result<Document> {
        if self.slides.len() != self.plan.len() {
            return Err(Error::config(format!(
                "document holds {} of {} planned slides",
                self.slides.len(),
                self.plan.len()
            )));
        }

        let mut metadata = self.metadata;
        metadata.slide_count = self.slides.len();
        if metadata.created.is_none() {
            metadata.created = Some(chrono::Utc::now().to_rfc3339());
        }

        Ok(Document {
            metadata,
            slides: self.slides,
        })
    }
}

/// A finished presentation: one element per planned slide, in deck order.
///
/// A `Document` has no mutating API; it is handed to a sink as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    metadata: Metadata,
    slides: Vec<SlideElement>,
}

impl Document {
    /// Document metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Slides in deck order.
    pub fn slides(&self) -> &[SlideElement] {
        &self.slides
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether the document has no slides. Never true for a built deck.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Slide types in deck order.
    pub fn slide_types(&self) -> Vec<SlideType> {
        self.slides.iter().map(|s| s.slide_type).collect()
    }

    /// Number of slides whose content fell back or degraded.
    pub fn degraded_count(&self) -> usize {
        self.slides
            .iter()
            .filter(|s| s.status != SlideStatus::Generated)
            .count()
    }

    /// Extract all text content as a single string.
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        for slide in &self.slides {
            let slide_text = slide.plain_text();
            if !slide_text.is_empty() {
                text.push_str(&slide_text);
                text.push_str("\n\n");
            }
        }
        text.trim().to_string()
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Convert to JSON string (compact).
    pub fn to_json_compact(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
