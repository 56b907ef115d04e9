//! Document builder: drives the pipeline for one deck.
//!
//! Slides are produced strictly in plan order. Each slide moves through the
//! stages of [`SlideStage`]; a generation failure on one slide is absorbed
//! into default content and never touches its siblings.

use crate::config::{ChartSource, DeckOptions};
use crate::error::{Error, Result};
use crate::generate::{GenerationClient, TextRequest};
use crate::layout::SlideAssembler;
use crate::model::{
    DeckPlan, Document, DocumentDraft, RawGeneration, SlideContent, SlideElement, SlideSpec,
    SlideStatus, SlideType, Topic, THANKS_MESSAGE,
};
use crate::parse::{parse_slide, ParseOutcome, SlideInput};
use crate::prompt::{DeckState, PromptBuilder, SlidePrompts};
use std::fmt;
use tracing::{debug, info, warn};

/// System prompt used when inventing a topic.
pub const TOPIC_PERSONA: &str = "You are a conspiracy scientist";

/// Lifecycle of one slide inside a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideStage {
    Pending,
    Prompted,
    Generated,
    Parsed,
    Assembled,
    Appended,
}

impl fmt::Display for SlideStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlideStage::Pending => "pending",
            SlideStage::Prompted => "prompted",
            SlideStage::Generated => "generated",
            SlideStage::Parsed => "parsed",
            SlideStage::Assembled => "assembled",
            SlideStage::Appended => "appended",
        };
        f.write_str(name)
    }
}

/// Builds documents from topics.
///
/// A builder holds no per-deck state and can serve concurrent builds.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    client: GenerationClient,
    options: DeckOptions,
}

impl DocumentBuilder {
    /// Create a builder.
    pub fn new(client: GenerationClient, options: DeckOptions) -> Self {
        Self { client, options }
    }

    /// Deck options in use.
    pub fn options(&self) -> &DeckOptions {
        &self.options
    }

    /// The deck plan in use.
    pub fn plan(&self) -> &DeckPlan {
        &self.options.plan
    }

    /// Generate and assemble a full deck for a topic.
    ///
    /// Only invalid options fail the build, and they fail it before any
    /// generation call. Every other problem degrades a single slide.
    pub async fn build(&self, topic: &Topic) -> Result<Document> {
        self.options.validate()?;

        let prompts = PromptBuilder::new(&self.options);
        let assembler = SlideAssembler::new(self.options.column_policy);
        let mut state = DeckState::new();
        let mut draft = DocumentDraft::new(self.options.plan.clone(), topic.as_str());

        info!(topic = %topic, slides = self.options.plan.len(), "building deck");

        for spec in self.options.plan.slides() {
            let element = self
                .build_slide(topic, spec, &prompts, &assembler, &mut state)
                .await;
            let status = element.status;
            draft.append(element)?;
            trace_stage(spec, SlideStage::Appended);
            info!(
                slide = spec.index,
                slide_type = %spec.slide_type,
                status = ?status,
                "slide complete"
            );
        }

        if let Some(title) = state.title() {
            draft.set_title(title);
        }

        let document = draft.finalize()?;
        info!(
            topic = %topic,
            slides = document.len(),
            degraded = document.degraded_count(),
            "deck complete"
        );
        Ok(document)
    }

    async fn build_slide(
        &self,
        topic: &Topic,
        spec: &SlideSpec,
        prompts: &PromptBuilder<'_>,
        assembler: &SlideAssembler,
        state: &mut DeckState,
    ) -> SlideElement {
        trace_stage(spec, SlideStage::Pending);

        let slide_prompts = prompts.build(topic, spec, state);
        trace_stage(spec, SlideStage::Prompted);

        let (material, generation_status) = self.generate(topic, spec, slide_prompts, state).await;
        trace_stage(spec, SlideStage::Generated);

        let outcome = match material {
            Material::Parse(input) => parse_slide(input),
            Material::Fixed(content) => ParseOutcome::clean(content),
        };
        if let Some(reason) = outcome.degradation {
            warn!(
                slide = spec.index,
                slide_type = %spec.slide_type,
                %reason,
                "generated content degraded to defaults"
            );
        }
        trace_stage(spec, SlideStage::Parsed);

        match &outcome.content {
            SlideContent::Title { title, .. } => state.set_title(title.clone()),
            SlideContent::Bullets { bullets, .. } if bullets.len() > assembler.capacity() => {
                warn!(
                    slide = spec.index,
                    bullets = bullets.len(),
                    capacity = assembler.capacity(),
                    "bullets beyond column capacity are not laid out"
                );
            }
            _ => {}
        }

        let status = outcome.status().worst(generation_status);
        let shapes = assembler.layout(&outcome.content);
        trace_stage(spec, SlideStage::Assembled);

        SlideElement::new(spec.index, spec.slide_type, shapes).with_status(status)
    }

    /// Run the generation calls of one slide.
    ///
    /// Returns the material to parse and `Fallback` if any call failed.
    async fn generate(
        &self,
        topic: &Topic,
        spec: &SlideSpec,
        prompts: SlidePrompts,
        state: &mut DeckState,
    ) -> (Material, SlideStatus) {
        let index = spec.index;
        let mut status = SlideStatus::Generated;

        let material = match prompts {
            SlidePrompts::Title { title, intro } => {
                let title = match self.text(spec, &title).await {
                    Some(text) => text,
                    None => {
                        status = SlideStatus::Fallback;
                        topic.as_str().to_string()
                    }
                };
                let intro = self.text(spec, &intro).await.unwrap_or_else(|| {
                    status = SlideStatus::Fallback;
                    String::new()
                });
                Material::Parse(SlideInput::Title {
                    title: RawGeneration::new(index, title),
                    intro: RawGeneration::new(index, intro),
                })
            }
            SlidePrompts::Bullets(bullet_prompts) => {
                let mut generations = Vec::with_capacity(bullet_prompts.len());
                for prompt in &bullet_prompts {
                    match self.text(spec, prompt).await {
                        Some(text) => {
                            state.push_bullet(text.clone());
                            generations.push(RawGeneration::new(index, text));
                        }
                        None => status = SlideStatus::Fallback,
                    }
                }
                Material::Parse(SlideInput::Bullets {
                    heading: state.heading(topic).to_string(),
                    generations,
                })
            }
            SlidePrompts::Text(prompt) => {
                let raw = self.raw_or_empty(spec, &prompt, &mut status).await;
                Material::Parse(SlideInput::Text(raw))
            }
            SlidePrompts::Chart(prompt) => {
                let raw = self.raw_or_empty(spec, &prompt, &mut status).await;
                Material::Parse(SlideInput::Chart(raw))
            }
            SlidePrompts::Image(prompt) => {
                let bytes = if self.options.images && self.client.has_images() {
                    match self.client.generate_image(index, &prompt).await {
                        Ok(bytes) => Some(bytes),
                        Err(err) => {
                            warn_fallback(spec, &err);
                            status = SlideStatus::Fallback;
                            None
                        }
                    }
                } else {
                    debug!(slide = index, "image generation disabled");
                    None
                };
                Material::Parse(SlideInput::Image { prompt, bytes })
            }
            SlidePrompts::None => match (spec.slide_type, &self.options.chart_source) {
                (SlideType::Chart, ChartSource::Fixed(chart)) => {
                    Material::Fixed(SlideContent::Chart(chart.clone()))
                }
                _ => Material::Parse(SlideInput::Thanks(RawGeneration::new(
                    index,
                    THANKS_MESSAGE,
                ))),
            },
        };

        (material, status)
    }

    async fn text(&self, spec: &SlideSpec, prompt: &str) -> Option<String> {
        let request = TextRequest::new(prompt, self.options.persona.as_str()).for_slide(spec.index);
        match self.client.generate_text(&request).await {
            Ok(text) => Some(text),
            Err(err) => {
                warn_fallback(spec, &err);
                None
            }
        }
    }

    async fn raw_or_empty(
        &self,
        spec: &SlideSpec,
        prompt: &str,
        status: &mut SlideStatus,
    ) -> RawGeneration {
        match self.text(spec, prompt).await {
            Some(text) => RawGeneration::new(spec.index, text),
            None => {
                *status = SlideStatus::Fallback;
                RawGeneration::empty(spec.index)
            }
        }
    }
}

/// What the generation step hands to the parse step.
enum Material {
    Parse(SlideInput),
    Fixed(SlideContent),
}

fn trace_stage(spec: &SlideSpec, stage: SlideStage) {
    debug!(slide = spec.index, slide_type = %spec.slide_type, %stage, "slide stage");
}

fn warn_fallback(spec: &SlideSpec, err: &Error) {
    warn!(
        slide = spec.index,
        slide_type = %spec.slide_type,
        error = %err,
        "generation failed, using default content"
    );
}

/// Use the given topic, or ask the text service for one.
///
/// A blank or missing topic triggers generation. The first non-empty line of
/// the answer becomes the topic.
pub async fn resolve_topic(client: &GenerationClient, topic: Option<&str>) -> Result<Topic> {
    if let Some(text) = topic.filter(|t| !t.trim().is_empty()) {
        return Topic::new(text);
    }

    let prompt = PromptBuilder::topic_prompt();
    let request = TextRequest::new(prompt.as_str(), TOPIC_PERSONA);
    let answer = client.generate_text(&request).await?;
    debug!(topic = %answer, "generated topic");

    answer
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| Error::GenerationFailed {
            slide_index: None,
            prompt,
            reason: "the service returned an empty topic".to_string(),
        })
        .and_then(Topic::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{RetryPolicy, TextGenerator};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct Echo;

    #[async_trait]
    impl TextGenerator for Echo {
        async fn generate(&self, request: &TextRequest) -> Result<String> {
            if request.prompt.contains("chart data") {
                Ok("A,B\n1,2".to_string())
            } else if request.slide_index.is_none() {
                Ok("\n  Pigeons are surveillance drones \nsecond line".to_string())
            } else {
                Ok(format!("answer for slide {:?}", request.slide_index))
            }
        }
    }

    struct Down;

    #[async_trait]
    impl TextGenerator for Down {
        async fn generate(&self, _request: &TextRequest) -> Result<String> {
            Err(Error::Http("connection refused".to_string()))
        }
    }

    fn client(service: Arc<dyn TextGenerator>) -> GenerationClient {
        GenerationClient::new(service).with_retry(
            RetryPolicy::default()
                .with_max_retries(0)
                .with_base_delay(Duration::ZERO),
        )
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(SlideStage::Pending.to_string(), "pending");
        assert_eq!(SlideStage::Appended.to_string(), "appended");
    }

    #[tokio::test]
    async fn test_build_default_plan() {
        let builder = DocumentBuilder::new(client(Arc::new(Echo)), DeckOptions::default());
        let topic = Topic::new("Birds are drones").unwrap();
        let doc = builder.build(&topic).await.unwrap();

        assert_eq!(doc.len(), builder.plan().len());
        assert_eq!(doc.slide_types(), builder.plan().types().collect::<Vec<_>>());
        assert_eq!(
            doc.metadata().title.as_deref(),
            Some("answer for slide Some(0)")
        );
        assert!(doc.slides()[3].has_chart());
    }

    #[tokio::test]
    async fn test_build_with_dead_service_still_completes() {
        let builder = DocumentBuilder::new(client(Arc::new(Down)), DeckOptions::default());
        let topic = Topic::new("Birds are drones").unwrap();
        let doc = builder.build(&topic).await.unwrap();

        assert_eq!(doc.len(), 7);
        assert_eq!(doc.metadata().title.as_deref(), Some("Birds are drones"));
        assert_eq!(doc.slides()[0].status, SlideStatus::Fallback);
        // The Thanks slide makes no call
        assert_eq!(doc.slides()[6].status, SlideStatus::Generated);
    }

    #[tokio::test]
    async fn test_invalid_options_fail_before_generation() {
        let options = DeckOptions::default().with_bullet_count(0);
        let builder = DocumentBuilder::new(client(Arc::new(Down)), options);
        let topic = Topic::new("Birds are drones").unwrap();
        assert!(builder.build(&topic).await.unwrap_err().is_fatal());
    }

    #[tokio::test]
    async fn test_resolve_topic() {
        let echo = client(Arc::new(Echo));
        let given = resolve_topic(&echo, Some(" Moon landing ")).await.unwrap();
        assert_eq!(given.as_str(), "Moon landing");

        let generated = resolve_topic(&echo, Some("   ")).await.unwrap();
        assert_eq!(generated.as_str(), "Pigeons are surveillance drones");

        let err = resolve_topic(&client(Arc::new(Down)), None).await.unwrap_err();
        assert!(matches!(err, Error::GenerationFailed { slide_index: None, .. }));
    }
}
