//! Prompt construction for each slide type.
//!
//! Prompt building is pure: it reads the topic, the [`SlideSpec`] and the
//! request-scoped [`DeckState`], and performs no I/O.

use crate::config::{ChartSource, DeckOptions};
use crate::model::{replace_control_chars, SlideSpec, SlideType, Topic};

/// Word ceiling for a single bullet.
pub const BULLET_WORD_LIMIT: usize = 30;

/// Approximate length of the title slide introduction.
pub const INTRO_WORD_TARGET: usize = 40;

/// Generation state shared between the slides of one deck.
///
/// Created fresh for every build, so concurrent builds never observe each
/// other's titles or bullets.
#[derive(Debug, Clone, Default)]
pub struct DeckState {
    title: Option<String>,
    bullets: Vec<String>,
}

impl DeckState {
    /// Create empty state for a new deck.
    pub fn new() -> Self {
        Self::default()
    }

    /// The deck title established by the Title slide, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The deck title, falling back to the topic before a Title slide ran.
    pub fn heading<'a>(&'a self, topic: &'a Topic) -> &'a str {
        self.title.as_deref().unwrap_or_else(|| topic.as_str())
    }

    /// Record the deck title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Bullets generated so far in this deck.
    pub fn bullets(&self) -> &[String] {
        &self.bullets
    }

    /// Record a generated bullet.
    pub fn push_bullet(&mut self, bullet: impl Into<String>) {
        self.bullets.push(bullet.into());
    }
}

/// The prompts one slide needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlidePrompts {
    /// Title and introduction prompts
    Title { title: String, intro: String },
    /// One prompt per bullet
    Bullets(Vec<String>),
    /// One paragraph prompt
    Text(String),
    /// One prompt for a categories line and a values line
    Chart(String),
    /// One prompt for the image service
    Image(String),
    /// No generation call
    None,
}

impl SlidePrompts {
    /// All prompt strings, in the order they are sent.
    pub fn all(&self) -> Vec<&str> {
        match self {
            SlidePrompts::Title { title, intro } => vec![title.as_str(), intro.as_str()],
            SlidePrompts::Bullets(prompts) => prompts.iter().map(String::as_str).collect(),
            SlidePrompts::Text(p) | SlidePrompts::Chart(p) | SlidePrompts::Image(p) => {
                vec![p.as_str()]
            }
            SlidePrompts::None => Vec::new(),
        }
    }

    /// Number of generation calls the slide needs.
    pub fn len(&self) -> usize {
        self.all().len()
    }

    /// Whether the slide needs no generation call.
    pub fn is_empty(&self) -> bool {
        matches!(self, SlidePrompts::None)
    }
}

/// Builds the prompts for each slide of a deck.
#[derive(Debug, Clone)]
pub struct PromptBuilder<'a> {
    options: &'a DeckOptions,
}

impl<'a> PromptBuilder<'a> {
    /// Create a prompt builder for a deck configuration.
    pub fn new(options: &'a DeckOptions) -> Self {
        Self { options }
    }

    /// Prompt used to invent a topic when the caller supplies none.
    pub fn topic_prompt() -> String {
        "Please suggest a conspiracy theory idea for a movie. \
         Answer with a single line containing only the idea."
            .to_string()
    }

    /// Build the prompts for one slide.
    pub fn build(&self, topic: &Topic, spec: &SlideSpec, state: &DeckState) -> SlidePrompts {
        let topic_text = topic.as_str();

        match spec.slide_type {
            SlideType::Title => SlidePrompts::Title {
                title: sanitize(&format!(
                    "Suggest a short, evocative presentation title about: {}. \
                     Answer with the title only, no quotes.",
                    topic_text
                )),
                intro: sanitize(&format!(
                    "Write an introduction paragraph of about {} words for a presentation about: {}. \
                     Mix verifiably real facts with clearly fabricated supporting claims. \
                     Answer with the paragraph only.",
                    INTRO_WORD_TARGET, topic_text
                )),
            },
            SlideType::Bullets => {
                let heading = state.heading(topic);
                let prompts = (0..self.options.bullet_count)
                    .map(|n| self.bullet_prompt(heading, topic_text, n, state))
                    .collect();
                SlidePrompts::Bullets(prompts)
            }
            SlideType::Text => SlidePrompts::Text(sanitize(&format!(
                "Write one paragraph of supporting detail for the presentation '{}' about: {}. \
                 Answer with the paragraph only.",
                state.heading(topic),
                topic_text
            ))),
            SlideType::Chart => match self.options.chart_source {
                ChartSource::Generated => SlidePrompts::Chart(sanitize(&format!(
                    "Provide chart data supporting the presentation '{}'. \
                     Answer with exactly two lines and nothing else: \
                     first line a comma-separated list of 3 to 6 short category names, \
                     second line a comma-separated list of the same number of plain numbers.",
                    state.heading(topic)
                ))),
                ChartSource::Fixed(_) => SlidePrompts::None,
            },
            SlideType::Image => SlidePrompts::Image(sanitize(&format!(
                "A dramatic, photorealistic illustration for a presentation about: {}. \
                 No text or lettering in the image.",
                topic_text
            ))),
            SlideType::Thanks => SlidePrompts::None,
        }
    }

    fn bullet_prompt(&self, heading: &str, topic: &str, n: usize, state: &DeckState) -> String {
        let mut prompt = format!(
            "Write bullet point {} of {} for the presentation '{}' about: {}. \
             Keep it under {} words and answer with the bullet text only.",
            n + 1,
            self.options.bullet_count,
            heading,
            topic,
            BULLET_WORD_LIMIT
        );
        if !state.bullets().is_empty() {
            prompt.push_str("\nDo not repeat these points:");
            for bullet in state.bullets() {
                prompt.push_str("\n- ");
                prompt.push_str(&replace_control_chars(bullet));
            }
        }
        sanitize(&prompt)
    }
}

/// Replace control characters other than line feeds with spaces.
fn sanitize(prompt: &str) -> String {
    prompt
        .chars()
        .map(|c| if c.is_control() && c != '\n' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeckPlan;

    fn spec(index: usize, slide_type: SlideType) -> SlideSpec {
        SlideSpec { index, slide_type }
    }

    fn assert_clean(prompts: &SlidePrompts) {
        for prompt in prompts.all() {
            assert!(!prompt.trim().is_empty());
            assert!(prompt.chars().all(|c| !c.is_control() || c == '\n'));
        }
    }

    #[test]
    fn test_title_prompts() {
        let options = DeckOptions::default();
        let builder = PromptBuilder::new(&options);
        let topic = Topic::new("Birds are drones").unwrap();

        let prompts = builder.build(&topic, &spec(0, SlideType::Title), &DeckState::new());
        match &prompts {
            SlidePrompts::Title { title, intro } => {
                assert!(title.contains("Birds are drones"));
                assert!(intro.contains("40 words"));
                assert!(intro.contains("fabricated"));
            }
            other => panic!("unexpected prompts: {:?}", other),
        }
        assert_eq!(prompts.len(), 2);
        assert_clean(&prompts);
    }

    #[test]
    fn test_bullet_prompts_use_deck_title() {
        let options = DeckOptions::default().with_bullet_count(3);
        let builder = PromptBuilder::new(&options);
        let topic = Topic::new("Birds are drones").unwrap();
        let mut state = DeckState::new();
        state.set_title("The Feathered Network");

        let prompts = builder.build(&topic, &spec(1, SlideType::Bullets), &state);
        let all = prompts.all();
        assert_eq!(all.len(), 3);
        for prompt in all {
            assert!(prompt.contains("The Feathered Network"));
            assert!(prompt.contains("under 30 words"));
        }
    }

    #[test]
    fn test_bullet_prompts_avoid_repeats() {
        let options = DeckOptions::default().with_bullet_count(1);
        let builder = PromptBuilder::new(&options);
        let topic = Topic::new("Birds are drones").unwrap();
        let mut state = DeckState::new();
        state.push_bullet("Pigeons\trecharge on power lines");

        let prompts = builder.build(&topic, &spec(1, SlideType::Bullets), &state);
        assert!(prompts.all()[0].contains("- Pigeons recharge on power lines"));
        assert_clean(&prompts);
    }

    #[test]
    fn test_heading_falls_back_to_topic() {
        let topic = Topic::new("Birds are drones").unwrap();
        let state = DeckState::new();
        assert_eq!(state.heading(&topic), "Birds are drones");
        assert!(state.title().is_none());
    }

    #[test]
    fn test_chart_prompt_depends_on_source() {
        let topic = Topic::new("Birds are drones").unwrap();
        let state = DeckState::new();

        let generated = DeckOptions::default();
        let prompts = PromptBuilder::new(&generated).build(&topic, &spec(3, SlideType::Chart), &state);
        assert!(matches!(prompts, SlidePrompts::Chart(ref p) if p.contains("two lines")));

        let fixed = DeckOptions::default().with_chart_source(ChartSource::sample());
        let prompts = PromptBuilder::new(&fixed).build(&topic, &spec(3, SlideType::Chart), &state);
        assert!(prompts.is_empty());
    }

    #[test]
    fn test_every_slide_type_is_clean() {
        let options = DeckOptions::default();
        let builder = PromptBuilder::new(&options);
        let topic = Topic::new("Birds are drones").unwrap();
        let mut state = DeckState::new();
        state.set_title("Title\u{7}with bell");

        let plan = DeckPlan::new(SlideType::ALL).unwrap();
        for spec in plan.slides() {
            let prompts = builder.build(&topic, spec, &state);
            assert_clean(&prompts);
            if spec.slide_type == SlideType::Thanks {
                assert!(prompts.is_empty());
            } else {
                assert!(!prompts.is_empty());
            }
        }
        assert!(!PromptBuilder::topic_prompt().is_empty());
    }
}
