//! # slidegen
//!
//! Generate PowerPoint decks from a single topic.
//!
//! A deck is described by an ordered plan of slide types. For every slide the
//! library builds a type-specific prompt, asks a generative-text service (and
//! optionally a generative-image service) for content, parses the untrusted
//! answer into typed content, and lays it out as positioned shapes. The
//! finished [`Document`] is written as a `.pptx` package.
//!
//! ## Quick Start
//!
//! ```no_run
//! use slidegen::{generate_presentation, DeckOptions, ServiceConfig};
//!
//! # async fn run() -> slidegen::Result<()> {
//! let config = ServiceConfig::from_env()?;
//! let document =
//!     generate_presentation(&config, DeckOptions::default(), Some("Moon landing")).await?;
//! println!("{} slides", document.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline APIs
//!
//! ```no_run
//! use slidegen::{DeckOptions, DocumentBuilder, GenerationClient, ServiceConfig, Topic};
//! use slidegen::pptx::PptxWriter;
//!
//! # async fn run() -> slidegen::Result<()> {
//! let client = GenerationClient::from_config(&ServiceConfig::from_env()?)?;
//! let builder = DocumentBuilder::new(client, DeckOptions::default());
//! let document = builder.build(&Topic::new("Moon landing")?).await?;
//! PptxWriter::new().write_to_path(&document, "deck.pptx")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `pptx` (default): PowerPoint writer

pub mod builder;
pub mod config;
pub mod error;
pub mod generate;
pub mod layout;
pub mod model;
pub mod parse;
pub mod prompt;

#[cfg(feature = "pptx")]
pub mod pptx;

// Re-exports
pub use builder::{resolve_topic, DocumentBuilder};
pub use config::{ChartSource, ColumnPolicy, DeckOptions, ServiceConfig};
pub use error::{Error, Result};
pub use generate::{GenerationClient, ImageGenerator, RetryPolicy, TextGenerator, TextRequest};
pub use layout::SlideAssembler;
pub use model::{
    ChartContent, DeckPlan, Document, Metadata, Shape, SlideContent, SlideElement, SlideStatus,
    SlideType, Topic,
};
pub use parse::{ParseDegraded, ParseOutcome};
pub use prompt::{DeckState, PromptBuilder};

/// Generate a deck with live services.
///
/// When `topic` is `None` or blank, a topic is generated first.
pub async fn generate_presentation(
    config: &ServiceConfig,
    options: DeckOptions,
    topic: Option<&str>,
) -> Result<Document> {
    options.validate()?;
    let client = GenerationClient::from_config(config)?;
    let topic = resolve_topic(&client, topic).await?;
    DocumentBuilder::new(client, options).build(&topic).await
}

/// Generate a deck and write it to the configured output path.
#[cfg(feature = "pptx")]
pub async fn generate_to_file(
    config: &ServiceConfig,
    options: DeckOptions,
    topic: Option<&str>,
) -> Result<Document> {
    let document = generate_presentation(config, options, topic).await?;
    pptx::PptxWriter::new().write_to_path(&document, &config.output)?;
    Ok(document)
}
