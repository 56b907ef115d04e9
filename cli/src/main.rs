//! slidegen CLI - topic to PowerPoint deck generation
//!
//! Generates a deck from the command line, or serves the HTTP trigger.

mod server;

use clap::{Args, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use slidegen::pptx::PptxWriter;
use slidegen::prompt::SlidePrompts;
use slidegen::{
    resolve_topic, ChartSource, ColumnPolicy, DeckOptions, DeckPlan, DeckState, DocumentBuilder,
    GenerationClient, PromptBuilder, ServiceConfig, Topic,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Generate PowerPoint decks from a single topic
#[derive(Parser)]
#[command(
    name = "slidegen",
    author = "iyulab",
    version,
    about = "Generate PowerPoint decks from a topic",
    long_about = "slidegen - drive a generative-text service slide by slide.\n\n\
                  Builds a title, bullet, text, chart, image and closing slide \
                  for a topic and writes them as a .pptx file."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a deck and write it as .pptx
    #[command(visible_alias = "gen")]
    Generate {
        /// Deck topic (generated when omitted)
        #[arg(short, long)]
        topic: Option<String>,

        /// Output file path (default: SLIDEGEN_OUTPUT or generated_presentation.pptx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the document as JSON to stdout
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        deck: DeckArgs,
    },

    /// Serve the HTTP trigger
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:5000")]
        addr: SocketAddr,

        /// Directory generated decks are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        #[command(flatten)]
        deck: DeckArgs,
    },

    /// Show the deck plan and the prompts it would send
    Plan {
        /// Topic used in the prompts
        #[arg(short, long, default_value = "the moon landing")]
        topic: String,

        #[command(flatten)]
        deck: DeckArgs,
    },

    /// Show version information
    Version,
}

/// Options shared by every command that builds a deck.
#[derive(Args, Debug, Clone)]
struct DeckArgs {
    /// Comma-separated slide types: title, bullets, text, chart, image, thanks
    #[arg(long)]
    plan: Option<String>,

    /// Bullets generated per bullet slide
    #[arg(long, default_value_t = 2)]
    bullets: usize,

    /// Lay bullets out in a single column
    #[arg(long)]
    single_column: bool,

    /// Use fixed sample data for chart slides
    #[arg(long)]
    fixed_chart: bool,

    /// Do not request pictures for image slides
    #[arg(long)]
    no_images: bool,
}

impl DeckArgs {
    fn options(&self) -> slidegen::Result<DeckOptions> {
        let mut options = DeckOptions::new()
            .with_bullet_count(self.bullets)
            .with_images(!self.no_images);

        if let Some(plan) = &self.plan {
            options = options.with_plan(DeckPlan::parse(plan)?);
        }
        if self.single_column {
            options = options.with_column_policy(ColumnPolicy::SingleColumn);
        }
        if self.fixed_chart {
            options = options.with_chart_source(ChartSource::sample());
        }

        options.validate()?;
        Ok(options)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    init_tracing(default_level);

    if let Err(e) = run(cli).await {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Generate {
            topic,
            output,
            json,
            deck,
        } => {
            let options = deck.options()?;
            let mut config = ServiceConfig::from_env()?;
            if let Some(output) = output {
                config = config.with_output(output);
            }
            let client = GenerationClient::from_config(&config)?;

            let pb = create_spinner("Choosing topic...");
            let work = async {
                let topic = resolve_topic(&client, topic.as_deref()).await?;
                pb.set_message(format!(
                    "Generating {} slides about \"{}\"...",
                    options.plan.len(),
                    topic
                ));
                DocumentBuilder::new(client.clone(), options.clone())
                    .build(&topic)
                    .await
            };

            let document = tokio::select! {
                result = work => result?,
                _ = tokio::signal::ctrl_c() => {
                    pb.finish_and_clear();
                    println!("{} Cancelled, nothing was written", "!".yellow().bold());
                    return Ok(());
                }
            };

            pb.set_message("Writing presentation...");
            PptxWriter::new().write_to_path(&document, &config.output)?;
            pb.finish_and_clear();

            if json {
                println!("{}", document.to_json()?);
            }

            println!(
                "{} Wrote {} slides to {}",
                "✓".green().bold(),
                document.len(),
                config.output.display()
            );
            if let Some(title) = &document.metadata().title {
                println!("{}: {}", "Title".bold(), title);
            }
            let degraded = document.degraded_count();
            if degraded > 0 {
                println!(
                    "{} {} slides used default content",
                    "!".yellow().bold(),
                    degraded
                );
            }
        }

        Commands::Serve {
            addr,
            out_dir,
            deck,
        } => {
            let options = deck.options()?;
            let config = ServiceConfig::from_env()?;
            std::fs::create_dir_all(&out_dir)?;

            let client = GenerationClient::from_config(&config).map_err(|e| e.to_string());
            if let Err(reason) = &client {
                tracing::warn!(%reason, "generation is not configured; requests will fail");
            }

            println!(
                "{} Serving on http://{} (decks in {})",
                "✓".green().bold(),
                addr,
                out_dir.display()
            );
            server::serve(addr, server::Server::new(client, options, out_dir)).await?;
        }

        Commands::Plan { topic, deck } => {
            let options = deck.options()?;
            let topic = Topic::new(&topic)?;
            print_plan(&topic, &options);
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_plan(topic: &Topic, options: &DeckOptions) {
    let prompts = PromptBuilder::new(options);
    let state = DeckState::new();

    println!("{}", "Deck Plan".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Topic".bold(), topic);
    println!("{}: {}", "Slides".bold(), options.plan.len());

    for spec in options.plan.slides() {
        println!();
        println!(
            "{} {}",
            format!("{:>2}.", spec.index + 1).bold(),
            spec.slide_type.to_string().cyan()
        );

        match prompts.build(topic, spec, &state) {
            SlidePrompts::None => println!("   {}", "(no generation call)".dimmed()),
            built => {
                for prompt in built.all() {
                    println!("   {}", prompt);
                }
            }
        }
    }
}

fn print_version() {
    println!("{} {}", "slidegen".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Generate PowerPoint decks from a single topic");
    println!();
    println!("Slide types: title, bullets, text, chart, image, thanks");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_deck_args() {
        let cli = Cli::parse_from([
            "slidegen",
            "plan",
            "--plan",
            "title,bullets,thanks",
            "--bullets",
            "4",
            "--single-column",
            "--fixed-chart",
        ]);
        let Commands::Plan { deck, .. } = cli.command else {
            panic!("expected plan command");
        };
        let options = deck.options().unwrap();
        assert_eq!(options.plan.len(), 3);
        assert_eq!(options.bullet_count, 4);
        assert_eq!(options.column_policy, ColumnPolicy::SingleColumn);
        assert!(matches!(options.chart_source, ChartSource::Fixed(_)));
        assert!(options.images);
    }

    #[test]
    fn test_invalid_deck_args() {
        let cli = Cli::parse_from(["slidegen", "generate", "--plan", "title,poster"]);
        let Commands::Generate { deck, .. } = cli.command else {
            panic!("expected generate command");
        };
        assert!(deck.options().is_err());
    }
}
