// Quill - LinkedIn post generation with a writer/critic rewrite loop
// Main entry point

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quill::config::{load_config, Config};
use quill::logging::RunLogger;
use quill::pipeline::{mermaid, ContentKind, GenerationRequest, RewriteController};
use quill::providers::build_collaborators;

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Draft, critique and rewrite LinkedIn posts")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.quill/config.toml, then environment)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a post and print the final pipeline state as JSON
    Generate(GenerateArgs),

    /// Print the pipeline state machine as a Mermaid flowchart
    Graph,
}

#[derive(Args)]
struct GenerateArgs {
    /// JSON request file (same fields as the flags below)
    #[arg(long, conflicts_with_all = ["topic", "description", "tone", "audience", "intent"])]
    request: Option<PathBuf>,

    #[arg(long, required_unless_present = "request")]
    topic: Option<String>,

    #[arg(long, default_value = "")]
    description: String,

    #[arg(long, required_unless_present = "request")]
    tone: Option<String>,

    #[arg(long, required_unless_present = "request")]
    audience: Option<String>,

    #[arg(long, required_unless_present = "request")]
    intent: Option<String>,

    /// Target post length in words
    #[arg(long)]
    word_limit: Option<u32>,

    /// Source material kind: text, url, image or video
    #[arg(long, default_value = "text")]
    kind: ContentKind,

    /// Locator of the source material (URL or path)
    #[arg(long)]
    source: Option<String>,

    /// Skip writing the run log even if one is configured
    #[arg(long)]
    no_run_log: bool,
}

impl GenerateArgs {
    fn to_request(&self) -> Result<GenerationRequest> {
        if let Some(path) = &self.request {
            return read_request(path);
        }

        // clap enforces these when --request is absent
        let required = |value: &Option<String>, name: &str| {
            value
                .clone()
                .with_context(|| format!("--{} is required without --request", name))
        };

        let mut request = GenerationRequest::new(
            required(&self.topic, "topic")?,
            self.description.clone(),
            required(&self.tone, "tone")?,
            required(&self.audience, "audience")?,
            required(&self.intent, "intent")?,
        )
        .with_kind(self.kind);

        if let Some(limit) = self.word_limit {
            request = request.with_word_limit(limit);
        }
        if let Some(source) = &self.source {
            request = request.with_source(self.kind, source.clone());
        }
        Ok(request)
    }
}

fn read_request(path: &Path) -> Result<GenerationRequest> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid request JSON in {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "quill=debug,info" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // stdout carries only the JSON result
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Graph => {
            let pipeline = match &cli.config {
                Some(path) => load_config(Some(path.as_path()))?.pipeline,
                None => Default::default(),
            };
            print!("{}", mermaid(&pipeline));
        }
        Commands::Generate(args) => {
            let config = load_config(cli.config.as_deref())?;
            generate(&config, &args).await?;
        }
    }

    Ok(())
}

async fn generate(config: &Config, args: &GenerateArgs) -> Result<()> {
    let request = args.to_request()?;
    let collaborators = build_collaborators(config)?;
    let controller = RewriteController::new(collaborators, config.pipeline.clone());

    let state = controller.run(request).await;

    if !args.no_run_log {
        if let Some(path) = &config.logging.run_log {
            // Run log failures are non-fatal
            match RunLogger::new(path.clone()).and_then(|logger| logger.record(&state)) {
                Ok(id) => tracing::info!("Logged run {} to {}", id, path.display()),
                Err(e) => tracing::warn!("Failed to write run log: {:#}", e),
            }
        }
    }

    let json = serde_json::to_string_pretty(&state).context("Failed to encode pipeline state")?;
    println!("{}", json);
    Ok(())
}
