use anyhow::{Context, Result};
use clap::Parser;
use gemdrive::config;
use gemdrive::gemini::{FREE_TIER_MODELS, GeminiClient};

#[derive(Parser)]
#[command(
    name = "check-models",
    about = "List the Gemini models this API key can use for text generation"
)]
struct Cli {
    /// Print the model names as a JSON array instead of text.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    config::init_config();

    let client = GeminiClient::new().context("failed to build the Gemini client")?;
    let models = client
        .list_generation_models()
        .await
        .context("failed to list models for this API key")?;

    let names: Vec<&str> = models.iter().map(|model| model.short_name()).collect();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    if names.is_empty() {
        println!("No models supporting generateContent are available to this API key.");
        return Ok(());
    }

    println!("Models supporting generateContent ({}):", names.len());
    for name in &names {
        println!("  {name}");
    }

    let free_tier: Vec<&str> = FREE_TIER_MODELS
        .iter()
        .copied()
        .filter(|candidate| names.contains(candidate))
        .collect();
    if free_tier.is_empty() {
        println!("\nNo free-tier alias found; set GEMINI_MODEL to one of the names above.");
    } else {
        println!("\nFree-tier choices for GEMINI_MODEL:");
        for name in free_tier {
            println!("  {name}");
        }
    }

    Ok(())
}
