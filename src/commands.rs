use anyhow::{Context, Result, bail};
use console::style;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::artifacts::{
    Artifact, ArtifactKind, ArtifactStore, CampaignBrief, Feedback, GeneratedAd, Recommendation,
    new_id, now,
};
use crate::config::Config;
use crate::embeddings::{EmbeddingProvider, provider_from_config};
use crate::memory::{ArtifactMemory, SearchResult, VectorIndex};
use crate::variations::{MAX_AD_VARIATIONS, parse_variations_detailed};

type Memory = ArtifactMemory<Box<dyn EmbeddingProvider>>;

/// Print the active configuration
#[inline]
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", style("📋 Current Configuration").bold().cyan());
    println!();

    println!("{}", style("Embedding Settings:").bold().yellow());
    println!(
        "  Provider: {}",
        style(format!("{:?}", config.embedding.provider)).cyan()
    );
    println!("  Dimension: {}", style(config.embedding.dimension).cyan());
    println!(
        "  Max Input Chars: {}",
        style(config.embedding.max_input_chars).cyan()
    );
    println!(
        "  Timeout: {}",
        style(format!("{}s", config.embedding.timeout_seconds)).cyan()
    );
    println!(
        "  Retry Attempts: {}",
        style(config.embedding.retry_attempts).cyan()
    );

    println!();
    println!("{}", style("OpenAI Settings:").bold().yellow());
    println!("  Model: {}", style(&config.openai.model).cyan());
    println!("  API Key Variable: {}", style(&config.openai.api_key_env).cyan());
    match config.openai.api_url() {
        Ok(url) => println!("  API URL: {}", style(url).cyan()),
        Err(e) => println!("  API URL: {} ({})", style("Invalid").red(), e),
    }

    println!();
    println!("{}", style("Ollama Settings:").bold().yellow());
    println!("  Model: {}", style(&config.ollama.model).cyan());
    match config.ollama.ollama_url() {
        Ok(url) => println!("  Ollama URL: {}", style(url).cyan()),
        Err(e) => println!("  Ollama URL: {} ({})", style("Invalid").red(), e),
    }

    println!();
    println!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );
    println!("Data directory: {}", style(config.data_dir().display()).dim());

    Ok(())
}

/// Write a default config file unless one already exists
#[inline]
pub fn init_config(config: &Config) -> Result<()> {
    let path = config.config_file_path();
    if path.exists() {
        println!(
            "{} {}",
            style("Configuration already exists:").yellow(),
            path.display()
        );
        return Ok(());
    }

    config.save()?;
    println!(
        "{} {}",
        style("✅ Wrote configuration to").green(),
        path.display()
    );
    Ok(())
}

/// Read a JSON record from `file`, store it, then index it
#[inline]
pub fn add_artifact(config: &Config, kind: ArtifactKind, file: &Path) -> Result<()> {
    let content = read_input(file)?;
    let mut memory = open_memory(config)?;

    let id = match kind {
        ArtifactKind::Brief => {
            let brief: CampaignBrief = parse_record(kind, &content)?;
            let id = persist(&memory, &brief)?;
            memory.add_campaign_brief(brief)?;
            id
        }
        ArtifactKind::Ad => {
            let ad: GeneratedAd = parse_record(kind, &content)?;
            let id = persist(&memory, &ad)?;
            memory.add_generated_ad(ad)?;
            id
        }
        ArtifactKind::Feedback => {
            let feedback: Feedback = parse_record(kind, &content)?;
            let id = persist(&memory, &feedback)?;
            memory.add_feedback(feedback)?;
            id
        }
        ArtifactKind::Recommendation => {
            let recommendation: Recommendation = parse_record(kind, &content)?;
            let id = persist(&memory, &recommendation)?;
            memory.add_recommendation(recommendation)?;
            id
        }
    };

    memory.close()?;
    println!("✅ Added {} {}", kind, style(id).bold());
    Ok(())
}

/// Print the stored record for `id`
#[inline]
pub fn get_artifact(config: &Config, kind: ArtifactKind, id: &str) -> Result<()> {
    let catalog = ArtifactStore::new(config).load_catalog()?;

    let record = match kind {
        ArtifactKind::Brief => to_pretty(catalog.campaign_briefs.get(id))?,
        ArtifactKind::Ad => to_pretty(catalog.generated_ads.get(id))?,
        ArtifactKind::Feedback => to_pretty(catalog.feedback.get(id))?,
        ArtifactKind::Recommendation => to_pretty(catalog.recommendations.get(id))?,
    };

    match record {
        Some(json) => println!("{}", json),
        None => println!("No {} found with id {}", kind, style(id).bold()),
    }
    Ok(())
}

/// Print the `k` artifacts closest to `query`
#[inline]
pub fn search(config: &Config, query: &str, k: usize) -> Result<()> {
    let memory = open_memory(config)?;
    let results = memory.search(query, k)?;

    print_results(&format!("Results for \"{}\"", query), &results)
}

/// Print campaign briefs similar to `description`
#[inline]
pub fn similar(config: &Config, description: &str, k: usize) -> Result<()> {
    let memory = open_memory(config)?;
    let results = memory.get_similar_campaigns(description, k)?;

    print_results("Similar campaigns", &results)
}

/// Split generated ad copy from `file` into `count` variations
#[inline]
pub fn variations(file: &Path, count: usize) -> Result<()> {
    if !(1..=MAX_AD_VARIATIONS).contains(&count) {
        bail!(
            "Variation count must be between 1 and {}, got {}",
            MAX_AD_VARIATIONS,
            count
        );
    }

    let content = read_input(file)?;
    let parsed = parse_variations_detailed(&content, count);

    if parsed.is_degraded() {
        warn!(
            "Only {} of {} variations found, padded the rest",
            count - parsed.padded,
            count
        );
    }

    for (i, variation) in parsed.variations.iter().enumerate() {
        println!("{}", style(format!("Variation {}:", i + 1)).bold().yellow());
        println!("{}", variation);
        println!();
    }
    println!(
        "{}",
        style(format!(
            "Strategy: {:?}, padded: {}",
            parsed.strategy, parsed.padded
        ))
        .dim()
    );

    Ok(())
}

/// Summarise stored artifacts and the memory index
#[inline]
pub fn show_status(config: &Config) -> Result<()> {
    println!("📊 AdNova Status Report");
    println!("{}", "=".repeat(50));
    println!();

    println!("🗂️  Artifact Store:");
    match ArtifactStore::new(config).load_catalog() {
        Ok(catalog) => {
            for kind in ArtifactKind::ALL {
                println!("   📄 {}: {}", kind, catalog.count(kind));
            }
        }
        Err(e) => println!("   ❌ Failed to read artifacts - {}", e),
    }

    println!();
    println!("🔍 Memory Index:");
    let index_path = config.memory_index_path();
    match VectorIndex::open(&index_path, config.embedding.dimension as usize) {
        Ok(index) => {
            println!("   ✅ Path: {}", index_path.display());
            println!("   🔢 Dimension: {}", index.dimension());
            println!("   📊 Entries: {}", index.len());
            println!("   🏷️  Distinct Items: {}", index.item_count());
        }
        Err(e) => println!("   ❌ Unreadable - {}", e),
    }

    println!();
    println!("🤖 Embedding Provider:");
    match provider_from_config(config) {
        Ok(provider) => println!("   ✅ {}", provider.name()),
        Err(e) => println!("   ❌ Not available - {}", e),
    }

    println!();
    println!("💡 Next Steps:");
    println!("   • Use 'adnova add brief <file>' to remember a campaign brief");
    println!("   • Use 'adnova search <query>' to recall similar artifacts");

    Ok(())
}

fn open_memory(config: &Config) -> Result<Memory> {
    let provider =
        provider_from_config(config).context("Failed to initialize embedding provider")?;
    let memory = ArtifactMemory::open(config, provider).context("Failed to open memory")?;
    Ok(memory)
}

/// `-` reads standard input
fn read_input(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read standard input")?;
        return Ok(content);
    }

    fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

/// Parse a record, generating its id and timestamp when the JSON omits them
fn parse_record<A: Artifact>(kind: ArtifactKind, content: &str) -> Result<A> {
    let mut value: Value = serde_json::from_str(content).context("Input is not valid JSON")?;

    let Some(object) = value.as_object_mut() else {
        bail!("Expected a JSON object describing a {}", kind);
    };
    object
        .entry(kind.id_field())
        .or_insert_with(|| Value::String(new_id()));
    object
        .entry("created_at")
        .or_insert_with(|| Value::String(now()));

    serde_json::from_value(value).with_context(|| format!("Input is not a valid {}", kind))
}

fn persist<A: Artifact>(memory: &Memory, artifact: &A) -> Result<String> {
    let path = memory.store().save(artifact)?;
    info!("Stored {} at {}", A::KIND, path.display());
    Ok(artifact.id().to_string())
}

fn to_pretty<T: Serialize>(record: Option<&T>) -> Result<Option<String>> {
    record
        .map(serde_json::to_string_pretty)
        .transpose()
        .context("Failed to serialize record")
}

fn print_results(title: &str, results: &[SearchResult]) -> Result<()> {
    if results.is_empty() {
        println!("No matching artifacts.");
        return Ok(());
    }

    println!("{}", style(title).bold().cyan());
    println!();

    for (rank, result) in results.iter().enumerate() {
        println!(
            "{}. {} {}",
            rank + 1,
            style(&result.item_id).bold(),
            style(format!("(distance {:.4})", result.similarity_score)).dim()
        );
        println!("   {}", serde_json::to_string(&result.metadata)?);
    }

    Ok(())
}
