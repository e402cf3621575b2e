use anyhow::{Result, bail};
use depot_config::Config;
use depot_core::{Listing, ListingEntry};
use depot_storage::{ArtifactStore, FsStore};

async fn load_listing(config: &Config) -> Result<Listing> {
    let store = FsStore::open(&config.data_dir)?;
    let snapshot = store.snapshot().await?;
    Ok(Listing::build(snapshot))
}

pub async fn list(config: &Config, json: bool) -> Result<()> {
    let listing = load_listing(config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if listing.is_empty() {
        println!("No revisions found in {}", config.data_dir.display());
        return Ok(());
    }

    println!("Revisions ({}):", listing.len());
    for entry in listing.entries() {
        print_entry(entry);
    }

    Ok(())
}

fn print_entry(entry: &ListingEntry) {
    let metadata = &entry.metadata;
    match &metadata.branch {
        Some(branch) => println!("  {} [{}] {}", metadata.short_revision(), branch, metadata.date),
        None => println!("  {} {}", metadata.short_revision(), metadata.date),
    }
    println!("    {} - {}", metadata.author, metadata.message);
    for (platform, filename) in &entry.artifacts {
        println!("    {}: {}", platform, filename);
    }
}

pub async fn latest(config: &Config, platform: &str) -> Result<()> {
    let listing = load_listing(config).await?;
    match listing.latest_artifact(platform) {
        Some(artifact) => {
            println!("{}", artifact.location(&config.artifacts.link_base()));
            Ok(())
        }
        None => bail!("No artifact for platform '{}'", platform),
    }
}

pub async fn status(config: &Config, platform: &str) -> Result<()> {
    let listing = load_listing(config).await?;
    match listing.build_status(platform) {
        Some(status) => {
            println!("{}", status.as_str());
            Ok(())
        }
        None => bail!("No revisions found in {}", config.data_dir.display()),
    }
}
