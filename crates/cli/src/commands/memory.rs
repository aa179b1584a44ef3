//! `openclaw memory`: inspect long-term memory.

use openclaw_memory::MemoryStore;
use crate::bootstrap;

fn store() -> Result<(openclaw_config::AppConfig, MemoryStore), Box<dyn std::error::Error>> {
    let config = bootstrap::load_config()?;
    let provider = bootstrap::provider(&config)?;
    let store = bootstrap::memory(&config, provider)?;
    Ok((config, store))
}

pub async fn stats() -> Result<(), Box<dyn std::error::Error>> {
    let (config, store) = store()?;

    println!("Memory Statistics");
    println!("=================");
    println!("  Backend:   {}", store.backend_name());
    println!("  Embedder:  {}", store.embedder_name());
    println!("  Recall:    top {}", config.memory.recall_limit);
    if config.memory.backend == "file" {
        println!("  File:      {}", config.memory_path().display());
    }
    println!("  Facts:     {}", store.count().await?);
    Ok(())
}

pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let (_config, store) = store()?;
    let records = store.list().await?;
    if records.is_empty() {
        println!("No facts stored.");
    }
    for r in records {
        let tags = r.metadata.tags.join(",");
        println!("  {}  [{tags}] {}", r.metadata.created_at.format("%Y-%m-%d %H:%M"), r.text);
    }
    Ok(())
}

pub async fn search(query: &str, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let (_config, store) = store()?;
    println!("Recalling facts for: \"{query}\"");
    println!();

    let records = store.retrieve(query, limit).await;
    if records.is_empty() {
        println!("  No facts found.");
    }
    for (i, r) in records.iter().enumerate() {
        println!("  {}. [{:.3}] {}", i + 1, r.score, r.text);
    }
    Ok(())
}
