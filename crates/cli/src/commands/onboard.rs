//! `openclaw onboard`: first-time setup.

use openclaw_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");
    let memory_dir = config_dir.join("memory");

    println!("OpenClaw - First-Time Setup");
    println!("===========================\n");

    if !memory_dir.exists() {
        std::fs::create_dir_all(&memory_dir)?;
        println!("Created data directory: {}", memory_dir.display());
    } else {
        println!("  Data directory exists: {}", memory_dir.display());
    }

    if config_path.exists() {
        println!("\nConfig already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("Created config.toml at: {}", config_path.display());
        println!("\nNext steps:");
        println!("   1. Start a local model server (default: Ollama with gemma:2b)");
        println!("   2. Adjust [model] and [persona] in {}", config_path.display());
        println!("   3. Run: openclaw chat\n");
    }

    println!("Setup complete. Run `openclaw doctor` to check the backends.\n");
    Ok(())
}
