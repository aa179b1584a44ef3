//! `openclaw doctor`: diagnose configuration and backends.

use openclaw_config::AppConfig;
use crate::bootstrap;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("OpenClaw Doctor - System Diagnostics");
    println!("====================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  [warn] No config file, using defaults (run `openclaw onboard`)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  [ok]   Config valid");
            config
        }
        Err(e) => {
            println!("  [fail] Config invalid: {e}");
            println!("\n  1 blocking issue found.");
            return Ok(());
        }
    };

    match bootstrap::provider(&config) {
        Ok(provider) => match provider.health_check().await {
            Ok(true) => println!("  [ok]   Model backend reachable at {}", config.model.api_url),
            Ok(false) | Err(_) => {
                println!("  [fail] Model backend not reachable at {}", config.model.api_url);
                issues += 1;
            }
        },
        Err(e) => {
            println!("  [fail] {e}");
            issues += 1;
        }
    }

    match bootstrap::provider(&config).and_then(|p| bootstrap::memory(&config, p)) {
        Ok(store) => match store.count().await {
            Ok(n) => println!("  [ok]   Memory backend '{}' holds {n} facts", store.backend_name()),
            Err(e) => {
                println!("  [fail] Memory backend '{}': {e}", store.backend_name());
                issues += 1;
            }
        },
        Err(e) => {
            println!("  [fail] {e}");
            issues += 1;
        }
    }

    let pending = bootstrap::todos(&config).pending().await.len();
    println!("  [ok]   To-do list at {} ({pending} pending)", config.todo_path().display());

    if let Err(e) = bootstrap::search(&config) {
        println!("  [fail] {e}");
        issues += 1;
    } else {
        println!("  [ok]   Search backend '{}'", config.search.backend);
    }

    println!();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }
    Ok(())
}
