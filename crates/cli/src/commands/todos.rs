//! `openclaw todos`: inspect and edit the to-do list.

use openclaw_tools::{CompleteOutcome, TodoStatus};
use crate::bootstrap;

pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let config = bootstrap::load_config()?;
    let todos = bootstrap::todos(&config);
    let items = todos.all().await;

    println!("To-do list ({})", config.todo_path().display());
    if items.is_empty() {
        println!("  (empty)");
    }
    for item in items {
        let mark = match item.status {
            TodoStatus::Pending => "[ ]",
            TodoStatus::Complete => "[x]",
        };
        println!("  {mark} {}  ({})", item.description, item.created_at.format("%Y-%m-%d %H:%M"));
    }
    Ok(())
}

pub async fn add(description: &str) -> Result<(), Box<dyn std::error::Error>> {
    if description.trim().is_empty() {
        return Err("Task description must not be empty".into());
    }
    let config = bootstrap::load_config()?;
    let item = bootstrap::todos(&config).add(description).await;
    println!("Task '{}' added.", item.description);
    Ok(())
}

pub async fn done(description: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = bootstrap::load_config()?;
    match bootstrap::todos(&config).complete(description).await {
        CompleteOutcome::Completed(item) => println!("Task '{}' marked as done.", item.description),
        CompleteOutcome::NotFound => println!("No matching task found."),
        CompleteOutcome::NothingPending => println!("There are no tasks to complete."),
    }
    Ok(())
}
