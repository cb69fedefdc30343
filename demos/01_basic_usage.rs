//! Example 01: Basic Usage
//!
//! This example adds, toggles, filters and deletes tasks with a `TaskList`,
//! first in memory and then backed by a directory on disk.
//!
//! Run with: cargo run --example 01_basic_usage

use eyre::Result;
use todolist::{FileStorage, Filter, MemoryStorage, PersistenceStore, TaskList, now_ms, status_text};

fn main() -> Result<()> {
    println!("todolist Basic Usage Example");
    println!("============================\n");

    // In-memory list: nothing survives the process
    println!("1. ADD - Creating tasks in memory...");
    let mut list = TaskList::new(PersistenceStore::new(MemoryStorage::new()));
    let milk = list.add("Buy milk", "2099-01-01T09:00")?.id.clone();
    let taxes = list.add("File taxes", "2000-04-15")?.id.clone();
    println!("   Added {} tasks\n", list.len());

    println!("2. TOGGLE - Completing 'Buy milk'...");
    list.toggle(&milk)?;

    println!("3. FILTER - Active and completed views:");
    let now = now_ms();
    for filter in [Filter::Active, Filter::Completed] {
        println!("   [{}]", filter);
        for task in list.get_filtered(filter) {
            println!("   - {}: {}", task.title, status_text(task, now));
        }
    }
    println!();

    println!("4. DELETE - Removing 'File taxes'...");
    list.delete(&taxes)?;
    println!("   Remaining: {}\n", list.get_filtered("all").len());

    // Directory-backed list: reopening reads the same slot back
    let temp_dir = tempfile::tempdir()?;
    println!("5. PERSIST - Using {}", temp_dir.path().display());
    let id = {
        let mut list = TaskList::new(PersistenceStore::new(FileStorage::open(temp_dir.path())?));
        let id = list.add("Water plants", "2099-06-01")?.id.clone();
        id
    };

    let reopened = TaskList::new(PersistenceStore::new(FileStorage::open(temp_dir.path())?));
    match reopened.get(&id) {
        Some(task) => println!("   Reloaded '{}' after reopening\n", task.title),
        None => println!("   Task not found after reopening!\n"),
    }

    println!("Example complete!");
    Ok(())
}
