//! Session management commands.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use digilife::prelude::*;

use crate::config::{current_session_path, sessions_dir};

pub fn save(name: &str) -> Result<()> {
    let current_path = current_session_path()?;

    if !current_path.exists() {
        bail!("No active session. Run {} first.", "digilife run".cyan());
    }
    // Refuse to copy a file that would not load back.
    let state = read_world_state(&current_path)
        .with_context(|| format!("Current session is unreadable: {}", current_path.display()))?;

    let sessions = sessions_dir()?;
    std::fs::create_dir_all(&sessions)?;

    let session_path = sessions.join(format!("{}.json", name));
    std::fs::copy(&current_path, &session_path)
        .with_context(|| format!("Failed to save session: {}", name))?;

    println!("{} Session saved: {}", "✓".green().bold(), name.cyan());
    println!(
        "  Tick {}, {} creatures",
        state.metadata.tick,
        state.metadata.creature_count
    );

    Ok(())
}

pub fn load(name: &str) -> Result<()> {
    let sessions = sessions_dir()?;
    let session_path = sessions.join(format!("{}.json", name));

    if !session_path.exists() {
        bail!("Session not found: {}", name);
    }

    let state = read_world_state(&session_path)
        .with_context(|| format!("Failed to load session: {}", name))?;

    let current_path = current_session_path()?;
    if let Some(parent) = current_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(&session_path, &current_path)
        .with_context(|| format!("Failed to load session: {}", name))?;

    println!("{} Session loaded: {}", "✓".green().bold(), name.cyan());
    println!("  Tick:      {}", state.metadata.tick.to_string().cyan());
    println!("  Creatures: {}", state.metadata.creature_count.to_string().cyan());
    println!("  Food:      {}", state.food.len().to_string().cyan());

    Ok(())
}

pub fn list() -> Result<()> {
    let sessions = list_sessions(&sessions_dir()?)?;

    if sessions.is_empty() {
        println!("{} No saved sessions.", "•".yellow());
        return Ok(());
    }

    println!("{} Saved sessions:", "→".blue());
    println!();
    for (path, meta) in sessions {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        println!(
            "  {} {} (tick {}, {} creatures, {} food)",
            "•".blue(),
            name.white().bold(),
            meta.tick,
            meta.creature_count,
            meta.food_count
        );
    }

    Ok(())
}
