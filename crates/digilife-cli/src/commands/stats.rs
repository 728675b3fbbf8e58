//! Show statistics for a saved world.

use anyhow::{bail, Context, Result};
use colored::{ColoredString, Colorize};
use digilife::prelude::*;

use crate::config::{current_session_path, resolve_session, Config};

pub fn run(session: Option<&str>, json: bool) -> Result<()> {
    let path = match session {
        Some(name) => resolve_session(name)?,
        None => current_session_path()?,
    };
    if !path.exists() {
        bail!("No session found. Run {} first.", "digilife run".cyan());
    }

    let project = Config::load()?;
    let world = WorldBuilder::new()
        .with_config(project.simulation)
        .with_sink(Box::new(NullSink))
        .resume_from(&path)
        .build()
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let stats = WorldStats::collect(&world);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_stats(&stats);
    }
    Ok(())
}

fn status_label(status: EnvironmentStatus) -> ColoredString {
    match status {
        EnvironmentStatus::Critical => status.label().red().bold(),
        EnvironmentStatus::Difficult => status.label().yellow(),
        EnvironmentStatus::Stable => status.label().cyan(),
        EnvironmentStatus::Thriving => status.label().green().bold(),
    }
}

pub fn print_stats(stats: &WorldStats) {
    println!("{}", "digilife World Statistics".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "Population".blue().bold());
    println!("  Tick:              {}", stats.tick.to_string().cyan());
    println!(
        "  Creatures:         {} / {}",
        stats.population.to_string().cyan(),
        stats.max_population
    );
    println!("  Food items:        {}", stats.food.to_string().cyan());
    println!("  Births:            {}", stats.total_births.to_string().green());
    println!("  Deaths:            {}", stats.total_deaths.to_string().red());
    println!("  Species:           {}", stats.species.to_string().cyan());
    println!("  Environment:       {}", status_label(stats.status));
    println!();

    println!("{}", "Evolution".blue().bold());
    println!("  Max complexity:    {:.1}", stats.max_complexity);
    println!("  Avg complexity:    {:.1}", stats.average_complexity);
    println!("  Avg energy:        {:.1}", stats.average_energy);
    println!("  Avg age:           {:.1}", stats.average_age);
    println!("  Avg fitness:       {:.1}", stats.average_fitness);
    println!("  Max fitness:       {:.1}", stats.max_fitness);
    for (phase, count) in &stats.phases {
        println!("  {:<18} {}", format!("{}:", phase.name()), count);
    }
    println!();

    println!("{}", "Society".blue().bold());
    println!("  Vocal creatures:   {}", stats.vocal_creatures.to_string().cyan());
    println!("  Active predators:  {}", stats.active_predators.to_string().cyan());
    println!("  Predation kills:   {}", stats.predation_kills);
    for predator in &stats.top_predators {
        println!(
            "    {} {} - {} kills, complexity {:.0}",
            "•".red(),
            predator.id,
            predator.kills,
            predator.complexity
        );
    }
    if let Some(id) = stats.notables.fittest {
        println!("  Fittest:           {}", id);
    }
    if let Some(id) = stats.notables.most_promising {
        println!("  Most promising:    {}", id);
    }
    println!();

    println!("{}", "Health".blue().bold());
    println!("  Infected:          {}", stats.infected.to_string().yellow());
    if stats.epidemics.is_empty() {
        println!("  {} No active epidemics", "•".green());
    }
    for epidemic in &stats.epidemics {
        println!(
            "  {} {} - {} infected now, {} total, {} deaths ({})",
            "!".red(),
            epidemic.name.red(),
            epidemic.current_infected,
            epidemic.total_infected,
            epidemic.deaths,
            epidemic.symptoms.join(", ")
        );
    }

    println!();
    println!("{}", "═".repeat(40).dimmed());
    println!("  Backend: {}", stats.backend.dimmed());
}
