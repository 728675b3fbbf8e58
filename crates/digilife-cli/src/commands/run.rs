//! Run the simulation headless.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use digilife::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::commands::stats::print_stats;
use crate::config::{current_session_path, resolve_session, Config};
use crate::RunArgs;

/// Layer command-line flags over the project's simulation settings.
pub fn apply_overrides(mut config: SimConfig, args: &RunArgs) -> Result<SimConfig> {
    if let Some(population) = args.population {
        config.world.initial_population = population;
    }
    if let Some(rate) = args.data_rate {
        config.world.food_spawn_rate = rate;
    }
    if let Some(size) = &args.world_size {
        let (width, height) = SimConfig::parse_world_size(size)?;
        config.world.width = width;
        config.world.height = height;
    }
    if args.no_gpu {
        config.neural.use_gpu = false;
    }
    if args.no_audio {
        config.vocal.audio_enabled = false;
    }
    if args.debug {
        config.debug = DebugFlags::all();
    }
    if let Some(speed) = args.speed {
        config.world.speed_multiplier = speed;
    }
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }
    config.validate()?;
    Ok(config)
}

/// One-line description of the events worth showing above the progress bar.
fn headline(event: &WorldEvent) -> Option<String> {
    match event {
        WorldEvent::Outbreak { name, patient_zero, symptoms, .. } => Some(format!(
            "{} Outbreak of {} (patient zero {}, symptoms: {})",
            "!".red().bold(),
            name.red(),
            patient_zero,
            symptoms.join(", ")
        )),
        WorldEvent::Eradicated { name, total_infected, deaths, .. } => Some(format!(
            "{} {} eradicated after {} infections, {} deaths",
            "✓".green(),
            name.cyan(),
            total_infected,
            deaths
        )),
        WorldEvent::BackendFallback { backend, reason } => Some(format!(
            "{} {} backend failed ({}), continuing on the CPU",
            "•".yellow(),
            backend,
            reason
        )),
        _ => None,
    }
}

pub fn run(args: &RunArgs, verbose: bool) -> Result<()> {
    let project = Config::load()?;
    let sim = apply_overrides(project.simulation.clone(), args)?;
    let ticks = args.ticks.unwrap_or(project.run.ticks);
    let fps = args.fps.unwrap_or(project.run.fps).max(1);
    let dt = 1.0 / fps as f64;

    let mut builder = WorldBuilder::new()
        .with_config(sim)
        .with_workers(project.run.workers);
    if let Some(load) = &args.load {
        let path = resolve_session(load)?;
        if !path.exists() {
            bail!("Session not found: {}", load);
        }
        println!("{} Loading {}...", "→".blue(), path.display());
        builder = builder.resume_from(path);
    }
    let mut world = builder.build().context("Failed to create world")?;

    println!(
        "{} {} creatures in a {}x{} world ({} backend)",
        "→".blue(),
        world.population().to_string().cyan(),
        world.width(),
        world.height(),
        world.backend_name()
    );
    println!(
        "{} Running {} ticks at {} steps/s...",
        "→".blue(),
        ticks.to_string().cyan(),
        fps
    );

    let pb = ProgressBar::new(ticks);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ticks {msg}")?
            .progress_chars("#>-"),
    );

    let mut history = History::new(project.run.stats_interval);
    for _ in 0..ticks {
        let events = world.tick(dt);
        for event in &events {
            if let Some(line) = headline(event) {
                pb.println(format!("  {}", line));
            }
        }
        if verbose && history.observe(&world) {
            if let Some(sample) = history.latest() {
                pb.println(format!(
                    "  tick {}: {} creatures, {} species, max complexity {:.0}",
                    sample.tick, sample.population, sample.species, sample.max_complexity
                ));
            }
        }
        pb.set_message(format!("pop {}", world.population()));
        pb.inc(1);
        if world.population() == 0 {
            pb.println(format!("  {} Every creature has died.", "✗".red()));
            break;
        }
    }
    pb.finish_with_message("done");

    let current = current_session_path()?;
    let meta = save_world(&world, &current)
        .with_context(|| format!("Failed to save {}", current.display()))?;
    tracing::info!(tick = meta.tick, session = %meta.session_id, "saved current session");

    println!();
    println!("{} Simulation complete!", "✓".green().bold());
    println!("  Saved tick {} to {}", meta.tick, current.display());
    println!();
    print_stats(&WorldStats::collect(&world));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_project_settings() {
        let args = RunArgs {
            population: Some(7),
            data_rate: Some(2.5),
            world_size: Some("800x600".into()),
            no_gpu: true,
            no_audio: true,
            debug: true,
            seed: Some(9),
            ..RunArgs::default()
        };
        let config = apply_overrides(SimConfig::default(), &args).unwrap();
        assert_eq!(config.world.initial_population, 7);
        assert_eq!(config.world.food_spawn_rate, 2.5);
        assert_eq!((config.world.width, config.world.height), (800.0, 600.0));
        assert!(!config.neural.use_gpu);
        assert!(!config.vocal.audio_enabled);
        assert!(config.debug.log_births);
        assert_eq!(config.world.seed, Some(9));
    }

    #[test]
    fn bad_world_size_is_rejected() {
        let args = RunArgs {
            world_size: Some("wide".into()),
            ..RunArgs::default()
        };
        assert!(apply_overrides(SimConfig::default(), &args).is_err());
    }

    #[test]
    fn outbreaks_make_headlines() {
        let event = WorldEvent::Outbreak {
            disease: DiseaseId(0),
            name: "Data Plague".into(),
            symptoms: vec!["fatigue".into()],
            patient_zero: CreatureId(3),
            contagion_rate: 0.1,
            lethality: 0.05,
        };
        assert!(headline(&event).is_some());
        let died = WorldEvent::Died {
            id: CreatureId(1),
            age: 3.0,
            generation: 0,
            fitness: -40.0,
            cause: DeathCause::Starvation,
        };
        assert!(headline(&died).is_none());
    }
}
