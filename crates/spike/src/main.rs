use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cyclic_evo_core::{run_replicates, RunSummary, SimConfig, Simulation};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

const BENCHMARK_DAYS: usize = 50;

#[derive(Parser)]
#[command(name = "cyclic-evo")]
#[command(about = "Cyclic-dominance evolution simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single simulation from a config file
    Run {
        /// Path to config file (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Output directory for results (optional)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Override the configured number of days
        #[arg(long)]
        days: Option<usize>,

        /// Also write record.json with the full registry and day lists
        #[arg(long)]
        full: bool,
    },
    /// Run several seeds (base, base + 1, ...) of the same config
    Replicates {
        #[arg(long)]
        config: PathBuf,

        #[arg(long, default_value_t = 9)]
        count: usize,

        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Time full runs at several population sizes
    Benchmark,
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

fn load_config(path: &Path) -> Result<SimConfig> {
    let file = File::open(path).context("failed to open config file")?;
    let config: SimConfig =
        serde_json::from_reader(BufReader::new(file)).context("failed to parse config")?;
    config.validate().context("config validation error")?;
    Ok(config)
}

fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<()> {
    std::fs::create_dir_all(dir).context("failed to create output directory")?;
    let file = File::create(dir.join(name)).with_context(|| format!("failed to create {name}"))?;
    serde_json::to_writer_pretty(file, value).with_context(|| format!("failed to write {name}"))
}

/// Column label and per-day values for the table.
///
/// Multi-allele runs show allele frequencies; first-allele strategy fractions
/// only describe single-allele genotypes.
fn table_columns(summary: &RunSummary) -> (&'static str, Vec<&[f64]>) {
    if summary.alleles_per_entity > 1 {
        (
            "a",
            summary
                .days
                .iter()
                .map(|d| d.allele_frequencies.as_slice())
                .collect(),
        )
    } else {
        (
            "s",
            summary
                .days
                .iter()
                .map(|d| d.strategy_fractions.as_slice())
                .collect(),
        )
    }
}

fn print_table(summary: &RunSummary) {
    let (label, rows) = table_columns(summary);
    let header: Vec<String> = (0..summary.num_options)
        .map(|o| format!("{label}{o:<6}"))
        .collect();
    println!("{:>6} {:>10}  {}", "day", "population", header.join(" "));
    for (day, values) in summary.days.iter().zip(rows) {
        let cells: Vec<String> = values.iter().map(|f| format!("{f:<7.4}")).collect();
        println!(
            "{:>6} {:>10}  {}",
            day.day,
            day.population_size,
            cells.join(" ")
        );
    }
}

fn run_benchmark(initial_population: usize) -> Result<()> {
    let config = SimConfig {
        num_days: BENCHMARK_DAYS,
        initial_population,
        resource_sites: initial_population / 2,
        mutation_rate: 0.01,
        ..SimConfig::default()
    };
    let start = Instant::now();
    let mut sim = Simulation::new(config).context("benchmark config")?;
    sim.run()?;
    let elapsed = start.elapsed();
    log::info!("benchmark run with {initial_population} founders finished");

    let births = sim.registry().len();
    let per_day_us = elapsed.as_micros() as f64 / BENCHMARK_DAYS as f64;
    println!("--- initial population {initial_population} ---");
    println!("  Total:         {:.1} ms", elapsed.as_secs_f64() * 1000.0);
    println!("  Avg day:       {per_day_us:.0} us");
    println!(
        "  Entities:      {births} ({:.0} per ms)",
        births as f64 / (elapsed.as_secs_f64() * 1000.0).max(1e-9)
    );
    println!();
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig => {
            let config = SimConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Benchmark => {
            if cfg!(debug_assertions) {
                eprintln!("WARNING: running in debug mode. Results are not representative.");
                eprintln!("         Use: cargo run -p cyclic-evo-cli --release -- benchmark");
                eprintln!();
            }
            println!("=== Cyclic Evo Benchmark ===");
            println!("Days per run: {BENCHMARK_DAYS}");
            println!();
            for initial_population in [1_000, 10_000, 100_000] {
                run_benchmark(initial_population)?;
            }
        }
        Commands::Run {
            config,
            out,
            days,
            full,
        } => {
            let mut sim_config = load_config(&config)?;
            if let Some(days) = days {
                sim_config.num_days = days;
            }
            sim_config.validate().context("config validation error")?;
            log::info!("loaded config from {:?}", config);
            log::info!("simulating for {} days", sim_config.num_days);

            let mut sim = Simulation::new(sim_config)?;
            sim.run()?;
            let summary = sim.summary();
            print_table(&summary);

            println!(
                "Run complete. Seed {}, final population {}",
                summary.seed, summary.final_population
            );
            if let Some(out_dir) = out {
                write_json(&out_dir, "summary.json", &summary)?;
                if full {
                    write_json(&out_dir, "record.json", &sim.into_record())?;
                }
                log::info!("results saved to {:?}", out_dir);
            }
        }
        Commands::Replicates { config, count, out } => {
            let sim_config = load_config(&config)?;
            log::info!("running {count} replicates from {:?}", config);
            let summaries = run_replicates(&sim_config, count)?;
            println!("{:>20} {:>12} {:>12}", "seed", "final pop", "entities");
            for s in &summaries {
                println!(
                    "{:>20} {:>12} {:>12}",
                    s.seed, s.final_population, s.total_entities
                );
            }
            if let Some(out_dir) = out {
                write_json(&out_dir, "replicates.json", &summaries)?;
                log::info!("results saved to {:?}", out_dir);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary_for(alleles_per_entity: usize) -> RunSummary {
        let config = SimConfig {
            num_days: 2,
            alleles_per_entity,
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(config).unwrap();
        sim.run().unwrap();
        sim.summary()
    }

    #[test]
    fn single_allele_table_shows_strategy_fractions() {
        let summary = summary_for(1);
        let (label, rows) = table_columns(&summary);
        assert_eq!(label, "s");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], summary.days[0].strategy_fractions.as_slice());
    }

    #[test]
    fn multi_allele_table_shows_allele_frequencies() {
        let summary = summary_for(3);
        let (label, rows) = table_columns(&summary);
        assert_eq!(label, "a");
        for (row, day) in rows.iter().zip(&summary.days) {
            assert_eq!(*row, day.allele_frequencies.as_slice());
        }
    }
}
