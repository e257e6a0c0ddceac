use std::path::PathBuf;

use clap::Parser;

use euchre_bench::config::{BenchmarkConfig, ResolvedOutputs};
use euchre_bench::logging::init_logging;
use euchre_bench::tournament::TournamentRunner;

/// Tournament benchmarking harness for Bid Euchre strategy tiers.
#[derive(Debug, Parser)]
#[command(
    name = "euchre-bench",
    author,
    version,
    about = "Deterministic Bid Euchre tournament harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of matches to play per permutation.
    #[arg(long, value_name = "MATCHES")]
    matches: Option<usize>,

    /// Override the RNG seed for deal generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of seat permutations per match.
    #[arg(long, value_name = "COUNT")]
    permutations: Option<usize>,

    /// Exit after validating the configuration (no tournament is run).
    #[arg(long)]
    validate_only: bool,

    /// Suppress progress output on stdout.
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(matches) = cli.matches {
        config.matches.matches = matches;
    }

    if let Some(seed) = cli.seed {
        config.matches.seed = Some(seed);
    }

    if let Some(permutations) = cli.permutations {
        config.matches.permutations = permutations;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let agent_count = config.agents.len();
    let run_id = config.run_id.clone();
    let matches = config.matches.matches;
    let permutations = config.matches.permutations;

    if !cli.quiet {
        println!(
            "Loaded configuration '{run_id}' with {agent_count} agent{} ({matches} matches, {permutations} permutations)",
            if agent_count == 1 { "" } else { "s" }
        );
    }

    let logging_guard = init_logging(&config.logging, &outputs)?;
    if !cli.quiet {
        if let Some(guard) = logging_guard.as_ref() {
            println!("Structured events: {}", guard.path().display());
        }
    }
    let runner = TournamentRunner::new(config, outputs)?;

    if cli.validate_only {
        if !cli.quiet {
            println!("Validation-only mode: tournament execution skipped.");
        }
        return Ok(());
    }

    let summary = runner.run()?;
    if !cli.quiet {
        println!(
            "Tournament complete for '{run_id}': {} matches × {} permutations → {} rows at {}",
            summary.matches_played,
            summary.permutations,
            summary.rows_written,
            summary.jsonl_path.display()
        );
        println!("Summary table: {}", summary.summary_path.display());
        if let Some(plot_path) = summary.plot_path.as_ref() {
            println!("Points delta plot: {}", plot_path.display());
        }
    }

    Ok(())
}
