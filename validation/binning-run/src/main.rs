//! Validation CLI for the binning engine.

use anyhow::Context;
use chrono::NaiveDate;
use binning::{
    BinSink, Binner, BinningConfig, CollectingSink, GridKind, JsonLinesSink,
};
use binning_run::{ResultsReport, RunResults, ScenarioConfig, SwathConfig, SwathGenerator};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "binning-run")]
#[command(about = "Runs the binning engine over synthetic satellite passes", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file
    Run {
        /// Path to scenario YAML file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Override number of passes
        #[arg(short, long)]
        passes: Option<u32>,

        /// Override RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write output bins as JSON lines to this file
        #[arg(long)]
        bins_out: Option<PathBuf>,

        /// Output format: table (default), json, csv
        #[arg(short, long, default_value = "table")]
        output: String,
    },

    /// Run a quick global mean/sigma smoke test
    Quick {
        /// Planetary grid (sea, regular_gaussian, reduced_gaussian)
        #[arg(short, long, default_value = "sea")]
        grid: String,

        /// Number of grid rows
        #[arg(short, long, default_value = "180")]
        rows: usize,

        /// Number of passes
        #[arg(short, long, default_value = "4")]
        passes: u32,

        /// UTC date of the first pass (YYYY-MM-DD)
        #[arg(long, default_value = "2024-01-15")]
        start_date: NaiveDate,
    },

    /// List available scenarios
    List {
        /// Scenarios directory
        #[arg(short, long, default_value = "scenarios")]
        dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run {
            scenario,
            passes,
            seed,
            bins_out,
            output,
        } => {
            println!("Loading scenario: {}", scenario.display());

            let mut config = ScenarioConfig::from_file(&scenario)
                .with_context(|| format!("failed to load {}", scenario.display()))?;
            config.binning.apply_env_overrides();

            // Apply overrides
            if let Some(p) = passes {
                config.passes = p;
            }
            if seed.is_some() {
                config.seed = seed;
            }

            config.validate()?;

            println!("✓ Scenario loaded successfully");
            println!("  Name: {}", config.name);
            println!("  Description: {}", config.description);
            println!("  Grid: {} ({} rows)", config.binning.planetary_grid, config.binning.num_rows);
            println!("  Passes: {}", config.passes);
            println!("  Aggregators: {}", config.binning.aggregators.len());
            println!();

            let results = run_scenario(&config, bins_out.as_deref())?;

            // Output results
            match output.as_str() {
                "json" => {
                    println!("{}", ResultsReport::format_json(&results)?);
                }
                "csv" => {
                    println!("{}", ResultsReport::csv_header());
                    println!("{}", ResultsReport::format_csv(&results));
                }
                _ => {
                    println!("{}", ResultsReport::format_table(&results));
                }
            }

            Ok(())
        }
        Commands::Quick {
            grid,
            rows,
            passes,
            start_date,
        } => {
            let planetary_grid = GridKind::parse(&grid)
                .ok_or_else(|| anyhow::anyhow!("unknown grid '{grid}'"))?;

            println!("Running quick test:");
            println!("  Grid: {}", planetary_grid);
            println!("  Rows: {}", rows);
            println!("  Passes: {}", passes);
            println!("  Start: {}", start_date);
            println!();

            let binning: BinningConfig = serde_yaml::from_str(&format!(
                "planetary_grid: {planetary_grid}\n\
                 num_rows: {rows}\n\
                 variables: [chl]\n\
                 aggregators:\n  - type: AVG\n    var_name: chl\n    output_counts: true\n"
            ))?;
            let config = ScenarioConfig {
                name: "quick".to_string(),
                description: "Quick smoke test".to_string(),
                seed: None,
                passes,
                swath: SwathConfig {
                    bbox: binning::BoundingBox::global(),
                    width_deg: 30.0,
                    samples_per_pass: 100_000,
                    start_mjd: binning::mjd_from_date(start_date),
                    pass_interval_days: 1.0,
                    cloud_fraction: 0.0,
                    nan_fraction: 0.05,
                },
                binning,
            };
            config.validate()?;

            let results = run_scenario(&config, None)?;

            // Display results as table
            println!("{}", ResultsReport::format_table(&results));

            Ok(())
        }
        Commands::List { dir } => {
            println!("Available scenarios in {}:", dir.display());
            println!();

            // Read directory
            match std::fs::read_dir(&dir) {
                Ok(entries) => {
                    let mut scenarios = Vec::new();

                    for entry in entries.flatten() {
                        let path = entry.path();
                        if path.extension().and_then(|s| s.to_str()) != Some("yaml") {
                            continue;
                        }
                        // Try to load the scenario to get name and description
                        if let Ok(config) = ScenarioConfig::from_file(&path) {
                            let filename = entry.file_name().to_string_lossy().to_string();
                            scenarios.push((filename, config.name, config.description));
                        }
                    }

                    scenarios.sort_by(|a, b| a.0.cmp(&b.0));

                    if scenarios.is_empty() {
                        println!("No scenario files found");
                    } else {
                        for (filename, name, desc) in scenarios {
                            println!("  {} - {}", filename, name);
                            println!("    {}", desc);
                            println!();
                        }
                    }
                }
                Err(e) => {
                    eprintln!("Error reading directory: {}", e);
                    eprintln!("Make sure the directory exists and is readable");
                }
            }

            Ok(())
        }
    }
}

/// Generate the scenario's passes, bin them and summarise the output.
fn run_scenario(config: &ScenarioConfig, bins_out: Option<&Path>) -> anyhow::Result<RunResults> {
    let context = config.binning.create_binning_context()?;
    let source = SwathGenerator::new(config).generate(config.passes);
    info!(
        scenario = %config.name,
        observations = source.total_observations(),
        "Generated synthetic passes"
    );

    let mut sink = CollectingSink::new();
    let summary = Binner::new(&context).run(&source, &mut sink)?;

    if let Some(path) = bins_out {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = JsonLinesSink::new(BufWriter::new(file));
        writer.begin(&sink.feature_names)?;
        for bin in &sink.bins {
            writer.consume(bin.clone())?;
        }
        writer.finish()?;
        info!(path = %path.display(), bins = writer.bins_written(), "Wrote output bins");
    }

    let grid = context.planetary_grid();
    let swath = &config.swath;
    let last_pass_mjd =
        swath.start_mjd + config.passes.saturating_sub(1) as f64 * swath.pass_interval_days;
    Ok(RunResults::new(
        &config.name,
        config.binning.planetary_grid.as_str(),
        grid.num_rows(),
        grid.num_bins(),
        summary,
        &sink.feature_names,
        &sink.bins,
    )
    .with_pass_period(swath.start_mjd, last_pass_mjd))
}
