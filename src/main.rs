//! wealth-montecarlo CLI
//!
//! Run Monte Carlo wealth projections from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Project a scenario described in a JSON file
//! wealth-montecarlo simulate --input scenario.json
//!
//! # Reproducible JSON output on four workers
//! wealth-montecarlo simulate --input scenario.json --seed 42 --workers 4 --format json
//!
//! # Show the allocation derived from a risk score
//! wealth-montecarlo allocation --risk-score 6
//!
//! # Print a sample scenario file
//! wealth-montecarlo sample
//! ```

use log::error;
use std::fs;
use std::process;
use wealth_montecarlo::analysis::bands::{yearly_bands, YearBand};
use wealth_montecarlo::analysis::statistics::{ConfidenceInterval, MonteCarloResult};
use wealth_montecarlo::core::input::{AssetAllocation, SimulationInput};
use wealth_montecarlo::market::allocation::allocation_for_risk_score;
use wealth_montecarlo::simulation::engine::{MonteCarloEngine, SimulationConfig};
use wealth_montecarlo::simulation::progress::Progress;
use wealth_montecarlo::simulation::runner::RunHooks;

fn print_usage() {
    eprintln!(
        r#"wealth-montecarlo — Monte Carlo retirement and portfolio projections

USAGE:
    wealth-montecarlo <COMMAND> [OPTIONS]

COMMANDS:
    simulate    Run a projection for a scenario file
    allocation  Show the allocation for a risk score
    sample      Print a sample scenario file
    help        Show this message

OPTIONS (simulate):
    --input <FILE>      Path to JSON scenario file
    --config <FILE>     Path to JSON engine config (optional)
    --format <FORMAT>   Output format: text (default) or json
    --seed <N>          Fixed seed for reproducible output
    --paths <N>         Number of paths (overrides the scenario)
    --workers <N>       Worker threads (default: 1)
    --fallback          Use the simplified three-asset profile (applied
                        on top of --config)
    --bands             Include per-year percentile bands

OPTIONS (allocation):
    --risk-score <N>    Risk score from 1 to 10

EXAMPLES:
    wealth-montecarlo simulate --input scenario.json
    wealth-montecarlo simulate --input scenario.json --seed 42 --format json
    wealth-montecarlo allocation --risk-score 7
    wealth-montecarlo sample > scenario.json"#
    );
}

/// JSON output schema for a projection.
#[derive(serde::Serialize)]
struct SimulationOutput {
    simulation_count: usize,
    success_probability: f64,
    average_final_wealth: String,
    median_final_wealth: String,
    confidence_interval: ConfidenceInterval,
    shortfall_risk: f64,
    average_shortfall: String,
    max_drawdown: f64,
    volatility: f64,
    execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    yearly_bands: Option<Vec<YearBand>>,
}

impl SimulationOutput {
    fn new(result: &MonteCarloResult, bands: Option<Vec<YearBand>>) -> Self {
        Self {
            simulation_count: result.simulation_count,
            success_probability: result.success_probability,
            average_final_wealth: result.average_final_wealth.to_string(),
            median_final_wealth: result.median_final_wealth.to_string(),
            confidence_interval: result.confidence_interval,
            shortfall_risk: result.shortfall_risk,
            average_shortfall: result.average_shortfall.to_string(),
            max_drawdown: result.max_drawdown,
            volatility: result.volatility,
            execution_time_ms: result.execution_time_ms,
            yearly_bands: bands,
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str, what: &str) -> T {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {} '{}': {}", what, path, e);
        process::exit(1);
    });
    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing {} JSON: {}", what, e);
        process::exit(1);
    })
}

fn next_value<'a>(args: &'a [String], i: usize, flag: &str, expected: &str) -> &'a str {
    args.get(i).map(String::as_str).unwrap_or_else(|| {
        eprintln!("{} requires {}", flag, expected);
        process::exit(1);
    })
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("{} requires a number, got '{}'", flag, value);
        process::exit(1);
    })
}

fn cmd_simulate(args: &[String]) {
    let mut input_path = None;
    let mut config_path = None;
    let mut format = "text".to_string();
    let mut seed: Option<u64> = None;
    let mut paths: Option<usize> = None;
    let mut workers: Option<usize> = None;
    let mut fallback = false;
    let mut bands = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(next_value(args, i, "--input", "a file path").to_string());
            }
            "--config" => {
                i += 1;
                config_path = Some(next_value(args, i, "--config", "a file path").to_string());
            }
            "--format" => {
                i += 1;
                format = next_value(args, i, "--format", "'text' or 'json'").to_string();
            }
            "--seed" => {
                i += 1;
                seed = Some(parse_number(next_value(args, i, "--seed", "a number"), "--seed"));
            }
            "--paths" => {
                i += 1;
                paths = Some(parse_number(next_value(args, i, "--paths", "a number"), "--paths"));
            }
            "--workers" => {
                i += 1;
                workers = Some(parse_number(
                    next_value(args, i, "--workers", "a number"),
                    "--workers",
                ));
            }
            "--fallback" => fallback = true,
            "--bands" => bands = true,
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let mut input: SimulationInput = read_json(&path, "scenario");
    if let Some(count) = paths {
        input.simulation_count = Some(count);
    }

    let mut config = match &config_path {
        Some(p) => read_json(p, "config"),
        None => SimulationConfig::default(),
    };
    if fallback {
        config = config.with_fallback_profile();
    }
    if let Some(seed) = seed {
        config.seed = Some(seed);
    }
    if let Some(workers) = workers {
        config.runner.workers = workers;
    }

    let mut engine = MonteCarloEngine::new(config);
    let show_progress = format == "text";
    let mut last_decile = 0;
    let mut on_progress = |p: &Progress| {
        let decile = (p.percentage() / 10.0) as u32;
        if show_progress && decile > last_decile {
            last_decile = decile;
            eprintln!("  {:>3.0}% ({}/{} paths)", p.percentage(), p.completed, p.total);
        }
    };

    let result = engine
        .run_with(&input, RunHooks::none().with_progress(&mut on_progress))
        .unwrap_or_else(|e| {
            error!("simulation failed: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        });

    let bands = bands.then(|| yearly_bands(&result.paths));

    if format == "json" {
        let output = SimulationOutput::new(&result, bands);
        let json = serde_json::to_string_pretty(&output).unwrap_or_else(|e| {
            eprintln!("Error serializing result: {}", e);
            process::exit(1);
        });
        println!("{}", json);
    } else {
        println!("{}", result);
        if let Some(bands) = bands {
            println!("Year        P10        P50        P90");
            for band in bands {
                println!(
                    "{:>4} {:>10} {:>10} {:>10}",
                    band.year, band.p10, band.p50, band.p90
                );
            }
        }
    }
}

fn cmd_allocation(args: &[String]) {
    let mut score: Option<u8> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--risk-score" => {
                i += 1;
                score = Some(parse_number(
                    next_value(args, i, "--risk-score", "a number from 1 to 10"),
                    "--risk-score",
                ));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let score = score.unwrap_or_else(|| {
        eprintln!("Error: --risk-score <N> is required");
        process::exit(1);
    });

    let allocation = allocation_for_risk_score(score);
    println!("Risk score {}:", score.clamp(1, 10));
    println!("  Equity: {:>6.2}%", allocation.equity * 100.0);
    println!("  Bonds:  {:>6.2}%", allocation.bonds * 100.0);
    println!("  Cash:   {:>6.2}%", allocation.cash * 100.0);
}

fn cmd_sample() {
    let input = SimulationInput::new(500_000.0, 30, 22_000.0, 6)
        .with_inflation_rate(0.025)
        .with_simulation_count(5_000)
        .with_allocation(AssetAllocation::new(0.55, 0.35, 0.05).with_alternatives(0.05));
    match serde_json::to_string_pretty(&input) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing sample: {}", e);
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "simulate" => cmd_simulate(rest),
        "allocation" => cmd_allocation(rest),
        "sample" => cmd_sample(),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
