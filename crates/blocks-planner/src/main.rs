//! CLI entry point for the blocks-world planner.
//!
//! Usage:
//!   blocks-planner solve <algorithm> <input> <output> [options]
//!   blocks-planner states <input> [options]
//!
//! Algorithms: bfs, dfs, best, astar
//!
//! Options:
//!   --timeout <seconds>   Search deadline (default: 60)
//!
//! The input is a PDDL problem file, or its JSON form when the file ends in
//! `.json`. The plan is written to <output> one move per line and a JSON
//! report is printed to stdout. Exit status is 0 when a plan was found or
//! the search proved there is none, 1 on any error. `states` counts the
//! configurations reachable from the initial state.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use blocks_planner::{
    plan, reachable_states, run_bounded, save_solution, ParsedProblem, PlannerConfig, Result,
};

#[derive(Parser)]
#[command(name = "blocks-planner")]
#[command(about = "State-space search planner for blocks-world problems")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a move sequence from the initial state to the goal
    Solve {
        /// Search strategy: bfs, dfs, best or astar
        algorithm: String,

        /// Problem file (PDDL, or JSON when the extension is .json)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// File receiving the plan, one move per line
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Search deadline in seconds
        #[arg(long, default_value = "60")]
        timeout: u64,
    },

    /// Count the configurations reachable from the initial state
    States {
        /// Problem file (PDDL, or JSON when the extension is .json)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Enumeration deadline in seconds
        #[arg(long, default_value = "60")]
        timeout: u64,
    },
}

fn solve(algorithm: &str, input: PathBuf, output: PathBuf, timeout: u64) -> Result<()> {
    // Strategy names are checked before the problem is even read.
    let config = PlannerConfig::for_algorithm(algorithm)?.with_timeout(Duration::from_secs(timeout));

    log::info!("Parsing problem from {}...", input.display());
    let problem = ParsedProblem::from_path(&input)?;

    let report = plan(&problem, &config)?;

    if report.solved {
        log::info!("Solution length: {} moves", report.moves().len());
    } else {
        log::info!("No solution found.");
    }
    save_solution(&output, report.moves())?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn count_states(input: PathBuf, timeout: u64) -> Result<()> {
    let problem = ParsedProblem::from_path(&input)?;
    let initial = problem.initial_configuration()?;
    let blocks = initial.blocks().len();

    let count = run_bounded(Duration::from_secs(timeout), move |cancel| {
        reachable_states(&initial, cancel).map(|states| states.len())
    })?;

    log::info!("{count} configurations reachable over {blocks} blocks");
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "blocks": blocks,
            "reachableStates": count,
        }))?
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Solve {
            algorithm,
            input,
            output,
            timeout,
        } => solve(&algorithm, input, output, timeout),
        Commands::States { input, timeout } => count_states(input, timeout),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
