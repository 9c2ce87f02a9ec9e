/*
cli_options.rs

Copyright 2025 Tilepack contributors

This file is part of Tilepack.

Tilepack is free software: you can redistribute it and/or modify it under
the terms of the GNU General Public License as published by the Free
Software Foundation, either version 3 of the License, or (at your option)
any later version.

Tilepack is distributed in the hope that it will be useful, but WITHOUT ANY
WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
details.

You should have received a copy of the GNU General Public License along
with Tilepack. If not, see <https://www.gnu.org/licenses/>.

SPDX-License-Identifier: GPL-3.0-or-later
*/

//! Process command-line options.
//!
//! # Examples
//!
//! Generate a puzzle; this writes the solved target file next to the task
//! file:
//!
//! ```text
//! $ tilepack generate --config boards/10x10.cfg --output out/puzzle.json
//! Generated target solution: out/puzzle_target.json
//! Generated task: out/puzzle.json
//! ```
//!
//! Solve the task with simulated annealing and a 30 second budget:
//!
//! ```text
//! $ tilepack solve --input out/puzzle.json --output out/solved.json --algo sa --timeout 30
//! ```

use clap::{Parser, Subcommand};
use log::debug;
use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::core::puzzle::Puzzle;
use crate::generator::config::GeneratorConfig;
use crate::generator::puzzle_gen::PuzzleGenerator;
use crate::saver::puzzle as puzzle_file;
use crate::solvers::{Algorithm, SolveOutcome, Solver, SolverConfig};

/// Generate and solve bundle-tiling puzzles.
#[derive(Parser)]
#[command(name = "tilepack", about, long_about = None, version)]
struct Args {
    /// Enable debug messages
    #[arg(short, long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a puzzle: the solved target file plus the cleared task file
    Generate {
        /// Generator configuration file (key=value lines)
        #[arg(short, long)]
        config: PathBuf,

        /// Path of the task file; the target file gets a "_target" suffix
        #[arg(short, long)]
        output: PathBuf,

        /// RNG seed, overriding the configuration file
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Solve a puzzle file and write the solved board
    Solve {
        /// Puzzle file to solve
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the solved puzzle
        #[arg(short, long)]
        output: PathBuf,

        /// Algorithm: grasp, dlx, sa, ga, or perm
        #[arg(short, long, default_value = "grasp")]
        algo: String,

        /// Advisory time budget in seconds
        #[arg(short, long)]
        timeout: Option<f64>,

        /// RNG seed for reproducible runs
        #[arg(short, long)]
        seed: Option<u64>,

        /// Log solver progress
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },
}

/// Parse the command line and run the requested mode. Returns the process
/// exit code.
pub fn run() -> u8 {
    let args: Args = Args::parse();

    if args.debug {
        unsafe {
            env::set_var("RUST_LOG", "debug");
        }
    }
    env_logger::init();

    let result: Result<(), Box<dyn Error>> = match args.command {
        Command::Generate {
            config,
            output,
            seed,
        } => generate(&config, &output, seed),
        Command::Solve {
            input,
            output,
            algo,
            timeout,
            seed,
            verbose,
        } => solve(&input, &output, &algo, timeout, seed, verbose),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}

/// Path of the target (solved) file: the output path with a `_target`
/// suffix before the extension.
fn target_path(output: &Path) -> PathBuf {
    match (output.file_stem(), output.extension()) {
        (Some(stem), Some(ext)) => {
            let mut name: std::ffi::OsString = stem.to_os_string();
            name.push("_target.");
            name.push(ext);
            output.with_file_name(name)
        }
        _ => {
            let mut name: std::ffi::OsString = output.as_os_str().to_os_string();
            name.push("_target.json");
            PathBuf::from(name)
        }
    }
}

fn generate(config_path: &Path, output: &Path, seed: Option<u64>) -> Result<(), Box<dyn Error>> {
    let mut config: GeneratorConfig = GeneratorConfig::load(config_path)?;
    if seed.is_some() {
        config.seed = seed;
    }
    debug!("Generator configuration: {config:?}");

    let mut generator: PuzzleGenerator = PuzzleGenerator::new(config);
    let solved: Puzzle = generator.generate();

    let target: PathBuf = target_path(output);
    puzzle_file::save(&solved, &target)?;
    println!("Generated target solution: {}", target.display());

    let mut task: Puzzle = solved.clone();
    task.clear_grid();
    puzzle_file::save(&task, output)?;
    println!("Generated task: {}", output.display());

    Ok(())
}

fn solve(
    input: &Path,
    output: &Path,
    algo_name: &str,
    timeout: Option<f64>,
    seed: Option<u64>,
    verbose: bool,
) -> Result<(), Box<dyn Error>> {
    let mut puzzle: Puzzle = puzzle_file::load(input)?;

    let algorithm: Algorithm = Algorithm::from_name(algo_name);
    let config: SolverConfig = SolverConfig {
        time_budget: timeout.map(Duration::from_secs_f64),
        verbose,
        seed,
        ..SolverConfig::default()
    };

    let mut solver: Box<dyn Solver> = algorithm.build(config);
    let start: Instant = Instant::now();
    let outcome: SolveOutcome = solver.solve(&mut puzzle);
    let duration_ms: f64 = start.elapsed().as_secs_f64() * 1000.0;

    let total_cells: usize = puzzle.grid().len();
    let coverage: f64 = if total_cells > 0 {
        outcome.score as f64 / total_cells as f64 * 100.0
    } else {
        0.0
    };

    println!("================ RESULT ================");
    println!(" Algorithm : {}", algorithm.name());
    println!(
        " Grid Size : {}x{}",
        puzzle.grid().width(),
        puzzle.grid().height()
    );
    println!(" Duration  : {duration_ms:.1} ms");
    println!(" Score     : {} / {total_cells}", outcome.score);
    println!(" Coverage  : {coverage:.1}%");
    println!(" Bundles   : {} placed", outcome.placed_bundles.len());
    println!("========================================");

    puzzle_file::save(&puzzle, output)?;
    Ok(())
}
