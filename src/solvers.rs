/*
solvers.rs

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

//! The placement solvers.
//!
//! Every solver consumes a [`Puzzle`] and tries to place whole bundles on
//! the board: either all shapes of a bundle get disjoint footprints or the
//! bundle is skipped. The score is the number of covered cells. During the
//! search a solver works on local occupancy masks and placement records;
//! the board is only tagged once, with the best solution found.

pub mod annealing;
pub mod exact_cover;
pub mod genetic;
pub mod genetic_perm;
pub mod grasp;
pub mod greedy;

use log::warn;
use std::rc::Rc;
use std::time::Duration;

use crate::core::figure::Figure;
use crate::core::grid::Grid;
use crate::core::puzzle::Puzzle;

/// Options shared by the solvers. Each solver reads the subset it cares
/// about and ignores the rest.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Outer iterations of the GRASP construction loop.
    pub grasp_max_iterations: usize,

    /// GRASP greediness: candidates scoring at least `alpha * max_score`
    /// enter the restricted candidate list. 1.0 is pure greedy.
    pub grasp_alpha: f32,

    /// Starting temperature of the simulated annealing schedule.
    pub sa_initial_temp: f32,

    /// Multiplicative cooling factor applied every iteration.
    pub sa_cooling_rate: f32,

    /// Iteration cap of the simulated annealing loop.
    pub sa_max_iterations: usize,

    /// Individuals per generation in the genetic solvers.
    pub population_size: usize,

    /// Generations the genetic solvers run.
    pub generations: usize,

    /// Top individuals carried over unchanged each generation.
    pub elite_count: usize,

    /// Probability of mutating a freshly bred individual.
    pub mutation_rate: f64,

    /// Advisory wall-clock budget, checked between outer iterations and
    /// generations only; an iteration always runs to completion.
    pub time_budget: Option<Duration>,

    /// Print progress to the log.
    pub verbose: bool,

    /// Explicit RNG seed for reproducible runs. `None` seeds from the
    /// operating system.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            grasp_max_iterations: 100,
            grasp_alpha: 0.8,
            sa_initial_temp: 1000.0,
            sa_cooling_rate: 0.995,
            sa_max_iterations: 5000,
            population_size: 30,
            generations: 50,
            elite_count: 2,
            mutation_rate: 0.3,
            time_budget: None,
            verbose: false,
            seed: None,
        }
    }
}

/// One shape laid on the board.
#[derive(Debug, Clone)]
pub struct PlacedShape {
    /// The placed figure.
    pub figure: Rc<Figure>,

    /// Board cell that figure node 0 is pinned to.
    pub anchor: usize,

    /// Cyclic port shift applied to the figure.
    pub rotation: usize,

    /// Board cells covered by the figure, in figure node order.
    pub footprint: Vec<usize>,
}

/// Result of a solver run.
#[derive(Debug, Clone, Default)]
pub struct SolveOutcome {
    /// Number of board cells covered by placed bundles.
    pub score: usize,

    /// Identifiers of the bundles that were fully placed.
    pub placed_bundles: Vec<usize>,
}

/// A placement solver.
pub trait Solver {
    /// Solve the puzzle and tag the chosen placements into its board.
    ///
    /// A zero score is a valid (degenerate) result, not an error.
    fn solve(&mut self, puzzle: &mut Puzzle) -> SolveOutcome;
}

/// The available solving algorithms.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// GRASP randomized greedy backtracking (the default).
    #[default]
    Grasp,

    /// Algorithm-X exact cover; only viable on tiny puzzles.
    ExactCover,

    /// Simulated annealing on bundle-order permutations.
    Annealing,

    /// Coordinate genetic algorithm.
    Genetic,

    /// Hyper-heuristic permutation genetic algorithm.
    GeneticPermutation,
}

impl Algorithm {
    /// Resolve a CLI algorithm name. Unknown names warn and fall back to
    /// GRASP.
    pub fn from_name(name: &str) -> Self {
        match name {
            "grasp" => Algorithm::Grasp,
            "dlx" => Algorithm::ExactCover,
            "sa" => Algorithm::Annealing,
            "ga" => Algorithm::Genetic,
            "perm" => Algorithm::GeneticPermutation,
            _ => {
                warn!("Unknown algorithm {name:?}, falling back to grasp");
                eprintln!("Warning: unknown algorithm {name:?}, using grasp");
                Algorithm::Grasp
            }
        }
    }

    /// Canonical CLI name of the algorithm.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Grasp => "grasp",
            Algorithm::ExactCover => "dlx",
            Algorithm::Annealing => "sa",
            Algorithm::Genetic => "ga",
            Algorithm::GeneticPermutation => "perm",
        }
    }

    /// Instantiate the solver for this algorithm.
    pub fn build(self, config: SolverConfig) -> Box<dyn Solver> {
        match self {
            Algorithm::Grasp => Box::new(grasp::GraspSolver::new(config)),
            Algorithm::ExactCover => Box::new(exact_cover::ExactCoverSolver::new(config)),
            Algorithm::Annealing => Box::new(annealing::AnnealingSolver::new(config)),
            Algorithm::Genetic => Box::new(genetic::GeneticSolver::new(config)),
            Algorithm::GeneticPermutation => {
                Box::new(genetic_perm::GeneticPermutationSolver::new(config))
            }
        }
    }
}

/// Tag an allocation onto the board: every footprint cell of a placed
/// bundle gets the bundle id, and each placed shape a fresh figure uid in
/// placement order.
pub(crate) fn stamp_allocations<'a, I>(grid: &mut Grid, allocations: I)
where
    I: IntoIterator<Item = (usize, &'a [PlacedShape])>,
{
    let mut figure_uid: usize = 0;
    for (bundle_id, shapes) in allocations {
        for placed in shapes {
            for &cid in &placed.footprint {
                let data = grid.cell_mut(cid);
                data.bundle_id = Some(bundle_id);
                data.figure_id = Some(figure_uid);
            }
            figure_uid += 1;
        }
    }
}
