/*
annealing.rs

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

//! Simulated annealing on bundle-order permutations.
//!
//! The state is a chromosome (see [`super::greedy`]): the order the bundles
//! are offered to the greedy builder, plus the heuristic each bundle is
//! placed with. The energy is the negated covered area, so the walk
//! descends toward fuller boards. Moves swap two genes (reordering the
//! bundles) or re-roll one gene's heuristic; worse states are accepted with
//! the Metropolis probability under a geometrically cooling temperature.

use std::time::Instant;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::puzzle::Puzzle;

use super::greedy::{Gene, build_solution, random_chromosome, random_heuristic};
use super::{SolveOutcome, Solver, SolverConfig, stamp_allocations};

/// Probability that a move swaps two genes; otherwise one gene's heuristic
/// is re-rolled.
const SWAP_PROBABILITY: f64 = 0.7;

/// A candidate state of the walk.
#[derive(Clone)]
struct State {
    sequence: Vec<Gene>,
    energy: f32,
}

/// The simulated annealing solver.
pub struct AnnealingSolver {
    config: SolverConfig,
    rng: StdRng,
}

impl AnnealingSolver {
    /// Create the solver. The RNG is seeded from the configuration's
    /// `seed` when set, otherwise from the operating system.
    pub fn new(config: SolverConfig) -> Self {
        let rng: StdRng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self { config, rng }
    }

    fn energy_of(puzzle: &Puzzle, sequence: &[Gene]) -> f32 {
        -(build_solution(puzzle.grid(), puzzle.bundles(), sequence).score as f32)
    }

    /// Produce a neighboring state by one random move.
    fn neighbor(&mut self, puzzle: &Puzzle, current: &State) -> State {
        let mut next: State = current.clone();
        let n: usize = next.sequence.len();
        if n < 2 {
            return next;
        }

        if self.rng.random_range(0.0..1.0) < SWAP_PROBABILITY {
            let i: usize = self.rng.random_range(0..n);
            let j: usize = self.rng.random_range(0..n);
            next.sequence.swap(i, j);
        } else {
            let i: usize = self.rng.random_range(0..n);
            next.sequence[i].heuristic = random_heuristic(&mut self.rng);
        }

        next.energy = Self::energy_of(puzzle, &next.sequence);
        next
    }
}

impl Solver for AnnealingSolver {
    fn solve(&mut self, puzzle: &mut Puzzle) -> SolveOutcome {
        let start: Instant = Instant::now();

        let sequence: Vec<Gene> = random_chromosome(puzzle.bundles(), &mut self.rng);
        let mut current: State = State {
            energy: Self::energy_of(puzzle, &sequence),
            sequence,
        };
        let mut best: State = current.clone();

        let mut temperature: f32 = self.config.sa_initial_temp;
        // Energy of a fully covered board; nothing can go lower.
        let target_energy: f32 = -(puzzle.grid().len() as f32);

        let log_interval: usize = (self.config.sa_max_iterations / 20).max(1);

        for iteration in 0..self.config.sa_max_iterations {
            if let Some(budget) = self.config.time_budget
                && start.elapsed() >= budget
            {
                debug!("SA: time budget reached after {iteration} iterations");
                break;
            }
            if self.config.verbose && iteration % log_interval == 0 {
                debug!(
                    "SA: iteration {iteration}/{} T={temperature:.1} score={}",
                    self.config.sa_max_iterations, -best.energy
                );
            }
            if best.energy <= target_energy {
                debug!("SA: full cover found at iteration {iteration}");
                break;
            }

            let neighbor: State = self.neighbor(puzzle, &current);
            let delta: f32 = neighbor.energy - current.energy;

            // Metropolis criterion: always accept an improvement, accept a
            // degradation with probability exp(-delta / T).
            if delta < 0.0
                || (-delta / temperature).exp() > self.rng.random_range(0.0..1.0) as f32
            {
                current = neighbor;
                if current.energy < best.energy {
                    best = current.clone();
                }
            }

            temperature *= self.config.sa_cooling_rate;
        }

        let built = build_solution(puzzle.grid(), puzzle.bundles(), &best.sequence);
        let placed_bundles: Vec<usize> = built.placements.keys().copied().collect();
        stamp_allocations(
            puzzle.grid_mut(),
            built
                .placements
                .iter()
                .map(|(bid, shapes)| (*bid, shapes.as_slice())),
        );

        SolveOutcome {
            score: built.score,
            placed_bundles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bundle::Bundle;
    use crate::core::grid::GridKind;
    use crate::generator::config::GeneratorConfig;
    use crate::generator::puzzle_gen::PuzzleGenerator;

    fn sa_config(seed: u64) -> SolverConfig {
        SolverConfig {
            sa_max_iterations: 400,
            seed: Some(seed),
            ..SolverConfig::default()
        }
    }

    fn small_task(seed: u64) -> Puzzle {
        let mut generator: PuzzleGenerator = PuzzleGenerator::new(GeneratorConfig {
            width: 5,
            height: 5,
            min_shape_size: 2,
            max_shape_size: 3,
            min_bundle_area: 4,
            max_bundle_area: 6,
            grid_kind: GridKind::Square,
            seed: Some(seed),
        });
        let mut task: Puzzle = generator.generate();
        task.clear_grid();
        task
    }

    #[test]
    fn test_score_matches_tagged_cells() {
        let mut task: Puzzle = small_task(21);
        let outcome: SolveOutcome = AnnealingSolver::new(sa_config(2)).solve(&mut task);
        assert_eq!(outcome.score, task.covered_cells());
        assert!(outcome.score <= task.grid().len());
    }

    #[test]
    fn test_placed_bundles_are_tagged_atomically() {
        let mut task: Puzzle = small_task(22);
        let outcome: SolveOutcome = AnnealingSolver::new(sa_config(6)).solve(&mut task);

        let placed_area: usize = task
            .bundles()
            .iter()
            .filter(|b| outcome.placed_bundles.contains(&b.id()))
            .map(Bundle::total_area)
            .sum();
        assert_eq!(outcome.score, placed_area);
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let outcome_a: SolveOutcome = AnnealingSolver::new(sa_config(11)).solve(&mut small_task(23));
        let outcome_b: SolveOutcome = AnnealingSolver::new(sa_config(11)).solve(&mut small_task(23));
        assert_eq!(outcome_a.score, outcome_b.score);
        assert_eq!(outcome_a.placed_bundles, outcome_b.placed_bundles);
    }
}
