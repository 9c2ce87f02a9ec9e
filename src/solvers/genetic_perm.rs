/*
genetic_perm.rs

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

//! Hyper-heuristic genetic algorithm on bundle-order permutations.
//!
//! Individuals are chromosomes (see [`super::greedy`]); evolution searches
//! both the order the bundles are placed in and the heuristic used for
//! each. Selection is a size-3 tournament, crossover is order crossover
//! (a slice of one parent, the remaining bundles in the other parent's
//! order, heuristics travelling with their bundle), and mutation scrambles
//! a sub-range and sometimes re-rolls a heuristic.

use std::time::Instant;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::core::puzzle::Puzzle;

use super::greedy::{Gene, build_solution, random_chromosome, random_heuristic};
use super::{SolveOutcome, Solver, SolverConfig, stamp_allocations};

/// Tournament size for parent selection.
const TOURNAMENT_SIZE: usize = 3;

/// Probability that mutation scrambles a sub-range of the chromosome.
const SCRAMBLE_PROBABILITY: f64 = 0.7;

/// Probability that mutation re-rolls one gene's heuristic.
const HEURISTIC_MUTATION_PROBABILITY: f64 = 0.5;

#[derive(Clone)]
struct Individual {
    chromosome: Vec<Gene>,
    fitness: usize,
}

/// The hyper-heuristic permutation GA solver.
pub struct GeneticPermutationSolver {
    config: SolverConfig,
    rng: StdRng,
}

impl GeneticPermutationSolver {
    /// Create the solver. The RNG is seeded from the configuration's
    /// `seed` when set, otherwise from the operating system.
    pub fn new(config: SolverConfig) -> Self {
        let rng: StdRng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self { config, rng }
    }

    fn fitness_of(puzzle: &Puzzle, chromosome: &[Gene]) -> usize {
        build_solution(puzzle.grid(), puzzle.bundles(), chromosome).score
    }

    fn random_individual(&mut self, puzzle: &Puzzle) -> Individual {
        let chromosome: Vec<Gene> = random_chromosome(puzzle.bundles(), &mut self.rng);
        Individual {
            fitness: Self::fitness_of(puzzle, &chromosome),
            chromosome,
        }
    }

    /// Pick the fittest of [`TOURNAMENT_SIZE`] random individuals.
    fn tournament<'a>(&mut self, population: &'a [Individual]) -> &'a Individual {
        let mut winner: &Individual = &population[self.rng.random_range(0..population.len())];
        for _ in 1..TOURNAMENT_SIZE {
            let other: &Individual = &population[self.rng.random_range(0..population.len())];
            if other.fitness > winner.fitness {
                winner = other;
            }
        }
        winner
    }

    /// Order crossover: copy a random slice of `p1`, then fill the
    /// remaining positions with `p2`'s genes in `p2`'s order, skipping
    /// bundles already taken from `p1`.
    fn crossover(&mut self, puzzle: &Puzzle, p1: &Individual, p2: &Individual) -> Individual {
        let n: usize = p1.chromosome.len();
        let mut start: usize = self.rng.random_range(0..n);
        let mut end: usize = self.rng.random_range(0..n);
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }

        let mut child: Vec<Option<Gene>> = vec![None; n];
        for i in start..=end {
            child[i] = Some(p1.chromosome[i]);
        }
        let copied: Vec<usize> = p1.chromosome[start..=end]
            .iter()
            .map(|g| g.bundle_id)
            .collect();

        let mut donor = p2
            .chromosome
            .iter()
            .filter(|g| !copied.contains(&g.bundle_id));
        for slot in child.iter_mut() {
            if slot.is_none() {
                *slot = donor.next().copied();
            }
        }

        let chromosome: Vec<Gene> = child.into_iter().flatten().collect();
        Individual {
            fitness: Self::fitness_of(puzzle, &chromosome),
            chromosome,
        }
    }

    /// Scramble a random sub-range, and independently re-roll one gene's
    /// heuristic.
    fn mutate(&mut self, puzzle: &Puzzle, individual: &mut Individual) {
        let n: usize = individual.chromosome.len();
        if n < 2 {
            return;
        }

        if self.rng.random_range(0.0..1.0) < SCRAMBLE_PROBABILITY {
            let mut i: usize = self.rng.random_range(0..n);
            let mut j: usize = self.rng.random_range(0..n);
            if i > j {
                std::mem::swap(&mut i, &mut j);
            }
            // Widen degenerate ranges so the scramble can act.
            if j - i < 2 {
                if j < n - 1 {
                    j += 1;
                } else if i > 0 {
                    i -= 1;
                }
            }
            individual.chromosome[i..=j].shuffle(&mut self.rng);
        }

        if self.rng.random_range(0.0..1.0) < HEURISTIC_MUTATION_PROBABILITY {
            let i: usize = self.rng.random_range(0..n);
            individual.chromosome[i].heuristic = random_heuristic(&mut self.rng);
        }

        individual.fitness = Self::fitness_of(puzzle, &individual.chromosome);
    }
}

impl Solver for GeneticPermutationSolver {
    fn solve(&mut self, puzzle: &mut Puzzle) -> SolveOutcome {
        let start: Instant = Instant::now();

        let mut population: Vec<Individual> = (0..self.config.population_size)
            .map(|_| self.random_individual(puzzle))
            .collect();
        let mut best: Individual = population[0].clone();

        for generation in 0..self.config.generations {
            if let Some(budget) = self.config.time_budget
                && start.elapsed() >= budget
            {
                debug!("GA-perm: time budget reached after {generation} generations");
                break;
            }

            population.sort_by(|a, b| b.fitness.cmp(&a.fitness));
            if population[0].fitness > best.fitness {
                best = population[0].clone();
            }
            if self.config.verbose {
                debug!("GA-perm: generation {generation} best fitness {}", best.fitness);
            }

            let mut next: Vec<Individual> = Vec::with_capacity(self.config.population_size);
            for elite in population.iter().take(self.config.elite_count) {
                next.push(elite.clone());
            }

            while next.len() < self.config.population_size {
                let p1: Individual = self.tournament(&population).clone();
                let p2: Individual = self.tournament(&population).clone();
                let mut child: Individual = self.crossover(puzzle, &p1, &p2);
                if self.rng.random_range(0.0..1.0) < self.config.mutation_rate {
                    self.mutate(puzzle, &mut child);
                }
                next.push(child);
            }

            population = next;
        }

        population.sort_by(|a, b| b.fitness.cmp(&a.fitness));
        if population[0].fitness > best.fitness {
            best = population[0].clone();
        }

        let built = build_solution(puzzle.grid(), puzzle.bundles(), &best.chromosome);
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

    fn ga_config(seed: u64) -> SolverConfig {
        SolverConfig {
            population_size: 10,
            generations: 8,
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
    fn test_crossover_preserves_the_bundle_permutation() {
        let task: Puzzle = small_task(31);
        let mut solver: GeneticPermutationSolver = GeneticPermutationSolver::new(ga_config(1));
        let p1: Individual = solver.random_individual(&task);
        let p2: Individual = solver.random_individual(&task);

        let child: Individual = solver.crossover(&task, &p1, &p2);
        let mut ids: Vec<usize> = child.chromosome.iter().map(|g| g.bundle_id).collect();
        ids.sort_unstable();
        let mut expected: Vec<usize> = task.bundles().iter().map(Bundle::id).collect();
        expected.sort_unstable();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_mutation_keeps_the_permutation_valid() {
        let task: Puzzle = small_task(32);
        let mut solver: GeneticPermutationSolver = GeneticPermutationSolver::new(ga_config(2));
        let mut individual: Individual = solver.random_individual(&task);

        for _ in 0..10 {
            solver.mutate(&task, &mut individual);
        }
        let mut ids: Vec<usize> = individual.chromosome.iter().map(|g| g.bundle_id).collect();
        ids.sort_unstable();
        let mut expected: Vec<usize> = task.bundles().iter().map(Bundle::id).collect();
        expected.sort_unstable();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_solve_reports_a_consistent_outcome() {
        let mut task: Puzzle = small_task(33);
        let outcome: SolveOutcome =
            GeneticPermutationSolver::new(ga_config(3)).solve(&mut task);

        assert_eq!(outcome.score, task.covered_cells());
        assert!(outcome.score <= task.grid().len());
        let placed_area: usize = task
            .bundles()
            .iter()
            .filter(|b| outcome.placed_bundles.contains(&b.id()))
            .map(Bundle::total_area)
            .sum();
        assert_eq!(outcome.score, placed_area);
    }
}
