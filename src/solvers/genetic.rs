/*
genetic.rs

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

//! Coordinate genetic algorithm: the order-free sibling of
//! [`super::genetic_perm`].
//!
//! An individual is not a permutation but an explicit partial solution:
//! per placed bundle the shape placements, plus a dense occupancy mask.
//! New bundles enter through a *sticky* try-add that anchors next to the
//! cells already covered, so individuals grow as one connected patch.
//! Crossover inherits non-clashing bundles from both parents and fills the
//! rest with try-add; mutation evicts one bundle and tries a missing one.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::time::Instant;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::core::bundle::Bundle;
use crate::core::grid::Grid;
use crate::core::puzzle::Puzzle;

use super::{PlacedShape, SolveOutcome, Solver, SolverConfig, stamp_allocations};

/// Tournament size for parent selection.
const TOURNAMENT_SIZE: usize = 3;

/// Cap on the anchors tried per bundle insertion.
const MAX_ANCHOR_CANDIDATES: usize = 50;

/// Random anchors appended to the sticky candidates as noise.
const NOISE_ANCHORS: usize = 3;

#[derive(Clone)]
struct Individual {
    /// Placements of the bundles present in this individual.
    bundles: BTreeMap<usize, Vec<PlacedShape>>,

    /// Dense occupancy mask kept in sync with the placements.
    occupied: Vec<bool>,

    /// Covered cells.
    fitness: usize,
}

impl Individual {
    fn empty(grid: &Grid) -> Self {
        Self {
            bundles: BTreeMap::new(),
            occupied: vec![false; grid.len()],
            fitness: 0,
        }
    }

    fn recompute_fitness(&mut self) {
        self.fitness = self
            .bundles
            .values()
            .flatten()
            .map(|p| p.footprint.len())
            .sum();
    }
}

/// The coordinate GA solver.
pub struct GeneticSolver {
    config: SolverConfig,
    rng: StdRng,
}

impl GeneticSolver {
    /// Create the solver. The RNG is seeded from the configuration's
    /// `seed` when set, otherwise from the operating system.
    pub fn new(config: SolverConfig) -> Self {
        let rng: StdRng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self { config, rng }
    }

    /// Sticky anchor proposals: empty neighbors of the individual's
    /// footprint, shuffled, with a few random cells as noise. An empty
    /// individual gets one random anchor.
    fn anchor_candidates(&mut self, grid: &Grid, individual: &Individual) -> Vec<usize> {
        let mut anchors: Vec<usize>;

        if individual.bundles.is_empty() {
            anchors = vec![self.rng.random_range(0..grid.len())];
        } else {
            let mut seen: BTreeSet<usize> = BTreeSet::new();
            for placed in individual.bundles.values().flatten() {
                for &cid in &placed.footprint {
                    for &slot in grid.node(cid).neighbors() {
                        if let Some(n) = slot
                            && !individual.occupied[n]
                        {
                            seen.insert(n);
                        }
                    }
                }
            }
            anchors = seen.into_iter().collect();

            if anchors.is_empty() {
                anchors.push(self.rng.random_range(0..grid.len()));
            } else {
                anchors.shuffle(&mut self.rng);
                for _ in 0..NOISE_ANCHORS {
                    anchors.push(self.rng.random_range(0..grid.len()));
                }
            }
        }

        anchors.truncate(MAX_ANCHOR_CANDIDATES);
        anchors
    }

    /// Random empty neighbor of the shapes placed so far in this bundle,
    /// falling back to a random cell.
    fn local_anchor(&mut self, grid: &Grid, placed: &[PlacedShape], mask: &[bool]) -> usize {
        let mut local: Vec<usize> = Vec::new();
        for shape in placed {
            for &cid in &shape.footprint {
                for &slot in grid.node(cid).neighbors() {
                    if let Some(n) = slot
                        && !mask[n]
                    {
                        local.push(n);
                    }
                }
            }
        }
        if local.is_empty() {
            self.rng.random_range(0..grid.len())
        } else {
            local[self.rng.random_range(0..local.len())]
        }
    }

    /// Try to place every shape of a bundle next to the individual's
    /// existing cells. Commits and returns true on success; otherwise the
    /// individual is untouched.
    fn try_add_bundle(&mut self, grid: &Grid, individual: &mut Individual, bundle: &Bundle) -> bool {
        let anchors: Vec<usize> = self.anchor_candidates(grid, individual);

        for anchor_candidate in anchors {
            let mut trial_mask: Vec<bool> = individual.occupied.clone();
            let mut new_shapes: Vec<PlacedShape> = Vec::with_capacity(bundle.shapes().len());
            let mut possible: bool = true;

            for shape in bundle.shapes() {
                let rotation_offset: usize = self.rng.random_range(0..grid.max_ports());
                let mut placed_this: bool = false;

                for r in 0..grid.max_ports() {
                    // The first shape is pinned to the candidate; later
                    // shapes cling to the ones just placed.
                    let anchor: usize = if new_shapes.is_empty() {
                        anchor_candidate
                    } else {
                        self.local_anchor(grid, &new_shapes, &trial_mask)
                    };
                    let rotation: usize = (r + rotation_offset) % grid.max_ports();

                    let Some(footprint) = grid.embed(shape, anchor, rotation) else {
                        continue;
                    };
                    if footprint.iter().any(|&c| trial_mask[c]) {
                        continue;
                    }

                    for &cid in &footprint {
                        trial_mask[cid] = true;
                    }
                    new_shapes.push(PlacedShape {
                        figure: Rc::clone(shape),
                        anchor,
                        rotation,
                        footprint,
                    });
                    placed_this = true;
                    break;
                }

                if !placed_this {
                    possible = false;
                    break;
                }
            }

            if possible {
                individual.bundles.insert(bundle.id(), new_shapes);
                individual.occupied = trial_mask;
                individual.recompute_fitness();
                return true;
            }
        }

        false
    }

    fn random_individual(&mut self, puzzle: &Puzzle) -> Individual {
        let mut individual: Individual = Individual::empty(puzzle.grid());

        let mut bundle_ids: Vec<usize> = puzzle.bundles().iter().map(Bundle::id).collect();
        bundle_ids.shuffle(&mut self.rng);
        for bid in bundle_ids {
            if let Some(bundle) = puzzle.bundles().iter().find(|b| b.id() == bid) {
                self.try_add_bundle(puzzle.grid(), &mut individual, bundle);
            }
        }
        individual
    }

    /// Inherit a bundle's placements when they do not clash with the
    /// child's mask.
    fn inherit(child: &mut Individual, bundle_id: usize, shapes: &[PlacedShape]) -> bool {
        let clash: bool = shapes
            .iter()
            .flat_map(|s| s.footprint.iter())
            .any(|&cid| child.occupied[cid]);
        if clash {
            return false;
        }
        for shape in shapes {
            for &cid in &shape.footprint {
                child.occupied[cid] = true;
            }
        }
        child.bundles.insert(bundle_id, shapes.to_vec());
        true
    }

    fn crossover(&mut self, puzzle: &Puzzle, p1: &Individual, p2: &Individual) -> Individual {
        let mut child: Individual = Individual::empty(puzzle.grid());

        // Each of p1's bundles crosses over with probability one half.
        for (&bid, shapes) in &p1.bundles {
            if self.rng.random_range(0.0..1.0) < 0.5 {
                Self::inherit(&mut child, bid, shapes);
            }
        }
        // Whatever fits from p2 follows.
        for (&bid, shapes) in &p2.bundles {
            if !child.bundles.contains_key(&bid) {
                Self::inherit(&mut child, bid, shapes);
            }
        }

        // Try to squeeze in the bundles neither parent contributed.
        let mut missing: Vec<usize> = puzzle
            .bundles()
            .iter()
            .map(Bundle::id)
            .filter(|bid| !child.bundles.contains_key(bid))
            .collect();
        missing.shuffle(&mut self.rng);
        for bid in missing {
            if let Some(bundle) = puzzle.bundles().iter().find(|b| b.id() == bid) {
                self.try_add_bundle(puzzle.grid(), &mut child, bundle);
            }
        }

        child.recompute_fitness();
        child
    }

    /// Evict one random bundle, then try to add one missing bundle.
    fn mutate(&mut self, puzzle: &Puzzle, individual: &mut Individual) {
        if !individual.bundles.is_empty() {
            let bids: Vec<usize> = individual.bundles.keys().copied().collect();
            let evicted: usize = bids[self.rng.random_range(0..bids.len())];
            if let Some(shapes) = individual.bundles.remove(&evicted) {
                for shape in shapes {
                    for &cid in &shape.footprint {
                        individual.occupied[cid] = false;
                    }
                }
            }
        }

        let missing: Vec<usize> = puzzle
            .bundles()
            .iter()
            .map(Bundle::id)
            .filter(|bid| !individual.bundles.contains_key(bid))
            .collect();
        if !missing.is_empty() {
            let bid: usize = missing[self.rng.random_range(0..missing.len())];
            if let Some(bundle) = puzzle.bundles().iter().find(|b| b.id() == bid) {
                self.try_add_bundle(puzzle.grid(), individual, bundle);
            }
        }

        individual.recompute_fitness();
    }

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
}

impl Solver for GeneticSolver {
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
                debug!("GA: time budget reached after {generation} generations");
                break;
            }

            population.sort_by(|a, b| b.fitness.cmp(&a.fitness));
            if population[0].fitness > best.fitness {
                best = population[0].clone();
            }
            if self.config.verbose {
                debug!("GA: generation {generation} best fitness {}", best.fitness);
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

        let placed_bundles: Vec<usize> = best.bundles.keys().copied().collect();
        stamp_allocations(
            puzzle.grid_mut(),
            best.bundles
                .iter()
                .map(|(bid, shapes)| (*bid, shapes.as_slice())),
        );

        SolveOutcome {
            score: best.fitness,
            placed_bundles,
        }
    }
}
