/*
grasp.rs

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

//! GRASP placement engine: greedy randomized adaptive search.
//!
//! Each construction phase walks the bundles from large to small and tries
//! to place every shape of a bundle by recursive backtracking. The
//! candidates of one recursion step are all `(empty cell, rotation)` pairs;
//! the best-scoring slice of them (the restricted candidate list) is
//! shuffled and at most [`MAX_BRANCHING`] branches are explored. Running
//! the phase many times with fresh randomness and keeping the best result
//! supplies the diversification that plain greedy search lacks.

use std::rc::Rc;
use std::time::Instant;

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::core::bundle::Bundle;
use crate::core::figure::Figure;
use crate::core::grid::Grid;
use crate::core::puzzle::Puzzle;

use super::{PlacedShape, SolveOutcome, Solver, SolverConfig, stamp_allocations};

/// Branch cap of one recursion step. Bounds the worst-case blow-up while
/// leaving room for the randomized candidate order to matter.
const MAX_BRANCHING: usize = 5;

/// Score weight of a footprint cell that touches the occupied envelope.
const CONTACT_WEIGHT: i32 = 10;

/// A candidate placement of one shape, with its greedy score.
struct Candidate {
    placement: PlacedShape,
    score: i32,
}

/// Bundles fully placed in one construction phase, with their shape
/// placements in placement order.
type Allocations = Vec<(usize, Vec<PlacedShape>)>;

/// The GRASP solver.
pub struct GraspSolver {
    config: SolverConfig,
    rng: StdRng,
}

impl GraspSolver {
    /// Create the solver. The RNG is seeded from the configuration's
    /// `seed` when set, otherwise from the operating system.
    pub fn new(config: SolverConfig) -> Self {
        let rng: StdRng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self { config, rng }
    }

    /// Contact score of a footprint: [`CONTACT_WEIGHT`] per footprint cell
    /// with at least one occupied neighbor.
    fn contact_score(grid: &Grid, footprint: &[usize], occupied: &[bool]) -> i32 {
        let mut touching: i32 = 0;
        for &cid in footprint {
            let touches: bool = grid
                .node(cid)
                .neighbors()
                .iter()
                .flatten()
                .any(|&n| occupied[n]);
            if touches {
                touching += 1;
            }
        }
        touching * CONTACT_WEIGHT
    }

    /// Place `shapes[0]`, then recurse on the rest. On success the chosen
    /// placements are appended to `out` and their cells stay marked in
    /// `occupied`; on failure both are restored.
    fn place_shapes(
        &mut self,
        shapes: &[Rc<Figure>],
        grid: &Grid,
        occupied: &mut [bool],
        out: &mut Vec<PlacedShape>,
    ) -> bool {
        let Some((shape, rest)) = shapes.split_first() else {
            return true;
        };

        // All legal, collision-free placements of the shape.
        let mut candidates: Vec<Candidate> = Vec::new();
        for anchor in 0..grid.len() {
            if occupied[anchor] {
                continue;
            }
            for rotation in 0..grid.max_ports() {
                let Some(footprint) = grid.embed(shape, anchor, rotation) else {
                    continue;
                };
                if footprint.iter().any(|&c| occupied[c]) {
                    continue;
                }
                let score: i32 = Self::contact_score(grid, &footprint, occupied);
                candidates.push(Candidate {
                    placement: PlacedShape {
                        figure: Rc::clone(shape),
                        anchor,
                        rotation,
                        footprint,
                    },
                    score,
                });
            }
        }

        if candidates.is_empty() {
            return false;
        }

        // Restricted candidate list: everything within alpha of the best.
        // A non-positive maximum means nothing touches the envelope yet, so
        // every candidate is as good as any other.
        let max_score: i32 = candidates.iter().map(|c| c.score).max().unwrap_or(0);
        let mut rcl: Vec<Candidate> = if max_score <= 0 {
            candidates
        } else {
            let threshold: f32 = self.config.grasp_alpha * max_score as f32;
            candidates
                .into_iter()
                .filter(|c| c.score as f32 >= threshold)
                .collect()
        };

        rcl.shuffle(&mut self.rng);
        rcl.truncate(MAX_BRANCHING);

        for candidate in rcl {
            for &cid in &candidate.placement.footprint {
                occupied[cid] = true;
            }
            out.push(candidate.placement);

            if self.place_shapes(rest, grid, occupied, out) {
                return true;
            }

            if let Some(undone) = out.pop() {
                for &cid in &undone.footprint {
                    occupied[cid] = false;
                }
            }
        }

        false
    }

    /// One construction phase: greedily place whole bundles, largest and
    /// most complex first, onto an empty board.
    fn construction_phase(&mut self, puzzle: &Puzzle) -> (usize, Allocations) {
        let grid: &Grid = puzzle.grid();

        let mut order: Vec<&Bundle> = puzzle.bundles().iter().collect();
        order.sort_by(|a, b| {
            b.total_area()
                .cmp(&a.total_area())
                .then(b.shapes().len().cmp(&a.shapes().len()))
                .then(a.id().cmp(&b.id()))
        });

        let mut occupied: Vec<bool> = vec![false; grid.len()];
        let mut allocations: Allocations = Vec::new();
        let mut score: usize = 0;

        for bundle in order {
            // The recursion works on a copy of the mask so a failed bundle
            // leaves no trace.
            let mut trial_mask: Vec<bool> = occupied.clone();
            let mut placements: Vec<PlacedShape> = Vec::new();

            if self.place_shapes(bundle.shapes(), grid, &mut trial_mask, &mut placements) {
                occupied = trial_mask;
                score += bundle.total_area();
                allocations.push((bundle.id(), placements));
            }
        }

        (score, allocations)
    }
}

impl Solver for GraspSolver {
    fn solve(&mut self, puzzle: &mut Puzzle) -> SolveOutcome {
        let start: Instant = Instant::now();
        let mut best_score: usize = 0;
        let mut best_allocations: Allocations = Vec::new();

        for iteration in 0..self.config.grasp_max_iterations {
            // The budget is advisory: checked between iterations only.
            if let Some(budget) = self.config.time_budget
                && start.elapsed() >= budget
            {
                debug!("GRASP: time budget reached after {iteration} iterations");
                break;
            }

            let (score, allocations) = self.construction_phase(puzzle);
            if score > best_score {
                best_score = score;
                best_allocations = allocations;
                if self.config.verbose {
                    debug!("GRASP: iteration {iteration} improved the score to {score}");
                }
            }

            if best_score == puzzle.grid().len() {
                debug!("GRASP: full cover found at iteration {iteration}");
                break;
            }
        }

        let placed_bundles: Vec<usize> = best_allocations.iter().map(|(bid, _)| *bid).collect();
        stamp_allocations(
            puzzle.grid_mut(),
            best_allocations
                .iter()
                .map(|(bid, shapes)| (*bid, shapes.as_slice())),
        );

        SolveOutcome {
            score: best_score,
            placed_bundles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::GridKind;
    use crate::generator::config::GeneratorConfig;
    use crate::generator::puzzle_gen::{PuzzleGenerator, figure_from_cells};
    use crate::generator::tessellation::build_grid;

    fn seeded_config(seed: u64) -> SolverConfig {
        SolverConfig {
            grasp_max_iterations: 20,
            seed: Some(seed),
            ..SolverConfig::default()
        }
    }

    fn bar_figure(length: usize) -> Rc<Figure> {
        let mut fig: Figure = Figure::new(format!("bar{length}"), 4);
        for _ in 0..length {
            fig.add_node();
        }
        for i in 1..length {
            fig.add_directed_edge(i - 1, i, 1);
            fig.add_directed_edge(i, i - 1, 3);
        }
        Rc::new(fig)
    }

    #[test]
    fn test_bar_fills_a_matching_board() {
        let grid: Grid = build_grid(GridKind::Square, 3, 1);
        let bundle: Bundle = Bundle::new(0, vec![bar_figure(3)], crate::core::bundle::Color::WHITE);
        let mut puzzle: Puzzle = Puzzle::new(grid, vec![bundle], "bar");

        let outcome: SolveOutcome = GraspSolver::new(seeded_config(1)).solve(&mut puzzle);
        assert_eq!(outcome.score, 3);
        assert_eq!(outcome.placed_bundles, vec![0]);
        for node in puzzle.grid().nodes() {
            assert_eq!(node.data().bundle_id, Some(0));
            assert_eq!(node.data().figure_id, Some(0));
        }
    }

    #[test]
    fn test_second_tromino_bundle_is_skipped_on_a_2x2_board() {
        let grid: Grid = build_grid(GridKind::Square, 2, 2);
        let tromino: Figure = figure_from_cells("L", &[0, 1, 2], &grid);
        let bundles: Vec<Bundle> = vec![
            Bundle::new(
                0,
                vec![Rc::new(tromino.clone())],
                crate::core::bundle::Color::WHITE,
            ),
            Bundle::new(1, vec![Rc::new(tromino)], crate::core::bundle::Color::WHITE),
        ];
        let mut puzzle: Puzzle = Puzzle::new(grid, bundles, "two trominoes");

        let outcome: SolveOutcome = GraspSolver::new(seeded_config(3)).solve(&mut puzzle);
        // Only four cells: one tromino fits, the second bundle must be
        // skipped whole.
        assert_eq!(outcome.score, 3);
        assert_eq!(outcome.placed_bundles.len(), 1);
        assert_eq!(puzzle.covered_cells(), 3);
    }

    #[test]
    fn test_identical_seeds_reproduce_the_score() {
        let mut generator: PuzzleGenerator = PuzzleGenerator::new(GeneratorConfig {
            width: 6,
            height: 6,
            min_shape_size: 2,
            max_shape_size: 3,
            min_bundle_area: 4,
            max_bundle_area: 6,
            grid_kind: GridKind::Square,
            seed: Some(77),
        });
        let reference: Puzzle = generator.generate();

        let mut scores: Vec<usize> = Vec::new();
        for _ in 0..2 {
            let mut task: Puzzle = reference.clone();
            task.clear_grid();
            let outcome: SolveOutcome = GraspSolver::new(seeded_config(5)).solve(&mut task);
            scores.push(outcome.score);
        }
        assert_eq!(scores[0], scores[1]);
    }

    #[test]
    fn test_solution_respects_placement_laws() {
        let mut generator: PuzzleGenerator = PuzzleGenerator::new(GeneratorConfig {
            width: 5,
            height: 5,
            min_shape_size: 2,
            max_shape_size: 3,
            min_bundle_area: 4,
            max_bundle_area: 6,
            grid_kind: GridKind::Hexagon,
            seed: Some(13),
        });
        let mut task: Puzzle = generator.generate();
        task.clear_grid();

        let outcome: SolveOutcome = GraspSolver::new(seeded_config(9)).solve(&mut task);

        // Score identity: the score equals both the tagged cell count and
        // the placed bundle areas.
        assert_eq!(outcome.score, task.covered_cells());
        let placed_area: usize = task
            .bundles()
            .iter()
            .filter(|b| outcome.placed_bundles.contains(&b.id()))
            .map(Bundle::total_area)
            .sum();
        assert_eq!(outcome.score, placed_area);
        assert!(outcome.score <= task.grid().len());

        // Tag consistency: a tagged cell carries both ids.
        for node in task.grid().nodes() {
            assert_eq!(
                node.data().bundle_id.is_some(),
                node.data().figure_id.is_some()
            );
        }
    }
}
