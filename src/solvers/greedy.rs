/*
greedy.rs

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

//! The greedy builder driven by a chromosome of `(bundle, heuristic)`
//! genes.
//!
//! The permutation metaheuristics (simulated annealing and the
//! hyper-heuristic genetic algorithm) share one fitness oracle: walk the
//! genes in order and place each bundle greedily, using the gene's
//! heuristic to propose anchors and rank footprints. A bundle whose shapes
//! cannot all be placed is rolled back whole.

use std::collections::BTreeMap;
use std::rc::Rc;

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::core::bundle::Bundle;
use crate::core::grid::Grid;
use crate::heuristics::{HEURISTIC_COUNT, HeuristicKind, candidates, evaluate};

use super::PlacedShape;

/// One gene: place this bundle next, with this placement strategy.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Gene {
    /// Bundle to place.
    pub bundle_id: usize,

    /// Strategy used for every shape of the bundle.
    pub heuristic: HeuristicKind,
}

/// Result of running a chromosome through the greedy builder.
#[derive(Debug, Default)]
pub struct BuiltSolution {
    /// Total area of the fully placed bundles.
    pub score: usize,

    /// Placements per placed bundle, keyed by bundle id.
    pub placements: BTreeMap<usize, Vec<PlacedShape>>,
}

/// Sample a heuristic kind uniformly.
pub fn random_heuristic(rng: &mut StdRng) -> HeuristicKind {
    HeuristicKind::from_repr(rng.random_range(0..HEURISTIC_COUNT)).unwrap_or_default()
}

/// Build a chromosome with the bundles in random order and random
/// heuristics.
pub fn random_chromosome(bundles: &[Bundle], rng: &mut StdRng) -> Vec<Gene> {
    let mut bundle_ids: Vec<usize> = bundles.iter().map(Bundle::id).collect();
    bundle_ids.shuffle(rng);
    bundle_ids
        .into_iter()
        .map(|bundle_id| Gene {
            bundle_id,
            heuristic: random_heuristic(rng),
        })
        .collect()
}

/// Place the best-scoring legal footprint of one shape, trying every
/// proposed anchor with every rotation. Returns the placement without
/// marking the mask.
fn place_one_shape(
    grid: &Grid,
    shape: &Rc<crate::core::figure::Figure>,
    kind: HeuristicKind,
    occupied: &[bool],
) -> Option<PlacedShape> {
    let anchors: Vec<usize> = candidates(kind, grid, occupied);

    let mut best_score: f32 = f32::NEG_INFINITY;
    let mut best: Option<PlacedShape> = None;

    for anchor in anchors {
        for rotation in 0..grid.max_ports() {
            let Some(footprint) = grid.embed(shape, anchor, rotation) else {
                continue;
            };
            if footprint.iter().any(|&c| occupied[c]) {
                continue;
            }
            let score: f32 = evaluate(kind, grid, occupied, &footprint);
            if score > best_score {
                best_score = score;
                best = Some(PlacedShape {
                    figure: Rc::clone(shape),
                    anchor,
                    rotation,
                    footprint,
                });
            }
        }
    }

    best
}

/// Run the chromosome: place each gene's bundle greedily, keeping bundles
/// atomic. The fitness is the total area of the bundles that fit whole.
pub fn build_solution(grid: &Grid, bundles: &[Bundle], chromosome: &[Gene]) -> BuiltSolution {
    let mut occupied: Vec<bool> = vec![false; grid.len()];
    let mut result: BuiltSolution = BuiltSolution::default();

    for gene in chromosome {
        let Some(bundle) = bundles.iter().find(|b| b.id() == gene.bundle_id) else {
            continue;
        };

        // Work on a mask copy so an unplaceable bundle rolls back whole.
        let mut trial_mask: Vec<bool> = occupied.clone();
        let mut placed: Vec<PlacedShape> = Vec::with_capacity(bundle.shapes().len());
        let mut complete: bool = true;

        for shape in bundle.shapes() {
            match place_one_shape(grid, shape, gene.heuristic, &trial_mask) {
                Some(placement) => {
                    for &cid in &placement.footprint {
                        trial_mask[cid] = true;
                    }
                    placed.push(placement);
                }
                None => {
                    complete = false;
                    break;
                }
            }
        }

        if complete {
            occupied = trial_mask;
            result.score += bundle.total_area();
            result.placements.insert(bundle.id(), placed);
        }
    }

    result
}
