/*
exact_cover.rs

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

//! Exact cover solver in the style of Knuth's Algorithm X.
//!
//! The matrix has one row per legal placement `(bundle, shape, anchor,
//! rotation)` and two families of columns: every shape must be placed
//! exactly once, and every board cell must be covered exactly once. The
//! search always branches on the column with the fewest rows and
//! backtracks classically. A solution is therefore a perfect tiling; on
//! anything but tiny boards the matrix explodes, which is why this solver
//! exists for validation rather than for scale.
//!
//! Rows cache their footprint at construction, so applying a solution
//! never re-runs the embedding.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::core::puzzle::Puzzle;

use super::{SolveOutcome, Solver, SolverConfig};

/// A matrix column: a constraint to satisfy exactly once.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Column {
    /// Shape number `uid` (global across bundles) must be placed.
    Shape(usize),

    /// Board cell `id` must be covered.
    Cell(usize),
}

/// A matrix row: one legal placement with its cached footprint.
struct MatrixRow {
    columns: Vec<Column>,
    bundle_id: usize,
    footprint: Vec<usize>,
}

/// Column incidence: for every live column, the rows that satisfy it.
type ColumnMap = BTreeMap<Column, BTreeSet<usize>>;

/// The exact cover solver.
pub struct ExactCoverSolver {
    config: SolverConfig,
}

impl ExactCoverSolver {
    /// Create the solver.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Enumerate every legal placement of every shape.
    fn build_matrix(puzzle: &Puzzle) -> (Vec<MatrixRow>, ColumnMap) {
        let grid = puzzle.grid();
        let mut rows: Vec<MatrixRow> = Vec::new();
        let mut columns: ColumnMap = BTreeMap::new();

        // Every constraint column exists up front, so an unplaceable shape
        // shows as an empty column rather than a missing one.
        let mut shape_uid: usize = 0;
        for bundle in puzzle.bundles() {
            for _ in bundle.shapes() {
                columns.insert(Column::Shape(shape_uid), BTreeSet::new());
                shape_uid += 1;
            }
        }
        for cid in 0..grid.len() {
            columns.insert(Column::Cell(cid), BTreeSet::new());
        }

        let mut shape_uid: usize = 0;
        for bundle in puzzle.bundles() {
            for shape in bundle.shapes() {
                for anchor in 0..grid.len() {
                    for rotation in 0..grid.max_ports() {
                        let Some(footprint) = grid.embed(shape, anchor, rotation) else {
                            continue;
                        };

                        let mut row_columns: Vec<Column> = Vec::with_capacity(footprint.len() + 1);
                        row_columns.push(Column::Shape(shape_uid));
                        for &cid in &footprint {
                            row_columns.push(Column::Cell(cid));
                        }

                        let row_id: usize = rows.len();
                        for &col in &row_columns {
                            if let Some(incidence) = columns.get_mut(&col) {
                                incidence.insert(row_id);
                            }
                        }
                        rows.push(MatrixRow {
                            columns: row_columns,
                            bundle_id: bundle.id(),
                            footprint,
                        });
                    }
                }
                shape_uid += 1;
            }
        }

        (rows, columns)
    }

    /// Classic Algorithm-X search over the column map.
    fn search(rows: &[MatrixRow], columns: &mut ColumnMap, solution: &mut Vec<usize>) -> bool {
        // No columns left: every constraint is satisfied.
        let Some((_, incidence)) = columns.iter().min_by_key(|(_, incidence)| incidence.len())
        else {
            return true;
        };
        if incidence.is_empty() {
            return false;
        }

        let candidates: Vec<usize> = incidence.iter().copied().collect();
        for row_id in candidates {
            solution.push(row_id);

            // Cover: remove every column this row satisfies, and detach
            // the rows that clash with it. The history allows an exact
            // rollback.
            let mut removed: Vec<(Column, BTreeSet<usize>)> = Vec::new();
            for &col in &rows[row_id].columns {
                let Some(incidence) = columns.get(&col) else {
                    continue;
                };
                let incidence: BTreeSet<usize> = incidence.clone();
                for &other in &incidence {
                    if other == row_id {
                        continue;
                    }
                    for &other_col in &rows[other].columns {
                        if other_col != col
                            && let Some(remaining) = columns.get_mut(&other_col)
                        {
                            remaining.remove(&other);
                        }
                    }
                }
                columns.remove(&col);
                removed.push((col, incidence));
            }

            if Self::search(rows, columns, solution) {
                return true;
            }

            solution.pop();

            // Uncover in reverse order.
            for (col, incidence) in removed.into_iter().rev() {
                for &other in &incidence {
                    if other == row_id {
                        continue;
                    }
                    for &other_col in &rows[other].columns {
                        if other_col != col
                            && let Some(remaining) = columns.get_mut(&other_col)
                        {
                            remaining.insert(other);
                        }
                    }
                }
                columns.insert(col, incidence);
            }
        }

        false
    }
}

impl Solver for ExactCoverSolver {
    fn solve(&mut self, puzzle: &mut Puzzle) -> SolveOutcome {
        let (rows, mut columns) = Self::build_matrix(puzzle);
        if self.config.verbose {
            debug!(
                "Exact cover: {} rows over {} columns",
                rows.len(),
                columns.len()
            );
        }

        // A shape with no legal placement anywhere makes the whole cover
        // infeasible; report the zero score without searching.
        let infeasible: bool = columns
            .iter()
            .any(|(col, incidence)| matches!(col, Column::Shape(_)) && incidence.is_empty());
        if infeasible {
            debug!("Exact cover: some shape has no legal placement");
            return SolveOutcome::default();
        }

        let mut solution: Vec<usize> = Vec::new();
        if !Self::search(&rows, &mut columns, &mut solution) {
            return SolveOutcome::default();
        }

        // Apply the cover from the cached footprints.
        let mut placed: BTreeSet<usize> = BTreeSet::new();
        for (figure_uid, &row_id) in solution.iter().enumerate() {
            let row: &MatrixRow = &rows[row_id];
            placed.insert(row.bundle_id);
            for &cid in &row.footprint {
                let data = puzzle.grid_mut().cell_mut(cid);
                data.bundle_id = Some(row.bundle_id);
                data.figure_id = Some(figure_uid);
            }
        }

        let score: usize = puzzle.bundles().iter().map(|b| b.total_area()).sum();
        SolveOutcome {
            score,
            placed_bundles: placed.into_iter().collect(),
        }
    }
}
