/*
puzzle.rs

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

//! A puzzle: a board together with the bundles to place on it.

use super::bundle::Bundle;
use super::grid::Grid;

/// Board plus bundle list.
///
/// Cloning deep-copies the board, so a solver never mutates the reference
/// copy held by its caller; bundles clone cheaply because their figures are
/// shared `Rc`s.
#[derive(Debug, Clone)]
pub struct Puzzle {
    grid: Grid,
    bundles: Vec<Bundle>,
    name: String,
}

impl Puzzle {
    /// Create a puzzle.
    pub fn new(grid: Grid, bundles: Vec<Bundle>, name: impl Into<String>) -> Self {
        Self {
            grid,
            bundles,
            name: name.into(),
        }
    }

    /// Name of the puzzle.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The board.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The board, for tagging by solvers and the generator.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// The bundles to place.
    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    /// Reset every cell tag, turning a solved puzzle into its task form.
    pub fn clear_grid(&mut self) {
        self.grid.clear_tags();
    }

    /// Number of cells currently covered by placed bundles.
    pub fn covered_cells(&self) -> usize {
        self.grid
            .nodes()
            .filter(|n| n.data().bundle_id.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::GridKind;
    use crate::generator::tessellation::build_grid;

    #[test]
    fn test_clear_grid_resets_all_tags() {
        let mut grid: Grid = build_grid(GridKind::Square, 3, 3);
        for id in 0..grid.len() {
            grid.cell_mut(id).bundle_id = Some(1);
            grid.cell_mut(id).figure_id = Some(id);
        }
        let mut puzzle: Puzzle = Puzzle::new(grid, Vec::new(), "test");
        assert_eq!(puzzle.covered_cells(), 9);

        puzzle.clear_grid();
        assert_eq!(puzzle.covered_cells(), 0);
        for node in puzzle.grid().nodes() {
            assert_eq!(node.data().bundle_id, None);
            assert_eq!(node.data().figure_id, None);
        }
    }

    #[test]
    fn test_clone_does_not_share_the_grid() {
        let grid: Grid = build_grid(GridKind::Square, 2, 2);
        let original: Puzzle = Puzzle::new(grid, Vec::new(), "test");
        let mut copy: Puzzle = original.clone();
        copy.grid_mut().cell_mut(0).bundle_id = Some(7);
        assert_eq!(original.grid().cell(0).bundle_id, None);
    }
}
