/*
puzzle_gen.rs

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

//! The puzzle generator.
//!
//! Generation runs in six steps: build the tessellated board, partition it
//! into connected regions, merge the undersized leftovers, materialize each
//! region as a [`Figure`] (writing the figure ids into the board), group
//! the figures into bundles (writing the bundle ids), and colour the
//! bundles by area. The result is a solved puzzle; callers clone and clear
//! it to obtain the task form.

use std::collections::HashMap;
use std::rc::Rc;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::core::bundle::{Bundle, Color};
use crate::core::figure::Figure;
use crate::core::grid::Grid;
use crate::core::puzzle::Puzzle;

use super::colors::heatmap_color;
use super::config::GeneratorConfig;
use super::regions::{grow_region, merge_small_regions};
use super::tessellation::build_grid;

/// A region on its way to becoming a figure.
struct TempShape {
    figure: Rc<Figure>,
    cells: Vec<usize>,
}

/// Generates puzzles with a known full solution.
pub struct PuzzleGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    figure_counter: usize,
}

impl PuzzleGenerator {
    /// Create a generator. The RNG is seeded from the configuration's
    /// `seed` when set, otherwise from the operating system.
    pub fn new(config: GeneratorConfig) -> Self {
        let rng: StdRng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self {
            config,
            rng,
            figure_counter: 0,
        }
    }

    /// Generate a puzzle whose board carries its reference solution: every
    /// cell is tagged with the bundle and figure that cover it.
    pub fn generate(&mut self) -> Puzzle {
        self.figure_counter = 0;
        let mut grid: Grid =
            build_grid(self.config.grid_kind, self.config.width, self.config.height);

        let regions: Vec<Vec<usize>> = self.partition(&grid);
        let regions: Vec<Vec<usize>> =
            merge_small_regions(&grid, regions, self.config.min_shape_size, &mut self.rng);
        debug!("Partitioned the board into {} regions", regions.len());

        let mut shapes: Vec<TempShape> = Vec::with_capacity(regions.len());
        for cells in regions {
            let figure: Figure =
                figure_from_cells(format!("S_{}", self.figure_counter), &cells, &grid);
            for &cid in &cells {
                grid.cell_mut(cid).figure_id = Some(self.figure_counter);
            }
            shapes.push(TempShape {
                figure: Rc::new(figure),
                cells,
            });
            self.figure_counter += 1;
        }

        let bundles: Vec<Bundle> = self.form_bundles(shapes, &mut grid);
        debug!("Grouped the figures into {} bundles", bundles.len());

        Puzzle::new(grid, bundles, "Generated")
    }

    /// Partition the whole board into connected regions by repeated region
    /// growing from random free seeds.
    fn partition(&mut self, grid: &Grid) -> Vec<Vec<usize>> {
        let mut pool: Vec<usize> = (0..grid.len()).collect();
        let mut is_free: Vec<bool> = vec![true; grid.len()];
        let mut regions: Vec<Vec<usize>> = Vec::new();

        while !pool.is_empty() {
            // Swap-and-pop keeps the random draw O(1).
            let idx: usize = self.rng.random_range(0..pool.len());
            let start: usize = pool.swap_remove(idx);

            let target_size: usize = self
                .rng
                .random_range(self.config.min_shape_size..=self.config.max_shape_size);
            if let Some(cells) = grow_region(grid, start, target_size, &mut is_free, &mut self.rng)
            {
                regions.push(cells);
            }
        }

        regions
    }

    /// Group the figures into bundles and colour them by area.
    ///
    /// The figures are shuffled, then accumulated in order: each bundle
    /// takes figures until its area reaches a uniformly sampled target (the
    /// first figure always goes in, so a single oversized figure still
    /// forms a bundle). Bundle ids are written into the board cells as the
    /// figures are consumed.
    fn form_bundles(&mut self, mut shapes: Vec<TempShape>, grid: &mut Grid) -> Vec<Bundle> {
        shapes.shuffle(&mut self.rng);

        let mut bundles: Vec<Bundle> = Vec::new();
        let mut idx: usize = 0;

        while idx < shapes.len() {
            let bundle_id: usize = bundles.len();
            let target_area: usize = self
                .rng
                .random_range(self.config.min_bundle_area..=self.config.max_bundle_area);
            let mut group: Vec<Rc<Figure>> = Vec::new();
            let mut area: usize = 0;

            while idx < shapes.len() {
                if area > 0 && area >= target_area {
                    break;
                }
                let shape: &TempShape = &shapes[idx];
                area += shape.figure.len();
                for &cid in &shape.cells {
                    grid.cell_mut(cid).bundle_id = Some(bundle_id);
                }
                group.push(Rc::clone(&shape.figure));
                idx += 1;
            }

            bundles.push(Bundle::new(bundle_id, group, Color::WHITE));
        }

        // Heatmap colouring over the spread of bundle areas.
        let min_area: usize = bundles.iter().map(Bundle::total_area).min().unwrap_or(0);
        let max_area: usize = bundles.iter().map(Bundle::total_area).max().unwrap_or(0);
        for bundle in &mut bundles {
            let t: f32 = if max_area > min_area {
                (bundle.total_area() - min_area) as f32 / (max_area - min_area) as f32
            } else {
                0.0
            };
            bundle.set_color(heatmap_color(t));
        }

        bundles
    }
}

/// Cut the induced subgraph of `cells` out of the board, preserving port
/// indices.
///
/// The region's cells become figure nodes in the region's order, and for
/// every board edge between two region cells the figure gets the same edge
/// on the same port. Because every node of the subgraph is visited, both
/// directions of each edge are inserted without computing opposite ports.
pub fn figure_from_cells(name: impl Into<String>, cells: &[usize], grid: &Grid) -> Figure {
    let mut figure: Figure = Figure::new(name, grid.max_ports());

    let mut grid_to_figure: HashMap<usize, usize> = HashMap::with_capacity(cells.len());
    for &cid in cells {
        let fid: usize = figure.add_node();
        grid_to_figure.insert(cid, fid);
    }

    for &cid in cells {
        let fid: usize = grid_to_figure[&cid];
        for p in 0..grid.max_ports() {
            if let Some(neighbor) = grid.neighbor(cid, p)
                && let Some(&neighbor_fid) = grid_to_figure.get(&neighbor)
            {
                figure.add_directed_edge(fid, neighbor_fid, p);
            }
        }
    }

    figure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::GridKind;

    fn generate_with_seed(config: GeneratorConfig, seed: u64) -> Puzzle {
        let mut config: GeneratorConfig = config;
        config.seed = Some(seed);
        PuzzleGenerator::new(config).generate()
    }

    fn small_config(kind: GridKind) -> GeneratorConfig {
        GeneratorConfig {
            width: 6,
            height: 6,
            min_shape_size: 2,
            max_shape_size: 4,
            min_bundle_area: 5,
            max_bundle_area: 8,
            grid_kind: kind,
            seed: None,
        }
    }

    /// Cells tagged with each figure id, in board order.
    fn cells_by_figure(puzzle: &Puzzle) -> HashMap<usize, Vec<usize>> {
        let mut map: HashMap<usize, Vec<usize>> = HashMap::new();
        for node in puzzle.grid().nodes() {
            if let Some(fid) = node.data().figure_id {
                map.entry(fid).or_default().push(node.id());
            }
        }
        map
    }

    #[test]
    fn test_every_cell_is_tagged() {
        for kind in [GridKind::Square, GridKind::Hexagon, GridKind::Triangle] {
            let puzzle: Puzzle = generate_with_seed(small_config(kind), 42);
            for node in puzzle.grid().nodes() {
                assert!(node.data().bundle_id.is_some(), "Untagged cell {}", node.id());
                assert!(node.data().figure_id.is_some(), "Untagged cell {}", node.id());
            }
        }
    }

    #[test]
    fn test_bundle_areas_sum_to_board_size() {
        let puzzle: Puzzle = generate_with_seed(small_config(GridKind::Square), 7);
        let total: usize = puzzle.bundles().iter().map(Bundle::total_area).sum();
        assert_eq!(total, 36);
    }

    #[test]
    fn test_every_figure_is_connected_and_large_enough() {
        let config: GeneratorConfig = small_config(GridKind::Hexagon);
        let min_size: usize = config.min_shape_size;
        let puzzle: Puzzle = generate_with_seed(config, 99);
        for bundle in puzzle.bundles() {
            for shape in bundle.shapes() {
                assert!(shape.is_connected(), "Figure {} is split", shape.name());
                assert!(
                    shape.len() >= min_size,
                    "Figure {} has only {} cells",
                    shape.name(),
                    shape.len()
                );
            }
        }
    }

    #[test]
    fn test_bundle_areas_respect_the_slack() {
        let config: GeneratorConfig = small_config(GridKind::Square);
        let puzzle: Puzzle = generate_with_seed(config.clone(), 123);
        // The last figure of a bundle may push it past the target, but
        // never by more than one figure (merged figures can exceed
        // max_shape_size, so the bound uses the largest actual figure).
        // The final bundle collects the leftovers and may stay below the
        // minimum.
        let largest_figure: usize = puzzle
            .bundles()
            .iter()
            .flat_map(Bundle::shapes)
            .map(|s| s.len())
            .max()
            .unwrap();
        let upper: usize = config.max_bundle_area + largest_figure - 1;
        for bundle in puzzle.bundles().iter().rev().skip(1) {
            assert!(bundle.total_area() >= config.min_bundle_area);
            assert!(bundle.total_area() <= upper);
        }
    }

    #[test]
    fn test_generated_tagging_is_a_valid_placement() {
        let puzzle: Puzzle = generate_with_seed(small_config(GridKind::Square), 2024);
        let tagged: HashMap<usize, Vec<usize>> = cells_by_figure(&puzzle);
        let grid: &Grid = puzzle.grid();

        for bundle in puzzle.bundles() {
            for shape in bundle.shapes() {
                let fid: usize = shape
                    .name()
                    .strip_prefix("S_")
                    .and_then(|s| s.parse().ok())
                    .unwrap();
                let mut expected: Vec<usize> = tagged[&fid].clone();
                expected.sort_unstable();
                assert_eq!(expected.len(), shape.len());

                // Some anchor and rotation must reproduce exactly the
                // tagged cells.
                let reproduced: bool = expected.iter().any(|&anchor| {
                    (0..grid.max_ports()).any(|rot| {
                        grid.embed(shape, anchor, rot).is_some_and(|fp| {
                            let mut fp: Vec<usize> = fp;
                            fp.sort_unstable();
                            fp == expected
                        })
                    })
                });
                assert!(reproduced, "Figure {fid} tagging is not embeddable");
            }
        }
    }

    #[test]
    fn test_same_seed_reproduces_the_same_puzzle() {
        let a: Puzzle = generate_with_seed(small_config(GridKind::Square), 5);
        let b: Puzzle = generate_with_seed(small_config(GridKind::Square), 5);
        assert_eq!(a.bundles().len(), b.bundles().len());
        for (na, nb) in a.grid().nodes().zip(b.grid().nodes()) {
            assert_eq!(na.data().bundle_id, nb.data().bundle_id);
            assert_eq!(na.data().figure_id, nb.data().figure_id);
        }
    }

    #[test]
    fn test_tiny_uniform_partition() {
        // 4x4 board, 2-cell shapes, 4-area bundles: the bundles tile the
        // whole board, and every bundle but the leftover one reaches the
        // target area.
        let config: GeneratorConfig = GeneratorConfig {
            width: 4,
            height: 4,
            min_shape_size: 2,
            max_shape_size: 2,
            min_bundle_area: 4,
            max_bundle_area: 4,
            grid_kind: GridKind::Square,
            seed: Some(31),
        };
        let puzzle: Puzzle = PuzzleGenerator::new(config).generate();
        let total: usize = puzzle.bundles().iter().map(Bundle::total_area).sum();
        assert_eq!(total, 16);
        for bundle in puzzle.bundles().iter().rev().skip(1) {
            assert!(bundle.total_area() >= 4);
        }
        // When nothing needed merging, the tiling is perfectly uniform.
        let all_dominoes: bool = puzzle
            .bundles()
            .iter()
            .flat_map(Bundle::shapes)
            .all(|s| s.len() == 2);
        if all_dominoes {
            assert!(puzzle.bundles().iter().all(|b| b.total_area() == 4));
        }
    }

    #[test]
    fn test_figure_from_cells_preserves_ports() {
        let grid: Grid = build_grid(GridKind::Square, 3, 3);
        // L-tromino: cells 0, 1 and 4 (east then south).
        let figure: Figure = figure_from_cells("L", &[0, 1, 4], &grid);
        assert_eq!(figure.len(), 3);
        // 0 -east-> 1 on port 1, 1 -south-> 4 on port 2.
        assert_eq!(figure.node(0).neighbor(1), Some(1));
        assert_eq!(figure.node(1).neighbor(3), Some(0));
        assert_eq!(figure.node(1).neighbor(2), Some(2));
        assert_eq!(figure.node(2).neighbor(0), Some(1));
        // No edge to the excluded cell 3.
        assert_eq!(figure.node(0).neighbor(2), None);
    }
}
