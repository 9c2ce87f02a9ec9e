/*
regions.rs

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

//! Region growing: carve the board into connected groups of cells.
//!
//! [`grow_region`] grows one connected region from a seed cell, and
//! [`merge_small_regions`] absorbs the leftovers that ended up below the
//! minimum shape size into a random neighboring region.

use std::collections::{BTreeSet, HashSet};

use log::debug;
use rand::Rng;
use rand::rngs::StdRng;

use crate::core::grid::Grid;

/// Probability of growing from the most recently added cell rather than a
/// uniformly chosen one. The bias produces snake-like regions, which make
/// for harder placements than round blobs.
const GROW_FROM_LAST_PROBABILITY: f64 = 0.6;

/// Grow a connected region of free cells starting at `start`.
///
/// Cells appended to the region are flagged as taken in `is_free`. Growth
/// stops when the region reaches `target_size` or no frontier cell has a
/// free neighbor left, so the result can be shorter than requested.
///
/// Returns `None` when the seed itself is already taken (a previous region
/// grew over it before the caller's pool got to it).
pub fn grow_region(
    grid: &Grid,
    start: usize,
    target_size: usize,
    is_free: &mut [bool],
    rng: &mut StdRng,
) -> Option<Vec<usize>> {
    if !is_free[start] {
        return None;
    }

    let mut region: Vec<usize> = vec![start];
    // Cells of the region that may still have free neighbors.
    let mut growth: Vec<usize> = vec![start];
    let mut in_region: HashSet<usize> = HashSet::new();
    in_region.insert(start);
    is_free[start] = false;

    while region.len() < target_size && !growth.is_empty() {
        let grow_from: usize = if rng.random_range(0.0..1.0) < GROW_FROM_LAST_PROBABILITY {
            *growth.last().unwrap()
        } else {
            growth[rng.random_range(0..growth.len())]
        };

        let mut free_neighbors: Vec<usize> = Vec::new();
        for p in 0..grid.max_ports() {
            if let Some(n) = grid.neighbor(grow_from, p)
                && is_free[n]
                && !in_region.contains(&n)
            {
                free_neighbors.push(n);
            }
        }

        if free_neighbors.is_empty() {
            // This cell is walled in, drop it from the frontier and retry.
            if let Some(pos) = growth.iter().position(|&c| c == grow_from) {
                growth.remove(pos);
            }
            continue;
        }

        let next: usize = free_neighbors[rng.random_range(0..free_neighbors.len())];
        region.push(next);
        growth.push(next);
        in_region.insert(next);
        is_free[next] = false;
    }

    Some(region)
}

/// Absorb every region smaller than `min_size` into a uniformly chosen
/// neighboring region, in a single sweep.
///
/// A region with no distinct neighbor (a board made of one region) is left
/// as it is. The sweep visits regions in order, so a small region absorbed
/// early can push its host past `min_size` before the host is visited.
pub fn merge_small_regions(
    grid: &Grid,
    mut regions: Vec<Vec<usize>>,
    min_size: usize,
    rng: &mut StdRng,
) -> Vec<Vec<usize>> {
    // cell id -> index of the region owning it
    let mut cell_to_region: Vec<Option<usize>> = vec![None; grid.len()];
    for (idx, region) in regions.iter().enumerate() {
        for &cid in region {
            cell_to_region[cid] = Some(idx);
        }
    }

    for i in 0..regions.len() {
        if regions[i].is_empty() || regions[i].len() >= min_size {
            continue;
        }

        // Distinct live regions adjacent to any of this region's cells.
        let mut neighbor_regions: BTreeSet<usize> = BTreeSet::new();
        for &cid in &regions[i] {
            for &slot in grid.node(cid).neighbors() {
                if let Some(n) = slot
                    && let Some(owner) = cell_to_region[n]
                    && owner != i
                    && !regions[owner].is_empty()
                {
                    neighbor_regions.insert(owner);
                }
            }
        }

        if neighbor_regions.is_empty() {
            continue;
        }

        let choices: Vec<usize> = neighbor_regions.into_iter().collect();
        let target: usize = choices[rng.random_range(0..choices.len())];
        debug!(
            "Merging region {i} ({} cells) into region {target}",
            regions[i].len()
        );

        let absorbed: Vec<usize> = std::mem::take(&mut regions[i]);
        for &cid in &absorbed {
            cell_to_region[cid] = Some(target);
        }
        regions[target].extend(absorbed);
    }

    regions.retain(|r| !r.is_empty());
    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::GridKind;
    use crate::generator::tessellation::build_grid;
    use rand::SeedableRng;

    #[test]
    fn test_grow_region_is_connected_and_marks_cells() {
        let grid: Grid = build_grid(GridKind::Square, 6, 6);
        let mut is_free: Vec<bool> = vec![true; grid.len()];
        let mut rng: StdRng = StdRng::seed_from_u64(11);

        let region: Vec<usize> = grow_region(&grid, 0, 5, &mut is_free, &mut rng).unwrap();
        assert_eq!(region.len(), 5);
        for &cid in &region {
            assert!(!is_free[cid]);
        }

        // Every cell after the seed must touch an earlier cell of the region.
        for (i, &cid) in region.iter().enumerate().skip(1) {
            let touches_earlier: bool = (0..grid.max_ports()).any(|p| {
                grid.neighbor(cid, p)
                    .is_some_and(|n| region[..i].contains(&n))
            });
            assert!(touches_earlier, "Cell {cid} is detached from the region");
        }
    }

    #[test]
    fn test_grow_region_rejects_taken_seed() {
        let grid: Grid = build_grid(GridKind::Square, 3, 3);
        let mut is_free: Vec<bool> = vec![true; grid.len()];
        is_free[4] = false;
        let mut rng: StdRng = StdRng::seed_from_u64(0);
        assert!(grow_region(&grid, 4, 3, &mut is_free, &mut rng).is_none());
    }

    #[test]
    fn test_grow_region_stops_when_walled_in() {
        let grid: Grid = build_grid(GridKind::Square, 3, 3);
        let mut is_free: Vec<bool> = vec![false; grid.len()];
        // Only the corner and its east neighbor are free.
        is_free[0] = true;
        is_free[1] = true;
        let mut rng: StdRng = StdRng::seed_from_u64(3);
        let region: Vec<usize> = grow_region(&grid, 0, 5, &mut is_free, &mut rng).unwrap();
        assert_eq!(region.len(), 2);
    }

    #[test]
    fn test_merge_absorbs_undersized_regions() {
        let grid: Grid = build_grid(GridKind::Square, 4, 1);
        // Regions {0}, {1, 2, 3}; min size 2 forces {0} into its neighbor.
        let regions: Vec<Vec<usize>> = vec![vec![0], vec![1, 2, 3]];
        let mut rng: StdRng = StdRng::seed_from_u64(5);
        let merged: Vec<Vec<usize>> = merge_small_regions(&grid, regions, 2, &mut rng);
        assert_eq!(merged.len(), 1);
        let mut cells: Vec<usize> = merged[0].clone();
        cells.sort_unstable();
        assert_eq!(cells, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_merge_keeps_large_regions_untouched() {
        let grid: Grid = build_grid(GridKind::Square, 4, 1);
        let regions: Vec<Vec<usize>> = vec![vec![0, 1], vec![2, 3]];
        let mut rng: StdRng = StdRng::seed_from_u64(7);
        let merged: Vec<Vec<usize>> = merge_small_regions(&grid, regions, 2, &mut rng);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_leaves_a_lone_region_alone() {
        let grid: Grid = build_grid(GridKind::Square, 2, 1);
        let regions: Vec<Vec<usize>> = vec![vec![0, 1]];
        let mut rng: StdRng = StdRng::seed_from_u64(9);
        let merged: Vec<Vec<usize>> = merge_small_regions(&grid, regions, 5, &mut rng);
        assert_eq!(merged.len(), 1);
    }
}
