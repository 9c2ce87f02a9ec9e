/*
tessellation.rs

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

//! Build the boards for the three supported tessellations.
//!
//! Every builder allocates the `width * height` cells row by row (so cell
//! `(x, y)` gets id `y * width + x`) and then wires the edges with the
//! tessellation's port convention. The port-opposite rules live in
//! [`GridKind`]; this module is the only place that knows the geometric
//! direction each port corresponds to.

use crate::core::grid::{CellData, Grid, GridKind};

/// Neighbor offsets of a hexagon on even rows, indexed by port.
///
/// Odd-r offset coordinates: even and odd rows use different offset
/// vectors so that ports 0..5 walk the six geometric neighbors in a fixed
/// order around the hexagon.
const HEX_EVEN_DX: [i64; 6] = [0, 1, 0, -1, -1, -1];
const HEX_EVEN_DY: [i64; 6] = [-1, 0, 1, 1, 0, -1];

/// Neighbor offsets of a hexagon on odd rows, indexed by port.
const HEX_ODD_DX: [i64; 6] = [1, 1, 1, 0, -1, 0];
const HEX_ODD_DY: [i64; 6] = [-1, 0, 1, 1, 0, -1];

/// Build a fully wired, untagged board of the requested tessellation.
pub fn build_grid(kind: GridKind, width: usize, height: usize) -> Grid {
    match kind {
        GridKind::Square => build_square(width, height),
        GridKind::Hexagon => build_hexagon(width, height),
        GridKind::Triangle => build_triangle(width, height),
    }
}

fn allocate_cells(grid: &mut Grid, width: usize, height: usize) {
    for y in 0..height {
        for x in 0..width {
            grid.add_cell(CellData::new(x, y));
        }
    }
}

/// Square tessellation: port 0 north, 1 east, 2 south, 3 west.
fn build_square(width: usize, height: usize) -> Grid {
    let mut grid: Grid = Grid::new(width, height, GridKind::Square);
    allocate_cells(&mut grid, width, height);

    for y in 0..height {
        for x in 0..width {
            let id: usize = y * width + x;
            if x + 1 < width {
                grid.add_edge(id, y * width + (x + 1), 1, 3);
            }
            if y + 1 < height {
                grid.add_edge(id, (y + 1) * width + x, 2, 0);
            }
        }
    }
    grid
}

/// Hexagonal tessellation in odd-r offset coordinates.
fn build_hexagon(width: usize, height: usize) -> Grid {
    let mut grid: Grid = Grid::new(width, height, GridKind::Hexagon);
    allocate_cells(&mut grid, width, height);

    for y in 0..height {
        for x in 0..width {
            let id: usize = y * width + x;
            let (dx, dy): (&[i64; 6], &[i64; 6]) = if y % 2 == 0 {
                (&HEX_EVEN_DX, &HEX_EVEN_DY)
            } else {
                (&HEX_ODD_DX, &HEX_ODD_DY)
            };

            for p in 0..6 {
                if let Some(nid) = grid.node_id_at(x as i64 + dx[p], y as i64 + dy[p]) {
                    grid.add_edge(id, nid, p, GridKind::Hexagon.opposite(p));
                }
            }
        }
    }
    grid
}

/// Triangular tessellation: cells alternate orientation with `(x + y) % 2`.
///
/// Port 0 points east and port 1 west for every triangle. Port 2 is the
/// vertical bond: an *up* triangle connects through it to the *down*
/// triangle directly below, and a *down* triangle to the *up* triangle
/// directly above, so the edge bonds port 2 to port 2 on both sides.
fn build_triangle(width: usize, height: usize) -> Grid {
    let mut grid: Grid = Grid::new(width, height, GridKind::Triangle);
    allocate_cells(&mut grid, width, height);

    for y in 0..height {
        for x in 0..width {
            let id: usize = y * width + x;
            let points_up: bool = (x + y) % 2 == 0;

            if x + 1 < width {
                grid.add_edge(id, y * width + (x + 1), 0, 1);
            }
            if points_up {
                if y + 1 < height {
                    grid.add_edge(id, (y + 1) * width + x, 2, 2);
                }
            } else if y > 0 {
                grid.add_edge(id, (y - 1) * width + x, 2, 2);
            }
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_port_symmetry(grid: &Grid) {
        for node in grid.nodes() {
            for p in 0..grid.max_ports() {
                if let Some(other) = node.neighbor(p) {
                    assert_eq!(
                        grid.neighbor(other, grid.kind().opposite(p)),
                        Some(node.id()),
                        "Cell {} port {p} points at {other}, which does not point back",
                        node.id()
                    );
                }
            }
        }
    }

    #[test]
    fn test_square_grid_port_symmetry() {
        assert_port_symmetry(&build_grid(GridKind::Square, 5, 4));
    }

    #[test]
    fn test_hexagon_grid_port_symmetry() {
        assert_port_symmetry(&build_grid(GridKind::Hexagon, 5, 5));
    }

    #[test]
    fn test_triangle_grid_port_symmetry() {
        assert_port_symmetry(&build_grid(GridKind::Triangle, 6, 4));
    }

    #[test]
    fn test_square_interior_cell_has_four_neighbors() {
        let grid: Grid = build_grid(GridKind::Square, 3, 3);
        let center: usize = 4;
        assert_eq!(grid.neighbor(center, 0), Some(1)); // north
        assert_eq!(grid.neighbor(center, 1), Some(5)); // east
        assert_eq!(grid.neighbor(center, 2), Some(7)); // south
        assert_eq!(grid.neighbor(center, 3), Some(3)); // west
    }

    #[test]
    fn test_square_corner_has_two_neighbors() {
        let grid: Grid = build_grid(GridKind::Square, 3, 3);
        let degree: usize = grid.node(0).neighbors().iter().flatten().count();
        assert_eq!(degree, 2);
    }

    #[test]
    fn test_hexagon_interior_cell_has_six_neighbors() {
        let grid: Grid = build_grid(GridKind::Hexagon, 5, 5);
        let center: usize = 2 * 5 + 2;
        let degree: usize = grid.node(center).neighbors().iter().flatten().count();
        assert_eq!(degree, 6);
    }

    #[test]
    fn test_hexagon_rows_use_offset_neighbors() {
        let grid: Grid = build_grid(GridKind::Hexagon, 4, 4);
        // Even row: port 0 goes straight up.
        let even_cell: usize = 2 * 4 + 1; // (1, 2)
        assert_eq!(grid.neighbor(even_cell, 0), grid.node_id_at(1, 1));
        // Odd row: port 0 goes up and to the east.
        let odd_cell: usize = 4 + 1; // (1, 1)
        assert_eq!(grid.neighbor(odd_cell, 0), grid.node_id_at(2, 0));
    }

    #[test]
    fn test_triangle_orientation_alternates() {
        let grid: Grid = build_grid(GridKind::Triangle, 4, 4);
        // (0, 0) points up: its vertical bond goes to the row below.
        assert_eq!(grid.neighbor(0, 2), grid.node_id_at(0, 1));
        // (1, 0) points down: no row above, so the bond is absent.
        assert_eq!(grid.neighbor(1, 2), None);
        // (1, 1) points up again.
        assert_eq!(grid.neighbor(5, 2), grid.node_id_at(1, 2));
        // (0, 1) points down and bonds to (0, 0) above.
        assert_eq!(grid.neighbor(4, 2), Some(0));
    }

    #[test]
    fn test_triangle_cells_have_at_most_three_neighbors() {
        let grid: Grid = build_grid(GridKind::Triangle, 5, 5);
        for node in grid.nodes() {
            let degree: usize = node.neighbors().iter().flatten().count();
            assert!(degree <= 3);
        }
    }
}
