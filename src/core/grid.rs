/*
grid.rs

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

//! The board: a port-indexed graph over a regular tessellation, plus the
//! embedding primitive that lays a shape onto the board.

use strum_macros::FromRepr;

use super::figure::Figure;
use super::graph::{Node, PortGraph};

/// Tessellation of the board.
///
/// The variant determines the port count of every cell and the convention
/// for the port opposite to a given port.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, FromRepr)]
#[repr(i32)]
pub enum GridKind {
    /// Square cells, 4 neighbors.
    #[default]
    Square = 0,

    /// Hexagonal cells in odd-r offset coordinates, 6 neighbors.
    Hexagon = 1,

    /// Triangular cells alternating orientation with `(x + y) % 2`,
    /// 3 neighbors.
    Triangle = 2,
}

impl GridKind {
    /// Ports per cell for this tessellation.
    pub fn max_ports(self) -> usize {
        match self {
            GridKind::Square => 4,
            GridKind::Hexagon => 6,
            GridKind::Triangle => 3,
        }
    }

    /// Port on the far side of an edge leaving through `port`.
    ///
    /// Square: `port + 2 (mod 4)`. Hexagon: `port + 3 (mod 6)`. Triangle:
    /// the same port, because each edge bonds same-indexed ports on two
    /// triangles of opposite orientation.
    pub fn opposite(self, port: usize) -> usize {
        match self {
            GridKind::Square => (port + 2) % 4,
            GridKind::Hexagon => (port + 3) % 6,
            GridKind::Triangle => port,
        }
    }
}

/// Payload of a board cell: its coordinates and the tags written by the
/// generator or a solver.
#[derive(Debug, Clone, Default)]
pub struct CellData {
    /// Column of the cell.
    pub x: usize,

    /// Row of the cell.
    pub y: usize,

    /// Bundle that occupies the cell, or `None` when the cell is empty.
    pub bundle_id: Option<usize>,

    /// Figure placement that occupies the cell, or `None` when empty.
    /// A cell carries either both tags or neither.
    pub figure_id: Option<usize>,
}

impl CellData {
    /// Create an untagged cell at the given coordinates.
    pub fn new(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            bundle_id: None,
            figure_id: None,
        }
    }
}

/// The board to tile.
///
/// Cells are created row by row so that the cell at `(x, y)` always has id
/// `y * width + x`. Edge wiring is the tessellation builders' job (see
/// [`crate::generator::tessellation`]); the grid only enforces the id
/// layout.
#[derive(Debug, Clone)]
pub struct Grid {
    graph: PortGraph<CellData>,
    width: usize,
    height: usize,
    kind: GridKind,
}

impl Grid {
    /// Create an empty board of the given tessellation.
    pub fn new(width: usize, height: usize, kind: GridKind) -> Self {
        Self {
            graph: PortGraph::new(kind.max_ports()),
            width,
            height,
            kind,
        }
    }

    /// Width of the board in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the board in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Tessellation of the board.
    pub fn kind(&self) -> GridKind {
        self.kind
    }

    /// Ports per cell.
    pub fn max_ports(&self) -> usize {
        self.graph.max_ports()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Whether the board has no cells.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Add a cell. Cells must be added in row-major order so that ids match
    /// the `y * width + x` layout.
    pub fn add_cell(&mut self, data: CellData) -> usize {
        self.graph.add_node(data)
    }

    /// Wire an edge between two cells through the given ports.
    pub fn add_edge(&mut self, u_id: usize, v_id: usize, port_u: usize, port_v: usize) {
        self.graph.add_edge(u_id, v_id, port_u, port_v);
    }

    /// Wire one direction of an edge. The puzzle loader replays the port
    /// slots of each cell exactly as stored, so it never needs the
    /// opposite-port rule.
    pub fn add_directed_edge(&mut self, u_id: usize, v_id: usize, port_u: usize) {
        self.graph.add_directed_edge(u_id, v_id, port_u);
    }

    /// Return the cell node with the given id.
    pub fn node(&self, id: usize) -> &Node<CellData> {
        self.graph.node(id)
    }

    /// Return the cell payload with the given id.
    pub fn cell(&self, id: usize) -> &CellData {
        self.graph.node(id).data()
    }

    /// Return the cell payload with the given id for modification.
    pub fn cell_mut(&mut self, id: usize) -> &mut CellData {
        self.graph.node_mut(id).data_mut()
    }

    /// Iterate over all the cell nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<CellData>> {
        self.graph.nodes()
    }

    /// Return the neighbor of a cell on the given port.
    pub fn neighbor(&self, id: usize, port: usize) -> Option<usize> {
        self.graph.node(id).neighbor(port)
    }

    /// Return the cell id at the given coordinates, or `None` when the
    /// coordinates fall outside the board.
    pub fn node_id_at(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || x >= self.width as i64 || y < 0 || y >= self.height as i64 {
            None
        } else {
            Some(y as usize * self.width + x as usize)
        }
    }

    /// Reset the bundle and figure tags of every cell.
    pub fn clear_tags(&mut self) {
        for id in 0..self.len() {
            let data: &mut CellData = self.cell_mut(id);
            data.bundle_id = None;
            data.figure_id = None;
        }
    }

    /// Try to lay `figure` onto the board with its node 0 pinned to the
    /// `anchor` cell, rotated by a cyclic port shift of `rotation`.
    ///
    /// Returns the footprint: one board cell per figure node, in figure
    /// node order, with no repeats. Returns `None` when the figure is
    /// empty, an edge of the figure leads off the board, or two figure
    /// nodes would land on the same cell.
    ///
    /// The walk is a breadth-first traversal of the figure. A figure edge
    /// leaving through port `p` is followed on the board through port
    /// `(p + rotation) % max_ports`; edges back into already-mapped figure
    /// nodes are skipped (spanning-tree descent). Cell occupancy is NOT
    /// consulted here; collision with previously placed figures is the
    /// caller's concern.
    ///
    /// Rotation is a plain port shift. On the triangle tessellation this
    /// cannot express every geometric rotation; shapes that need the
    /// missing orientations must be modelled as distinct figures.
    ///
    /// # Panics
    ///
    /// Panics if `rotation` is not in `[0, max_ports)` or `anchor` is not a
    /// cell id; both are programming errors.
    pub fn embed(&self, figure: &Figure, anchor: usize, rotation: usize) -> Option<Vec<usize>> {
        assert!(
            rotation < self.max_ports(),
            "Rotation {rotation} out of range for a {} port grid",
            self.max_ports()
        );
        if figure.is_empty() {
            return None;
        }

        // mapping[figure node] = board cell; `Some` doubles as the visited
        // flag for the traversal.
        let mut mapping: Vec<Option<usize>> = vec![None; figure.len()];
        mapping[0] = Some(anchor);

        let mut queue: Vec<usize> = vec![0];
        let mut head: usize = 0;
        while head < queue.len() {
            let u_fig: usize = queue[head];
            head += 1;
            let u_grid: usize = mapping[u_fig]?;

            for p in 0..figure.max_ports() {
                let Some(v_fig) = figure.node(u_fig).neighbor(p) else {
                    continue;
                };
                if mapping[v_fig].is_some() {
                    continue;
                }

                let rot_port: usize = (p + rotation) % self.max_ports();
                let Some(v_grid) = self.node(u_grid).neighbor(rot_port) else {
                    // The edge leaves the board.
                    return None;
                };
                if mapping.contains(&Some(v_grid)) {
                    // Two figure nodes cannot share a cell.
                    return None;
                }

                mapping[v_fig] = Some(v_grid);
                queue.push(v_fig);
            }
        }

        // A node left unmapped means the figure was not connected; that is
        // not a placeable shape.
        mapping.into_iter().collect()
    }
}
