/*
figure.rs

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

//! A shape: a small connected port-indexed graph cut out of a board.
//!
//! Shapes keep the port indices of the board subgraph they were extracted
//! from. That is what makes rotation a plain cyclic port shift in
//! [`crate::core::grid::Grid::embed`]: the shape "remembers" the direction
//! each of its internal edges was laid along.

use super::graph::{Node, PortGraph};

/// A connected shape with node ids `0..len()`.
#[derive(Debug, Clone)]
pub struct Figure {
    /// Human-readable name, used in diagnostics and in the puzzle file.
    name: String,

    graph: PortGraph<()>,
}

impl Figure {
    /// Create an empty figure with the given port count.
    pub fn new(name: impl Into<String>, max_ports: usize) -> Self {
        Self {
            name: name.into(),
            graph: PortGraph::new(max_ports),
        }
    }

    /// Name of the figure.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ports per node.
    pub fn max_ports(&self) -> usize {
        self.graph.max_ports()
    }

    /// Number of cells the figure covers.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Whether the figure has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Add a node and return its id.
    pub fn add_node(&mut self) -> usize {
        self.graph.add_node(())
    }

    /// Add a directed edge from `u_id` to `v_id` through port `port_u`.
    ///
    /// Figure extraction visits every node of the source subgraph, so both
    /// directions of an edge are inserted by two separate calls; the
    /// opposite port never has to be computed here.
    pub fn add_directed_edge(&mut self, u_id: usize, v_id: usize, port_u: usize) {
        self.graph.add_directed_edge(u_id, v_id, port_u);
    }

    /// Return the node with the given id.
    pub fn node(&self, id: usize) -> &Node<()> {
        self.graph.node(id)
    }

    /// Iterate over all the nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<()>> {
        self.graph.nodes()
    }

    /// Whether every node is reachable from node 0 along the port edges.
    pub fn is_connected(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        let mut visited: Vec<bool> = vec![false; self.len()];
        visited[0] = true;
        let mut queue: Vec<usize> = vec![0];
        let mut head: usize = 0;
        while head < queue.len() {
            let u: usize = queue[head];
            head += 1;
            for p in 0..self.max_ports() {
                if let Some(v) = self.node(u).neighbor(p)
                    && !visited[v]
                {
                    visited[v] = true;
                    queue.push(v);
                }
            }
        }
        visited.into_iter().all(|seen| seen)
    }
}
