/*
graph.rs

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

//! Port-indexed graph: nodes with a fixed number of directional neighbor
//! slots ("ports").
//!
//! Both the board and the shapes are instances of [`PortGraph`]. A node
//! stores one optional neighbor id per port, so an edge `u ->[p] v` means
//! "port `p` of `u` points at `v`". Edges are inserted in pairs with a
//! tessellation-specific convention for the opposite port; the graph itself
//! does not know that convention.

/// Capacity of the neighbor slot array. The largest supported tessellation
/// (hexagon) has six ports.
pub const MAX_PORTS_CAPACITY: usize = 6;

/// A graph node: a dense id, one neighbor slot per port, and a payload.
#[derive(Debug, Clone)]
pub struct Node<T> {
    id: usize,
    neighbors: [Option<usize>; MAX_PORTS_CAPACITY],
    data: T,
}

impl<T> Node<T> {
    fn new(id: usize, data: T) -> Self {
        Self {
            id,
            neighbors: [None; MAX_PORTS_CAPACITY],
            data,
        }
    }

    /// Identifier of the node, dense in `[0, graph.len())`.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Payload of the node.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Mutable payload of the node.
    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    /// Return the neighbor on the given port.
    ///
    /// Both an empty slot and a port beyond the slot array report "no
    /// neighbor", so callers can probe ports up to [`MAX_PORTS_CAPACITY`]
    /// without bounds bookkeeping.
    pub fn neighbor(&self, port: usize) -> Option<usize> {
        if port < MAX_PORTS_CAPACITY {
            self.neighbors[port]
        } else {
            None
        }
    }

    /// Return all the neighbor slots.
    pub fn neighbors(&self) -> &[Option<usize>; MAX_PORTS_CAPACITY] {
        &self.neighbors
    }

    fn set_neighbor(&mut self, port: usize, neighbor_id: usize) {
        if port < MAX_PORTS_CAPACITY {
            self.neighbors[port] = Some(neighbor_id);
        }
    }
}

/// Graph with a fixed per-node port count.
#[derive(Debug, Clone)]
pub struct PortGraph<T> {
    /// Number of ports actually used by this graph (3, 4, or 6).
    max_ports: usize,

    /// Node storage. A node id is its index in this vector.
    nodes: Vec<Node<T>>,
}

impl<T> PortGraph<T> {
    /// Create an empty graph with the given port count.
    ///
    /// # Panics
    ///
    /// Panics if `max_ports` exceeds [`MAX_PORTS_CAPACITY`].
    pub fn new(max_ports: usize) -> Self {
        assert!(
            max_ports <= MAX_PORTS_CAPACITY,
            "Port count {max_ports} exceeds the slot capacity {MAX_PORTS_CAPACITY}"
        );
        Self {
            max_ports,
            nodes: Vec::new(),
        }
    }

    /// Number of ports per node.
    pub fn max_ports(&self) -> usize {
        self.max_ports
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node and return its id. Ids are assigned in insertion order.
    pub fn add_node(&mut self, data: T) -> usize {
        let id: usize = self.nodes.len();
        self.nodes.push(Node::new(id, data));
        id
    }

    /// Add a directed edge from `u_id` to `v_id` through port `port_u`.
    pub fn add_directed_edge(&mut self, u_id: usize, v_id: usize, port_u: usize) {
        if u_id < self.nodes.len() {
            self.nodes[u_id].set_neighbor(port_u, v_id);
        }
    }

    /// Add an edge in both directions: `u ->[port_u] v` and `v ->[port_v] u`.
    pub fn add_edge(&mut self, u_id: usize, v_id: usize, port_u: usize, port_v: usize) {
        self.add_directed_edge(u_id, v_id, port_u);
        self.add_directed_edge(v_id, u_id, port_v);
    }

    /// Return the node with the given id.
    ///
    /// # Panics
    ///
    /// An out-of-range id is a programming error and panics.
    pub fn node(&self, id: usize) -> &Node<T> {
        match self.nodes.get(id) {
            Some(n) => n,
            None => panic!("Node ID {id} out of range (graph size {})", self.nodes.len()),
        }
    }

    /// Return the node with the given id for modification.
    ///
    /// # Panics
    ///
    /// An out-of-range id is a programming error and panics.
    pub fn node_mut(&mut self, id: usize) -> &mut Node<T> {
        let len: usize = self.nodes.len();
        match self.nodes.get_mut(id) {
            Some(n) => n,
            None => panic!("Node ID {id} out of range (graph size {len})"),
        }
    }

    /// Iterate over all the nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<T>> {
        self.nodes.iter()
    }
}
