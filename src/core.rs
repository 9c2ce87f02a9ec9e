/*
core.rs

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

//! Core data model of Tilepack.
//!
//! Everything is built on the port-indexed graph in [`graph`]: the board
//! ([`grid::Grid`]) is a graph over a regular tessellation whose nodes
//! carry cell tags, and a shape ([`figure::Figure`]) is a small graph cut
//! out of a board with its port indices preserved. Shapes are grouped into
//! atomically-placed [`bundle::Bundle`]s, and a board plus its bundles form
//! a [`puzzle::Puzzle`].
//!
//! The single geometric primitive every solver relies on is
//! [`grid::Grid::embed`]: "does this shape fit at this anchor with this
//! rotation, and which cells does it cover?"

pub mod bundle;
pub mod figure;
pub mod graph;
pub mod grid;
pub mod puzzle;
