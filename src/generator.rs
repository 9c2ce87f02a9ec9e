/*
generator.rs

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

//! Generate random puzzles with a known full solution.
//!
//! The entry point is [`puzzle_gen::PuzzleGenerator`], configured through a
//! [`config::GeneratorConfig`] (usually loaded from a `key=value` file).
//! The generator builds a board with [`tessellation::build_grid`], carves
//! it into connected regions with [`regions`], turns each region into a
//! figure, groups the figures into colour-coded bundles, and returns the
//! solved [`crate::core::puzzle::Puzzle`].
//!
//! Because the regions partition the board, the generated puzzle always
//! admits at least one full solution: the one tagged into the board. Clone
//! the puzzle and clear its grid to get the unsolved task form.

pub mod colors;
pub mod config;
pub mod puzzle_gen;
pub mod regions;
pub mod tessellation;
