/*
bundle.rs

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

//! A bundle: a group of shapes that must be placed together or not at all.

use std::rc::Rc;

use super::figure::Figure;

/// RGB colour of a bundle in the renderer's heatmap legend.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// White, the placeholder before the generator assigns heatmap colours.
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };
}

/// A group of figures placed atomically.
///
/// Figures are immutable and shared by reference: bundles, solver states,
/// and placement records all point at the same [`Figure`] objects.
#[derive(Debug, Clone)]
pub struct Bundle {
    id: usize,
    shapes: Vec<Rc<Figure>>,
    total_area: usize,
    color: Color,
}

impl Bundle {
    /// Create a bundle; the total area is the sum of the shape sizes.
    pub fn new(id: usize, shapes: Vec<Rc<Figure>>, color: Color) -> Self {
        let total_area: usize = shapes.iter().map(|s| s.len()).sum();
        Self {
            id,
            shapes,
            total_area,
            color,
        }
    }

    /// Identifier of the bundle.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The figures of the bundle, in placement order.
    pub fn shapes(&self) -> &[Rc<Figure>] {
        &self.shapes
    }

    /// Cached sum of the shape sizes.
    pub fn total_area(&self) -> usize {
        self.total_area
    }

    /// Colour of the bundle.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Set the colour. Only the generator's colouring step uses this,
    /// after the bundle areas are known.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn figure_of_size(name: &str, size: usize) -> Rc<Figure> {
        let mut fig: Figure = Figure::new(name, 4);
        for _ in 0..size {
            fig.add_node();
        }
        for i in 1..size {
            fig.add_directed_edge(i - 1, i, 1);
            fig.add_directed_edge(i, i - 1, 3);
        }
        Rc::new(fig)
    }

    #[test]
    fn test_total_area_is_sum_of_shape_sizes() {
        let bundle: Bundle = Bundle::new(
            0,
            vec![figure_of_size("a", 3), figure_of_size("b", 5)],
            Color::WHITE,
        );
        assert_eq!(bundle.total_area(), 8);
        assert_eq!(bundle.shapes().len(), 2);
    }
}
