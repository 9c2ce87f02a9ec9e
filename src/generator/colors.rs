/*
colors.rs

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

//! Bundle colours for the renderer's heatmap legend.

use crate::core::bundle::Color;

/// Convert HSV (all components in `[0, 1]`) to an RGB colour.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Color {
    let sector: i32 = (h * 6.0) as i32;
    let f: f32 = h * 6.0 - sector as f32;
    let p: f32 = v * (1.0 - s);
    let q: f32 = v * (1.0 - f * s);
    let t: f32 = v * (1.0 - (1.0 - f) * s);

    let (rf, gf, bf): (f32, f32, f32) = match sector.rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    Color {
        r: (rf * 255.0) as u8,
        g: (gf * 255.0) as u8,
        b: (bf * 255.0) as u8,
    }
}

/// Heatmap colour for `t` in `[0, 1]`: blue at 0, red at 1.
///
/// The hue runs from 240 degrees down to 0 with saturation 0.85 and
/// value 0.95; out-of-range inputs are clamped.
pub fn heatmap_color(t: f32) -> Color {
    let t: f32 = t.clamp(0.0, 1.0);
    let h: f32 = (1.0 - t) * (240.0 / 360.0);
    hsv_to_rgb(h, 0.85, 0.95)
}
