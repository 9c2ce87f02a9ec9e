/*
puzzle.rs

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

//! Save and restore puzzles as JSON files.
//!
//! The file stores the grid header, every cell with its tags and port
//! slots, and every bundle with the full topology of its shapes. Absent
//! ids are written as `-1`. On load, the ports are replayed exactly as
//! stored (never re-derived from the tessellation), so saving a loaded
//! puzzle reproduces the file up to key ordering.
//!
//! Loaders stay lenient where old files differ: `bundle_id` and
//! `figure_id` may be missing (treated as `-1`), and the port list of a
//! cell or shape node may use the legacy `neighbors` key.

use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::bundle::{Bundle, Color};
use crate::core::figure::Figure;
use crate::core::graph::MAX_PORTS_CAPACITY;
use crate::core::grid::{CellData, Grid, GridKind};
use crate::core::puzzle::Puzzle;

/// Sentinel for an absent id or port.
const ABSENT: i64 = -1;

fn absent() -> i64 {
    ABSENT
}

/// A structurally invalid puzzle file.
#[derive(Debug)]
pub struct FormatError(String);

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid puzzle file: {}", self.0)
    }
}

impl Error for FormatError {}

#[derive(Serialize, Deserialize)]
struct GridRecord {
    width: usize,
    height: usize,
    #[serde(rename = "type")]
    kind: i32,
    max_ports: usize,
}

#[derive(Serialize, Deserialize)]
struct CellRecord {
    id: usize,
    x: usize,
    y: usize,
    #[serde(default = "absent")]
    bundle_id: i64,
    #[serde(default = "absent")]
    figure_id: i64,
    #[serde(alias = "neighbors")]
    ports: Vec<i64>,
}

#[derive(Serialize, Deserialize)]
struct TopologyRecord {
    id: usize,
    #[serde(alias = "neighbors")]
    ports: Vec<i64>,
}

#[derive(Serialize, Deserialize)]
struct ShapeRecord {
    name: String,
    size: usize,
    max_ports: usize,
    topology: Vec<TopologyRecord>,
}

#[derive(Serialize, Deserialize)]
struct BundleRecord {
    id: usize,
    color: [u8; 3],
    area: usize,
    shapes: Vec<ShapeRecord>,
}

#[derive(Serialize, Deserialize)]
struct PuzzleRecord {
    #[serde(default)]
    name: String,
    grid: GridRecord,
    cells: Vec<CellRecord>,
    bundles: Vec<BundleRecord>,
}

fn id_to_file(id: Option<usize>) -> i64 {
    match id {
        Some(v) => v as i64,
        None => ABSENT,
    }
}

fn ports_to_file(slots: &[Option<usize>; MAX_PORTS_CAPACITY], max_ports: usize) -> Vec<i64> {
    slots
        .iter()
        .take(max_ports)
        .map(|slot| match slot {
            Some(v) => *v as i64,
            None => ABSENT,
        })
        .collect()
}

fn puzzle_to_record(puzzle: &Puzzle) -> PuzzleRecord {
    let grid: &Grid = puzzle.grid();

    let cells: Vec<CellRecord> = grid
        .nodes()
        .map(|node| CellRecord {
            id: node.id(),
            x: node.data().x,
            y: node.data().y,
            bundle_id: id_to_file(node.data().bundle_id),
            figure_id: id_to_file(node.data().figure_id),
            ports: ports_to_file(node.neighbors(), grid.max_ports()),
        })
        .collect();

    let bundles: Vec<BundleRecord> = puzzle
        .bundles()
        .iter()
        .map(|bundle| {
            let color: Color = bundle.color();
            BundleRecord {
                id: bundle.id(),
                color: [color.r, color.g, color.b],
                area: bundle.total_area(),
                shapes: bundle
                    .shapes()
                    .iter()
                    .map(|shape| ShapeRecord {
                        name: shape.name().to_string(),
                        size: shape.len(),
                        max_ports: shape.max_ports(),
                        topology: shape
                            .nodes()
                            .map(|node| TopologyRecord {
                                id: node.id(),
                                ports: ports_to_file(node.neighbors(), shape.max_ports()),
                            })
                            .collect(),
                    })
                    .collect(),
            }
        })
        .collect();

    PuzzleRecord {
        name: puzzle.name().to_string(),
        grid: GridRecord {
            width: grid.width(),
            height: grid.height(),
            kind: grid.kind() as i32,
            max_ports: grid.max_ports(),
        },
        cells,
        bundles,
    }
}

fn file_to_id(value: i64) -> Option<usize> {
    usize::try_from(value).ok()
}

fn grid_from_record(record: &PuzzleRecord) -> Result<Grid, Box<dyn Error>> {
    let header: &GridRecord = &record.grid;
    let kind: GridKind = GridKind::from_repr(header.kind)
        .ok_or_else(|| FormatError(format!("unknown grid type {}", header.kind)))?;
    if header.max_ports != kind.max_ports() {
        return Err(Box::new(FormatError(format!(
            "grid type {:?} implies {} ports, file says {}",
            kind,
            kind.max_ports(),
            header.max_ports
        ))));
    }
    if record.cells.len() != header.width * header.height {
        return Err(Box::new(FormatError(format!(
            "{} cells for a {}x{} board",
            record.cells.len(),
            header.width,
            header.height
        ))));
    }

    let mut grid: Grid = Grid::new(header.width, header.height, kind);
    for (index, cell) in record.cells.iter().enumerate() {
        if cell.id != index {
            return Err(Box::new(FormatError(format!(
                "cell ids must be dense and ordered, found {} at position {index}",
                cell.id
            ))));
        }
        let id: usize = grid.add_cell(CellData::new(cell.x, cell.y));
        let data: &mut CellData = grid.cell_mut(id);
        data.bundle_id = file_to_id(cell.bundle_id);
        data.figure_id = file_to_id(cell.figure_id);
    }

    // Replay the port slots as stored.
    for cell in &record.cells {
        for (port, &target) in cell.ports.iter().take(grid.max_ports()).enumerate() {
            if let Some(neighbor) = file_to_id(target) {
                if neighbor >= record.cells.len() {
                    return Err(Box::new(FormatError(format!(
                        "cell {} port {port} points at unknown cell {neighbor}",
                        cell.id
                    ))));
                }
                grid.add_directed_edge(cell.id, neighbor, port);
            }
        }
    }

    Ok(grid)
}

fn figure_from_record(record: &ShapeRecord) -> Result<Figure, Box<dyn Error>> {
    if record.max_ports > MAX_PORTS_CAPACITY {
        return Err(Box::new(FormatError(format!(
            "shape {:?} declares {} ports, the maximum is {MAX_PORTS_CAPACITY}",
            record.name, record.max_ports
        ))));
    }

    let mut figure: Figure = Figure::new(record.name.clone(), record.max_ports);
    for _ in 0..record.size {
        figure.add_node();
    }

    for node in &record.topology {
        if node.id >= record.size {
            return Err(Box::new(FormatError(format!(
                "shape {:?} topology names node {} of {}",
                record.name, node.id, record.size
            ))));
        }
        for (port, &target) in node.ports.iter().take(record.max_ports).enumerate() {
            if let Some(neighbor) = file_to_id(target) {
                if neighbor >= record.size {
                    return Err(Box::new(FormatError(format!(
                        "shape {:?} node {} port {port} points at unknown node {neighbor}",
                        record.name, node.id
                    ))));
                }
                figure.add_directed_edge(node.id, neighbor, port);
            }
        }
    }

    Ok(figure)
}

/// Save a puzzle to a JSON file.
///
/// # Errors
///
/// Returns an error when the file cannot be created or written.
pub fn save(puzzle: &Puzzle, path: &Path) -> Result<(), Box<dyn Error>> {
    let record: PuzzleRecord = puzzle_to_record(puzzle);
    let file: File = File::create(path)?;
    let mut writer: BufWriter<File> = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &record)?;
    writer.flush()?;
    Ok(())
}

/// Load a puzzle from a JSON file.
///
/// # Errors
///
/// Returns an error when the file cannot be read, is not valid JSON, or
/// describes an inconsistent puzzle (wrong cell count, dangling ids,
/// impossible port counts).
pub fn load(path: &Path) -> Result<Puzzle, Box<dyn Error>> {
    let file: File = File::open(path)?;
    let reader: BufReader<File> = BufReader::new(file);
    let record: PuzzleRecord = serde_json::from_reader(reader)?;

    let grid: Grid = grid_from_record(&record)?;

    let mut bundles: Vec<Bundle> = Vec::with_capacity(record.bundles.len());
    for bundle_record in &record.bundles {
        let mut shapes: Vec<Rc<Figure>> = Vec::with_capacity(bundle_record.shapes.len());
        for shape_record in &bundle_record.shapes {
            shapes.push(Rc::new(figure_from_record(shape_record)?));
        }
        let color: Color = Color {
            r: bundle_record.color[0],
            g: bundle_record.color[1],
            b: bundle_record.color[2],
        };
        bundles.push(Bundle::new(bundle_record.id, shapes, color));
    }

    Ok(Puzzle::new(grid, bundles, record.name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::GridKind;
    use crate::generator::config::GeneratorConfig;
    use crate::generator::puzzle_gen::PuzzleGenerator;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let mut path: PathBuf = std::env::temp_dir();
        path.push(format!("tilepack-saver-{}-{name}.json", std::process::id()));
        path
    }

    fn generated_puzzle(kind: GridKind) -> Puzzle {
        let mut generator: PuzzleGenerator = PuzzleGenerator::new(GeneratorConfig {
            width: 5,
            height: 4,
            min_shape_size: 2,
            max_shape_size: 3,
            min_bundle_area: 4,
            max_bundle_area: 6,
            grid_kind: kind,
            seed: Some(61),
        });
        generator.generate()
    }

    #[test]
    fn test_round_trip_preserves_the_puzzle() {
        for kind in [GridKind::Square, GridKind::Hexagon, GridKind::Triangle] {
            let original: Puzzle = generated_puzzle(kind);
            let path: PathBuf = temp_path(&format!("roundtrip-{}", kind as i32));

            save(&original, &path).unwrap();
            let loaded: Puzzle = load(&path).unwrap();
            fs::remove_file(&path).unwrap();

            assert_eq!(loaded.name(), original.name());
            assert_eq!(loaded.grid().width(), original.grid().width());
            assert_eq!(loaded.grid().kind(), original.grid().kind());
            assert_eq!(loaded.bundles().len(), original.bundles().len());

            for (a, b) in original.grid().nodes().zip(loaded.grid().nodes()) {
                assert_eq!(a.data().x, b.data().x);
                assert_eq!(a.data().bundle_id, b.data().bundle_id);
                assert_eq!(a.data().figure_id, b.data().figure_id);
                assert_eq!(a.neighbors(), b.neighbors());
            }

            for (a, b) in original.bundles().iter().zip(loaded.bundles()) {
                assert_eq!(a.id(), b.id());
                assert_eq!(a.total_area(), b.total_area());
                assert_eq!(a.color(), b.color());
                for (sa, sb) in a.shapes().iter().zip(b.shapes()) {
                    assert_eq!(sa.name(), sb.name());
                    assert_eq!(sa.len(), sb.len());
                    for (na, nb) in sa.nodes().zip(sb.nodes()) {
                        assert_eq!(na.neighbors(), nb.neighbors());
                    }
                }
            }
        }
    }

    #[test]
    fn test_save_load_save_is_byte_stable() {
        let puzzle: Puzzle = generated_puzzle(GridKind::Square);
        let first: PathBuf = temp_path("bytes-1");
        let second: PathBuf = temp_path("bytes-2");

        save(&puzzle, &first).unwrap();
        let loaded: Puzzle = load(&first).unwrap();
        save(&loaded, &second).unwrap();

        let bytes_first: Vec<u8> = fs::read(&first).unwrap();
        let bytes_second: Vec<u8> = fs::read(&second).unwrap();
        fs::remove_file(&first).unwrap();
        fs::remove_file(&second).unwrap();

        assert_eq!(bytes_first, bytes_second);
    }

    #[test]
    fn test_load_accepts_missing_tags_and_legacy_neighbors() {
        let path: PathBuf = temp_path("legacy");
        let text: &str = r#"{
            "name": "legacy",
            "grid": {"width": 2, "height": 1, "type": 0, "max_ports": 4},
            "cells": [
                {"id": 0, "x": 0, "y": 0, "neighbors": [-1, 1, -1, -1]},
                {"id": 1, "x": 1, "y": 0, "neighbors": [-1, -1, -1, 0]}
            ],
            "bundles": [
                {"id": 0, "color": [10, 20, 30], "area": 2, "shapes": [
                    {"name": "duo", "size": 2, "max_ports": 4, "topology": [
                        {"id": 0, "neighbors": [-1, 1, -1, -1]},
                        {"id": 1, "neighbors": [-1, -1, -1, 0]}
                    ]}
                ]}
            ]
        }"#;
        fs::write(&path, text).unwrap();

        let puzzle: Puzzle = load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        // Missing bundle_id/figure_id read as empty.
        for node in puzzle.grid().nodes() {
            assert_eq!(node.data().bundle_id, None);
            assert_eq!(node.data().figure_id, None);
        }
        assert_eq!(puzzle.grid().neighbor(0, 1), Some(1));
        assert_eq!(puzzle.grid().neighbor(1, 3), Some(0));

        let shape: &Rc<Figure> = &puzzle.bundles()[0].shapes()[0];
        assert_eq!(shape.len(), 2);
        assert_eq!(shape.node(0).neighbor(1), Some(1));
    }

    #[test]
    fn test_load_rejects_wrong_cell_count() {
        let path: PathBuf = temp_path("short");
        let text: &str = r#"{
            "grid": {"width": 2, "height": 2, "type": 0, "max_ports": 4},
            "cells": [{"id": 0, "x": 0, "y": 0, "ports": [-1, -1, -1, -1]}],
            "bundles": []
        }"#;
        fs::write(&path, text).unwrap();
        let result = load(&path);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_load_rejects_mismatched_port_count() {
        let path: PathBuf = temp_path("ports");
        let text: &str = r#"{
            "grid": {"width": 2, "height": 1, "type": 0, "max_ports": 6},
            "cells": [
                {"id": 0, "x": 0, "y": 0, "ports": [-1, 1, -1, -1]},
                {"id": 1, "x": 1, "y": 0, "ports": [-1, -1, -1, 0]}
            ],
            "bundles": []
        }"#;
        fs::write(&path, text).unwrap();
        let result = load(&path);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_load_rejects_missing_file() {
        assert!(load(Path::new("/nonexistent/tilepack.json")).is_err());
    }

    #[test]
    fn test_cleared_task_round_trips() {
        let mut task: Puzzle = generated_puzzle(GridKind::Hexagon);
        task.clear_grid();
        let path: PathBuf = temp_path("task");

        save(&task, &path).unwrap();
        let loaded: Puzzle = load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded.covered_cells(), 0);
        assert_eq!(loaded.bundles().len(), task.bundles().len());
    }
}
