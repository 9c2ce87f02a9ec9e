/*
config.rs

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

//! Generator configuration and its `key=value` file format.
//!
//! The configuration file is plain text, one option per line, with `#`
//! comments. Missing keys take the documented defaults; unknown keys are
//! logged and skipped.
//!
//! ```text
//! # 8x8 hexagonal board
//! width=8
//! height=8
//! grid_type=1
//! min_shape_size=3
//! max_shape_size=5
//! min_bundle_area=15
//! max_bundle_area=25
//! ```

use log::warn;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::core::grid::GridKind;

/// Errors raised while loading or validating a configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(std::io::Error),

    /// A value could not be parsed as an integer, or names an unknown
    /// tessellation.
    BadValue { key: String, value: String },

    /// The options parse individually but contradict each other.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Cannot read the configuration file: {e}"),
            ConfigError::BadValue { key, value } => {
                write!(f, "Bad value {value:?} for the {key:?} option")
            }
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

/// Options controlling puzzle generation. All bounds are inclusive.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Board width in cells.
    pub width: usize,

    /// Board height in cells.
    pub height: usize,

    /// Smallest shape the region growing aims for.
    pub min_shape_size: usize,

    /// Largest shape the region growing aims for.
    pub max_shape_size: usize,

    /// Smallest target area of a bundle.
    pub min_bundle_area: usize,

    /// Largest target area of a bundle.
    pub max_bundle_area: usize,

    /// Tessellation of the board.
    pub grid_kind: GridKind,

    /// Explicit RNG seed for reproducible generation. `None` seeds from
    /// the operating system.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            min_shape_size: 3,
            max_shape_size: 5,
            min_bundle_area: 15,
            max_bundle_area: 25,
            grid_kind: GridKind::Square,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Load a configuration file, falling back to the defaults for every
    /// key the file does not set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a value does not
    /// parse, or the resulting options are inconsistent (see
    /// [`GeneratorConfig::validate`]).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text: String = fs::read_to_string(path)?;
        let mut config: GeneratorConfig = GeneratorConfig::default();

        for line in text.lines() {
            let line: &str = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!("Skipping malformed configuration line: {line:?}");
                continue;
            };
            let key: &str = key.trim();
            let value: &str = value.trim();

            let parsed: i64 = value.parse().map_err(|_| ConfigError::BadValue {
                key: key.to_string(),
                value: value.to_string(),
            })?;
            let as_usize = || -> Result<usize, ConfigError> {
                usize::try_from(parsed).map_err(|_| ConfigError::BadValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            };

            match key {
                "width" => config.width = as_usize()?,
                "height" => config.height = as_usize()?,
                "min_shape_size" => config.min_shape_size = as_usize()?,
                "max_shape_size" => config.max_shape_size = as_usize()?,
                "min_bundle_area" => config.min_bundle_area = as_usize()?,
                "max_bundle_area" => config.max_bundle_area = as_usize()?,
                "grid_type" => {
                    config.grid_kind = i32::try_from(parsed)
                        .ok()
                        .and_then(GridKind::from_repr)
                        .ok_or_else(|| ConfigError::BadValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        })?;
                }
                "seed" => config.seed = Some(parsed as u64),
                _ => warn!("Skipping unknown configuration key {key:?}"),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the option bounds: board at least 2x2, shape sizes at least 1
    /// and ordered, bundle areas at least one shape and ordered.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 2 || self.height < 2 {
            return Err(ConfigError::Invalid(format!(
                "the board must be at least 2x2, got {}x{}",
                self.width, self.height
            )));
        }
        if self.min_shape_size < 1 {
            return Err(ConfigError::Invalid(
                "min_shape_size must be at least 1".to_string(),
            ));
        }
        if self.min_shape_size > self.max_shape_size {
            return Err(ConfigError::Invalid(format!(
                "min_shape_size {} exceeds max_shape_size {}",
                self.min_shape_size, self.max_shape_size
            )));
        }
        if self.min_bundle_area < self.min_shape_size {
            return Err(ConfigError::Invalid(format!(
                "min_bundle_area {} is below min_shape_size {}",
                self.min_bundle_area, self.min_shape_size
            )));
        }
        if self.min_bundle_area > self.max_bundle_area {
            return Err(ConfigError::Invalid(format!(
                "min_bundle_area {} exceeds max_bundle_area {}",
                self.min_bundle_area, self.max_bundle_area
            )));
        }
        Ok(())
    }
}
