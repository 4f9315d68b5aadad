//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::defaults::{MAX_PARALLEL_DOWNLOADS, MIN_PARALLEL_DOWNLOADS};
use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [api] section
    if let Some(section) = ini.section(Some("api")) {
        if let Some(v) = section.get("endpoint") {
            let v = v.trim();
            if !v.starts_with("http://") && !v.starts_with("https://") {
                return Err(invalid(
                    "api",
                    "endpoint",
                    v,
                    "must start with http:// or https://",
                ));
            }
            config.api.endpoint = v.to_string();
        }
        if let Some(v) = section.get("user_agent") {
            let v = v.trim();
            if !v.is_empty() {
                config.api.user_agent = v.to_string();
            }
        }
    }

    // [grid] section
    if let Some(section) = ini.section(Some("grid")) {
        if let Some(v) = section.get("tile_width") {
            config.grid.tile_width = parse_positive_degrees("grid", "tile_width", v)?;
        }
        if let Some(v) = section.get("tile_height") {
            config.grid.tile_height = parse_positive_degrees("grid", "tile_height", v)?;
        }
    }

    // [bbox] section
    if let Some(section) = ini.section(Some("bbox")) {
        if let Some(v) = section.get("north") {
            config.bbox.north = parse_degrees("bbox", "north", v)?;
        }
        if let Some(v) = section.get("south") {
            config.bbox.south = parse_degrees("bbox", "south", v)?;
        }
        if let Some(v) = section.get("east") {
            config.bbox.east = parse_degrees("bbox", "east", v)?;
        }
        if let Some(v) = section.get("west") {
            config.bbox.west = parse_degrees("bbox", "west", v)?;
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("timeout") {
            config.download.timeout = v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|t| *t > 0)
                .ok_or_else(|| {
                    invalid(
                        "download",
                        "timeout",
                        v,
                        "must be a positive number of seconds",
                    )
                })?;
        }
        if let Some(v) = section.get("parallel") {
            config.download.parallel = v
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|p| (MIN_PARALLEL_DOWNLOADS..=MAX_PARALLEL_DOWNLOADS).contains(p))
                .ok_or_else(|| {
                    invalid(
                        "download",
                        "parallel",
                        v,
                        &format!(
                            "must be between {} and {}",
                            MIN_PARALLEL_DOWNLOADS, MAX_PARALLEL_DOWNLOADS
                        ),
                    )
                })?;
        }
    }

    // [merge] section
    if let Some(section) = ini.section(Some("merge")) {
        if let Some(v) = section.get("command") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid("merge", "command", v, "must not be empty"));
            }
            config.merge.command = v.to_string();
        }
        if let Some(v) = section.get("output") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid("merge", "output", v, "must not be empty"));
            }
            config.merge.output = v.to_string();
        }
    }

    // [output] section
    if let Some(section) = ini.section(Some("output")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.output.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("keep_tiles") {
            config.output.keep_tiles = parse_bool(v);
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_degrees(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite())
        .ok_or_else(|| invalid(section, key, value, "expected decimal degrees"))
}

fn parse_positive_degrees(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    let degrees = parse_degrees(section, key, value)?;
    if degrees <= 0.0 {
        return Err(invalid(section, key, value, "must be greater than zero"));
    }
    Ok(degrees)
}

/// Parse a boolean value from config.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
