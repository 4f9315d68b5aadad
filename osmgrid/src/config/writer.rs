//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let keep_tiles = if config.output.keep_tiles {
        "true"
    } else {
        "false"
    };

    format!(
        r#"[api]
; Map API endpoint. Each tile is requested as <endpoint>?bbox=west,south,east,north
endpoint = {}
; User-Agent sent with every request (the public API requires one)
user_agent = {}

[grid]
; Tile size in decimal degrees. Smaller tiles keep each request under the
; server's node limit.
tile_width = {}
tile_height = {}

[bbox]
; Default area to extract, in decimal degrees
north = {}
south = {}
east = {}
west = {}

[download]
; Timeout in seconds for a single tile fetch
timeout = {}
; Number of tiles fetched at once (1-64)
parallel = {}

[merge]
; Program used to merge tile files: <command> <tiles...> -o=<output>
command = {}
; Merged output filename, written inside the output directory
output = {}

[output]
; Directory receiving tile files and the merged output
directory = {}
; Keep tile files after merging (true/false)
keep_tiles = {}

[logging]
; Log file location
file = {}
"#,
        config.api.endpoint,
        config.api.user_agent,
        config.grid.tile_width,
        config.grid.tile_height,
        config.bbox.north,
        config.bbox.south,
        config.bbox.east,
        config.bbox.west,
        config.download.timeout,
        config.download.parallel,
        config.merge.command,
        config.merge.output,
        path_to_string(&config.output.directory),
        keep_tiles,
        path_to_string(&config.logging.file),
    )
}

/// Render a path, shortening the home directory to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
