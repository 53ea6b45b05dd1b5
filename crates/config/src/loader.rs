//! Configuration loading: defaults, optional JSON file, then environment

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::{AppConfig, GridConfig};

/// Environment variable naming an optional JSON config file
pub const CONFIG_FILE_ENV: &str = "SIGNBOARD_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Load the application configuration from the process environment
pub fn load() -> Result<AppConfig, ConfigError> {
    let mut config = match std::env::var(CONFIG_FILE_ENV) {
        Ok(path) => from_file(Path::new(&path))?,
        Err(_) => AppConfig::default(),
    };
    apply_env(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;

    info!(
        "Board {}x{} cells of {}x{} px, {} placement, tiles {} px",
        config.board.grid.cols,
        config.board.grid.rows,
        config.board.grid.cell_width,
        config.board.grid.cell_height,
        config.board.placement,
        config.board.tiles.tile_size
    );
    Ok(config)
}

/// Read a JSON config file; missing keys fall back to defaults
pub fn from_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: display,
        source,
    })
}

/// Apply `SIGNBOARD_*` overrides using the given variable lookup
pub fn apply_env<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("SIGNBOARD_HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("SIGNBOARD_PORT") {
        config.server.port = parse("SIGNBOARD_PORT", &port)?;
    }
    if let Some(store) = lookup("SIGNBOARD_STORE") {
        // An empty value selects the in-memory store
        config.server.store_path = (!store.is_empty()).then_some(store);
    }
    if let Some(seed) = lookup("SIGNBOARD_SEED") {
        config.server.seed_examples = matches!(seed.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
    }

    // Viewport sizing first so explicit cols/rows win
    if let Some(viewport) = lookup("SIGNBOARD_VIEWPORT") {
        let (width, height) = parse_viewport(&viewport)?;
        let sized = GridConfig::for_viewport(width, height);
        config.board.grid.cols = sized.cols;
        config.board.grid.rows = sized.rows;
    }
    if let Some(cols) = lookup("SIGNBOARD_COLS") {
        config.board.grid.cols = parse("SIGNBOARD_COLS", &cols)?;
    }
    if let Some(rows) = lookup("SIGNBOARD_ROWS") {
        config.board.grid.rows = parse("SIGNBOARD_ROWS", &rows)?;
    }
    if let Some(placement) = lookup("SIGNBOARD_PLACEMENT") {
        config.board.placement = placement.parse()?;
    }
    if let Some(tile_size) = lookup("SIGNBOARD_TILE_SIZE") {
        config.board.tiles.tile_size = parse("SIGNBOARD_TILE_SIZE", &tile_size)?;
    }
    Ok(())
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

/// Parse a `WIDTHxHEIGHT` viewport string
fn parse_viewport(value: &str) -> Result<(u32, u32), ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "SIGNBOARD_VIEWPORT",
        value: value.to_string(),
    };
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(invalid)?;
    let width = width.trim().parse().map_err(|_| invalid())?;
    let height = height.trim().parse().map_err(|_| invalid())?;
    Ok((width, height))
}
