//! Loading of garden tuning values and plant catalogs.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use garden_core::{GardenConfig, PlantCatalog};
use log::debug;

/// Plants placed when no catalog file is supplied.
const BUILT_IN_GARDEN: &str = include_str!("../assets/garden.toml");

/// Reads and validates the garden configuration, falling back to defaults.
pub(crate) fn load_config(path: Option<&Path>) -> Result<GardenConfig> {
    let Some(path) = path else {
        return Ok(GardenConfig::default());
    };

    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = parse_config(&source)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    debug!("loaded {config:?} from {}", path.display());
    Ok(config)
}

/// Reads the plant catalog from `path`, or the built-in garden when absent.
pub(crate) fn load_catalog(path: Option<&Path>) -> Result<PlantCatalog> {
    let Some(path) = path else {
        return parse_catalog(BUILT_IN_GARDEN).context("built-in garden is invalid");
    };

    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file {}", path.display()))?;
    parse_catalog(&source).with_context(|| format!("invalid catalog file {}", path.display()))
}

fn parse_config(source: &str) -> Result<GardenConfig> {
    let config: GardenConfig = toml::from_str(source).context("malformed garden config")?;
    config.validate()?;
    Ok(config)
}

fn parse_catalog(source: &str) -> Result<PlantCatalog> {
    toml::from_str(source).context("malformed plant catalog")
}
