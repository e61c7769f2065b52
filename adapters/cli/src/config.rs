use std::{fs, path::Path};

use anyhow::{Context, Result};
use arrehab_core::PlacementConfig;

/// Loads a placement configuration from a TOML or JSON file.
///
/// Files ending in `.toml` are parsed as TOML, anything else as JSON. Fields
/// missing from the file keep their default values.
pub(crate) fn load(path: &Path) -> Result<PlacementConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("toml"));
    let config = if is_toml {
        parse_toml(&raw)
    } else {
        parse_json(&raw)
    };
    config.with_context(|| format!("invalid config file {}", path.display()))
}

fn parse_toml(raw: &str) -> Result<PlacementConfig> {
    let config: PlacementConfig =
        toml::from_str(raw).context("failed to parse config toml contents")?;
    config.validate()?;
    Ok(config)
}

fn parse_json(raw: &str) -> Result<PlacementConfig> {
    let config: PlacementConfig =
        serde_json::from_str(raw).context("failed to parse config json contents")?;
    config.validate()?;
    Ok(config)
}
