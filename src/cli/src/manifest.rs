//! Agent network manifest reader
//!
//! A manifest is a JSON object keyed by network file name:
//!
//! ```json
//! {
//!     "hello_world.hocon": true,
//!     "basic/music_nerd.hocon": { "enabled": true },
//!     "experimental.hocon": false
//! }
//! ```
//!
//! Enabled entries, with the `.hocon`/`.json` extension removed, are the
//! network names, in file order.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

const NETWORK_EXTENSIONS: [&str; 2] = [".hocon", ".json"];

/// Read the enabled network names from a manifest file
pub fn read_network_names(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {:?}", path))?;
    let names = parse_network_names(&content)
        .with_context(|| format!("Failed to parse manifest {:?}", path))?;

    debug!("Manifest {:?} lists {} enabled networks", path, names.len());
    Ok(names)
}

/// Parse manifest content into enabled network names
pub fn parse_network_names(content: &str) -> Result<Vec<String>> {
    let manifest: Value = serde_json::from_str(content)?;
    let Value::Object(entries) = manifest else {
        bail!("Manifest must be a JSON object");
    };

    let mut names = Vec::new();
    for (key, value) in &entries {
        let enabled = match value {
            Value::Bool(enabled) => *enabled,
            Value::Object(settings) => match settings.get("enabled") {
                None => true,
                Some(Value::Bool(enabled)) => *enabled,
                Some(other) => bail!("Entry {:?}: 'enabled' must be a boolean, got {}", key, other),
            },
            other => bail!("Entry {:?}: expected a boolean or an object, got {}", key, other),
        };

        if enabled {
            names.push(network_name(key).to_string());
        }
    }

    Ok(names)
}

fn network_name(key: &str) -> &str {
    NETWORK_EXTENSIONS
        .iter()
        .find_map(|ext| key.strip_suffix(ext))
        .unwrap_or(key)
}
