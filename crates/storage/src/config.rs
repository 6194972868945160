// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration loading.
//!
//! `.edison/config/*.yaml` files are deep-merged in file-name order, then
//! `EDISON_*` environment overrides are applied (`__` separates dotted
//! segments), and the result is deserialized into the strict typed tree.
//! The merged view also serves dotted `{{config.a.b.c}}` lookups for the
//! composition pipeline.

use crate::paths::Layout;
use edison_core::config::EdisonConfig;
use edison_core::error::{Error, Result};
use serde_yaml::Value;
use tracing::debug;

/// Environment variable prefix for config overrides.
const ENV_PREFIX: &str = "EDISON_";

/// Loaded, merged, and typed configuration.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    typed: EdisonConfig,
    /// Typed tree re-serialized, so lookups observe defaults.
    merged: Value,
}

impl ConfigManager {
    /// Load configuration for a repository, applying overrides from
    /// `vars` (pass `std::env::vars()` in production).
    pub fn load_with_env(
        layout: &Layout,
        vars: impl Iterator<Item = (String, String)>,
    ) -> Result<Self> {
        let mut merged = Value::Null;
        let config_dir = layout.config_dir();
        if config_dir.is_dir() {
            let mut files: Vec<_> = std::fs::read_dir(&config_dir)
                .map_err(|e| Error::io(&config_dir, e))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| {
                    matches!(
                        p.extension().and_then(|e| e.to_str()),
                        Some("yaml") | Some("yml")
                    )
                })
                .collect();
            files.sort();
            for file in files {
                let text = crate::atomic::read_text(&file)?;
                let value: Value = serde_yaml::from_str(&text).map_err(|e| {
                    Error::Config(format!("invalid yaml in {}: {e}", file.display()))
                })?;
                deep_merge(&mut merged, value);
                debug!(file = %file.display(), "merged config file");
            }
        }

        for (key, raw) in vars {
            let Some(rest) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            // Only double-underscore keys are config paths; everything
            // else (EDISON_LOG, EDISON_ACTOR_KIND, ...) is out of band.
            if !rest.contains("__") {
                continue;
            }
            let path: Vec<String> = rest.split("__").map(|s| s.to_lowercase()).collect();
            override_path(&mut merged, &path, scalar_from_str(&raw));
        }

        Self::from_value(merged)
    }

    /// Build from an already-merged value (tests, embedded defaults).
    pub fn from_value(merged: Value) -> Result<Self> {
        let typed = if merged.is_null() {
            EdisonConfig::default()
        } else {
            EdisonConfig::from_value(merged)?
        };
        let merged = serde_yaml::to_value(&typed).map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self { typed, merged })
    }

    pub fn typed(&self) -> &EdisonConfig {
        &self.typed
    }

    /// Dotted lookup over the merged tree (`session.recovery.block_on_stale`).
    pub fn lookup(&self, dotted: &str) -> Option<&Value> {
        let mut current = &self.merged;
        for segment in dotted.split('.') {
            current = current.get(segment)?;
        }
        Some(current)
    }

    /// Dotted lookup rendered as a substitutable string; mappings and
    /// sequences are not substitutable.
    pub fn lookup_string(&self, dotted: &str) -> Option<String> {
        match self.lookup(dotted)? {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Recursively merge `overlay` into `base`. Mappings merge key-wise;
/// everything else is replaced.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base_slot, overlay) => *base_slot = overlay,
    }
}

fn override_path(root: &mut Value, path: &[String], value: Value) {
    let mut overlay = value;
    for segment in path.iter().rev() {
        let mut mapping = serde_yaml::Mapping::new();
        mapping.insert(Value::String(segment.clone()), overlay);
        overlay = Value::Mapping(mapping);
    }
    deep_merge(root, overlay);
}

/// Parse an env value the way YAML would read a scalar.
fn scalar_from_str(raw: &str) -> Value {
    serde_yaml::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
