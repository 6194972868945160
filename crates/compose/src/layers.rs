// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered content discovery.
//!
//! Precedence, increasing: core < vendor exports < active packs (in
//! declared order) < project overlays. Vendor roots contribute only
//! exported entities; a mount alone produces nothing. A vendor export
//! that collides with an existing key fails the run unless the export
//! sets `allow_shadowing`.

use edison_core::config::EdisonConfig;
use edison_core::error::{Error, Result};
use edison_storage::Layout;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Content types produced by composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Agents,
    Validators,
    Constitutions,
    Prompts,
    Skills,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Agents,
        ContentType::Validators,
        ContentType::Constitutions,
        ContentType::Prompts,
        ContentType::Skills,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            ContentType::Agents => "agents",
            ContentType::Validators => "validators",
            ContentType::Constitutions => "constitutions",
            ContentType::Prompts => "prompts",
            ContentType::Skills => "skills",
        }
    }

    /// Section and loop tokens apply only to these types.
    pub fn supports_sections(&self) -> bool {
        matches!(
            self,
            ContentType::Agents | ContentType::Validators | ContentType::Constitutions
        )
    }
}

impl std::str::FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "agents" => Ok(ContentType::Agents),
            "validators" => Ok(ContentType::Validators),
            "constitutions" => Ok(ContentType::Constitutions),
            "prompts" => Ok(ContentType::Prompts),
            "skills" => Ok(ContentType::Skills),
            other => Err(Error::Validation(format!("unknown content type: {other}"))),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Identity of a discovery layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerKind {
    Core,
    Vendor(String),
    Pack(String),
    Project,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::Core => f.write_str("core"),
            LayerKind::Vendor(name) => write!(f, "vendor:{name}"),
            LayerKind::Pack(name) => write!(f, "pack:{name}"),
            LayerKind::Project => f.write_str("project"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub kind: LayerKind,
    pub root: PathBuf,
}

/// Ordered layers used for include resolution and entity discovery.
#[derive(Debug, Clone)]
pub struct LayerSet {
    /// Increasing priority.
    layers: Vec<Layer>,
}

impl LayerSet {
    /// Assemble layers for a repository. Vendor layers are listed for
    /// include-resolution fallback only.
    pub fn discover(layout: &Layout, config: &EdisonConfig) -> Self {
        let mut layers = vec![Layer {
            kind: LayerKind::Core,
            root: layout.core_dir(),
        }];
        let mut vendors: Vec<&str> = config
            .vendors
            .exports
            .iter()
            .map(|e| e.vendor.as_str())
            .collect();
        vendors.dedup();
        for vendor in vendors {
            layers.push(Layer {
                kind: LayerKind::Vendor(vendor.to_string()),
                root: layout.vendor_worktree(vendor),
            });
        }
        for pack in &config.compose.active_packs {
            layers.push(Layer {
                kind: LayerKind::Pack(pack.clone()),
                root: layout.pack_dir(pack),
            });
        }
        layers.push(Layer {
            kind: LayerKind::Project,
            root: layout.overlays_dir(),
        });
        Self { layers }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Resolve a relative path for `{{include:...}}`: project overlay
    /// first, then packs in reverse declared order, then core, then
    /// vendor roots. First match wins.
    pub fn resolve_include(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        let project = self.layers.iter().filter(|l| l.kind == LayerKind::Project);
        let packs = self
            .layers
            .iter()
            .filter(|l| matches!(l.kind, LayerKind::Pack(_)))
            .rev();
        let core = self.layers.iter().filter(|l| l.kind == LayerKind::Core);
        let vendors = self
            .layers
            .iter()
            .filter(|l| matches!(l.kind, LayerKind::Vendor(_)));
        for layer in project.chain(packs).chain(core).chain(vendors) {
            let candidate = layer.root.join(relative);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    /// Layer names, low to high priority (the `source_layers` variable).
    pub fn source_names(&self) -> String {
        self.layers
            .iter()
            .map(|l| l.kind.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One discoverable entity: a key like `agents/reviewer` plus the source
/// file that currently provides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeEntity {
    pub content_type: ContentType,
    /// `<type>/<relative-name-without-extension>`.
    pub key: String,
    pub source: PathBuf,
    pub layer: LayerKind,
}

/// Discover all entities of a type across layers.
///
/// Core, packs, and the project overlay shadow freely in priority order
/// (that is the overlay model); vendor exports are additive and must opt
/// in to shadowing explicitly.
pub fn collect_entities(
    layout: &Layout,
    config: &EdisonConfig,
    content_type: ContentType,
) -> Result<Vec<ComposeEntity>> {
    let mut entities: BTreeMap<String, ComposeEntity> = BTreeMap::new();

    let mut overlay_layers = vec![(LayerKind::Core, layout.core_dir())];
    for pack in &config.compose.active_packs {
        overlay_layers.push((LayerKind::Pack(pack.clone()), layout.pack_dir(pack)));
    }
    overlay_layers.push((LayerKind::Project, layout.overlays_dir()));

    for (kind, root) in overlay_layers {
        let type_dir = root.join(content_type.dir_name());
        if !type_dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&type_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                Error::Config(format!("cannot walk {}: {e}", type_dir.display()))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&type_dir)
                .map_err(|e| Error::Config(e.to_string()))?;
            let key = entity_key(content_type, relative);
            debug!(key = %key, layer = %kind, "discovered compose entity");
            entities.insert(
                key.clone(),
                ComposeEntity {
                    content_type,
                    key,
                    source: entry.path().to_path_buf(),
                    layer: kind.clone(),
                },
            );
        }
    }

    for export in &config.vendors.exports {
        if export.content_type != content_type.dir_name() {
            continue;
        }
        let key = format!("{}/{}", content_type.dir_name(), export.name);
        if entities.contains_key(&key) && !export.allow_shadowing {
            return Err(Error::Config(format!(
                "vendor export {key} from {} collides with an existing entity; \
                 set allow_shadowing: true on the export to permit it",
                export.vendor
            )));
        }
        let source = layout
            .vendor_worktree(&export.vendor)
            .join(&export.source_path);
        entities.insert(
            key.clone(),
            ComposeEntity {
                content_type,
                key,
                source,
                layer: LayerKind::Vendor(export.vendor.clone()),
            },
        );
    }

    Ok(entities.into_values().collect())
}

fn entity_key(content_type: ContentType, relative: &Path) -> String {
    let without_ext = relative.with_extension("");
    format!(
        "{}/{}",
        content_type.dir_name(),
        without_ext.to_string_lossy().replace('\\', "/")
    )
}

#[cfg(test)]
#[path = "layers_tests.rs"]
mod tests;
