// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use edison_core::config::VendorExport;

struct Fixture {
    _dir: tempfile::TempDir,
    layout: Layout,
    config: EdisonConfig,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".edison")).unwrap();
        Self {
            layout: Layout::discover(dir.path()).unwrap(),
            _dir: dir,
            config: EdisonConfig::default(),
        }
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.layout.root().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}

#[test]
fn layer_order_is_core_vendors_packs_project() {
    let mut fx = Fixture::new();
    fx.config.compose.active_packs = vec!["alpha".to_string(), "beta".to_string()];
    fx.config.vendors.exports = vec![VendorExport {
        vendor: "catalog".to_string(),
        source_path: "skills/tdd.md".to_string(),
        content_type: "skills".to_string(),
        name: "tdd".to_string(),
        allow_shadowing: false,
    }];
    let set = LayerSet::discover(&fx.layout, &fx.config);
    assert_eq!(
        set.source_names(),
        "core,vendor:catalog,pack:alpha,pack:beta,project"
    );
}

#[test]
fn include_resolution_prefers_project_then_packs_reversed() {
    let mut fx = Fixture::new();
    fx.config.compose.active_packs = vec!["alpha".to_string(), "beta".to_string()];
    fx.write(".edison/core/shared/header.md", "core");
    fx.write(".edison/packs/alpha/shared/header.md", "alpha");
    fx.write(".edison/packs/beta/shared/header.md", "beta");

    let set = LayerSet::discover(&fx.layout, &fx.config);
    let resolved = set.resolve_include("shared/header.md").unwrap();
    // Later packs win over earlier packs; core loses to both.
    assert!(resolved.ends_with("packs/beta/shared/header.md"));

    fx.write(".edison/overlays/shared/header.md", "project");
    let resolved = set.resolve_include("shared/header.md").unwrap();
    assert!(resolved.ends_with("overlays/shared/header.md"));
}

#[test]
fn missing_include_resolves_to_none() {
    let fx = Fixture::new();
    let set = LayerSet::discover(&fx.layout, &fx.config);
    assert!(set.resolve_include("nope.md").is_none());
}

#[test]
fn entity_discovery_shadows_in_priority_order() {
    let mut fx = Fixture::new();
    fx.config.compose.active_packs = vec!["alpha".to_string()];
    fx.write(".edison/core/agents/reviewer.md", "core reviewer");
    fx.write(".edison/packs/alpha/agents/reviewer.md", "pack reviewer");
    fx.write(".edison/core/agents/planner.md", "planner");

    let entities = collect_entities(&fx.layout, &fx.config, ContentType::Agents).unwrap();
    assert_eq!(entities.len(), 2);
    let reviewer = entities
        .iter()
        .find(|e| e.key == "agents/reviewer")
        .unwrap();
    assert_eq!(reviewer.layer, LayerKind::Pack("alpha".to_string()));
    assert!(entities.iter().any(|e| e.key == "agents/planner"));
}

#[test]
fn vendor_export_without_collision_is_added() {
    let mut fx = Fixture::new();
    fx.config.vendors.exports = vec![VendorExport {
        vendor: "catalog".to_string(),
        source_path: "testing/tdd.md".to_string(),
        content_type: "skills".to_string(),
        name: "testing/tdd".to_string(),
        allow_shadowing: false,
    }];
    let entities = collect_entities(&fx.layout, &fx.config, ContentType::Skills).unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].key, "skills/testing/tdd");
    assert_eq!(entities[0].layer, LayerKind::Vendor("catalog".to_string()));
}

#[test]
fn vendor_collision_without_opt_in_fails_naming_key_and_flag() {
    let mut fx = Fixture::new();
    fx.write(".edison/core/skills/testing/tdd.md", "core tdd");
    fx.config.vendors.exports = vec![VendorExport {
        vendor: "catalog".to_string(),
        source_path: "testing/tdd.md".to_string(),
        content_type: "skills".to_string(),
        name: "testing/tdd".to_string(),
        allow_shadowing: false,
    }];
    let err = collect_entities(&fx.layout, &fx.config, ContentType::Skills).unwrap_err();
    assert_eq!(err.code(), "config_error");
    let text = err.to_string();
    assert!(text.contains("skills/testing/tdd"));
    assert!(text.contains("allow_shadowing"));
}

#[test]
fn vendor_collision_with_opt_in_shadows() {
    let mut fx = Fixture::new();
    fx.write(".edison/core/skills/testing/tdd.md", "core tdd");
    fx.config.vendors.exports = vec![VendorExport {
        vendor: "catalog".to_string(),
        source_path: "testing/tdd.md".to_string(),
        content_type: "skills".to_string(),
        name: "testing/tdd".to_string(),
        allow_shadowing: true,
    }];
    let entities = collect_entities(&fx.layout, &fx.config, ContentType::Skills).unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].layer, LayerKind::Vendor("catalog".to_string()));
}

#[test]
fn section_support_by_type() {
    assert!(ContentType::Agents.supports_sections());
    assert!(ContentType::Validators.supports_sections());
    assert!(ContentType::Constitutions.supports_sections());
    assert!(!ContentType::Prompts.supports_sections());
    assert!(!ContentType::Skills.supports_sections());
}
