// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The composition pipeline: one deterministic pass producing every
//! generated artifact under `.edison/_generated/`.
//!
//! JSON sources bypass the template stages and are copied atomically.

use crate::layers::{collect_entities, ContentType, LayerSet};
use crate::report::ComposeReport;
use crate::template::Transformer;
use edison_core::cancel::CancelToken;
use edison_core::clock::Clock;
use edison_core::error::Result;
use edison_storage::{atomic, ConfigManager, Layout};
use std::collections::HashMap;
use tracing::info;

/// Composition over a repository.
pub struct ComposePipeline<'a> {
    layout: &'a Layout,
    config: &'a ConfigManager,
    clock: &'a dyn Clock,
    version: &'a str,
}

impl<'a> ComposePipeline<'a> {
    pub fn new(
        layout: &'a Layout,
        config: &'a ConfigManager,
        clock: &'a dyn Clock,
        version: &'a str,
    ) -> Self {
        Self {
            layout,
            config,
            clock,
            version,
        }
    }

    /// Compose every content type.
    pub fn compose_all(&self, cancel: &CancelToken) -> Result<ComposeReport> {
        let mut report = ComposeReport::default();
        for content_type in ContentType::ALL {
            cancel.check()?;
            report.merge(self.compose_type(content_type, cancel)?);
        }
        info!(
            files = report.files_written,
            warnings = report.warnings.len(),
            errors = report.errors.len(),
            "composition finished"
        );
        Ok(report)
    }

    /// Compose one content type into `.edison/_generated/<type>/`.
    pub fn compose_type(
        &self,
        content_type: ContentType,
        cancel: &CancelToken,
    ) -> Result<ComposeReport> {
        let mut report = ComposeReport::default();
        let layers = LayerSet::discover(self.layout, self.config.typed());
        let entities = match collect_entities(self.layout, self.config.typed(), content_type) {
            Ok(entities) => entities,
            Err(e) => {
                report.errors.push(e.to_string());
                return Ok(report);
            }
        };

        for entity in entities {
            cancel.check()?;
            let source = match atomic::read_text(&entity.source) {
                Ok(source) => source,
                Err(e) => {
                    report
                        .errors
                        .push(format!("{}: unreadable source: {e}", entity.key));
                    continue;
                }
            };

            let is_json = entity
                .source
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("json"))
                .unwrap_or(false);
            let target = self
                .layout
                .generated_dir()
                .join(&entity.key)
                .with_extension(if is_json { "json" } else { "md" });

            if is_json {
                // JSON outputs bypass the template stages entirely.
                if let Err(e) = atomic::write_text(&target, &source) {
                    report.errors.push(format!("{}: {e}", entity.key));
                } else {
                    report.files_written += 1;
                }
                continue;
            }

            let transformer =
                Transformer::new(&layers, self.config, self.legacy_vars(&layers, &entity.key));
            match transformer.transform(&source, content_type.supports_sections()) {
                Ok(outcome) => {
                    if let Err(e) = atomic::write_text(&target, &outcome.content) {
                        report.errors.push(format!("{}: {e}", entity.key));
                        continue;
                    }
                    report.absorb(&entity.key, &outcome);
                }
                Err(e) => report.errors.push(format!("{}: {e}", entity.key)),
            }
        }
        Ok(report)
    }

    fn legacy_vars(&self, layers: &LayerSet, template_name: &str) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("source_layers".to_string(), layers.source_names());
        vars.insert(
            "timestamp".to_string(),
            self.clock.now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        );
        vars.insert("version".to_string(), self.version.to_string());
        vars.insert("template_name".to_string(), template_name.to_string());
        vars.insert(
            "PROJECT_EDISON_DIR".to_string(),
            self.layout.edison_dir().to_string_lossy().into_owned(),
        );
        vars
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
