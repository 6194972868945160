// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template transformation.
//!
//! Stage order is fixed: includes → sections → config variables → legacy
//! variables → validation. Missing config variables are recorded, never
//! substituted; leftover `{{...}}` tokens become warnings unless they
//! are intentionally-unprocessed section tokens.

use crate::layers::LayerSet;
use edison_core::error::{Error, Result};
use edison_storage::{atomic, ConfigManager};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// The small allow-list of legacy variables.
pub const LEGACY_VARS: [&str; 5] = [
    "source_layers",
    "timestamp",
    "version",
    "template_name",
    "PROJECT_EDISON_DIR",
];

// Allow expect here as the regexes are compile-time verified to be valid
#[allow(clippy::expect_used)]
static INCLUDE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{include:([^}]+)\}\}").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static SECTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{SECTION:([A-Za-z0-9_-]+)\}\}").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static EACH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{#each ([a-zA-Z_][a-zA-Z0-9_.]*)\}\}(.*?)\{\{/each\}\}")
        .expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static CONFIG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{config\.([a-zA-Z_][a-zA-Z0-9_.]*)\}\}").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static ANY_TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^}]*\}\}").expect("constant regex pattern is valid"));

/// Per-file transformation counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOutcome {
    pub content: String,
    pub includes_resolved: u32,
    pub sections_processed: u32,
    pub variables_substituted: u32,
    pub variables_missing: Vec<String>,
    pub warnings: Vec<String>,
}

/// One transformer per composition run.
pub struct Transformer<'a> {
    layers: &'a LayerSet,
    config: &'a ConfigManager,
    legacy: HashMap<String, String>,
    include_depth: u32,
}

impl<'a> Transformer<'a> {
    pub fn new(
        layers: &'a LayerSet,
        config: &'a ConfigManager,
        legacy: HashMap<String, String>,
    ) -> Self {
        let include_depth = config.typed().compose.include_depth;
        Self {
            layers,
            config,
            legacy,
            include_depth,
        }
    }

    /// Run all stages on one file's content.
    pub fn transform(&self, content: &str, supports_sections: bool) -> Result<TransformOutcome> {
        let mut outcome = TransformOutcome::default();

        let mut text = self.resolve_includes(content, 0, &mut outcome)?;
        if supports_sections {
            text = self.apply_sections(&text, &mut outcome)?;
        }
        text = self.substitute_config_vars(&text, &mut outcome);
        text = self.substitute_legacy_vars(&text, &mut outcome);
        self.validate(&text, supports_sections, &mut outcome);

        outcome.content = text;
        Ok(outcome)
    }

    /// Stage 1: `{{include:path}}` resolved recursively with a depth cap.
    fn resolve_includes(
        &self,
        content: &str,
        depth: u32,
        outcome: &mut TransformOutcome,
    ) -> Result<String> {
        if depth >= self.include_depth {
            if INCLUDE_PATTERN.is_match(content) {
                outcome
                    .warnings
                    .push(format!("include depth cap ({}) reached", self.include_depth));
            }
            return Ok(content.to_string());
        }
        let mut result = String::with_capacity(content.len());
        let mut last_end = 0;
        for captures in INCLUDE_PATTERN.captures_iter(content) {
            let whole = captures.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
            let target = captures[1].trim().to_string();
            result.push_str(&content[last_end..whole.0]);
            match self.layers.resolve_include(&target) {
                Some(path) => {
                    let included = atomic::read_text(&path)?;
                    let nested = self.resolve_includes(&included, depth + 1, outcome)?;
                    outcome.includes_resolved += 1;
                    result.push_str(&nested);
                }
                None => {
                    outcome
                        .warnings
                        .push(format!("unresolved include: {target}"));
                    result.push_str(&content[whole.0..whole.1]);
                }
            }
            last_end = whole.1;
        }
        result.push_str(&content[last_end..]);
        Ok(result)
    }

    /// Stage 2: `{{SECTION:Name}}` pulls `sections/Name.md` through the
    /// layer set; `{{#each a.b}}...{{/each}}` repeats the body per entry
    /// of the config sequence, substituting `{{this}}`.
    fn apply_sections(&self, content: &str, outcome: &mut TransformOutcome) -> Result<String> {
        let mut text = String::with_capacity(content.len());
        let mut last_end = 0;
        for captures in SECTION_PATTERN.captures_iter(content) {
            let whole = captures.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
            let name = &captures[1];
            text.push_str(&content[last_end..whole.0]);
            match self.layers.resolve_include(&format!("sections/{name}.md")) {
                Some(path) => {
                    text.push_str(atomic::read_text(&path)?.trim_end());
                    outcome.sections_processed += 1;
                }
                None => {
                    outcome
                        .warnings
                        .push(format!("unresolved section: {name}"));
                    text.push_str(&content[whole.0..whole.1]);
                }
            }
            last_end = whole.1;
        }
        text.push_str(&content[last_end..]);

        let mut looped = String::with_capacity(text.len());
        let mut last_end = 0;
        for captures in EACH_PATTERN.captures_iter(&text) {
            let whole = captures.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
            let collection = &captures[1];
            let body = &captures[2];
            looped.push_str(&text[last_end..whole.0]);
            match self.config.lookup(collection).and_then(|v| v.as_sequence()) {
                Some(items) => {
                    for item in items {
                        let rendered = match item {
                            serde_yaml::Value::String(s) => s.clone(),
                            other => serde_yaml::to_string(other)
                                .map_err(|e| Error::Config(e.to_string()))?
                                .trim_end()
                                .to_string(),
                        };
                        looped.push_str(&body.replace("{{this}}", &rendered));
                    }
                    outcome.sections_processed += 1;
                }
                None => {
                    outcome
                        .warnings
                        .push(format!("unresolved loop collection: {collection}"));
                    looped.push_str(&text[whole.0..whole.1]);
                }
            }
            last_end = whole.1;
        }
        looped.push_str(&text[last_end..]);
        Ok(looped)
    }

    /// Stage 3: `{{config.a.b.c}}` via the config manager's dotted
    /// lookup. Missing variables are recorded, not substituted.
    fn substitute_config_vars(&self, content: &str, outcome: &mut TransformOutcome) -> String {
        let missing = &mut outcome.variables_missing;
        let substituted = &mut outcome.variables_substituted;
        CONFIG_PATTERN
            .replace_all(content, |captures: &regex::Captures| {
                let dotted = &captures[1];
                match self.config.lookup_string(dotted) {
                    Some(value) => {
                        *substituted += 1;
                        value
                    }
                    None => {
                        let token = format!("config.{dotted}");
                        if !missing.contains(&token) {
                            missing.push(token);
                        }
                        captures[0].to_string()
                    }
                }
            })
            .into_owned()
    }

    /// Stage 4: the legacy variable allow-list from the context map.
    fn substitute_legacy_vars(&self, content: &str, outcome: &mut TransformOutcome) -> String {
        let mut text = content.to_string();
        for name in LEGACY_VARS {
            let token = format!("{{{{{name}}}}}");
            if !text.contains(token.as_str()) {
                continue;
            }
            match self.legacy.get(name) {
                Some(value) => {
                    let count = text.matches(token.as_str()).count() as u32;
                    text = text.replace(token.as_str(), value);
                    outcome.variables_substituted += count;
                }
                None => {
                    if !outcome.variables_missing.contains(&name.to_string()) {
                        outcome.variables_missing.push(name.to_string());
                    }
                }
            }
        }
        text
    }

    /// Stage 5: any remaining `{{...}}` is a warning, except section and
    /// loop tokens on content types that do not process sections.
    fn validate(&self, content: &str, supports_sections: bool, outcome: &mut TransformOutcome) {
        for token in ANY_TOKEN_PATTERN.find_iter(content) {
            let text = token.as_str();
            let is_section_token = SECTION_PATTERN.is_match(text)
                || text.starts_with("{{#each")
                || text == "{{/each}}"
                || text == "{{this}}";
            if is_section_token && !supports_sections {
                continue;
            }
            outcome.warnings.push(format!("unresolved token: {text}"));
        }
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
