// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entity file codec: ordered YAML header, `---` separator, markdown body.
//!
//! The body is preserved byte-for-byte on re-save, which is what keeps
//! `<!-- EXTENSIBLE: Name -->` regions intact.

use edison_core::error::{Error, Result};
use indexmap::IndexMap;
use serde_yaml::Value;

/// A parsed entity file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// Header keys in file order.
    pub header: IndexMap<String, Value>,
    /// Everything below the separator, verbatim.
    pub body: String,
}

impl Document {
    pub fn new(header: IndexMap<String, Value>, body: impl Into<String>) -> Self {
        Self {
            header,
            body: body.into(),
        }
    }

    /// Parse header + body. A leading `---` line is tolerated; the header
    /// ends at the first line consisting of `---`.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rest = text;
        if let Some(stripped) = rest.strip_prefix("---\n") {
            rest = stripped;
        }
        let (header_text, body) = match split_at_separator(rest) {
            Some(parts) => parts,
            None => (rest, ""),
        };
        let header: IndexMap<String, Value> = if header_text.trim().is_empty() {
            IndexMap::new()
        } else {
            serde_yaml::from_str(header_text)
                .map_err(|e| Error::Validation(format!("invalid entity header: {e}")))?
        };
        Ok(Self {
            header,
            body: body.to_string(),
        })
    }

    /// Serialize deterministically: header keys in insertion order, then
    /// the separator, then the body verbatim.
    pub fn serialize(&self) -> Result<String> {
        let mut out = if self.header.is_empty() {
            String::new()
        } else {
            serde_yaml::to_string(&self.header)
                .map_err(|e| Error::Validation(format!("unserializable header: {e}")))?
        };
        out.push_str("---\n");
        out.push_str(&self.body);
        Ok(out)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.header.get(key).and_then(Value::as_str)
    }
}

fn split_at_separator(text: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&text[..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Extract the content of an editable region, excluding its markers.
pub fn extensible_region(body: &str, name: &str) -> Option<String> {
    let open = format!("<!-- EXTENSIBLE: {name} -->");
    let close = format!("<!-- /EXTENSIBLE: {name} -->");
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(body[start..end].to_string())
}

/// Replace the content of an editable region, keeping the markers.
/// Returns `None` when the region is absent.
pub fn replace_extensible_region(body: &str, name: &str, content: &str) -> Option<String> {
    let open = format!("<!-- EXTENSIBLE: {name} -->");
    let close = format!("<!-- /EXTENSIBLE: {name} -->");
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    let mut out = String::with_capacity(body.len());
    out.push_str(&body[..start]);
    out.push_str(content);
    out.push_str(&body[end..]);
    Some(out)
}

#[cfg(test)]
#[path = "frontmatter_tests.rs"]
mod tests;
