//! View rendering
//!
//! A view is a file-backed page addressed by the normalized request path.
//! [`ViewRenderer`] escapes the data handed to it and asks a [`ViewSource`]
//! to render the shared header, the view body and the shared footer, in that
//! order, all with the same bindings.

use crate::error::Result;
use crate::output::Output;
use serde_json::{Map, Value};
use std::sync::Arc;

/// The three parts rendered for every view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewPart {
    /// Shared header
    Header,
    /// The view's own entry
    Body,
    /// Shared footer
    Footer,
}

impl ViewPart {
    /// Render order
    pub const ORDER: [ViewPart; 3] = [ViewPart::Header, ViewPart::Body, ViewPart::Footer];
}

/// Where views come from
pub trait ViewSource: Send + Sync + 'static {
    /// Check whether a renderable entry exists for `view`
    fn has_view(&self, view: &str) -> bool;

    /// Render one part of `view` into `out`
    fn render(&self, view: &str, part: ViewPart, bindings: &Map<String, Value>, out: &mut Output) -> Result<()>;
}

/// Renders views from a [`ViewSource`] with escaped bindings
#[derive(Clone)]
pub struct ViewRenderer {
    source: Arc<dyn ViewSource>,
}

impl ViewRenderer {
    /// Create a renderer over `source`
    pub fn new(source: Arc<dyn ViewSource>) -> Self {
        Self { source }
    }

    /// Render `view` with `data` into `out`.
    ///
    /// Returns `Ok(false)` without writing anything when the view does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Propagates render failures from the source.
    pub fn render(&self, view: &str, data: &Map<String, Value>, out: &mut Output) -> Result<bool> {
        if !self.source.has_view(view) {
            return Ok(false);
        }

        let bindings: Map<String, Value> = data
            .iter()
            .map(|(key, value)| (key.clone(), escape_value(value)))
            .collect();

        tracing::debug!(view, bindings = bindings.len(), "Rendering view");
        for part in ViewPart::ORDER {
            self.source.render(view, part, &bindings, out)?;
        }
        Ok(true)
    }
}

impl std::fmt::Debug for ViewRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewRenderer").finish_non_exhaustive()
    }
}

/// Escape `& < > " '` for an HTML context
pub fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            _ => output.push(c),
        }
    }
    output
}

/// Escape every string reachable in `value`. Other scalars are left alone.
pub fn escape_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(escape_html(s)),
        Value::Array(items) => Value::Array(items.iter().map(escape_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), escape_value(value)))
                .collect(),
        ),
        other => other.clone(),
    }
}
