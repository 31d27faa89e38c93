//! Playground page rendering
//!
//! The template is read once at startup and never mutated; handlers share
//! it behind an `Arc`. Slots are `{{name}}`, `{{input}}` and `{{output}}`,
//! substituted in a single pass so payload text can never be re-expanded.

use crate::error::{PlayError, PlayResult};
use crate::playground::PlaygroundView;
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::debug;

const BUILTIN_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>sqlplay: {{name}}</title>
  <link rel="stylesheet" href="/static/play.css">
</head>
<body>
  <header><h1>{{name}}</h1></header>
  <main id="playground"></main>
  <script id="input" type="application/json">{{input}}</script>
  <script id="output" type="application/json">{{output}}</script>
  <script src="/static/play.js"></script>
</body>
</html>
"#;

/// Immutable rendering context for the playground page
#[derive(Debug, Clone)]
pub struct PlaygroundPage {
    template: String,
}

impl PlaygroundPage {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The page bundled with the binary
    pub fn builtin() -> Self {
        Self::new(BUILTIN_TEMPLATE)
    }

    /// Load a template file, or fall back to the built-in page
    pub async fn load(path: Option<&Path>) -> PlayResult<Self> {
        let Some(path) = path else {
            return Ok(Self::builtin());
        };

        let template = fs::read_to_string(path)
            .await
            .map_err(|e| PlayError::TemplateLoad {
                path: path.to_path_buf(),
                source: e,
            })?;
        debug!("Loaded page template from {}", path.display());
        Ok(Self::new(template))
    }

    /// Render a workspace view
    pub fn render(&self, view: &PlaygroundView) -> PlayResult<String> {
        let name = escape_html(view.fingerprint.as_str());
        let input = script_json(&view.input)?;
        let output = script_json(&view.output)?;

        Ok(fill(&self.template, |slot| match slot {
            "name" => Some(name.as_str()),
            "input" => Some(input.as_str()),
            "output" => Some(output.as_str()),
            _ => None,
        }))
    }
}

/// Serialize to JSON that is safe inside a `<script>` element
///
/// `<`, `>` and `&` only occur inside JSON strings, where the `\uXXXX`
/// form is equivalent. U+2028/U+2029 are escaped for JavaScript parsers.
pub fn script_json<T: Serialize>(value: &T) -> PlayResult<String> {
    let raw = serde_json::to_string(value)?;
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    Ok(out)
}

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Replace `{{slot}}` markers; unknown slots are left as-is
fn fill<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let slot = after[..end].trim();
                match lookup(slot) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{Artifact, BuildResponse};
    use crate::cache::Fingerprint;

    fn view(query: &str) -> PlaygroundView {
        let fingerprint = Fingerprint::compute(b"{}", query.as_bytes());
        PlaygroundView {
            input: BuildResponse {
                sha: fingerprint.to_string(),
                files: vec![Artifact::new("query.sql", query)],
                ..BuildResponse::default()
            },
            output: BuildResponse::default(),
            fingerprint,
        }
    }

    #[test]
    fn script_json_escapes_markup() {
        let json = script_json(&"</script><b>&\u{2028}").unwrap();
        assert_eq!(json, r#""\u003c/script\u003e\u003cb\u003e\u0026\u2028""#);

        let back: String = serde_json::from_str(&json).unwrap();
        assert_eq!(back, "</script><b>&\u{2028}");
    }

    #[test]
    fn escape_html_entities() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&#34;x&#34;&gt;&amp;&#39;");
    }

    #[test]
    fn fill_single_pass() {
        let out = fill("{{ a }}-{{b}}-{{unknown}}-{{open", |slot| match slot {
            "a" => Some("{{b}}"),
            "b" => Some("B"),
            _ => None,
        });
        assert_eq!(out, "{{b}}-B-{{unknown}}-{{open");
    }

    #[test]
    fn render_embeds_payloads() {
        let page = PlaygroundPage::new("{{name}}|{{input}}|{{output}}");
        let view = view("SELECT '</script>';");

        let html = page.render(&view).unwrap();

        assert!(html.starts_with(view.fingerprint.as_str()));
        assert!(!html.contains("</script>"));
        assert!(html.contains("\\u003c/script\\u003e"));
        assert!(html.ends_with(r#""files":[]}"#));
    }

    #[test]
    fn builtin_has_all_slots() {
        let html = PlaygroundPage::builtin().render(&view("SELECT 1;")).unwrap();
        assert!(!html.contains("{{"));
        assert!(html.contains(r#"<script id="input" type="application/json">{"errored":false"#));
    }

    #[tokio::test]
    async fn load_missing_template_fails() {
        let err = PlaygroundPage::load(Some(Path::new("/nonexistent/page.html")))
            .await
            .unwrap_err();
        assert!(matches!(err, PlayError::TemplateLoad { .. }));
    }
}
