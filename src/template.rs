//! `{path}` placeholder substitution for template properties.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::path;
use crate::types::EvaluationContext;

/// A single-level `{...}` placeholder. Nested or empty braces never match and
/// pass through verbatim.
const PLACEHOLDER_PATTERN: &str = r"\{([^{}]+)\}";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("valid regex"));

/// Strip the optional `data.` prefix from a placeholder body.
fn placeholder_path(body: &str) -> &str {
    let body = body.trim();
    body.strip_prefix("data.").unwrap_or(body)
}

/// Render `template` against `ctx.data`.
///
/// Each `{path}` (or `{data.path}`) is replaced by the string form of the
/// value at that path, or by nothing when the path is absent. Text outside
/// placeholders is copied unchanged.
#[must_use]
pub fn render(template: &str, ctx: &EvaluationContext) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            path::get(ctx.data(), placeholder_path(&caps[1]))
                .map(ToString::to_string)
                .unwrap_or_default()
        })
        .into_owned()
}

/// Data paths referenced by the placeholders of `template`.
pub(crate) fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER_RE
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| placeholder_path(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    #[test]
    fn missing_value_renders_empty() {
        let ctx = EvaluationContext::new().set("first", "Jane");
        assert_eq!(render("{data.first} {data.last}", &ctx), "Jane ");
    }

    #[test]
    fn prefix_is_optional() {
        let ctx = EvaluationContext::new().set("address.city", "Oslo");
        assert_eq!(render("City: {address.city}", &ctx), "City: Oslo");
    }

    #[test]
    fn non_string_values() {
        let ctx = EvaluationContext::new()
            .set("n", 3_i64)
            .set("ok", true)
            .set("none", Value::Null)
            .set("list", vec!["a", "b"]);
        assert_eq!(render("{n}|{ok}|{none}|{list}", &ctx), "3|true|null|a,b");
    }

    #[test]
    fn malformed_placeholders_pass_through() {
        let ctx = EvaluationContext::new().set("a", "x");
        assert_eq!(render("{ {} {a", &ctx), "{ {} {a");
        assert_eq!(render("no placeholders", &ctx), "no placeholders");
    }

    #[test]
    fn placeholder_paths() {
        let paths: Vec<&str> = placeholders("{data.a.b} and {c}").collect();
        assert_eq!(paths, vec!["a.b", "c"]);
    }
}
