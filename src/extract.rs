//! Dependent-field extraction.
//!
//! The result is a conservative superset of the data keys a component's rules
//! read: hosts skip re-evaluation when none of them changed, so a missing key
//! is a bug while an extra key only costs a redundant pass. Reads that no key
//! set can describe (the whole `data` object, a computed `data[key]`, an
//! opaque registered function) are flagged instead; see
//! [`CompiledDependencies::reads_all_data`].

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::compile::Compiler;
use crate::config::EngineConfig;
use crate::template;
use crate::types::rule::{
    CompiledCondition, CompiledConditionKind, CompiledProperty, CompiledPropertyKind,
    CompiledRule,
};
use crate::types::{CompiledDependencies, ComponentDependencies, Expr, FunctionRegistry};

/// Fallback scan for rule sources that did not compile.
static DATA_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:data|rootData)\.([A-Za-z_$][A-Za-z0-9_$]*)").expect("valid regex")
});

/// Data keys read by a component's rules.
///
/// Includes every `fieldValue` field, every static `data.` / `rootData.` path
/// in expression and function bodies (both the root key and the full path),
/// every template placeholder, every `resetOn` entry and every filter
/// `sourceField`. Sources over the default length or nesting limits are
/// scanned for `data.key` references instead of parsed.
///
/// A rule that reads `data` as a whole, such as `Boolean(data)` or
/// `data[data.key]`, adds no key for that read. Compile the component and
/// check [`CompiledDependencies::reads_all_data`] to detect it.
#[must_use]
pub fn extract_dependent_fields(deps: &ComponentDependencies) -> BTreeSet<String> {
    let registry = FunctionRegistry::new();
    Compiler::new(&registry, &EngineConfig::default())
        .dependencies(deps)
        .dependent_fields()
        .clone()
}

/// What a component's rules read.
#[derive(Debug, Default)]
pub(crate) struct Reads {
    pub(crate) fields: BTreeSet<String>,
    pub(crate) all: bool,
}

impl Reads {
    /// Record `path` and its root segment.
    fn insert_path(&mut self, path: &str) {
        if path.is_empty() {
            return;
        }
        if let Some((root, _)) = path.split_once('.') {
            self.fields.insert(root.to_owned());
        }
        self.fields.insert(path.to_owned());
    }
}

pub(crate) fn collect(deps: &CompiledDependencies) -> Reads {
    let mut reads = Reads::default();

    for condition in [&deps.disabled, &deps.enabled, &deps.visible, &deps.required]
        .into_iter()
        .flatten()
    {
        condition_fields(condition, &mut reads);
    }
    for property in [&deps.label, &deps.placeholder, &deps.value, &deps.options]
        .into_iter()
        .flatten()
    {
        property_fields(property, &mut reads);
    }
    for filter in deps.filter_by.iter().flatten() {
        reads.fields.insert(filter.source_field.clone());
        if let Some(transform) = &filter.transform {
            rule_fields(transform, &mut reads);
        }
    }
    reads.fields.extend(deps.reset_on.iter().cloned());
    reads
}

fn condition_fields(condition: &CompiledCondition, out: &mut Reads) {
    match &condition.kind {
        CompiledConditionKind::FieldValue { field, .. } => {
            out.fields.insert(field.clone());
        }
        CompiledConditionKind::Rule(rule) => rule_fields(rule, out),
    }
}

fn property_fields(property: &CompiledProperty, out: &mut Reads) {
    match &property.kind {
        CompiledPropertyKind::Template(source) => {
            for path in template::placeholders(source) {
                out.insert_path(path);
            }
        }
        CompiledPropertyKind::Rule(rule) => rule_fields(rule, out),
    }
}

fn rule_fields(rule: &CompiledRule, out: &mut Reads) {
    match rule {
        CompiledRule::Expr(expr) => expr_fields(expr, out),
        CompiledRule::Function(f) => match &f.reads {
            Some(reads) => {
                for path in reads {
                    out.insert_path(path);
                }
            }
            None => out.all = true,
        },
        CompiledRule::Broken { source, .. } => {
            for caps in DATA_REF_RE.captures_iter(source) {
                out.fields.insert(caps[1].to_owned());
            }
        }
    }
}

fn expr_fields(expr: &Expr, out: &mut Reads) {
    if let Some(("data" | "rootData", segments)) = expr.static_path()
        && !segments.is_empty()
    {
        out.insert_path(&segments.join("."));
        return;
    }

    match expr {
        Expr::Ident(name) => {
            if matches!(name.as_str(), "data" | "rootData") {
                out.all = true;
            }
        }
        Expr::Literal(_) | Expr::Undefined => {}
        Expr::Array(items) | Expr::Call { args: items, .. } => {
            for item in items {
                expr_fields(item, out);
            }
        }
        Expr::Member { object, .. } => expr_fields(object, out),
        Expr::Index { object, index } => {
            expr_fields(object, out);
            expr_fields(index, out);
        }
        Expr::Method { receiver, args, .. } => {
            expr_fields(receiver, out);
            for arg in args {
                expr_fields(arg, out);
            }
        }
        Expr::Unary { operand, .. } => expr_fields(operand, out),
        Expr::Binary { left, right, .. } => {
            expr_fields(left, out);
            expr_fields(right, out);
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            expr_fields(test, out);
            expr_fields(consequent, out);
            expr_fields(alternate, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_SOURCE_LEN;
    use crate::types::{
        ComputedProperty, DependencyCondition, FilterBy, FilterDependency, Operator,
    };

    fn fields(deps: &ComponentDependencies) -> Vec<String> {
        extract_dependent_fields(deps).into_iter().collect()
    }

    #[test]
    fn expression_roots_and_paths() {
        let deps = ComponentDependencies {
            visible: Some(DependencyCondition::expression(
                "data.a === 1 && data.b.c === 2",
            )),
            ..Default::default()
        };
        assert_eq!(fields(&deps), vec!["a", "b", "b.c"]);
    }

    #[test]
    fn field_value_reset_on_and_filters() {
        let deps = ComponentDependencies {
            required: Some(DependencyCondition::field("status", Operator::NotEmpty)),
            filter_by: Some(FilterBy::from(vec![
                FilterDependency::new("country", "country_id"),
                FilterDependency::new("region", "region_id").with_transform("data.mode"),
            ])),
            reset_on: vec!["country".into()],
            ..Default::default()
        };
        assert_eq!(fields(&deps), vec!["country", "mode", "region", "status"]);
    }

    #[test]
    fn template_placeholders() {
        let deps = ComponentDependencies {
            label: Some(ComputedProperty::template("{data.first} {address.city}")),
            ..Default::default()
        };
        assert_eq!(fields(&deps), vec!["address", "address.city", "first"]);
    }

    #[test]
    fn root_data_and_computed_index() {
        let deps = ComponentDependencies {
            value: Some(ComputedProperty::expression(
                "rootData.total + data.items[data.idx].price",
            )),
            ..Default::default()
        };
        assert_eq!(fields(&deps), vec!["idx", "items", "total"]);
    }

    #[test]
    fn parent_data_is_not_a_field() {
        let deps = ComponentDependencies {
            visible: Some(DependencyCondition::expression("parentData.kind === 'x'")),
            ..Default::default()
        };
        assert!(fields(&deps).is_empty());
    }

    #[test]
    fn broken_source_falls_back_to_scan() {
        let deps = ComponentDependencies {
            disabled: Some(DependencyCondition::expression("data.x.y.z.invalid((")),
            ..Default::default()
        };
        assert_eq!(fields(&deps), vec!["x"]);
    }

    #[test]
    fn function_reads_from_registry() {
        let mut registry = FunctionRegistry::new();
        registry.register_reading("isAdult", &["person.age"], |_| Ok(None));
        let deps = ComponentDependencies {
            visible: Some(DependencyCondition::function("isAdult")),
            ..Default::default()
        };
        let compiled = Compiler::new(&registry, &EngineConfig::default()).dependencies(&deps);
        let got: Vec<&str> = compiled.dependent_fields().iter().map(String::as_str).collect();
        assert_eq!(got, vec!["person", "person.age"]);
    }

    fn compile(deps: &ComponentDependencies) -> CompiledDependencies {
        Compiler::new(&FunctionRegistry::new(), &EngineConfig::default()).dependencies(deps)
    }

    #[test]
    fn static_reads_do_not_flag_whole_data() {
        let deps = ComponentDependencies {
            visible: Some(DependencyCondition::expression(
                "data.a && data.items[data.idx].price > rootData.limit",
            )),
            ..Default::default()
        };
        assert!(!compile(&deps).reads_all_data());
    }

    #[test]
    fn bare_data_flags_whole_data() {
        for source in ["Boolean(data)", "data[data.key]", "isEmpty(rootData)"] {
            let deps = ComponentDependencies {
                visible: Some(DependencyCondition::expression(source)),
                ..Default::default()
            };
            assert!(compile(&deps).reads_all_data(), "{source}");
        }
    }

    #[test]
    fn computed_key_still_records_static_parts() {
        let deps = ComponentDependencies {
            value: Some(ComputedProperty::expression("data[data.key]")),
            ..Default::default()
        };
        let compiled = compile(&deps);
        assert!(compiled.reads_all_data());
        assert_eq!(
            compiled.dependent_fields().iter().collect::<Vec<_>>(),
            vec!["key"]
        );
    }

    #[test]
    fn opaque_function_flags_whole_data() {
        let mut registry = FunctionRegistry::new();
        registry.register("opaque", |_| Ok(None));
        registry.register_reading("declared", &["age"], |_| Ok(None));
        let compiler = Compiler::new(&registry, &EngineConfig::default());

        let opaque = ComponentDependencies {
            visible: Some(DependencyCondition::function("opaque")),
            ..Default::default()
        };
        assert!(compiler.dependencies(&opaque).reads_all_data());

        let declared = ComponentDependencies {
            visible: Some(DependencyCondition::function("declared")),
            ..Default::default()
        };
        assert!(!compiler.dependencies(&declared).reads_all_data());
    }

    #[test]
    fn deeply_nested_source_is_scanned() {
        let source = format!("{}data.a{}", "(".repeat(300), ")".repeat(300));
        let deps = ComponentDependencies {
            disabled: Some(DependencyCondition::expression(&source)),
            ..Default::default()
        };
        assert_eq!(fields(&deps), vec!["a"]);
    }

    #[test]
    fn oversized_source_is_scanned() {
        let padding = "(".repeat(DEFAULT_MAX_SOURCE_LEN);
        let source = format!("{padding}data.a{}", ")".repeat(DEFAULT_MAX_SOURCE_LEN));
        let deps = ComponentDependencies {
            disabled: Some(DependencyCondition::expression(&source)),
            ..Default::default()
        };
        assert_eq!(fields(&deps), vec!["a"]);
    }
}
