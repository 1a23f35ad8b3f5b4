//! Binding resolver.
//!
//! Resolves prop values against a data context. Three shapes are understood:
//! bind-descriptors (`{"bind": "path", "default": ...}`), template strings
//! containing `{{token}}` expressions, and plain literals which pass through
//! unchanged. Resolution is pure and deterministic: no side effects, safe to
//! call repeatedly on the same inputs.

use serde_json::{Map, Value};

/// The data a template resolves against: the document payload, injected
/// style constants, and (inside a repeat scope) the current array element.
///
/// Read-only per layout pass. Repeat nodes derive child contexts with
/// [`BindingContext::child_for`]; the parent context is never mutated.
#[derive(Debug, Clone)]
pub struct BindingContext {
    root: Map<String, Value>,
    current: Option<Value>,
}

impl BindingContext {
    /// Build a context from the document payload. A non-object payload still
    /// works: it is only reachable through the current-item path (`"."`).
    pub fn new(data: &Value) -> Self {
        let root = match data {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        BindingContext {
            root,
            current: None,
        }
    }

    /// Shallow-merge injected style constants. Payload fields win on
    /// collision so document data can override theme defaults.
    pub fn with_constants(mut self, constants: &Map<String, Value>) -> Self {
        for (key, value) in constants {
            self.root.entry(key.clone()).or_insert_with(|| value.clone());
        }
        self
    }

    /// Derive the merged context for one repeat element: parent fields,
    /// shallow-merged record fields, and an explicit current-item slot.
    pub fn child_for(&self, item: &Value) -> Self {
        let mut root = self.root.clone();
        if let Value::Object(fields) = item {
            for (key, value) in fields {
                root.insert(key.clone(), value.clone());
            }
        }
        BindingContext {
            root,
            current: Some(item.clone()),
        }
    }

    /// Resolve a dot-separated path. `"."` or `""` means the current repeat
    /// item. Path segments traverse objects by key and arrays by index.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        if path.is_empty() || path == "." {
            return self.current.as_ref();
        }
        let mut parts = path.split('.');
        let mut value = self.root.get(parts.next()?)?;
        for part in parts {
            match value {
                Value::Object(map) => value = map.get(part)?,
                Value::Array(arr) => {
                    let idx: usize = part.parse().ok()?;
                    value = arr.get(idx)?;
                }
                _ => return None,
            }
        }
        Some(value)
    }
}

/// Resolve a single prop value against the context.
///
/// Missing bind paths fall back to the descriptor's `default` (or null when
/// none is given); this is never an error.
pub fn resolve(value: &Value, ctx: &BindingContext) -> Value {
    if let Some((path, default)) = as_bind_descriptor(value) {
        return match ctx.lookup(path) {
            Some(found) if !found.is_null() => found.clone(),
            _ => default.cloned().unwrap_or(Value::Null),
        };
    }
    if let Value::String(s) = value {
        if s.contains("{{") {
            return Value::String(substitute(s, ctx));
        }
    }
    value.clone()
}

/// Resolve a prop value and coerce the result to display text.
pub fn resolve_text(value: &Value, ctx: &BindingContext) -> String {
    coerce_text(&resolve(value, ctx))
}

fn as_bind_descriptor(value: &Value) -> Option<(&str, Option<&Value>)> {
    let map = value.as_object()?;
    let path = map.get("bind")?.as_str()?;
    Some((path, map.get("default")))
}

/// Substitute every `{{expr}}` token in a template string. An unterminated
/// token passes through verbatim.
fn substitute(template: &str, ctx: &BindingContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let expr = after[..end].trim();
                let resolved = ctx.lookup(expr).cloned().unwrap_or(Value::Null);
                out.push_str(&coerce_text(&resolved));
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Keys tried, in order, when coercing an object to display text.
const DISPLAY_KEYS: &[&str] = &["name", "label", "title", "text", "value"];

/// Coerce a resolved value to text for template substitution.
///
/// Null renders empty, arrays comma-join their coerced non-empty elements,
/// and objects try a fixed priority key list before falling back to their
/// JSON serialization.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(coerce_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => {
            for key in DISPLAY_KEYS {
                if let Some(found) = map.get(*key) {
                    if !found.is_null() {
                        return coerce_text(found);
                    }
                }
            }
            value.to_string()
        }
    }
}

/// Truthiness for flag props like `noPageBlock`.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bind_resolves_nested_path() {
        let ctx = BindingContext::new(&json!({"a": {"b": "y"}}));
        let resolved = resolve(&json!({"bind": "a.b", "default": "x"}), &ctx);
        assert_eq!(resolved, json!("y"));
    }

    #[test]
    fn bind_falls_back_to_default() {
        let ctx = BindingContext::new(&json!({}));
        let resolved = resolve(&json!({"bind": "a.b", "default": "x"}), &ctx);
        assert_eq!(resolved, json!("x"));
    }

    #[test]
    fn bind_without_default_resolves_null() {
        let ctx = BindingContext::new(&json!({}));
        assert_eq!(resolve(&json!({"bind": "missing"}), &ctx), Value::Null);
    }

    #[test]
    fn dot_path_means_current_item() {
        let ctx = BindingContext::new(&json!({})).child_for(&json!("Rust"));
        assert_eq!(resolve(&json!({"bind": "."}), &ctx), json!("Rust"));
        assert_eq!(resolve(&json!({"bind": ""}), &ctx), json!("Rust"));
    }

    #[test]
    fn path_traverses_array_index() {
        let ctx = BindingContext::new(&json!({"jobs": [{"role": "dev"}]}));
        assert_eq!(ctx.lookup("jobs.0.role"), Some(&json!("dev")));
    }

    #[test]
    fn child_context_merges_record_fields() {
        let ctx = BindingContext::new(&json!({"company": "root"}));
        let child = ctx.child_for(&json!({"company": "Acme", "role": "dev"}));
        assert_eq!(child.lookup("company"), Some(&json!("Acme")));
        assert_eq!(child.lookup("role"), Some(&json!("dev")));
        // parent is untouched
        assert_eq!(ctx.lookup("company"), Some(&json!("root")));
    }

    #[test]
    fn constants_never_shadow_payload() {
        let mut constants = Map::new();
        constants.insert("accent".into(), json!("#888"));
        constants.insert("name".into(), json!("fallback"));
        let ctx = BindingContext::new(&json!({"name": "Ada"})).with_constants(&constants);
        assert_eq!(ctx.lookup("accent"), Some(&json!("#888")));
        assert_eq!(ctx.lookup("name"), Some(&json!("Ada")));
    }

    #[test]
    fn template_coerces_arrays() {
        let ctx = BindingContext::new(&json!({"n": [1, 2, 3]}));
        assert_eq!(resolve_text(&json!("{{n}} items"), &ctx), "1, 2, 3 items");
    }

    #[test]
    fn template_coerces_objects_by_priority_key() {
        let ctx = BindingContext::new(&json!({
            "job": {"title": "Engineer", "value": "ignored"}
        }));
        assert_eq!(resolve_text(&json!("{{job}}"), &ctx), "Engineer");
    }

    #[test]
    fn template_missing_token_renders_empty() {
        let ctx = BindingContext::new(&json!({}));
        assert_eq!(resolve_text(&json!("hi {{nobody}}!"), &ctx), "hi !");
    }

    #[test]
    fn unterminated_token_passes_through() {
        let ctx = BindingContext::new(&json!({"a": 1}));
        assert_eq!(resolve_text(&json!("{{a}} and {{b"), &ctx), "1 and {{b");
    }

    #[test]
    fn array_coercion_filters_empty_elements() {
        let ctx = BindingContext::new(&json!({"xs": ["A", null, "", "B"]}));
        assert_eq!(resolve_text(&json!("{{xs}}"), &ctx), "A, B");
    }

    #[test]
    fn object_without_display_key_serializes_defensively() {
        let ctx = BindingContext::new(&json!({"o": {"zz": 1}}));
        assert_eq!(resolve_text(&json!("{{o}}"), &ctx), r#"{"zz":1}"#);
    }

    #[test]
    fn non_string_literals_pass_through() {
        let ctx = BindingContext::new(&json!({}));
        assert_eq!(resolve(&json!(42), &ctx), json!(42));
        assert_eq!(resolve(&json!(true), &ctx), json!(true));
        assert_eq!(resolve(&json!("plain"), &ctx), json!("plain"));
    }

    #[test]
    fn resolution_is_repeatable() {
        let ctx = BindingContext::new(&json!({"a": {"b": [1, 2]}}));
        let value = json!("{{a.b}} twice");
        assert_eq!(resolve(&value, &ctx), resolve(&value, &ctx));
    }
}
