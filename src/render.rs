//! Schema tree renderer.
//!
//! Recursively interprets a static schema tree against a binding context to
//! produce a resolved content tree. Two rules matter for pagination later:
//!
//! 1. Repeat nodes expand into N concatenated child renders, one per array
//!    element, preserving array order. That order is the pagination order.
//! 2. Every Stack/Row/Box renders as an atomic break boundary by default; a
//!    truthy `noPageBlock` prop lets the node flow with its siblings, and an
//!    explicit PageBlock node is always atomic.
//!
//! Rendering faults are contained per-node: an unknown type or a non-array
//! repeat target renders nothing and the rest of the document is unaffected.

use serde::Serialize;
use serde_json::Value;

use crate::binding::{is_truthy, resolve, resolve_text, BindingContext};
use crate::model::{NodeType, SchemaNode, Template};

/// A node of the resolved content tree: what the measurer and the print
/// adapter see. Props are already bound; repeat nodes are already expanded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedNode {
    #[serde(flatten)]
    pub kind: RenderedKind,

    /// Stable content-identity key: the schema node's `id` when present,
    /// otherwise the structural path (with repeat indices). Pagination
    /// results are compared by these keys across passes.
    pub key: String,

    /// Atomic pagination boundary: the measurer never groups this node with
    /// its siblings and the packer never splits it.
    pub atomic: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderedNode>,
}

/// Resolved node kinds. Only content that survives rendering appears here;
/// there is no variant for unknown input or for an image with an empty src.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderedKind {
    Stack { gap: f64 },
    Row { gap: f64 },
    Text { content: String },
    Heading { level: u8, content: String },
    Image { src: String, width: Option<f64>, height: Option<f64> },
    Divider,
    Box,
}

/// Render a whole template against a data payload. The result is a root
/// stack whose direct children are the flattened, ordered content roots the
/// measurer partitions into units.
pub fn render_document(template: &Template, data: &Value) -> RenderedNode {
    let ctx = BindingContext::new(data).with_constants(&template.constants);
    let mut children = Vec::new();
    for (idx, node) in template.children.iter().enumerate() {
        render_into(node, &ctx, &child_key("root", node, idx), &mut children);
    }
    RenderedNode {
        kind: RenderedKind::Stack { gap: 0.0 },
        key: "root".to_string(),
        atomic: false,
        children,
    }
}

/// Render a single schema node. Returns zero or more nodes: a repeat node
/// expands to one render per array element, and a faulty node (unknown type,
/// empty image src, non-array repeat target) renders to nothing.
pub fn render(node: &SchemaNode, ctx: &BindingContext) -> Vec<RenderedNode> {
    let key = node.id.clone().unwrap_or_else(|| "node".to_string());
    let mut out = Vec::new();
    render_into(node, ctx, &key, &mut out);
    out
}

/// Render one schema node (or its repeat expansion) into `out`.
fn render_into(node: &SchemaNode, ctx: &BindingContext, key: &str, out: &mut Vec<RenderedNode>) {
    if let Some(path) = &node.repeat {
        match ctx.lookup(path).cloned() {
            Some(Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    let item_ctx = ctx.child_for(item);
                    for (j, child) in node.children.iter().enumerate() {
                        let item_key = format!("{key}:{i}");
                        render_into(child, &item_ctx, &child_key(&item_key, child, j), out);
                    }
                }
            }
            _ => {
                log::debug!("repeat target {path:?} at {key} is not an array; rendering nothing");
            }
        }
        return;
    }
    if let Some(rendered) = render_node(node, ctx, key) {
        out.push(rendered);
    }
}

fn render_node(node: &SchemaNode, ctx: &BindingContext, key: &str) -> Option<RenderedNode> {
    let kind = match node.node_type {
        NodeType::Stack => RenderedKind::Stack { gap: number_prop(node, "gap", ctx).unwrap_or(0.0) },
        NodeType::Row => RenderedKind::Row { gap: number_prop(node, "gap", ctx).unwrap_or(0.0) },
        NodeType::Box | NodeType::PageBlock => RenderedKind::Box,
        NodeType::Divider => RenderedKind::Divider,
        NodeType::Text => RenderedKind::Text {
            content: text_prop(node, "content", ctx),
        },
        NodeType::Heading => RenderedKind::Heading {
            level: heading_level(node, ctx),
            content: text_prop(node, "content", ctx),
        },
        NodeType::Image => {
            let src = text_prop(node, "src", ctx);
            if src.is_empty() {
                // No broken-image placeholder: an unresolved src renders nothing.
                return None;
            }
            RenderedKind::Image {
                src,
                width: number_prop(node, "width", ctx),
                height: number_prop(node, "height", ctx),
            }
        }
        NodeType::Unknown => {
            log::warn!("unknown node type at {key}; rendering nothing");
            return None;
        }
    };

    let mut children = Vec::new();
    for (idx, child) in node.children.iter().enumerate() {
        render_into(child, ctx, &child_key(key, child, idx), &mut children);
    }

    Some(RenderedNode {
        atomic: is_atomic(node, ctx),
        kind,
        key: key.to_string(),
        children,
    })
}

/// Stack/Row/Box are implicit page blocks unless opted out; PageBlock always
/// is; leaves never are.
fn is_atomic(node: &SchemaNode, ctx: &BindingContext) -> bool {
    match node.node_type {
        NodeType::PageBlock => true,
        NodeType::Stack | NodeType::Row | NodeType::Box => node
            .props
            .get("noPageBlock")
            .map(|flag| !is_truthy(&resolve(flag, ctx)))
            .unwrap_or(true),
        _ => false,
    }
}

fn child_key(parent: &str, child: &SchemaNode, index: usize) -> String {
    match &child.id {
        Some(id) => id.clone(),
        None => format!("{parent}/{index}"),
    }
}

fn text_prop(node: &SchemaNode, name: &str, ctx: &BindingContext) -> String {
    node.props
        .get(name)
        .map(|value| resolve_text(value, ctx))
        .unwrap_or_default()
}

fn number_prop(node: &SchemaNode, name: &str, ctx: &BindingContext) -> Option<f64> {
    node.props.get(name).and_then(|value| resolve(value, ctx).as_f64())
}

fn heading_level(node: &SchemaNode, ctx: &BindingContext) -> u8 {
    number_prop(node, "level", ctx)
        .map(|level| (level as i64).clamp(1, 6) as u8)
        .unwrap_or(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template(children: Value) -> Template {
        serde_json::from_value(json!({ "children": children })).unwrap()
    }

    #[test]
    fn repeat_yields_one_instance_per_element() {
        let template = template(json!([
            {
                "type": "stack",
                "repeat": "skills",
                "children": [
                    { "type": "text", "props": { "content": "{{.}}" } }
                ]
            }
        ]));
        let root = render_document(&template, &json!({"skills": ["A", "B"]}));
        assert_eq!(root.children.len(), 2);
        let contents: Vec<_> = root
            .children
            .iter()
            .map(|c| match &c.kind {
                RenderedKind::Text { content } => content.as_str(),
                other => panic!("expected text, got {other:?}"),
            })
            .collect();
        assert_eq!(contents, ["A", "B"]);
    }

    #[test]
    fn repeat_over_records_merges_fields() {
        let template = template(json!([
            {
                "type": "box",
                "repeat": "work",
                "children": [
                    { "type": "heading", "props": { "content": "{{company}}", "level": 3 } }
                ]
            }
        ]));
        let root = render_document(
            &template,
            &json!({"work": [{"company": "Acme"}, {"company": "Initech"}]}),
        );
        assert_eq!(root.children.len(), 2);
        match &root.children[1].kind {
            RenderedKind::Heading { level, content } => {
                assert_eq!(*level, 3);
                assert_eq!(content, "Initech");
            }
            other => panic!("expected heading, got {other:?}"),
        }
    }

    #[test]
    fn non_array_repeat_target_renders_nothing() {
        let template = template(json!([
            {
                "type": "stack",
                "repeat": "skills",
                "children": [{ "type": "text", "props": { "content": "x" } }]
            }
        ]));
        let root = render_document(&template, &json!({"skills": "not an array"}));
        assert!(root.children.is_empty());
    }

    #[test]
    fn unknown_type_is_skipped_not_fatal() {
        let template = template(json!([
            { "type": "hologram" },
            { "type": "text", "props": { "content": "still here" } }
        ]));
        let root = render_document(&template, &json!({}));
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn empty_image_src_renders_nothing() {
        let template = template(json!([
            { "type": "image", "props": { "src": { "bind": "photo" } } },
            { "type": "image", "props": { "src": "avatar.png" } }
        ]));
        let root = render_document(&template, &json!({}));
        assert_eq!(root.children.len(), 1);
        match &root.children[0].kind {
            RenderedKind::Image { src, .. } => assert_eq!(src, "avatar.png"),
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn heading_level_clamps_to_1_through_6() {
        let template = template(json!([
            { "type": "heading", "props": { "content": "a", "level": 0 } },
            { "type": "heading", "props": { "content": "b", "level": 9 } },
            { "type": "heading", "props": { "content": "c" } }
        ]));
        let root = render_document(&template, &json!({}));
        let levels: Vec<u8> = root
            .children
            .iter()
            .map(|c| match &c.kind {
                RenderedKind::Heading { level, .. } => *level,
                other => panic!("expected heading, got {other:?}"),
            })
            .collect();
        assert_eq!(levels, [1, 6, 2]);
    }

    #[test]
    fn containers_are_atomic_unless_opted_out() {
        let template = template(json!([
            { "type": "box" },
            { "type": "stack", "props": { "noPageBlock": true } },
            { "type": "page-block", "props": { "noPageBlock": true } },
            { "type": "text", "props": { "content": "flow" } }
        ]));
        let root = render_document(&template, &json!({}));
        let atomics: Vec<bool> = root.children.iter().map(|c| c.atomic).collect();
        // page-block ignores the opt-out; leaves always flow
        assert_eq!(atomics, [true, false, true, false]);
    }

    #[test]
    fn keys_prefer_ids_and_encode_repeat_index() {
        let template = template(json!([
            {
                "type": "stack",
                "id": "skills-section",
                "repeat": "skills",
                "children": [{ "type": "text", "props": { "content": "{{.}}" } }]
            }
        ]));
        let root = render_document(&template, &json!({"skills": ["A", "B"]}));
        assert_eq!(root.children[0].key, "skills-section:0/0");
        assert_eq!(root.children[1].key, "skills-section:1/0");
    }

    #[test]
    fn single_node_render_expands_repeats() {
        let node: crate::model::SchemaNode = serde_json::from_value(json!({
            "type": "stack",
            "repeat": "xs",
            "children": [{ "type": "text", "props": { "content": "{{.}}" } }]
        }))
        .unwrap();
        let ctx = crate::binding::BindingContext::new(&json!({"xs": [1, 2, 3]}));
        assert_eq!(render(&node, &ctx).len(), 3);
    }

    #[test]
    fn row_gap_resolves_through_bindings() {
        let template = template(json!([
            { "type": "row", "props": { "gap": { "bind": "theme.gap", "default": 4 } } }
        ]));
        let root = render_document(&template, &json!({"theme": {"gap": 12}}));
        match &root.children[0].kind {
            RenderedKind::Row { gap } => assert_eq!(*gap, 12.0),
            other => panic!("expected row, got {other:?}"),
        }
    }
}
